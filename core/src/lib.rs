// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Core components for signing and executing cloud API requests.
//!
//! This crate provides the foundational types and traits shared by the
//! cloudsign service crates.
//!
//! ## Overview
//!
//! - **Context**: holds the file reader, HTTP transport and environment used
//!   while loading credentials and sending requests.
//! - **Traits**: [`ProvideCredential`] loads credentials, [`SignRequest`]
//!   mutates a request so the service accepts it.
//! - **Signer**: pairs a provider with a request signer and caches credentials.
//! - **Retrier**: runs a call under a quadratic backoff [`RetryPolicy`].
//! - **RequestExecutor**: signs, sends and retries a request end to end.
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use cloudsign_core::{Body, Context, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//! use http::HeaderValue;
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug)]
//! struct Token(String);
//!
//! impl SigningCredential for Token {
//!     fn is_valid(&self) -> bool {
//!         !self.0.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct StaticToken;
//!
//! #[async_trait]
//! impl ProvideCredential for StaticToken {
//!     type Credential = Token;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
//!         Ok(Some(Token("my-token".to_string())))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct BearerSigner;
//!
//! #[async_trait]
//! impl SignRequest for BearerSigner {
//!     type Credential = Token;
//!
//!     async fn sign_request(
//!         &self,
//!         _: &Context,
//!         req: &mut http::Request<Body>,
//!         credential: Option<&Token>,
//!         _: Option<Duration>,
//!     ) -> Result<()> {
//!         if let Some(token) = credential {
//!             let value = HeaderValue::from_str(&format!("Bearer {}", token.0))?;
//!             req.headers_mut().insert(http::header::AUTHORIZATION, value);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), StaticToken, BearerSigner);
//!
//! let mut req = http::Request::builder()
//!     .uri("https://example.com")
//!     .body(Body::Empty)?;
//! signer.sign(&mut req, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`canonical`]: canonical string building and percent-encoding
//! - [`hash`]: Base64, SHA1 and HMAC helpers
//! - [`time`]: time formatting and parsing
//! - [`utils`]: redaction of secrets in `Debug` output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod canonical;
pub mod hash;
pub mod response;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod body;
pub use body::Body;

mod context;
pub use context::{Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, ProvideCredentialChain, SignRequest, SigningCredential};

mod request;
pub use request::SigningRequest;

mod signer;
pub use signer::Signer;

mod retry;
pub use retry::{
    QuadraticBackoff, Retrier, RetryClassifier, RetryOn, RetryPolicy, RetryWhenTemporary,
    CLOUDSIGN_RETRY_MAX_PERIOD_MS, CLOUDSIGN_RETRY_MAX_TRIES, CLOUDSIGN_RETRY_PERIOD_MS,
};

mod executor;
pub use executor::RequestExecutor;
