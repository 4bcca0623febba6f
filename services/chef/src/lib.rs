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

//! Chef server signer.
//!
//! Chef servers authenticate requests with an RSA signature over the
//! method, path, body digest, timestamp and client name, carried in the
//! `X-Ops-*` headers.
//!
//! ## Example
//!
//! ```no_run
//! use cloudsign_chef::{DefaultCredentialProvider, RequestSigner};
//! use cloudsign_core::{Body, Context, OsEnv, Result, Signer};
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(
//!     Context::new().with_env(OsEnv),
//!     DefaultCredentialProvider::new(),
//!     RequestSigner::new(),
//! );
//!
//! let mut req = http::Request::get("https://chef.example.com/organizations/bedrock/nodes")
//!     .body(Body::Empty)?;
//! signer.sign(&mut req, None).await?;
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::RequestSigner;
