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

//! AWS Signature Version 2 signers.
//!
//! Two flavours of the legacy V2 signature are provided:
//!
//! - [`FormRequestSigner`] for query APIs (EC2, SQS, SimpleDB) where the
//!   signature travels as the `Signature` parameter.
//! - [`RestRequestSigner`] for the S3 REST API where the signature travels in
//!   `Authorization: AWS <key>:<signature>`.
//!
//! ## Example
//!
//! ```no_run
//! use cloudsign_aws_v2::{FormRequestSigner, StaticCredentialProvider};
//! use cloudsign_core::{Body, Context, Result, Signer};
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(
//!     Context::new(),
//!     StaticCredentialProvider::new("access_key_id", "secret_access_key"),
//!     FormRequestSigner::new(),
//! );
//!
//! let mut req = http::Request::post("https://ec2.amazonaws.com/")
//!     .body(Body::from("Action=DescribeImages&Version=2010-06-15"))?;
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

mod sign_form;
pub use sign_form::{FormRequestSigner, SignatureMethod};

mod sign_rest;
pub use sign_rest::RestRequestSigner;
