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

//! AWS signature version 2.

pub use cloudsign_aws_v2::*;

#[cfg(feature = "default-context")]
use crate::{default_context, Signer};

/// Signer using AWS signature version 2 credentials.
#[cfg(feature = "default-context")]
pub type DefaultSigner = Signer<Credential>;

/// Signer for query APIs with the default context and credential chain.
#[cfg(feature = "default-context")]
pub fn default_form_signer() -> DefaultSigner {
    let ctx = default_context();
    let config = std::sync::Arc::new(Config::new().from_env(&ctx));
    let provider = DefaultCredentialProvider::from_config(config);
    Signer::new(ctx, provider, FormRequestSigner::new())
}

/// Signer for the S3 REST API with the default context and credential chain.
#[cfg(feature = "default-context")]
pub fn default_rest_signer() -> DefaultSigner {
    let ctx = default_context();
    let config = std::sync::Arc::new(Config::new().from_env(&ctx));
    let provider = DefaultCredentialProvider::from_config(config);
    Signer::new(ctx, provider, RestRequestSigner::new())
}
