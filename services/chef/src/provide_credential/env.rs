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

use async_trait::async_trait;
use cloudsign_core::{Context, ProvideCredential, Result};
use log::debug;

use super::load_client_key;
use crate::{constants::*, Credential};

/// EnvCredentialProvider loads chef credentials from environment variables.
///
/// - `CHEF_CLIENT_NAME`: the client name
/// - `CHEF_CLIENT_KEY`: the path to the client key, or the PEM text itself
///
/// Once both are set, failing to read the key is an error rather than a miss.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let (Some(name), Some(key)) = (ctx.env_var(CHEF_CLIENT_NAME), ctx.env_var(CHEF_CLIENT_KEY))
        else {
            return Ok(None);
        };

        debug!("loading chef credential of {name} from env");
        let private_key = load_client_key(ctx, &key, None).await?;
        Ok(Some(Credential::new(name, private_key)))
    }
}
