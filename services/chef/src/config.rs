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

use std::fmt::{Debug, Formatter};

use crate::constants::*;
use cloudsign_core::{utils::Redact, Context};

/// Config carries all the configuration for chef servers.
#[derive(Clone, Default)]
pub struct Config {
    /// `client_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CHEF_CLIENT_NAME`]
    pub client_name: Option<String>,
    /// `client_key` is the path to a PEM key, or the PEM text itself.
    ///
    /// It will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CHEF_CLIENT_KEY`]
    pub client_key: Option<String>,
    /// `profile` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CHEF_PROFILE`]
    pub profile: Option<String>,
    /// `credentials_file` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CHEF_CREDENTIALS_FILE`]
    pub credentials_file: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client name.
    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    /// Set the client key path or PEM text.
    pub fn with_client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = Some(client_key.into());
        self
    }

    /// Set the profile in the credentials file.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the credentials file path.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Load config from env, keeping the values already set.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if let Some(v) = envs.get(CHEF_CLIENT_NAME) {
            self.client_name.get_or_insert(v.clone());
        }
        if let Some(v) = envs.get(CHEF_CLIENT_KEY) {
            self.client_key.get_or_insert(v.clone());
        }
        if let Some(v) = envs.get(CHEF_PROFILE) {
            self.profile.get_or_insert(v.clone());
        }
        if let Some(v) = envs.get(CHEF_CREDENTIALS_FILE) {
            self.credentials_file.get_or_insert(v.clone());
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_name", &self.client_name)
            .field("client_key", &Redact::from(&self.client_key))
            .field("profile", &self.profile)
            .field("credentials_file", &self.credentials_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudsign_core::StaticEnv;
    use std::collections::HashMap;

    #[test]
    fn test_from_env_keeps_explicit_values() {
        let ctx = Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::from([
                (CHEF_CLIENT_NAME.to_string(), "env-client".to_string()),
                (CHEF_CLIENT_KEY.to_string(), "/etc/chef/client.pem".to_string()),
                (CHEF_PROFILE.to_string(), "staging".to_string()),
            ]),
        });

        let cfg = Config::new().with_client_name("fred").from_env(&ctx);
        assert_eq!(cfg.client_name.as_deref(), Some("fred"));
        assert_eq!(cfg.client_key.as_deref(), Some("/etc/chef/client.pem"));
        assert_eq!(cfg.profile.as_deref(), Some("staging"));
        assert_eq!(cfg.credentials_file, None);
    }
}
