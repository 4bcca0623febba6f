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

use std::path::Path;

use cloudsign_core::{Context, Error, Result};

mod config;
pub use config::ConfigCredentialProvider;

mod config_file;
pub use config_file::ConfigFileCredentialProvider;

mod default;
pub use default::DefaultCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;

mod r#static;
pub use r#static::StaticCredentialProvider;

/// Resolve a `client_key` setting into PEM text.
///
/// Inline PEM is returned as is. Paths expand a leading `~` and relative
/// paths are joined onto `base` when given.
async fn load_client_key(ctx: &Context, client_key: &str, base: Option<&Path>) -> Result<String> {
    if client_key.trim_start().starts_with("-----BEGIN") {
        return Ok(client_key.to_string());
    }

    let path = ctx.expand_home_dir(client_key).ok_or_else(|| {
        Error::config_invalid(format!("failed to expand home dir for {client_key}"))
    })?;
    let path = match base {
        Some(base) if Path::new(&path).is_relative() => base.join(&path).to_string_lossy().to_string(),
        _ => path,
    };

    ctx.file_read_as_string(&path).await
}
