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

//! Tokio-based file reading for cloudsign.
//!
//! `TokioFileRead` implements [`FileRead`] with `tokio::fs`, which is what
//! credential providers use to read shared credential files and private keys.
//!
//! ## Example
//!
//! ```no_run
//! use cloudsign_core::{Context, OsEnv};
//! use cloudsign_file_read_tokio::TokioFileRead;
//!
//! # async fn example() -> cloudsign_core::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_env(OsEnv);
//!
//! let pem = ctx.file_read_as_string("/etc/chef/client.pem").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use cloudsign_core::{Error, FileRead, Result};
use std::io::ErrorKind;

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            let err = match e.kind() {
                ErrorKind::PermissionDenied => {
                    Error::credential_denied(format!("permission denied reading {path}"))
                }
                _ => Error::unexpected(format!("failed to read file {path}")),
            };
            err.with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudsign_core::{Context, ErrorKind as CoreErrorKind};
    use std::io::Write;

    #[tokio::test]
    async fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[default]").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let ctx = Context::new().with_file_read(TokioFileRead);
        assert_eq!(ctx.file_read(&path).await.unwrap(), b"[default]\n");
        assert_eq!(ctx.file_read_as_string(&path).await.unwrap(), "[default]\n");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pem");

        let err = TokioFileRead
            .file_read(&path.to_string_lossy())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Unexpected);
        assert!(err.to_string().contains("missing.pem"));
    }
}
