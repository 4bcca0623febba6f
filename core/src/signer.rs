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

use crate::{Body, Context, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Signer is the main struct used to sign the request.
///
/// It pairs a credential provider with a request signer and caches the last
/// valid credential. The cache is refreshed whenever the cached value stops
/// being valid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    signer: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        signer: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            provider: Arc::new(provider),
            signer: Arc::new(signer),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the context used for loading credentials and signing.
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// Replace the credential provider, the cached credential is dropped.
    pub fn with_credential_provider(
        mut self,
        provider: impl ProvideCredential<Credential = K>,
    ) -> Self {
        self.provider = Arc::new(provider);
        self.credential = Arc::new(Mutex::new(None));
        self
    }

    /// Replace the request signer.
    pub fn with_request_signer(mut self, signer: impl SignRequest<Credential = K>) -> Self {
        self.signer = Arc::new(signer);
        self
    }

    /// Get the context of this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Signing request.
    ///
    /// The lock is never held across an await point.
    pub async fn sign(
        &self,
        req: &mut http::Request<Body>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let credential = self.credential.lock().expect("lock poisoned").clone();
        let credential = if credential.is_valid() {
            credential
        } else {
            let loaded = self.provider.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = loaded.clone();
            loaded
        };

        self.signer
            .sign_request(&self.ctx, req, credential.as_ref(), expires_in)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct Token {
        value: String,
        valid: bool,
    }

    impl SigningCredential for Token {
        fn is_valid(&self) -> bool {
            self.valid
        }
    }

    #[derive(Debug)]
    struct CountingProvider {
        loads: Arc<AtomicUsize>,
        valid: bool,
    }

    #[async_trait::async_trait]
    impl ProvideCredential for CountingProvider {
        type Credential = Token;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Token {
                value: format!("token-{n}"),
                valid: self.valid,
            }))
        }
    }

    #[derive(Debug)]
    struct HeaderSigner;

    #[async_trait::async_trait]
    impl SignRequest for HeaderSigner {
        type Credential = Token;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::Request<Body>,
            credential: Option<&Token>,
            _: Option<Duration>,
        ) -> Result<()> {
            let Some(cred) = credential else {
                return Ok(());
            };
            req.headers_mut()
                .insert("x-token", HeaderValue::from_str(&cred.value)?);
            Ok(())
        }
    }

    fn request() -> http::Request<Body> {
        http::Request::builder()
            .uri("https://example.com/")
            .body(Body::Empty)
            .unwrap()
    }

    #[tokio::test]
    async fn test_signer_caches_valid_credential() {
        let loads = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            CountingProvider {
                loads: loads.clone(),
                valid: true,
            },
            HeaderSigner,
        );

        for _ in 0..3 {
            let mut req = request();
            signer.sign(&mut req, None).await.unwrap();
            assert_eq!(req.headers()["x-token"], "token-0");
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_signer_reloads_invalid_credential() {
        let loads = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            CountingProvider {
                loads: loads.clone(),
                valid: false,
            },
            HeaderSigner,
        );

        let mut req = request();
        signer.sign(&mut req, None).await.unwrap();
        let mut req = request();
        signer.sign(&mut req, None).await.unwrap();

        assert_eq!(req.headers()["x-token"], "token-1");
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }
}
