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

use bytes::Bytes;
use http::Request;
use http::Response;
use log::debug;

use crate::response::check_response;
use crate::Body;
use crate::Result;
use crate::Retrier;
use crate::Signer;
use crate::SigningCredential;

/// RequestExecutor signs, sends and retries requests.
///
/// Every attempt starts from a fresh copy of the request template and is
/// signed again, so timestamps advance and stale signatures are replaced.
/// Responses go through [`check_response`] before the retrier sees them.
#[derive(Debug, Clone)]
pub struct RequestExecutor<K: SigningCredential> {
    signer: Signer<K>,
    retrier: Retrier,
}

impl<K: SigningCredential> RequestExecutor<K> {
    /// Create an executor with the default [`Retrier`].
    pub fn new(signer: Signer<K>) -> Self {
        Self {
            signer,
            retrier: Retrier::default(),
        }
    }

    /// Replace the retrier.
    pub fn with_retrier(mut self, retrier: Retrier) -> Self {
        self.retrier = retrier;
        self
    }

    /// Get the signer used by this executor.
    pub fn signer(&self) -> &Signer<K> {
        &self.signer
    }

    /// Execute the request until it succeeds or the retrier gives up.
    pub async fn execute(&self, req: Request<Body>) -> Result<Response<Bytes>> {
        let template = &req;
        let signer = &self.signer;

        self.retrier
            .call_async(|| async move {
                let mut req = clone_request(template);
                signer.sign(&mut req, None).await?;

                debug!("sending request: {} {}", req.method(), req.uri());
                let (parts, body) = req.into_parts();
                let resp = signer
                    .context()
                    .http_send(Request::from_parts(parts, body.into_bytes()))
                    .await?;

                check_response(resp)
            })
            .await
    }
}

/// `http::Request` is not `Clone` because of its extensions, which signing
/// never reads.
fn clone_request(req: &Request<Body>) -> Request<Body> {
    let mut cloned = Request::new(req.body().clone());
    *cloned.method_mut() = req.method().clone();
    *cloned.uri_mut() = req.uri().clone();
    *cloned.version_mut() = req.version();
    *cloned.headers_mut() = req.headers().clone();
    cloned
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_clone_request() {
        let req = Request::builder()
            .method(Method::PUT)
            .uri("https://example.com/a?b=c")
            .header("content-type", "text/plain")
            .body(Body::from("hello"))
            .unwrap();

        let cloned = clone_request(&req);
        assert_eq!(cloned.method(), &Method::PUT);
        assert_eq!(cloned.uri(), req.uri());
        assert_eq!(cloned.headers(), req.headers());
        assert_eq!(cloned.body(), req.body());
    }
}
