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

//! Chef server signed header authentication, protocol version 1.0.
//!
//! - [Chef Infra Server API authentication](https://docs.chef.io/server/api_chef_server/#authentication-headers)

use std::time::Duration;

use async_trait::async_trait;
use cloudsign_core::hash::{base64_encode, base64_sha1, EMPTY_SHA1_BASE64};
use cloudsign_core::time::{format_iso8601_with_separator, now, DateTime};
use cloudsign_core::{Body, Context, Error, Result, SignRequest, SigningRequest};
use http::header::HeaderName;
use http::HeaderValue;
use log::debug;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};

use crate::constants::*;
use crate::Credential;

/// RequestSigner adds the `X-Ops-*` headers a chef server authenticates.
#[derive(Debug, Clone, Default)]
pub struct RequestSigner {
    signature_logging: bool,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the string to sign at `debug` on the `cloudsign::signature` target.
    pub fn with_signature_logging(mut self, enabled: bool) -> Self {
        self.signature_logging = enabled;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request in place.
    pub fn sign(&self, req: &mut http::Request<Body>, cred: &Credential) -> Result<()> {
        let now = self.time.unwrap_or_else(now);
        // Parse before taking the request apart so a bad key leaves it intact.
        let key = parse_private_key(&cred.private_key)?;

        let mut ctx = SigningRequest::build(req)?;
        remove_stale_authorization(&mut ctx);

        let timestamp = format_iso8601_with_separator(now);
        let content_hash = if ctx.body.is_empty() {
            EMPTY_SHA1_BASE64.to_string()
        } else {
            base64_sha1(ctx.body.as_bytes())
        };

        let string_to_sign = format!(
            "Method:{}\nHashed Path:{}\nX-Ops-Content-Hash:{}\nX-Ops-Timestamp:{}\nX-Ops-UserId:{}",
            ctx.method.as_str(),
            base64_sha1(canonical_path(&ctx.path).as_bytes()),
            content_hash,
            timestamp,
            cred.user_id,
        );
        if self.signature_logging {
            debug!(target: "cloudsign::signature", "string to sign: {string_to_sign:?}");
        }

        // Version 1.0 signs the canonical string itself, without a DigestInfo prefix.
        let signature = key
            .sign(Pkcs1v15Sign::new_unprefixed(), string_to_sign.as_bytes())
            .map_err(|e| Error::signing_failed("failed to sign chef request").with_source(e))?;
        let signature = base64_encode(&signature);

        ctx.headers.insert(
            HeaderName::from_static(X_OPS_SIGN),
            HeaderValue::from_static(SIGN_VERSION),
        );
        ctx.header_insert(HeaderName::from_static(X_OPS_USERID), &cred.user_id)?;
        ctx.header_insert(HeaderName::from_static(X_OPS_TIMESTAMP), &timestamp)?;
        ctx.header_insert(HeaderName::from_static(X_OPS_CONTENT_HASH), &content_hash)?;
        for (idx, chunk) in signature.as_bytes().chunks(AUTHORIZATION_CHUNK).enumerate() {
            let name = HeaderName::from_bytes(
                format!("{X_OPS_AUTHORIZATION_PREFIX}{}", idx + 1).as_bytes(),
            )?;
            let mut value = HeaderValue::from_bytes(chunk)?;
            value.set_sensitive(true);
            ctx.headers.insert(name, value);
        }

        ctx.apply(req)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut http::Request<Body>,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        if expires_in.is_some() {
            return Err(Error::request_invalid(
                "chef signed headers can't be turned into an expiring url",
            ));
        }

        let Some(cred) = credential else {
            debug!("no credential provided, leaving request unsigned");
            return Ok(());
        };

        self.sign(req, cred)
    }
}

/// Collapse repeated `/` and drop the trailing one, except for the root.
fn canonical_path(path: &str) -> String {
    let mut s = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && s.ends_with('/') {
            continue;
        }
        s.push(c);
    }
    if s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    if s.is_empty() {
        s.push('/');
    }
    s
}

fn remove_stale_authorization(ctx: &mut SigningRequest) {
    let stale: Vec<HeaderName> = ctx
        .headers
        .keys()
        .filter(|k| k.as_str().starts_with(X_OPS_AUTHORIZATION_PREFIX))
        .cloned()
        .collect();
    for k in stale {
        ctx.headers.remove(k);
    }
}

/// Parse PEM text as PKCS#1 (`knife` default) and fall back to PKCS#8.
fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| Error::credential_invalid("failed to parse chef private key").with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const PKCS1: &str = include_str!("../testdata/chef.pem");
    const PKCS8: &str = include_str!("../testdata/chef-pkcs8.pem");

    fn signer() -> RequestSigner {
        RequestSigner::new()
            .with_signature_logging(true)
            .with_time(Utc.with_ymd_and_hms(2009, 1, 1, 12, 0, 0).unwrap())
    }

    fn header<'a>(req: &'a http::Request<Body>, name: &str) -> &'a str {
        req.headers()[name].to_str().unwrap()
    }

    fn authorization(req: &http::Request<Body>) -> Vec<String> {
        (1..)
            .map_while(|i| req.headers().get(format!("x-ops-authorization-{i}")))
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_sign_get() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut req = http::Request::get("https://chef.example.com/organizations/bedrock/nodes")
            .body(Body::Empty)?;
        signer().sign(&mut req, &Credential::new("fred", PKCS1))?;

        assert_eq!(header(&req, "x-ops-sign"), "version=1.0");
        assert_eq!(header(&req, "x-ops-userid"), "fred");
        assert_eq!(header(&req, "x-ops-timestamp"), "2009-01-01T12:00:00Z");
        assert_eq!(header(&req, "x-ops-content-hash"), EMPTY_SHA1_BASE64);
        assert_eq!(
            authorization(&req),
            vec![
                "gmkVlYsV6BGu+MVmeGV95UCiZTPY8bzTQB8z3DO9Pjaex95n78AU+2ZzEzFH",
                "2ru/PV43CNXQaNtQUwrO7GDFtfpcdb9+PEm3uuFY5RljWPyJvNoekGsQLXV6",
                "ysHFDpFUW3dlMOS83ud0bus44HcRB8y4/tBwQ+L/AsTrIggeGqZSAL9sfsJI",
                "YwIbHRFW98N05RjhC2FkzuOOJ6oaRn+7SPBkB+C4TNgQf161N1VA6Iz+hFJJ",
                "UfIOHPJXPs7/5lP+B9ZBwuu4h09L4m3eliXxLVqr91nsVj4kYgel+i+RT+CZ",
                "7nv3fyz4zrst1fW/2KgMOFBzcUpYROkVlNAFwvtw6Q==",
            ]
        );
        assert!(req.headers()["x-ops-authorization-1"].is_sensitive());
        Ok(())
    }

    #[test_case(PKCS1; "pkcs1")]
    #[test_case(PKCS8; "pkcs8")]
    fn test_sign_post(key: &str) -> anyhow::Result<()> {
        let mut req = http::Request::post("https://chef.example.com/organizations/bedrock//clients/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"fred"}"#))?;
        signer().sign(&mut req, &Credential::new("fred", key))?;

        assert_eq!(header(&req, "x-ops-content-hash"), "85GjKCpE2SlkqP8EeBdHLV4d+rg=");
        assert_eq!(
            authorization(&req),
            vec![
                "ISD9tT3d+Jzhb5ggGng5mmKMIQnSdbQteE23nD7aU8CvYZorJji9O61VowQ0",
                "ITryLZMmw/TV3GHceo4dUrrEXlZp9+p7MkvNWiryG9mwtGGExOdpu0shfetW",
                "d6eqamk/pN3Zym5EP7R+cpMrP0OyLAMVsNL8x3kdH0cJj+i0hR7XViE4Zm3z",
                "t8cExua0bngc8XX5/MNz1OVbcLDm/wjouyvcPT6CnUo8Of1B+n8Mkcs93S2o",
                "ickUofQQD8mXneg7p3Lh/HPjU0ntjjMR0Cv3w5uk8m07BMzU0iwP7bo5Uh5g",
                "BnIfV6Z31wd6vGTh55RNkpekgdKF7//bYpMOCfwNbA==",
            ]
        );
        // The request itself is left as sent.
        assert_eq!(req.uri().path(), "/organizations/bedrock//clients/");
        assert_eq!(req.body(), &Body::from(r#"{"name":"fred"}"#));
        Ok(())
    }

    #[test]
    fn test_resign_removes_stale_chunks() -> anyhow::Result<()> {
        let mut req = http::Request::get("https://chef.example.com/organizations/bedrock/nodes")
            .header("x-ops-authorization-7", "stale")
            .header("x-ops-authorization-1", "stale")
            .body(Body::Empty)?;

        let cred = Credential::new("fred", PKCS1);
        signer().sign(&mut req, &cred)?;
        signer().sign(&mut req, &cred)?;

        let chunks = authorization(&req);
        assert_eq!(chunks.len(), 6);
        assert!(chunks[0].starts_with("gmkVlYsV6BGu"));
        assert!(req.headers().get("x-ops-authorization-7").is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_key_leaves_request_untouched() -> anyhow::Result<()> {
        let mut req = http::Request::get("https://chef.example.com/nodes").body(Body::Empty)?;

        let err = signer()
            .sign(&mut req, &Credential::new("fred", "not a pem"))
            .unwrap_err();
        assert_eq!(err.kind(), cloudsign_core::ErrorKind::CredentialInvalid);
        assert_eq!(req.uri().to_string(), "https://chef.example.com/nodes");
        assert!(req.headers().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_expiring_url_is_rejected() -> anyhow::Result<()> {
        let mut req = http::Request::get("https://chef.example.com/nodes").body(Body::Empty)?;

        let err = signer()
            .sign_request(
                &Context::new(),
                &mut req,
                Some(&Credential::new("fred", PKCS1)),
                Some(Duration::from_secs(60)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), cloudsign_core::ErrorKind::RequestInvalid);
        Ok(())
    }

    #[test_case("/", "/"; "root")]
    #[test_case("", "/"; "empty")]
    #[test_case("/nodes/", "/nodes"; "trailing slash")]
    #[test_case("//organizations///bedrock//nodes", "/organizations/bedrock/nodes"; "repeated slashes")]
    #[test_case("/organizations/bedrock/nodes", "/organizations/bedrock/nodes"; "already canonical")]
    fn test_canonical_path(input: &str, expected: &str) {
        assert_eq!(canonical_path(input), expected);
    }
}
