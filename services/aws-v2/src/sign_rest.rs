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

//! Signature version 2 for the S3 REST API.
//!
//! - [Signing and authenticating REST requests](https://docs.aws.amazon.com/AmazonS3/latest/userguide/RESTAuthentication.html)

use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use cloudsign_core::hash::base64_hmac_sha1;
use cloudsign_core::time::{format_http_date, now, DateTime};
use cloudsign_core::{Body, Context, Error, Result, SignRequest, SigningRequest};
use http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE, DATE};
use http::HeaderValue;
use log::debug;

use crate::constants::*;
use crate::Credential;

/// RestRequestSigner signs S3 REST requests with `Authorization: AWS <key>:<signature>`.
///
/// The bucket of virtual-hosted requests (`<bucket>.s3.amazonaws.com`) is
/// detected from the host. Requests addressed through a CNAME need the
/// bucket set with [`RestRequestSigner::with_bucket`].
#[derive(Debug, Clone, Default)]
pub struct RestRequestSigner {
    bucket: Option<String>,
    signature_logging: bool,
    time: Option<DateTime>,
}

impl RestRequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket the request host stands for.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
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

    /// Sign the request in place with an `Authorization` header.
    pub fn sign(&self, req: &mut http::Request<Body>, cred: &Credential) -> Result<()> {
        self.sign_inner(req, cred, None)
    }

    /// Turn the request into an expiring URL valid for `expires_in`.
    pub fn presign(
        &self,
        req: &mut http::Request<Body>,
        cred: &Credential,
        expires_in: Duration,
    ) -> Result<()> {
        self.sign_inner(req, cred, Some(expires_in))
    }

    fn sign_inner(
        &self,
        req: &mut http::Request<Body>,
        cred: &Credential,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let now = self.time.unwrap_or_else(now);
        let expires = match expires_in {
            Some(d) => {
                let d = chrono::TimeDelta::from_std(d)
                    .map_err(|e| Error::request_invalid("expires_in is too large").with_source(e))?;
                Some((now + d).timestamp())
            }
            None => None,
        };

        let mut ctx = SigningRequest::build(req)?;

        // A request we signed before carries our Date, so stamp a fresh one.
        let resigned = ctx
            .headers
            .get(AUTHORIZATION)
            .is_some_and(|v| v.as_bytes().starts_with(b"AWS "));
        if resigned {
            ctx.headers.remove(DATE);
        }
        ctx.headers.remove(AUTHORIZATION);
        ctx.headers.remove(X_AMZ_SECURITY_TOKEN);
        ctx.query_remove(&[AWS_ACCESS_KEY_ID_PARAM, EXPIRES, SIGNATURE, X_AMZ_SECURITY_TOKEN]);

        let string_to_sign = self.string_to_sign(&mut ctx, cred, now, expires)?;
        if self.signature_logging {
            debug!(target: "cloudsign::signature", "string to sign: {string_to_sign:?}");
        }
        let signature = base64_hmac_sha1(
            cred.secret_access_key.as_bytes(),
            string_to_sign.as_bytes(),
        );

        match expires {
            None => {
                let mut value =
                    HeaderValue::from_str(&format!("AWS {}:{}", cred.access_key_id, signature))?;
                value.set_sensitive(true);
                ctx.headers.insert(AUTHORIZATION, value);
            }
            Some(expires) => {
                ctx.query_push(AWS_ACCESS_KEY_ID_PARAM, &cred.access_key_id);
                ctx.query_push(EXPIRES, expires.to_string());
                ctx.query_push(SIGNATURE, signature);
            }
        }

        ctx.apply(req)
    }

    /// Construct string to sign
    ///
    /// ## Format
    ///
    /// ```text
    /// VERB + "\n" +
    /// Content-MD5 + "\n" +
    /// Content-Type + "\n" +
    /// Date + "\n" +
    /// CanonicalizedAmzHeaders +
    /// CanonicalizedResource;
    /// ```
    fn string_to_sign(
        &self,
        ctx: &mut SigningRequest,
        cred: &Credential,
        now: DateTime,
        expires: Option<i64>,
    ) -> Result<String> {
        if let Some(token) = &cred.session_token {
            match expires {
                None => {
                    let mut value = HeaderValue::from_str(token)?;
                    value.set_sensitive(true);
                    ctx.headers
                        .insert(HeaderName::from_static(X_AMZ_SECURITY_TOKEN), value);
                }
                Some(_) => ctx.query_push(X_AMZ_SECURITY_TOKEN, token),
            }
        }

        let mut s = String::new();
        s.write_str(ctx.method.as_str())?;
        s.write_str("\n")?;
        s.write_str(ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?)?;
        s.write_str("\n")?;
        s.write_str(ctx.header_get_or_default(&CONTENT_TYPE)?)?;
        s.write_str("\n")?;
        match expires {
            Some(expires) => writeln!(&mut s, "{expires}")?,
            None if ctx.headers.contains_key(X_AMZ_DATE) => s.write_str("\n")?,
            None => {
                if !ctx.headers.contains_key(DATE) {
                    ctx.headers
                        .insert(DATE, HeaderValue::from_str(&format_http_date(now))?);
                }
                writeln!(&mut s, "{}", ctx.header_get_or_default(&DATE)?)?;
            }
        }

        let mut amz_headers = ctx.header_to_vec_with_prefix(X_AMZ_PREFIX)?;
        if expires.is_some() {
            if let Some(token) = &cred.session_token {
                amz_headers.push((X_AMZ_SECURITY_TOKEN.to_string(), token.clone()));
            }
        }
        amz_headers.sort();
        for (k, v) in amz_headers {
            writeln!(&mut s, "{k}:{v}")?;
        }

        s.write_str(&self.canonicalize_resource(ctx)?)?;
        Ok(s)
    }

    fn canonicalize_resource(&self, ctx: &SigningRequest) -> Result<String> {
        let mut s = String::new();
        let bucket = match &self.bucket {
            Some(bucket) => Some(bucket.clone()),
            None => virtual_host_bucket(&ctx.host()?),
        };
        if let Some(bucket) = bucket {
            s.push('/');
            s.push_str(&bucket);
        }
        s.push_str(if ctx.path.is_empty() { "/" } else { &ctx.path });

        let mut subresources: Vec<&(String, String)> = ctx
            .query
            .iter()
            .filter(|(k, _)| SUBRESOURCES.contains(k.as_str()))
            .collect();
        subresources.sort();

        for (i, (k, v)) in subresources.into_iter().enumerate() {
            s.push(if i == 0 { '?' } else { '&' });
            s.push_str(k);
            if !v.is_empty() {
                s.push('=');
                s.push_str(v);
            }
        }

        Ok(s)
    }
}

/// Extract the bucket from `<bucket>.s3.amazonaws.com` style hosts.
///
/// Regional endpoints (`s3-us-west-2`, `s3.eu-west-1`) are recognised too.
fn virtual_host_bucket(host: &str) -> Option<String> {
    let host = host.split(':').next().unwrap_or(host);
    if !host.ends_with(".amazonaws.com") {
        return None;
    }

    // Bucket names may contain `.s3.` themselves, the endpoint is the last match.
    let idx = host.rfind(".s3.").max(host.rfind(".s3-"))?;
    Some(host[..idx].to_string())
}

#[async_trait]
impl SignRequest for RestRequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut http::Request<Body>,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            debug!("no credential provided, leaving request unsigned");
            return Ok(());
        };

        self.sign_inner(req, cred, expires_in)
    }
}
