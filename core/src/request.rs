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

use std::mem;
use std::str::FromStr;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::canonical::percent_encode;
use crate::Body;
use crate::Error;
use crate::Result;

/// Signing context for request.
///
/// Built from an `http::Request<Body>` by moving its parts out, mutated by a
/// signer, then written back with [`SigningRequest::apply`]. Query pairs are
/// kept percent-decoded while the request is being signed.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, still percent-encoded as sent.
    pub path: String,
    /// Decoded HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Body,
}

impl SigningRequest {
    /// Build a signing context from http::Request.
    pub fn build(req: &mut http::Request<Body>) -> Result<Self> {
        let uri = mem::take(req.uri_mut()).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: req.method().clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Headers and body are moved out and returned in `apply`.
            headers: mem::take(req.headers_mut()),
            body: mem::take(req.body_mut()),
        })
    }

    /// Apply the signing context back to http::Request.
    ///
    /// Query pairs are percent-encoded with the unreserved set, a pair with an
    /// empty value is written as a bare key (`?acl`).
    pub fn apply(mut self, req: &mut http::Request<Body>) -> Result<()> {
        mem::swap(req.headers_mut(), &mut self.headers);
        *req.method_mut() = self.method;
        *req.body_mut() = self.body;

        let paq = if self.query.is_empty() {
            self.path
        } else {
            let mut s = self.path;
            s.push('?');
            for (i, (k, v)) in self.query.iter().enumerate() {
                if i > 0 {
                    s.push('&');
                }

                s.push_str(&percent_encode(k));
                if !v.is_empty() {
                    s.push('=');
                    s.push_str(&percent_encode(v));
                }
            }
            s
        };

        let mut uri_parts = mem::take(req.uri_mut()).into_parts();
        uri_parts.scheme = Some(self.scheme);
        uri_parts.authority = Some(self.authority);
        uri_parts.path_and_query = Some(PathAndQuery::from_str(&paq)?);
        *req.uri_mut() = Uri::from_parts(uri_parts)?;

        Ok(())
    }

    /// Host used for signing: the `Host` header if set, the URI authority otherwise.
    pub fn host(&self) -> Result<String> {
        match self.headers.get(http::header::HOST) {
            Some(v) => Ok(v.to_str()?.to_lowercase()),
            None => Ok(self.authority.as_str().to_lowercase()),
        }
    }

    /// Get the first query value for key.
    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove every query pair whose key is in `keys`.
    pub fn query_remove(&mut self, keys: &[&str]) {
        self.query.retain(|(k, _)| !keys.contains(&k.as_str()));
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Insert a header, replacing every previous value.
    pub fn header_insert(&mut self, key: HeaderName, value: &str) -> Result<()> {
        self.headers.insert(key, HeaderValue::from_str(value)?);
        Ok(())
    }

    /// Collect headers whose lowercase name starts with prefix.
    ///
    /// Values of repeated headers are joined with `,` and trimmed.
    pub fn header_to_vec_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let mut h: Vec<(String, String)> = Vec::new();
        for name in self.headers.keys() {
            if !name.as_str().starts_with(prefix) {
                continue;
            }

            let mut values = Vec::new();
            for v in self.headers.get_all(name) {
                values.push(v.to_str()?.trim().to_string());
            }
            h.push((name.as_str().to_lowercase(), values.join(",")));
        }

        Ok(h)
    }

    /// Convert sorted headers to string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via header name.
        headers.sort();

        for (idx, (k, v)) in headers.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }
}
