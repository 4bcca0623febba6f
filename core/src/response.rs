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

//! Mapping of HTTP responses into [`Error`] values.

use std::time::Duration;

use bytes::Bytes;
use http::header::RETRY_AFTER;
use http::HeaderMap;
use http::Response;
use http::StatusCode;

use crate::time::parse_http_date;
use crate::time::DateTime;
use crate::Error;
use crate::Result;

/// Longest slice of the response body kept in an error message.
const MAX_BODY_IN_MESSAGE: usize = 256;

/// Server supplied hint telling the client when to come back.
///
/// Carried by [`crate::ErrorKind::RetryAfter`] errors. The backoff retrier
/// never reads it, callers decide what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfter {
    /// `Retry-After: 120`
    Delay(Duration),
    /// `Retry-After: Fri, 31 Dec 1999 23:59:59 GMT`
    At(DateTime),
}

impl RetryAfter {
    /// Parse a `Retry-After` value, either delay-seconds or an HTTP date.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(secs) = value.parse::<u64>() {
            return Some(RetryAfter::Delay(Duration::from_secs(secs)));
        }

        parse_http_date(value).ok().map(RetryAfter::At)
    }

    /// Read the hint from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
        Self::parse(value)
    }

    /// How long to wait starting from `now`, dates in the past yield zero.
    pub fn delay_from(&self, now: DateTime) -> Duration {
        match self {
            RetryAfter::Delay(d) => *d,
            RetryAfter::At(at) => (*at - now).to_std().unwrap_or(Duration::ZERO),
        }
    }
}

/// Map a response into an error unless it is successful.
///
/// - 2xx and 3xx pass through untouched.
/// - A failure carrying a parseable `Retry-After` becomes [`crate::ErrorKind::RetryAfter`].
/// - 401 and 403 become `Unauthorized`, 404 `NotFound`, 409 `Conflict`.
/// - 408, 429 and 5xx become `Unexpected` marked temporary.
/// - Every other status becomes `RequestInvalid`.
pub fn check_response(resp: Response<Bytes>) -> Result<Response<Bytes>> {
    let status = resp.status();
    if status.is_success() || status.is_redirection() {
        return Ok(resp);
    }

    let message = format!(
        "request failed with status {status}: {}",
        truncated_body(resp.body())
    );

    let err = if let Some(hint) = RetryAfter::from_headers(resp.headers()) {
        Error::retry_after(message, hint)
    } else {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::unauthorized(message),
            StatusCode::NOT_FOUND => Error::not_found(message),
            StatusCode::CONFLICT => Error::conflict(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                Error::unexpected(message).set_temporary()
            }
            s if s.is_server_error() => Error::unexpected(message).set_temporary(),
            _ => Error::request_invalid(message),
        }
    };

    Err(err.with_status(status))
}

fn truncated_body(body: &Bytes) -> String {
    let s = String::from_utf8_lossy(body);
    match s.char_indices().nth(MAX_BODY_IN_MESSAGE) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use chrono::TimeZone;
    use chrono::Utc;
    use test_case::test_case;

    fn response(status: u16, retry_after: Option<&str>) -> Response<Bytes> {
        let mut builder = Response::builder().status(status);
        if let Some(v) = retry_after {
            builder = builder.header(RETRY_AFTER, v);
        }
        builder
            .body(Bytes::from_static(b"<Error>boom</Error>"))
            .unwrap()
    }

    #[test_case(200; "ok")]
    #[test_case(204; "no content")]
    #[test_case(302; "found")]
    fn test_success_passes(status: u16) {
        let resp = check_response(response(status, None)).unwrap();
        assert_eq!(resp.status().as_u16(), status);
    }

    #[test_case(400, ErrorKind::RequestInvalid, false; "bad request")]
    #[test_case(401, ErrorKind::Unauthorized, false; "unauthorized")]
    #[test_case(403, ErrorKind::Unauthorized, false; "forbidden")]
    #[test_case(404, ErrorKind::NotFound, false; "not found")]
    #[test_case(408, ErrorKind::Unexpected, true; "request timeout")]
    #[test_case(409, ErrorKind::Conflict, false; "conflict")]
    #[test_case(429, ErrorKind::Unexpected, true; "too many requests")]
    #[test_case(500, ErrorKind::Unexpected, true; "internal error")]
    #[test_case(503, ErrorKind::Unexpected, true; "unavailable")]
    fn test_failure_mapping(status: u16, kind: ErrorKind, temporary: bool) {
        let err = check_response(response(status, None)).unwrap_err();
        assert_eq!(err.kind(), kind);
        assert_eq!(err.is_temporary(), temporary);
        assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
        assert!(err.to_string().contains("<Error>boom</Error>"));
    }

    #[test]
    fn test_retry_after_seconds() {
        let err = check_response(response(503, Some("120"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RetryAfter);
        assert_eq!(
            err.retry_after_hint(),
            Some(RetryAfter::Delay(Duration::from_secs(120)))
        );
        assert!(!err.is_temporary());
    }

    #[test]
    fn test_retry_after_date() {
        let err = check_response(response(429, Some("Fri, 31 Dec 1999 23:59:59 GMT"))).unwrap_err();
        let at = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();

        assert_eq!(err.retry_after_hint(), Some(RetryAfter::At(at)));
        assert_eq!(
            RetryAfter::At(at).delay_from(at - chrono::Duration::seconds(5)),
            Duration::from_secs(5)
        );
        assert_eq!(
            RetryAfter::At(at).delay_from(at + chrono::Duration::seconds(5)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_unparseable_retry_after_is_ignored() {
        let err = check_response(response(503, Some("soon"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert!(err.is_temporary());
    }

    #[test]
    fn test_long_body_is_truncated() {
        let resp = Response::builder()
            .status(500)
            .body(Bytes::from("x".repeat(1000)))
            .unwrap();
        let err = check_response(resp).unwrap_err();
        assert!(err.to_string().ends_with("..."));
        assert!(err.to_string().len() < 400);
    }
}
