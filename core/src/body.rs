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

/// Body of a request that can be signed.
///
/// Signers need the whole payload in memory to hash it or to rewrite form
/// parameters, so only buffered content is supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    /// No content at all.
    #[default]
    Empty,
    /// Buffered content.
    Bytes(Bytes),
}

impl Body {
    /// Borrow the content, empty bodies yield an empty slice.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Empty => &[],
            Body::Bytes(bs) => bs.as_ref(),
        }
    }

    /// Length of the content in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Check whether there is no content.
    ///
    /// A `Bytes` body holding zero bytes counts as empty too.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into `Bytes` for sending.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Body::Empty => Bytes::new(),
            Body::Bytes(bs) => bs,
        }
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Body::Empty
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Body::Bytes(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(value))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Bytes(Bytes::from(value))
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(value.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_len() {
        assert_eq!(Body::Empty.len(), 0);
        assert!(Body::from(Bytes::new()).is_empty());
        assert_eq!(Body::from("{\"name\":\"fred\"}").len(), 15);
        assert_eq!(Body::from(String::from("abc")).into_bytes(), Bytes::from("abc"));
        assert_eq!(Body::from(()).into_bytes(), Bytes::new());
    }
}
