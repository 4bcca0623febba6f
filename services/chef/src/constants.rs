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

// Headers used in the Chef signing protocol.
pub const X_OPS_SIGN: &str = "x-ops-sign";
pub const X_OPS_USERID: &str = "x-ops-userid";
pub const X_OPS_TIMESTAMP: &str = "x-ops-timestamp";
pub const X_OPS_CONTENT_HASH: &str = "x-ops-content-hash";
pub const X_OPS_AUTHORIZATION_PREFIX: &str = "x-ops-authorization-";

/// Protocol version announced in `X-Ops-Sign`.
pub const SIGN_VERSION: &str = "version=1.0";
/// Width of each `X-Ops-Authorization-N` header value.
pub const AUTHORIZATION_CHUNK: usize = 60;

// Env values used in chef services.
pub const CHEF_CLIENT_NAME: &str = "CHEF_CLIENT_NAME";
pub const CHEF_CLIENT_KEY: &str = "CHEF_CLIENT_KEY";
pub const CHEF_PROFILE: &str = "CHEF_PROFILE";
pub const CHEF_CREDENTIALS_FILE: &str = "CHEF_CREDENTIALS_FILE";

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_CREDENTIALS_FILE: &str = "~/.chef/credentials";
