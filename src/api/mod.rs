// This file is part of the terraform-provider-ibm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed clients for the IBM Cloud services the provider talks to.
//!
//! Every service is exposed as an `async` trait so that resources only depend
//! on the seam, and tests can swap in the in-memory fakes from `crate::testing`.

use thiserror::Error;

pub mod findings;
pub mod http;
pub mod iam;
pub mod paginate;
pub mod power;
pub mod tagging;
pub mod vpc;

pub use findings::FindingsApi;
pub use paginate::Page;
pub use power::PowerApi;
pub use tagging::TaggingApi;
pub use vpc::VpcApi;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The provider has not been configured yet.
    #[error("the IBM Cloud session has not been configured")]
    Unconfigured,

    #[error("invalid provider configuration: {0}")]
    Config(String),

    /// Credentials could not be exchanged for a token.
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("{method} {url} failed with status {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A list response points to a next page that cannot be followed.
    #[error("invalid next page link `{href}`: {message}")]
    Pagination { href: String, message: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
