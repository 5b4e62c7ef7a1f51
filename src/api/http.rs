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

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use super::{iam::Authenticator, ApiError, ApiResult};

/// Authenticated JSON client shared by every service client of a session
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    auth: Arc<Authenticator>,
}

impl HttpClient {
    pub fn new(timeout: Duration, auth: Arc<Authenticator>) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("terraform-provider-ibm/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { inner, auth })
    }

    pub fn request(&self, method: Method, url: Url) -> Request<'_> {
        Request {
            builder: self.inner.request(method.clone(), url.clone()),
            client: self,
            method,
            url,
        }
    }

    pub fn get(&self, url: Url) -> Request<'_> {
        self.request(Method::GET, url)
    }
    pub fn post(&self, url: Url) -> Request<'_> {
        self.request(Method::POST, url)
    }
    pub fn put(&self, url: Url) -> Request<'_> {
        self.request(Method::PUT, url)
    }
    pub fn patch(&self, url: Url) -> Request<'_> {
        self.request(Method::PATCH, url)
    }
    pub fn delete(&self, url: Url) -> Request<'_> {
        self.request(Method::DELETE, url)
    }
}

pub struct Request<'c> {
    client: &'c HttpClient,
    builder: reqwest::RequestBuilder,
    method: Method,
    url: Url,
}

impl<'c> Request<'c> {
    pub fn header(mut self, name: &'static str, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value.as_ref());
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    /// Send the request and decode the JSON response.
    ///
    /// An empty body decodes as `null`, so `()` and `IgnoredAny` work for
    /// calls that return nothing.
    pub async fn send<T: DeserializeOwned>(self) -> ApiResult<T> {
        let token = self.client.auth.token().await?;
        let url = self.url.to_string();

        tracing::debug!(method = %self.method, url = %url, "IBM Cloud request");

        let response = self
            .builder
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(error_message(&body)));
        }
        if !status.is_success() {
            tracing::debug!(method = %self.method, url = %url, status = status.as_u16(), body = %body, "IBM Cloud request failed");
            return Err(ApiError::Status {
                method: self.method.to_string(),
                url,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = if body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };
        serde_json::from_str(body).map_err(|source| ApiError::Decode { url, source })
    }
}

/// Build `base/segment/...`, percent-encoding every segment
pub fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Extract the most meaningful message out of an IBM Cloud error body.
///
/// VPC reports `{"errors": [{"message": ...}]}`, Power reports
/// `{"description": ...}` and the findings API `{"message": ...}`.
pub fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_owned();
    };

    let message = json
        .pointer("/errors/0/message")
        .or_else(|| json.get("description"))
        .or_else(|| json.get("message"))
        .or_else(|| json.get("error"))
        .and_then(serde_json::Value::as_str);

    match message {
        Some(message) => message.to_owned(),
        None => body.trim().to_owned(),
    }
}
