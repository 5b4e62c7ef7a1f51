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

//! Global Tagging API (user tags attached to a resource)

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::http::{endpoint, HttpClient};
use super::ApiResult;

/// Largest page the tagging service accepts
pub const TAGS_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ApiTag {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTagList {
    #[serde(default)]
    items: Vec<ApiTag>,
}

#[async_trait]
pub trait TaggingApi: Send + Sync {
    /// User tags attached to the resource with the given CRN
    async fn list_user_tags(&self, crn: &str) -> ApiResult<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct TaggingClient {
    http: HttpClient,
    base: Url,
}

impl TaggingClient {
    pub fn new(http: HttpClient, base: Url) -> Self {
        Self { http, base }
    }
}

fn tag_names(list: ApiTagList) -> Vec<String> {
    list.items.into_iter().filter_map(|tag| tag.name).collect()
}

#[async_trait]
impl TaggingApi for TaggingClient {
    async fn list_user_tags(&self, crn: &str) -> ApiResult<Vec<String>> {
        let mut url = endpoint(&self.base, &["v3", "tags"]);
        url.query_pairs_mut()
            .append_pair("attached_to", crn)
            .append_pair("tag_type", "user")
            .append_pair("providers", "ghost")
            .append_pair("limit", &TAGS_LIMIT.to_string());

        let list: ApiTagList = self.http.get(url).send().await?;
        Ok(tag_names(list))
    }
}
