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

//! Security & Compliance Center findings API (notes)

use async_trait::async_trait;
use serde::{de::IgnoredAny, Deserialize, Serialize};
use url::Url;

use super::http::{endpoint, HttpClient};
use super::{ApiResult, Page};

/// Notes fetched per list call
pub const NOTES_PAGE_SIZE: u32 = 200;
pub const PROVIDERS_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiNote {
    /// Note id, unique within its provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_url: Option<Vec<ApiRelatedUrl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<ApiReporter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding: Option<ApiFindingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpi: Option<ApiKpiType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<ApiCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<ApiSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiRelatedUrl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiReporter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiFindingType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<ApiRemediationStep>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiRemediationStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiKpiType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding_note_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_configuration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ApiCardElement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiCardElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_time_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiNoteList {
    #[serde(default)]
    notes: Vec<ApiNote>,
    next_page_token: Option<String>,
}

/// A findings provider; `name` reads `{account_id}/providers/{provider_id}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ApiProvider {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiProviderList {
    #[serde(default)]
    providers: Vec<ApiProvider>,
    #[serde(default)]
    skip: usize,
    total_count: Option<usize>,
}

impl ApiProviderList {
    /// Providers are paged by offset: the cursor is the next `skip`
    fn into_page(self) -> Page<ApiProvider> {
        let end = self.skip + self.providers.len();
        let next = match self.total_count {
            Some(total) if !self.providers.is_empty() && end < total => Some(end.to_string()),
            _ => None,
        };
        Page::new(self.providers, next)
    }
}

#[async_trait]
pub trait FindingsApi: Send + Sync {
    async fn create_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note: &ApiNote,
    ) -> ApiResult<ApiNote>;

    async fn get_note(&self, account_id: &str, provider_id: &str, note_id: &str)
        -> ApiResult<ApiNote>;

    /// Replace a note; the whole note is sent
    async fn update_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note_id: &str,
        note: &ApiNote,
    ) -> ApiResult<ApiNote>;

    async fn delete_note(&self, account_id: &str, provider_id: &str, note_id: &str)
        -> ApiResult<()>;

    /// One page of the notes of a provider
    async fn list_notes(
        &self,
        account_id: &str,
        provider_id: &str,
        page_token: Option<String>,
    ) -> ApiResult<Page<ApiNote>>;

    /// One page of the providers of an account
    async fn list_providers(
        &self,
        account_id: &str,
        page_token: Option<String>,
    ) -> ApiResult<Page<ApiProvider>>;
}

#[derive(Debug, Clone)]
pub struct FindingsClient {
    http: HttpClient,
    base: Url,
}

impl FindingsClient {
    pub fn new(http: HttpClient, base: Url) -> Self {
        Self { http, base }
    }

    fn notes_url(&self, account_id: &str, provider_id: &str) -> Url {
        endpoint(
            &self.base,
            &["v1", account_id, "providers", provider_id, "notes"],
        )
    }

    fn note_url(&self, account_id: &str, provider_id: &str, note_id: &str) -> Url {
        endpoint(
            &self.base,
            &["v1", account_id, "providers", provider_id, "notes", note_id],
        )
    }
}

#[async_trait]
impl FindingsApi for FindingsClient {
    async fn create_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note: &ApiNote,
    ) -> ApiResult<ApiNote> {
        self.http
            .post(self.notes_url(account_id, provider_id))
            .json(note)
            .send()
            .await
    }

    async fn get_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note_id: &str,
    ) -> ApiResult<ApiNote> {
        self.http
            .get(self.note_url(account_id, provider_id, note_id))
            .send()
            .await
    }

    async fn update_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note_id: &str,
        note: &ApiNote,
    ) -> ApiResult<ApiNote> {
        self.http
            .put(self.note_url(account_id, provider_id, note_id))
            .json(note)
            .send()
            .await
    }

    async fn delete_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note_id: &str,
    ) -> ApiResult<()> {
        self.http
            .delete(self.note_url(account_id, provider_id, note_id))
            .send::<IgnoredAny>()
            .await?;
        Ok(())
    }

    async fn list_notes(
        &self,
        account_id: &str,
        provider_id: &str,
        page_token: Option<String>,
    ) -> ApiResult<Page<ApiNote>> {
        let mut url = self.notes_url(account_id, provider_id);
        url.query_pairs_mut()
            .append_pair("page_size", &NOTES_PAGE_SIZE.to_string());
        if let Some(page_token) = &page_token {
            url.query_pairs_mut().append_pair("page_token", page_token);
        }

        let list: ApiNoteList = self.http.get(url).send().await?;
        Ok(Page::new(list.notes, list.next_page_token))
    }

    async fn list_providers(
        &self,
        account_id: &str,
        page_token: Option<String>,
    ) -> ApiResult<Page<ApiProvider>> {
        let mut url = endpoint(&self.base, &["v1", account_id, "providers"]);
        url.query_pairs_mut()
            .append_pair("limit", &PROVIDERS_PAGE_SIZE.to_string());
        if let Some(skip) = &page_token {
            url.query_pairs_mut().append_pair("skip", skip);
        }

        let list: ApiProviderList = self.http.get(url).send().await?;
        Ok(list.into_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_not_serialized() {
        let note = ApiNote {
            id: Some("n1".to_owned()),
            kind: Some("FINDING".to_owned()),
            reporter: Some(ApiReporter {
                id: Some("r".to_owned()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            serde_json::json!({"id": "n1", "kind": "FINDING", "reporter": {"id": "r"}})
        );
    }

    #[test]
    fn list_tolerates_missing_fields() {
        let list: ApiNoteList = serde_json::from_str(r#"{"next_page_token": ""}"#).unwrap();
        assert!(list.notes.is_empty());
        assert_eq!(Page::new(list.notes, list.next_page_token).next, None);
    }

    #[test]
    fn providers_page_by_offset() {
        let list: ApiProviderList = serde_json::from_str(
            r#"{"providers": [{"id": "p3", "name": "acc/providers/p3"}], "skip": 2, "total_count": 5}"#,
        )
        .unwrap();
        let page = list.into_page();
        assert_eq!(page.items[0].id.as_deref(), Some("p3"));
        assert_eq!(page.next.as_deref(), Some("3"));

        let last: ApiProviderList =
            serde_json::from_str(r#"{"providers": [{"id": "p5"}], "skip": 4, "total_count": 5}"#)
                .unwrap();
        assert_eq!(last.into_page().next, None);
    }
}
