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

//! VPC infrastructure API (IKE policies, bare metal server disks)

use async_trait::async_trait;
use serde::{de::IgnoredAny, Deserialize, Serialize};
use url::Url;

use super::http::{endpoint, HttpClient};
use super::{ApiError, ApiResult, Page};

pub const API_VERSION: &str = "2024-07-02";

/// Items requested per list call
pub const PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiResourceGroupReference {
    pub id: Option<String>,
    pub href: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResourceGroupIdentity {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiDeleted {
    pub more_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiVpnConnectionReference {
    /// Set when the connection has been deleted
    pub deleted: Option<ApiDeleted>,
    pub id: Option<String>,
    pub href: Option<String>,
    pub name: Option<String>,
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiIkePolicy {
    pub id: Option<String>,
    pub href: Option<String>,
    pub name: Option<String>,
    pub authentication_algorithm: Option<String>,
    pub encryption_algorithm: Option<String>,
    pub dh_group: Option<i64>,
    pub ike_version: Option<i64>,
    pub key_lifetime: Option<i64>,
    pub negotiation_mode: Option<String>,
    pub resource_type: Option<String>,
    pub created_at: Option<String>,
    pub resource_group: Option<ApiResourceGroupReference>,
    pub connections: Option<Vec<ApiVpnConnectionReference>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiIkePolicyPrototype {
    pub name: String,
    pub authentication_algorithm: String,
    pub encryption_algorithm: String,
    pub dh_group: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ike_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_lifetime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ApiResourceGroupIdentity>,
}

/// Merge patch: only the present fields are modified
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ApiIkePolicyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dh_group: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ike_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_lifetime: Option<i64>,
}

impl ApiIkePolicyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiDiskAllowedUse {
    pub api_version: Option<String>,
    pub bare_metal_server: Option<String>,
    pub instance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiBareMetalServerDisk {
    pub id: Option<String>,
    pub href: Option<String>,
    pub name: Option<String>,
    pub size: Option<i64>,
    pub interface_type: Option<String>,
    pub resource_type: Option<String>,
    pub created_at: Option<String>,
    pub allowed_use: Option<ApiDiskAllowedUse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ApiBareMetalServerDiskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPageLink {
    href: String,
}

#[derive(Debug, Deserialize)]
struct ApiIkePolicyCollection {
    #[serde(default)]
    ike_policies: Vec<ApiIkePolicy>,
    next: Option<ApiPageLink>,
}

#[derive(Debug, Deserialize)]
struct ApiConnectionCollection {
    #[serde(default)]
    connections: Vec<ApiVpnConnectionReference>,
}

#[derive(Debug, Deserialize)]
struct ApiDiskCollection {
    #[serde(default)]
    disks: Vec<ApiBareMetalServerDisk>,
}

#[async_trait]
pub trait VpcApi: Send + Sync {
    async fn create_ike_policy(&self, body: &ApiIkePolicyPrototype) -> ApiResult<ApiIkePolicy>;

    async fn get_ike_policy(&self, id: &str) -> ApiResult<ApiIkePolicy>;

    async fn update_ike_policy(&self, id: &str, patch: &ApiIkePolicyPatch)
        -> ApiResult<ApiIkePolicy>;

    async fn delete_ike_policy(&self, id: &str) -> ApiResult<()>;

    /// One page of IKE policies, `start` being the cursor of the page
    async fn list_ike_policies(&self, start: Option<String>) -> ApiResult<Page<ApiIkePolicy>>;

    /// VPN gateway connections using an IKE policy
    async fn list_ike_policy_connections(
        &self,
        id: &str,
    ) -> ApiResult<Vec<ApiVpnConnectionReference>>;

    async fn get_bare_metal_server_disk(
        &self,
        bare_metal_server: &str,
        disk: &str,
    ) -> ApiResult<ApiBareMetalServerDisk>;

    async fn update_bare_metal_server_disk(
        &self,
        bare_metal_server: &str,
        disk: &str,
        patch: &ApiBareMetalServerDiskPatch,
    ) -> ApiResult<ApiBareMetalServerDisk>;

    async fn list_bare_metal_server_disks(
        &self,
        bare_metal_server: &str,
    ) -> ApiResult<Vec<ApiBareMetalServerDisk>>;
}

#[derive(Debug, Clone)]
pub struct VpcClient {
    http: HttpClient,
    base: Url,
}

impl VpcClient {
    pub fn new(http: HttpClient, mut base: Url) -> Self {
        base.query_pairs_mut()
            .append_pair("version", API_VERSION)
            .append_pair("generation", "2");
        Self { http, base }
    }

    fn url(&self, segments: &[&str]) -> Url {
        endpoint(&self.base, segments)
    }
}

/// Cursor of the next page: the `start` parameter of the `next` link.
/// A link without a usable cursor is an error, the listing would be truncated.
fn start_token(next: Option<ApiPageLink>) -> ApiResult<Option<String>> {
    let Some(ApiPageLink { href }) = next else {
        return Ok(None);
    };
    let url = match Url::parse(&href) {
        Ok(url) => url,
        Err(err) => {
            return Err(ApiError::Pagination {
                message: err.to_string(),
                href,
            })
        }
    };
    let start = url
        .query_pairs()
        .find(|(key, _)| key == "start")
        .map(|(_, value)| value.into_owned());
    match start {
        Some(start) => Ok(Some(start)),
        None => Err(ApiError::Pagination {
            href,
            message: "missing `start` parameter".to_owned(),
        }),
    }
}

const MERGE_PATCH: &str = "application/merge-patch+json";

#[async_trait]
impl VpcApi for VpcClient {
    async fn create_ike_policy(&self, body: &ApiIkePolicyPrototype) -> ApiResult<ApiIkePolicy> {
        self.http
            .post(self.url(&["ike_policies"]))
            .json(body)
            .send()
            .await
    }

    async fn get_ike_policy(&self, id: &str) -> ApiResult<ApiIkePolicy> {
        self.http.get(self.url(&["ike_policies", id])).send().await
    }

    async fn update_ike_policy(
        &self,
        id: &str,
        patch: &ApiIkePolicyPatch,
    ) -> ApiResult<ApiIkePolicy> {
        self.http
            .patch(self.url(&["ike_policies", id]))
            .header("Content-Type", MERGE_PATCH)
            .json(patch)
            .send()
            .await
    }

    async fn delete_ike_policy(&self, id: &str) -> ApiResult<()> {
        self.http
            .delete(self.url(&["ike_policies", id]))
            .send::<IgnoredAny>()
            .await?;
        Ok(())
    }

    async fn list_ike_policies(&self, start: Option<String>) -> ApiResult<Page<ApiIkePolicy>> {
        let mut url = self.url(&["ike_policies"]);
        url.query_pairs_mut()
            .append_pair("limit", &PAGE_LIMIT.to_string());
        if let Some(start) = &start {
            url.query_pairs_mut().append_pair("start", start);
        }

        let collection: ApiIkePolicyCollection = self.http.get(url).send().await?;
        Ok(Page::new(
            collection.ike_policies,
            start_token(collection.next)?,
        ))
    }

    async fn list_ike_policy_connections(
        &self,
        id: &str,
    ) -> ApiResult<Vec<ApiVpnConnectionReference>> {
        let collection: ApiConnectionCollection = self
            .http
            .get(self.url(&["ike_policies", id, "connections"]))
            .send()
            .await?;
        Ok(collection.connections)
    }

    async fn get_bare_metal_server_disk(
        &self,
        bare_metal_server: &str,
        disk: &str,
    ) -> ApiResult<ApiBareMetalServerDisk> {
        self.http
            .get(self.url(&["bare_metal_servers", bare_metal_server, "disks", disk]))
            .send()
            .await
    }

    async fn update_bare_metal_server_disk(
        &self,
        bare_metal_server: &str,
        disk: &str,
        patch: &ApiBareMetalServerDiskPatch,
    ) -> ApiResult<ApiBareMetalServerDisk> {
        self.http
            .patch(self.url(&["bare_metal_servers", bare_metal_server, "disks", disk]))
            .header("Content-Type", MERGE_PATCH)
            .json(patch)
            .send()
            .await
    }

    async fn list_bare_metal_server_disks(
        &self,
        bare_metal_server: &str,
    ) -> ApiResult<Vec<ApiBareMetalServerDisk>> {
        let collection: ApiDiskCollection = self
            .http
            .get(self.url(&["bare_metal_servers", bare_metal_server, "disks"]))
            .send()
            .await?;
        Ok(collection.disks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_token_from_next_link() {
        let collection: ApiIkePolicyCollection = serde_json::from_str(
            r#"{
                "ike_policies": [{"id": "p1", "name": "a"}],
                "next": {"href": "https://us-south.iaas.cloud.ibm.com/v1/ike_policies?limit=50&start=r006-abc&version=2024-07-02"}
            }"#,
        )
        .unwrap();
        assert_eq!(collection.ike_policies.len(), 1);
        assert_eq!(
            start_token(collection.next).unwrap().as_deref(),
            Some("r006-abc")
        );
    }

    #[test]
    fn last_page_has_no_token() {
        let collection: ApiIkePolicyCollection =
            serde_json::from_str(r#"{"ike_policies": []}"#).unwrap();
        assert_eq!(start_token(collection.next).unwrap(), None);
    }

    #[test]
    fn unusable_next_link_fails() {
        let collection: ApiIkePolicyCollection = serde_json::from_str(
            r#"{
                "ike_policies": [{"id": "p1"}],
                "next": {"href": "https://us-south.iaas.cloud.ibm.com/v1/ike_policies?limit=50"}
            }"#,
        )
        .unwrap();
        assert!(matches!(
            start_token(collection.next),
            Err(ApiError::Pagination { .. })
        ));

        let relative = Some(ApiPageLink {
            href: "/v1/ike_policies?start=r006-abc".to_owned(),
        });
        assert!(matches!(
            start_token(relative),
            Err(ApiError::Pagination { .. })
        ));
    }

    #[test]
    fn deleted_connection_is_decoded() {
        let connection: ApiVpnConnectionReference = serde_json::from_str(
            r#"{"id": "c1", "deleted": {"more_info": "https://cloud.ibm.com/apidocs/vpc#deleted-resources"}}"#,
        )
        .unwrap();
        assert_eq!(
            connection.deleted.and_then(|deleted| deleted.more_info).as_deref(),
            Some("https://cloud.ibm.com/apidocs/vpc#deleted-resources")
        );
    }

    #[test]
    fn patch_skips_unchanged_fields() {
        let patch = ApiIkePolicyPatch {
            key_lifetime: Some(3600),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"key_lifetime": 3600})
        );
        assert!(ApiIkePolicyPatch::default().is_empty());
    }
}
