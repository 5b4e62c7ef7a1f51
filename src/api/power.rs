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

//! Power Systems Virtual Server API (placement groups)

use async_trait::async_trait;
use serde::{de::IgnoredAny, Deserialize, Serialize};
use url::Url;

use super::http::{endpoint, HttpClient};
use super::ApiResult;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiPlacementGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub policy: Option<String>,
    pub crn: Option<String>,
    /// Ids of the instances in the group
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiPlacementGroupCreate {
    pub name: String,
    pub policy: String,
}

#[derive(Debug, Deserialize)]
struct ApiPlacementGroupList {
    #[serde(default, rename = "placementGroups")]
    placement_groups: Vec<ApiPlacementGroup>,
}

#[async_trait]
pub trait PowerApi: Send + Sync {
    async fn create_placement_group(
        &self,
        cloud_instance_id: &str,
        body: &ApiPlacementGroupCreate,
    ) -> ApiResult<ApiPlacementGroup>;

    /// `placement_group` is either the id or the name of the group
    async fn get_placement_group(
        &self,
        cloud_instance_id: &str,
        placement_group: &str,
    ) -> ApiResult<ApiPlacementGroup>;

    async fn list_placement_groups(
        &self,
        cloud_instance_id: &str,
    ) -> ApiResult<Vec<ApiPlacementGroup>>;

    async fn delete_placement_group(
        &self,
        cloud_instance_id: &str,
        placement_group_id: &str,
    ) -> ApiResult<()>;
}

#[derive(Debug, Clone)]
pub struct PowerClient {
    http: HttpClient,
    base: Url,
    account_id: String,
    zone: String,
}

impl PowerClient {
    pub fn new(http: HttpClient, base: Url, account_id: String, zone: String) -> Self {
        Self {
            http,
            base,
            account_id,
            zone,
        }
    }

    /// Power requests are scoped by the CRN of the workspace
    fn crn(&self, cloud_instance_id: &str) -> String {
        format!(
            "crn:v1:bluemix:public:power-iaas:{}:a/{}:{}::",
            self.zone, self.account_id, cloud_instance_id
        )
    }

    fn groups_url(&self, cloud_instance_id: &str, rest: &[&str]) -> Url {
        let mut segments = vec![
            "pcloud",
            "v1",
            "cloud-instances",
            cloud_instance_id,
            "placement-groups",
        ];
        segments.extend_from_slice(rest);
        endpoint(&self.base, &segments)
    }
}

#[async_trait]
impl PowerApi for PowerClient {
    async fn create_placement_group(
        &self,
        cloud_instance_id: &str,
        body: &ApiPlacementGroupCreate,
    ) -> ApiResult<ApiPlacementGroup> {
        self.http
            .post(self.groups_url(cloud_instance_id, &[]))
            .header("CRN", self.crn(cloud_instance_id))
            .json(body)
            .send()
            .await
    }

    async fn get_placement_group(
        &self,
        cloud_instance_id: &str,
        placement_group: &str,
    ) -> ApiResult<ApiPlacementGroup> {
        self.http
            .get(self.groups_url(cloud_instance_id, &[placement_group]))
            .header("CRN", self.crn(cloud_instance_id))
            .send()
            .await
    }

    async fn list_placement_groups(
        &self,
        cloud_instance_id: &str,
    ) -> ApiResult<Vec<ApiPlacementGroup>> {
        let list: ApiPlacementGroupList = self
            .http
            .get(self.groups_url(cloud_instance_id, &[]))
            .header("CRN", self.crn(cloud_instance_id))
            .send()
            .await?;
        Ok(list.placement_groups)
    }

    async fn delete_placement_group(
        &self,
        cloud_instance_id: &str,
        placement_group_id: &str,
    ) -> ApiResult<()> {
        self.http
            .delete(self.groups_url(cloud_instance_id, &[placement_group_id]))
            .header("CRN", self.crn(cloud_instance_id))
            .send::<IgnoredAny>()
            .await?;
        Ok(())
    }
}
