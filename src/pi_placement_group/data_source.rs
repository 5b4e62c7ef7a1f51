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

use std::borrow::Cow;

use async_trait::async_trait;

use tf_provider::{AttributePath, DataSource, Diagnostics, Schema, Value, ValueEmpty};

use crate::session::SessionHandle;
use crate::utils::{validate_not_empty, ReportResult, WithSchema};

use super::fill_user_tags;
use super::state::{data_source_schema, PlacementGroupState, PlacementGroupsState};

#[derive(Debug, Default, Clone)]
pub struct PlacementGroupDataSource {
    session: SessionHandle,
}

impl PlacementGroupDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for PlacementGroupDataSource {
    type State<'a> = PlacementGroupState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(data_source_schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        validate_not_empty(
            diags,
            &config.pi_cloud_instance_id,
            AttributePath::new("pi_cloud_instance_id"),
        );
        validate_not_empty(
            diags,
            &config.pi_placement_group_name,
            AttributePath::new("pi_placement_group_name"),
        );

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let session = self.session.get().await.or_report(diags, "Provider not configured")?;
        let cloud_instance_id = config.pi_cloud_instance_id.as_str();

        // The API resolves names as well as ids
        let group = session
            .power
            .get_placement_group(cloud_instance_id, config.pi_placement_group_name.as_str())
            .await
            .or_report(diags, "Failed to read placement group")?;

        let mut group = PlacementGroupState::from_api(cloud_instance_id, group)
            .or_report(diags, "Failed to read placement group")?;
        fill_user_tags(session.tagging.as_ref(), diags, &mut group).await;
        Some(group)
    }
}

#[derive(Debug, Default, Clone)]
pub struct PlacementGroupsDataSource {
    session: SessionHandle,
}

impl PlacementGroupsDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for PlacementGroupsDataSource {
    type State<'a> = PlacementGroupsState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(PlacementGroupsState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        validate_not_empty(
            diags,
            &config.pi_cloud_instance_id,
            AttributePath::new("pi_cloud_instance_id"),
        );

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let session = self.session.get().await.or_report(diags, "Provider not configured")?;
        let cloud_instance_id = config.pi_cloud_instance_id.as_str().to_owned();

        let groups = session
            .power
            .list_placement_groups(&cloud_instance_id)
            .await
            .or_report(diags, "Failed to list placement groups")?;
        tracing::debug!(cloud_instance_id, count = groups.len(), "placement groups listed");

        Some(PlacementGroupsState {
            pi_cloud_instance_id: Value::Value(Cow::Owned(cloud_instance_id)),
            placement_groups: Value::Value(
                groups
                    .into_iter()
                    .map(|group| Value::Value(group.into()))
                    .collect(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::api::power::ApiPlacementGroupCreate;
    use crate::testing::FakeCloud;

    async fn seed(cloud: &FakeCloud, names: &[&str]) {
        for name in names {
            cloud
                .session()
                .power
                .create_placement_group(
                    "cloud-1",
                    &ApiPlacementGroupCreate {
                        name: name.to_string(),
                        policy: "affinity".to_owned(),
                    },
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn lookup_by_name() {
        let cloud = FakeCloud::default();
        seed(&cloud, &["web", "db"]).await;
        let data_source = PlacementGroupDataSource::new(cloud.handle());

        let config = PlacementGroupState {
            pi_cloud_instance_id: Value::Value(Cow::Borrowed("cloud-1")),
            pi_placement_group_name: Value::Value(Cow::Borrowed("db")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, config, Default::default())
            .await
            .unwrap();
        assert_eq!(state.pi_placement_group_name.as_str(), "db");
        assert_eq!(state.pi_placement_group_policy.as_str(), "affinity");
        assert!(state.crn.as_str().starts_with("crn:v1:"));
        assert_eq!(state.user_tags, Value::Value(vec![]));
    }

    fn db_config() -> PlacementGroupState<'static> {
        PlacementGroupState {
            pi_cloud_instance_id: Value::Value(Cow::Borrowed("cloud-1")),
            pi_placement_group_name: Value::Value(Cow::Borrowed("db")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn user_tags_are_read_by_crn() {
        let cloud = FakeCloud::default();
        seed(&cloud, &["db"]).await;
        let crn = cloud
            .session()
            .power
            .get_placement_group("cloud-1", "db")
            .await
            .unwrap()
            .crn
            .unwrap();
        cloud
            .tagging
            .tags
            .lock()
            .unwrap()
            .insert(crn, vec!["env:prod".to_owned(), "team:db".to_owned()]);
        let data_source = PlacementGroupDataSource::new(cloud.handle());

        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, db_config(), Default::default())
            .await
            .unwrap();
        let Value::Value(tags) = state.user_tags else {
            panic!("user tags should be known");
        };
        let tags: Vec<_> = tags.iter().map(|tag| tag.as_str().to_owned()).collect();
        assert_eq!(tags, ["env:prod", "team:db"]);
        assert!(diags.warnings.is_empty());
    }

    #[tokio::test]
    async fn failing_tags_only_warn() {
        let cloud = FakeCloud::default();
        seed(&cloud, &["db"]).await;
        cloud.tagging.fail.store(true, Ordering::SeqCst);
        let data_source = PlacementGroupDataSource::new(cloud.handle());

        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, db_config(), Default::default())
            .await
            .unwrap();
        assert!(state.user_tags.is_null());
        assert!(!state.crn.is_null());
        assert!(diags.errors.is_empty());
        assert_eq!(diags.warnings.len(), 1);
    }

    #[tokio::test]
    async fn unknown_name_is_an_error() {
        let cloud = FakeCloud::default();
        let data_source = PlacementGroupDataSource::new(cloud.handle());

        let config = PlacementGroupState {
            pi_cloud_instance_id: Value::Value(Cow::Borrowed("cloud-1")),
            pi_placement_group_name: Value::Value(Cow::Borrowed("nope")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        assert!(data_source
            .read(&mut diags, config, Default::default())
            .await
            .is_none());
        assert_eq!(diags.errors.len(), 1);
    }

    #[tokio::test]
    async fn list_all_groups() {
        let cloud = FakeCloud::default();
        seed(&cloud, &["web", "db"]).await;
        let data_source = PlacementGroupsDataSource::new(cloud.handle());

        let config = PlacementGroupsState {
            pi_cloud_instance_id: Value::Value(Cow::Borrowed("cloud-1")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, config, Default::default())
            .await
            .unwrap();
        assert_eq!(state.placement_groups.as_ref_option().map(Vec::len), Some(2));
    }
}
