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

use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{schema::Schema, AttributePath, Diagnostics, Resource};

use crate::id::split_id;
use crate::session::SessionHandle;
use crate::utils::{
    force_new, IntoKnown, ReportMissing, ReportResult, WithSchema, WithValidate,
};

use super::fill_user_tags;
use super::state::{PlacementGroupState, ID_PARTS};

/// Placement groups cannot be modified: every change replaces the group
#[derive(Debug, Default, Clone)]
pub struct PlacementGroupResource {
    session: SessionHandle,
}

impl PlacementGroupResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Resource for PlacementGroupResource {
    type State<'a> = Value<PlacementGroupState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(PlacementGroupState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Value::Value(config) = &config {
            config.validate(diags, AttributePath::default());
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = match state {
            Value::Value(state) => state,
            other => return Some((other, private_state)),
        };
        let session = self.session.get().await.or_report(diags, "Provider not configured")?;
        let [cloud_instance_id, group_id] = split_id(state.id.as_str(), ID_PARTS).or_report_at(
            diags,
            "Invalid placement group id",
            AttributePath::new("id"),
        )?;

        let Some(group) = session
            .power
            .get_placement_group(cloud_instance_id, group_id)
            .await
            .or_report_missing(diags, "Failed to read placement group")?
        else {
            tracing::warn!(
                id = state.id.as_str(),
                "placement group not found, removing it from state"
            );
            return Some((Value::Null, private_state));
        };

        let mut state = PlacementGroupState::from_api(cloud_instance_id, group)
            .or_report(diags, "Failed to read placement group")?;
        fill_user_tags(session.tagging.as_ref(), diags, &mut state).await;
        Some((Value::Value(state), private_state))
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state.into_known(diags)?;
        state.id = Value::Unknown;
        state.placement_group_id = Value::Unknown;
        state.members = Value::Unknown;
        state.crn = Value::Unknown;
        state.user_tags = Value::Unknown;

        Some((Value::Value(state), Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let prior_state = prior_state.into_known(diags)?;
        let state = proposed_state.into_known(diags)?;

        let mut trigger_replace = Vec::new();
        force_new(
            &mut trigger_replace,
            "pi_cloud_instance_id",
            &prior_state.pi_cloud_instance_id,
            &state.pi_cloud_instance_id,
        );
        force_new(
            &mut trigger_replace,
            "pi_placement_group_name",
            &prior_state.pi_placement_group_name,
            &state.pi_placement_group_name,
        );
        force_new(
            &mut trigger_replace,
            "pi_placement_group_policy",
            &prior_state.pi_placement_group_policy,
            &state.pi_placement_group_policy,
        );

        Some((Value::Value(state), prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = planned_state.into_known(diags)?;
        let session = self.session.get().await.or_report(diags, "Provider not configured")?;
        let cloud_instance_id = state.pi_cloud_instance_id.as_str();
        let body = state.to_api().or_report(diags, "Invalid placement group")?;

        let group = session
            .power
            .create_placement_group(cloud_instance_id, &body)
            .await
            .or_report(diags, "Failed to create placement group")?;
        tracing::info!(
            cloud_instance_id,
            placement_group_id = group.id.as_deref().unwrap_or_default(),
            "placement group created"
        );

        let mut state = PlacementGroupState::from_api(cloud_instance_id, group)
            .or_report(diags, "Failed to create placement group")?;
        fill_user_tags(session.tagging.as_ref(), diags, &mut state).await;
        Some((Value::Value(state), private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        // Nothing is updatable in place
        let state = planned_state.into_known(diags)?;
        Some((Value::Value(state), private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let state = state.into_known(diags)?;
        let session = self.session.get().await.or_report(diags, "Provider not configured")?;
        let [cloud_instance_id, group_id] = split_id(state.id.as_str(), ID_PARTS).or_report_at(
            diags,
            "Invalid placement group id",
            AttributePath::new("id"),
        )?;

        if session
            .power
            .delete_placement_group(cloud_instance_id, group_id)
            .await
            .or_report_missing(diags, "Failed to delete placement group")?
            .is_none()
        {
            tracing::debug!(cloud_instance_id, group_id, "placement group already deleted");
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [cloud_instance_id, group_id] =
            split_id(&id, ID_PARTS).or_report(diags, "Invalid import id")?;
        let state = PlacementGroupState {
            pi_cloud_instance_id: Value::Value(Cow::Owned(cloud_instance_id.to_owned())),
            placement_group_id: Value::Value(Cow::Owned(group_id.to_owned())),
            id: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
