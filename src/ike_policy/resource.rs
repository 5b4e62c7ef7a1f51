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

use crate::session::SessionHandle;
use crate::utils::{
    force_new, IntoKnown, ReportMissing, ReportResult, WithSchema, WithValidate,
};

use super::fill_connections;
use super::state::IkePolicyState;

#[derive(Debug, Default, Clone)]
pub struct IkePolicyResource {
    session: SessionHandle,
}

impl IkePolicyResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Resource for IkePolicyResource {
    type State<'a> = Value<IkePolicyState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(IkePolicyState::schema())
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

        let Some(policy) = session
            .vpc
            .get_ike_policy(state.id.as_str())
            .await
            .or_report_missing(diags, "Failed to read IKE policy")?
        else {
            tracing::warn!(id = state.id.as_str(), "IKE policy not found, removing it from state");
            return Some((Value::Null, private_state));
        };

        let mut state =
            IkePolicyState::from_api(policy).or_report(diags, "Failed to read IKE policy")?;
        fill_connections(
            session.vpc.as_ref(),
            diags,
            state.id.as_str(),
            &mut state.vpn_connections,
        )
        .await;
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
        state.href = Value::Unknown;
        state.negotiation_mode = Value::Unknown;
        state.resource_type = Value::Unknown;
        state.created_at = Value::Unknown;
        state.vpn_connections = Value::Unknown;
        if state.ike_version.is_null() {
            state.ike_version = Value::Unknown;
        }
        if state.key_lifetime.is_null() {
            state.key_lifetime = Value::Unknown;
        }
        if state.resource_group.is_null() {
            state.resource_group = Value::Unknown;
        }

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
            "resource_group",
            &prior_state.resource_group,
            &state.resource_group,
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
        let body = state.to_api().or_report(diags, "Invalid IKE policy")?;

        let policy = session
            .vpc
            .create_ike_policy(&body)
            .await
            .or_report(diags, "Failed to create IKE policy")?;
        tracing::info!(
            id = policy.id.as_deref().unwrap_or_default(),
            name = %body.name,
            "IKE policy created"
        );

        let mut state =
            IkePolicyState::from_api(policy).or_report(diags, "Failed to create IKE policy")?;
        fill_connections(
            session.vpc.as_ref(),
            diags,
            state.id.as_str(),
            &mut state.vpn_connections,
        )
        .await;
        Some((Value::Value(state), private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let prior_state = prior_state.into_known(diags)?;
        let state = planned_state.into_known(diags)?;
        let session = self.session.get().await.or_report(diags, "Provider not configured")?;
        let id = prior_state.id.as_str();

        let patch = state.patch_from(&prior_state);
        let policy = if patch.is_empty() {
            session.vpc.get_ike_policy(id).await
        } else {
            tracing::debug!(id, ?patch, "patching IKE policy");
            session.vpc.update_ike_policy(id, &patch).await
        }
        .or_report(diags, "Failed to update IKE policy")?;

        let mut state =
            IkePolicyState::from_api(policy).or_report(diags, "Failed to update IKE policy")?;
        fill_connections(
            session.vpc.as_ref(),
            diags,
            state.id.as_str(),
            &mut state.vpn_connections,
        )
        .await;
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
        let id = state.id.as_str();

        if session
            .vpc
            .delete_ike_policy(id)
            .await
            .or_report_missing(diags, "Failed to delete IKE policy")?
            .is_none()
        {
            tracing::debug!(id, "IKE policy already deleted");
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        if id.is_empty() {
            diags.root_error_short("IKE policy id must not be empty");
            return None;
        }
        let state = IkePolicyState {
            id: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
