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

use crate::api::vpc::{ApiBareMetalServerDisk, ApiBareMetalServerDiskPatch};
use crate::id::split_id;
use crate::session::{Session, SessionHandle};
use crate::utils::{
    force_new, owned, IntoKnown, ReportMissing, ReportResult, WithSchema, WithValidate,
};

use super::state::{DiskState, ID_PARTS};

/// Disks come with the server: creating the resource adopts an existing disk
/// and deleting it only forgets the disk
#[derive(Debug, Default, Clone)]
pub struct BareMetalDiskResource {
    session: SessionHandle,
}

impl BareMetalDiskResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

/// Rename the disk if the wanted name differs from the current one
async fn rename(
    session: &Session,
    diags: &mut Diagnostics,
    bare_metal_server: &str,
    disk: ApiBareMetalServerDisk,
    name: Option<String>,
) -> Option<ApiBareMetalServerDisk> {
    let Some(name) = name.filter(|name| Some(name) != disk.name.as_ref()) else {
        return Some(disk);
    };
    let disk_id = disk.id.unwrap_or_default();
    let patch = ApiBareMetalServerDiskPatch { name: Some(name) };
    let disk = session
        .vpc
        .update_bare_metal_server_disk(bare_metal_server, &disk_id, &patch)
        .await
        .or_report(diags, "Failed to rename disk")?;
    tracing::info!(
        bare_metal_server,
        disk = %disk_id,
        name = disk.name.as_deref().unwrap_or_default(),
        "disk renamed"
    );
    Some(disk)
}

#[async_trait]
impl Resource for BareMetalDiskResource {
    type State<'a> = Value<DiskState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(DiskState::schema())
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
        let [bare_metal_server, disk_id] = split_id(state.id.as_str(), ID_PARTS).or_report_at(
            diags,
            "Invalid disk id",
            AttributePath::new("id"),
        )?;

        let Some(disk) = session
            .vpc
            .get_bare_metal_server_disk(bare_metal_server, disk_id)
            .await
            .or_report_missing(diags, "Failed to read disk")?
        else {
            tracing::warn!(id = state.id.as_str(), "disk not found, removing it from state");
            return Some((Value::Null, private_state));
        };

        let state =
            DiskState::from_api(bare_metal_server, disk).or_report(diags, "Failed to read disk")?;
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
        if state.name.is_null() {
            state.name = Value::Unknown;
        }
        state.href = Value::Unknown;
        state.size = Value::Unknown;
        state.interface_type = Value::Unknown;
        state.resource_type = Value::Unknown;
        state.created_at = Value::Unknown;
        state.allowed_use = Value::Unknown;

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
        let mut state = proposed_state.into_known(diags)?;

        let mut trigger_replace = Vec::new();
        force_new(
            &mut trigger_replace,
            "bare_metal_server",
            &prior_state.bare_metal_server,
            &state.bare_metal_server,
        );
        force_new(&mut trigger_replace, "disk", &prior_state.disk, &state.disk);

        if state.name.is_null() {
            state.name = prior_state.name;
        }

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
        let bare_metal_server = state.bare_metal_server.as_str();

        let disk = session
            .vpc
            .get_bare_metal_server_disk(bare_metal_server, state.disk.as_str())
            .await
            .or_report(diags, "Failed to read disk")?;
        let disk = rename(&session, diags, bare_metal_server, disk, owned(&state.name)).await?;

        let state =
            DiskState::from_api(bare_metal_server, disk).or_report(diags, "Failed to read disk")?;
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
        let state = planned_state.into_known(diags)?;
        let session = self.session.get().await.or_report(diags, "Provider not configured")?;
        let bare_metal_server = state.bare_metal_server.as_str();

        let disk = session
            .vpc
            .get_bare_metal_server_disk(bare_metal_server, state.disk.as_str())
            .await
            .or_report(diags, "Failed to read disk")?;
        let disk = rename(&session, diags, bare_metal_server, disk, owned(&state.name)).await?;

        let state =
            DiskState::from_api(bare_metal_server, disk).or_report(diags, "Failed to read disk")?;
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
        tracing::info!(
            id = state.id.as_str(),
            "disks cannot be deleted, only removing it from state"
        );
        Some(())
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [bare_metal_server, disk_id] =
            split_id(&id, ID_PARTS).or_report(diags, "Invalid import id")?;
        let state = DiskState {
            bare_metal_server: Value::Value(Cow::Owned(bare_metal_server.to_owned())),
            disk: Value::Value(Cow::Owned(disk_id.to_owned())),
            id: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
