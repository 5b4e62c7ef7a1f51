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

use async_trait::async_trait;

use tf_provider::{AttributePath, DataSource, Diagnostics, Schema, Value, ValueEmpty};

use crate::session::SessionHandle;
use crate::utils::{validate_not_empty, ReportResult, WithSchema};

use super::state::{data_source_schema, DiskState, DisksState};

#[derive(Debug, Default, Clone)]
pub struct BareMetalDiskDataSource {
    session: SessionHandle,
}

impl BareMetalDiskDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for BareMetalDiskDataSource {
    type State<'a> = DiskState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(data_source_schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        validate_not_empty(
            diags,
            &config.bare_metal_server,
            AttributePath::new("bare_metal_server"),
        );
        validate_not_empty(diags, &config.disk, AttributePath::new("disk"));

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
        let bare_metal_server = config.bare_metal_server.as_str();

        let disk = session
            .vpc
            .get_bare_metal_server_disk(bare_metal_server, config.disk.as_str())
            .await
            .or_report(diags, "Failed to read disk")?;
        DiskState::from_api(bare_metal_server, disk).or_report(diags, "Failed to read disk")
    }
}

/// Every disk of a bare metal server, in a single request
#[derive(Debug, Default, Clone)]
pub struct BareMetalDisksDataSource {
    session: SessionHandle,
}

impl BareMetalDisksDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for BareMetalDisksDataSource {
    type State<'a> = DisksState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(DisksState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        validate_not_empty(
            diags,
            &config.bare_metal_server,
            AttributePath::new("bare_metal_server"),
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
        let bare_metal_server = config.bare_metal_server.as_str();

        let disks = session
            .vpc
            .list_bare_metal_server_disks(bare_metal_server)
            .await
            .or_report(diags, "Failed to list disks")?;
        tracing::debug!(bare_metal_server, count = disks.len(), "disks listed");

        let disks = disks
            .into_iter()
            .map(|disk| DiskState::from_api(bare_metal_server, disk).map(Value::Value))
            .collect::<Result<Vec<_>, _>>()
            .or_report(diags, "Failed to list disks")?;

        Some(DisksState {
            disks: Value::Value(disks),
            ..config
        })
    }
}
