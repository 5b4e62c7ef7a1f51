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

use tf_provider::{map, AttributePath, Diagnostics, Provider, Schema, ValueEmpty};

use crate::bare_metal_disk::{
    BareMetalDiskDataSource, BareMetalDiskResource, BareMetalDisksDataSource,
};
use crate::config::{ProviderConfig, Settings};
use crate::ike_policy::{IkePoliciesDataSource, IkePolicyDataSource, IkePolicyResource};
use crate::pi_placement_group::{
    PlacementGroupDataSource, PlacementGroupResource, PlacementGroupsDataSource,
};
use crate::scc_note::{NoteDataSource, NoteResource, NotesDataSource};
use crate::scc_provider::ProviderDataSource;
use crate::session::{Session, SessionHandle};
use crate::utils::{ReportResult, WithSchema, WithValidate};

/// Every resource and data source shares the provider session
#[derive(Debug, Default, Clone)]
pub struct IbmProvider {
    session: SessionHandle,
}

#[async_trait]
impl Provider for IbmProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProviderConfig::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        config.validate(diags, AttributePath::default());

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        tracing::debug!(%terraform_version, "configuring provider");
        let settings = Settings::from_env(&config)
            .map_err(|err| format!("{err:#}"))
            .or_report(diags, "Invalid provider configuration")?;
        let session = Session::connect(&settings)
            .await
            .map_err(|err| format!("{err:#}"))
            .or_report(diags, "Failed to connect to IBM Cloud")?;
        self.session.install(session).await;
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<std::collections::HashMap<String, Box<dyn tf_provider::resource::DynamicResource>>>
    {
        let session = &self.session;
        Some(map! {
            "scc_si_note" => NoteResource::new(session.clone()),
            "pi_placement_group" => PlacementGroupResource::new(session.clone()),
            "is_ike_policy" => IkePolicyResource::new(session.clone()),
            "is_bare_metal_server_disk" => BareMetalDiskResource::new(session.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<
        std::collections::HashMap<String, Box<dyn tf_provider::data_source::DynamicDataSource>>,
    > {
        let session = &self.session;
        Some(map! {
            "scc_si_note" => NoteDataSource::new(session.clone()),
            "scc_si_notes" => NotesDataSource::new(session.clone()),
            "scc_si_provider" => ProviderDataSource::new(session.clone()),
            "pi_placement_group" => PlacementGroupDataSource::new(session.clone()),
            "pi_placement_groups" => PlacementGroupsDataSource::new(session.clone()),
            "is_ike_policy" => IkePolicyDataSource::new(session.clone()),
            "is_ike_policies" => IkePoliciesDataSource::new(session.clone()),
            "is_bare_metal_server_disk" => BareMetalDiskDataSource::new(session.clone()),
            "is_bare_metal_server_disks" => BareMetalDisksDataSource::new(session.clone()),
        })
    }
}
