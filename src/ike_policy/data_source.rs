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

use crate::api::paginate::{collect_all, find_first};
use crate::api::vpc::ApiIkePolicy;
use crate::session::SessionHandle;
use crate::utils::{ReportResult, WithSchema, WithValidate};

use super::fill_connections;
use super::state::{IkePoliciesState, IkePolicyDataState, IkePolicyDetails, IkePolicyLookup};

/// Single IKE policy, by name or by id
#[derive(Debug, Default, Clone)]
pub struct IkePolicyDataSource {
    session: SessionHandle,
}

impl IkePolicyDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for IkePolicyDataSource {
    type State<'a> = IkePolicyDataState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(IkePolicyDataState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        config.validate(diags, AttributePath::default());

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
        let lookup = config.lookup().or_report(diags, "Invalid IKE policy lookup")?;

        let policy = match lookup {
            Some(IkePolicyLookup::ById(id)) => session
                .vpc
                .get_ike_policy(id)
                .await
                .or_report(diags, "Failed to read IKE policy")?,
            Some(IkePolicyLookup::ByName(name)) => {
                let found = find_first(
                    |start| session.vpc.list_ike_policies(start),
                    |policy: &ApiIkePolicy| policy.name.as_deref() == Some(name),
                )
                .await
                .or_report(diags, "Failed to list IKE policies")?;
                match found {
                    Some(policy) => policy,
                    None => {
                        diags.error(
                            "Failed to read IKE policy",
                            format!("no IKE policy found with given name {name}"),
                            AttributePath::new("name"),
                        );
                        return None;
                    }
                }
            }
            None => {
                diags.root_error_short("IKE policy lookup is not known yet");
                return None;
            }
        };

        let mut policy =
            IkePolicyDetails::from_api(policy).or_report(diags, "Failed to read IKE policy")?;
        fill_connections(
            session.vpc.as_ref(),
            diags,
            policy.id.as_str(),
            &mut policy.connections,
        )
        .await;

        // `ike_policy` is not computed: it stays as configured
        Some(IkePolicyDataState {
            ike_policy: config.ike_policy,
            policy,
        })
    }
}

/// Every IKE policy of the region
#[derive(Debug, Default, Clone)]
pub struct IkePoliciesDataSource {
    session: SessionHandle,
}

impl IkePoliciesDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for IkePoliciesDataSource {
    type State<'a> = IkePoliciesState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(IkePoliciesState::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        _config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let session = self.session.get().await.or_report(diags, "Provider not configured")?;

        let policies = collect_all(|start| session.vpc.list_ike_policies(start))
            .await
            .or_report(diags, "Failed to list IKE policies")?;
        tracing::debug!(count = policies.len(), "IKE policies listed");

        let policies = policies
            .into_iter()
            .map(|policy| IkePolicyDetails::from_api(policy).map(Value::Value))
            .collect::<Result<Vec<_>, _>>()
            .or_report(diags, "Failed to list IKE policies")?;

        Some(IkePoliciesState {
            ike_policies: Value::Value(policies),
        })
    }
}
