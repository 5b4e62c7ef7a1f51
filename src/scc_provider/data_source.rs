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
use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::{
    map, Attribute, AttributePath, AttributeType, Block, DataSource, Description, Diagnostics,
    Schema, Value, ValueEmpty, ValueList, ValueNumber, ValueString,
};

use crate::api::findings::ApiProvider;
use crate::api::paginate::{collect_all, find_first};
use crate::session::SessionHandle;
use crate::utils::{
    computed, computed_blocks, optional_computed, string_of, validate_not_empty, ReportResult,
    WithSchema,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
}

impl From<ApiProvider> for ProviderState<'_> {
    fn from(provider: ApiProvider) -> Self {
        Self {
            id: string_of(provider.id),
            name: string_of(provider.name),
        }
    }
}

fn provider_attributes() -> HashMap<String, Attribute> {
    map! {
        "id" => computed(AttributeType::String, "Id of the provider"),
        "name" => computed(AttributeType::String, "Name of the provider, `{account_id}/providers/{provider_id}`"),
    }
}

/// Providers of an account, optionally narrowed to a single id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProvidersLookupState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub account_id: ValueString<'a>,
    pub providers: ValueList<Value<ProviderState<'a>>>,
    pub total_count: ValueNumber,
}

impl<'a> WithSchema for ProvidersLookupState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => optional_computed(AttributeType::String, "Id of the provider to look up; every provider is returned when unset"),
                    "account_id" => optional_computed(AttributeType::String, "Account owning the providers (defaults to the provider account)"),
                    "providers" => computed_blocks(&provider_attributes(), "Providers found"),
                    "total_count" => computed(AttributeType::Number, "Number of providers found"),
                },
                description: Description::plain("Look up the findings providers of a Security and Compliance Center account"),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProviderDataSource {
    session: SessionHandle,
}

impl ProviderDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for ProviderDataSource {
    type State<'a> = ProvidersLookupState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProvidersLookupState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        validate_not_empty(diags, &config.id, AttributePath::new("id"));

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
        let account_id = session
            .account_id(config.account_id.as_deref_option())
            .or_report(diags, "Failed to list providers")?;

        let providers = match config.id.as_deref_option() {
            Some(id) => {
                let found = find_first(
                    |page_token| session.findings.list_providers(&account_id, page_token),
                    |provider: &ApiProvider| provider.id.as_deref() == Some(id),
                )
                .await
                .or_report(diags, "Failed to list providers")?;
                match found {
                    Some(provider) => vec![provider],
                    None => {
                        diags.error(
                            "Failed to read provider",
                            format!("no Providers found with id {id}"),
                            AttributePath::new("id"),
                        );
                        return None;
                    }
                }
            }
            None => collect_all(|page_token| {
                session.findings.list_providers(&account_id, page_token)
            })
            .await
            .or_report(diags, "Failed to list providers")?,
        };
        tracing::debug!(account_id, count = providers.len(), "providers listed");

        // Without a filter, the listing is identified by its account
        let id = match config.id {
            Value::Value(id) => Value::Value(id),
            _ => Value::Value(Cow::Owned(account_id.clone())),
        };
        Some(ProvidersLookupState {
            id,
            account_id: Value::Value(Cow::Owned(account_id)),
            total_count: Value::Value(providers.len() as i64),
            providers: Value::Value(
                providers
                    .into_iter()
                    .map(|provider| Value::Value(provider.into()))
                    .collect(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{FakeCloud, ACCOUNT_ID};

    fn seed(cloud: &FakeCloud, ids: &[&str]) {
        let providers = ids
            .iter()
            .map(|id| ApiProvider {
                id: Some(id.to_string()),
                name: Some(format!("{ACCOUNT_ID}/providers/{id}")),
            })
            .collect();
        cloud
            .findings
            .providers
            .lock()
            .unwrap()
            .insert(ACCOUNT_ID.to_owned(), providers);
    }

    fn ids_of(state: &ProvidersLookupState) -> Vec<String> {
        state
            .providers
            .iter()
            .flatten()
            .filter_map(Value::as_ref_option)
            .map(|provider| provider.id.as_str().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn lookup_by_id() {
        let cloud = FakeCloud::default();
        seed(&cloud, &["p1", "p2", "p3", "p4", "p5"]);
        let data_source = ProviderDataSource::new(cloud.handle());

        let config = ProvidersLookupState {
            id: Value::Value(Cow::Borrowed("p3")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, config, Default::default())
            .await
            .unwrap();
        assert_eq!(ids_of(&state), ["p3"]);
        assert_eq!(state.id.as_str(), "p3");
        assert_eq!(state.total_count, Value::Value(1));
        let provider = state.providers.iter().flatten().next().unwrap();
        assert_eq!(
            provider.as_ref_option().unwrap().name.as_str(),
            format!("{ACCOUNT_ID}/providers/p3")
        );
        // Pages of two: the match is on the second page
        assert_eq!(cloud.findings.provider_list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_id_is_an_error() {
        let cloud = FakeCloud::default();
        seed(&cloud, &["p1", "p2", "p3"]);
        let data_source = ProviderDataSource::new(cloud.handle());

        let config = ProvidersLookupState {
            id: Value::Value(Cow::Borrowed("missing")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        assert!(data_source
            .read(&mut diags, config, Default::default())
            .await
            .is_none());
        assert_eq!(diags.errors.len(), 1);
        assert!(format!("{:?}", diags.errors[0]).contains("no Providers found with id missing"));
        assert_eq!(cloud.findings.provider_list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn list_visits_every_page() {
        let cloud = FakeCloud::default();
        seed(&cloud, &["p1", "p2", "p3", "p4", "p5"]);
        let data_source = ProviderDataSource::new(cloud.handle());

        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, Default::default(), Default::default())
            .await
            .unwrap();
        assert_eq!(ids_of(&state), ["p1", "p2", "p3", "p4", "p5"]);
        assert_eq!(state.id.as_str(), ACCOUNT_ID);
        assert_eq!(state.account_id.as_str(), ACCOUNT_ID);
        assert_eq!(state.total_count, Value::Value(5));
        assert_eq!(cloud.findings.provider_list_calls.load(Ordering::SeqCst), 3);
    }
}
