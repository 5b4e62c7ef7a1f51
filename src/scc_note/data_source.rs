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
use serde::{Deserialize, Serialize};

use tf_provider::{
    map, AttributePath, AttributeType, Block, DataSource, Description, Diagnostics, Schema, Value,
    ValueEmpty, ValueList, ValueString,
};

use crate::api::paginate::collect_all;
use crate::session::SessionHandle;
use crate::utils::{
    computed_blocks, optional_computed, required, validate_not_empty, ReportResult, WithSchema,
};

use super::state::{computed_note_attributes, data_source_schema, NoteState};

/// Single note, looked up by provider and note id
#[derive(Debug, Default, Clone)]
pub struct NoteDataSource {
    session: SessionHandle,
}

impl NoteDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for NoteDataSource {
    type State<'a> = NoteState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(data_source_schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        validate_not_empty(diags, &config.provider_id, AttributePath::new("provider_id"));
        validate_not_empty(diags, &config.note_id, AttributePath::new("note_id"));

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
            .or_report(diags, "Failed to read note")?;
        let provider_id = config.provider_id.as_str();

        let note = session
            .findings
            .get_note(&account_id, provider_id, config.note_id.as_str())
            .await
            .or_report(diags, "Failed to read note")?;

        NoteState::from_api(&account_id, provider_id, note).or_report(diags, "Failed to read note")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NotesState<'a> {
    #[serde(borrow = "'a")]
    pub account_id: ValueString<'a>,
    pub provider_id: ValueString<'a>,
    pub notes: ValueList<Value<NoteState<'a>>>,
}

impl<'a> WithSchema for NotesState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "account_id" => optional_computed(AttributeType::String, "Account owning the notes (defaults to the provider account)"),
                    "provider_id" => required(AttributeType::String, "Id of the findings provider"),
                    "notes" => computed_blocks(&computed_note_attributes(), "Notes of the provider"),
                },
                description: Description::plain("List the notes of a Security and Compliance Center findings provider"),
                ..Default::default()
            },
        }
    }
}

/// Every note of a provider
#[derive(Debug, Default, Clone)]
pub struct NotesDataSource {
    session: SessionHandle,
}

impl NotesDataSource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DataSource for NotesDataSource {
    type State<'a> = NotesState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(NotesState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        validate_not_empty(diags, &config.provider_id, AttributePath::new("provider_id"));

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
            .or_report(diags, "Failed to list notes")?;
        let provider_id = config.provider_id.as_str();

        let notes = collect_all(|page_token| {
            session
                .findings
                .list_notes(&account_id, provider_id, page_token)
        })
        .await
        .or_report(diags, "Failed to list notes")?;
        tracing::debug!(provider_id, count = notes.len(), "notes listed");

        let notes = notes
            .into_iter()
            .map(|note| NoteState::from_api(&account_id, provider_id, note).map(Value::Value))
            .collect::<Result<Vec<_>, _>>()
            .or_report(diags, "Failed to list notes")?;

        Some(NotesState {
            account_id: Value::Value(Cow::Owned(account_id)),
            notes: Value::Value(notes),
            ..config
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::super::state::tests::finding_note;
    use super::*;
    use crate::testing::FakeCloud;

    async fn seed(cloud: &FakeCloud, provider_id: &str, note_ids: &[&str]) {
        let session = cloud.session();
        for note_id in note_ids {
            let note = finding_note(provider_id, note_id).to_api().unwrap();
            session
                .findings
                .create_note(crate::testing::ACCOUNT_ID, provider_id, &note)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn read_single_note() {
        let cloud = FakeCloud::default();
        seed(&cloud, "p1", &["n1"]).await;
        let data_source = NoteDataSource::new(cloud.handle());

        let config = NoteState {
            provider_id: Value::Value(Cow::Borrowed("p1")),
            note_id: Value::Value(Cow::Borrowed("n1")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, config, Default::default())
            .await
            .unwrap();
        assert_eq!(state.id.as_str(), "p1/n1");
        assert_eq!(state.kind.as_str(), "FINDING");
    }

    #[tokio::test]
    async fn missing_note_is_an_error() {
        let cloud = FakeCloud::default();
        let data_source = NoteDataSource::new(cloud.handle());

        let config = NoteState {
            provider_id: Value::Value(Cow::Borrowed("p1")),
            note_id: Value::Value(Cow::Borrowed("n1")),
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
    async fn list_visits_every_page() {
        let cloud = FakeCloud::default();
        seed(&cloud, "p1", &["n1", "n2", "n3"]).await;
        seed(&cloud, "p2", &["other"]).await;
        let data_source = NotesDataSource::new(cloud.handle());

        let config = NotesState {
            provider_id: Value::Value(Cow::Borrowed("p1")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, config, Default::default())
            .await
            .unwrap();

        let ids: Vec<_> = state
            .notes
            .iter()
            .flatten()
            .filter_map(Value::as_ref_option)
            .map(|note| note.note_id.as_str().to_owned())
            .collect();
        assert_eq!(ids, ["n1", "n2", "n3"]);
        assert_eq!(cloud.findings.list_calls.load(Ordering::SeqCst), 2);
    }
}
