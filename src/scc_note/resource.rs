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

use super::state::{NoteState, ID_PARTS};

#[derive(Debug, Default, Clone)]
pub struct NoteResource {
    session: SessionHandle,
}

impl NoteResource {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Resource for NoteResource {
    type State<'a> = Value<NoteState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(NoteState::schema())
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
        let [provider_id, note_id] = split_id(state.id.as_str(), ID_PARTS).or_report_at(
            diags,
            "Invalid note id",
            AttributePath::new("id"),
        )?;
        let account_id = session
            .account_id(state.account_id.as_deref_option())
            .or_report(diags, "Failed to read note")?;

        let Some(note) = session
            .findings
            .get_note(&account_id, provider_id, note_id)
            .await
            .or_report_missing(diags, "Failed to read note")?
        else {
            tracing::warn!(id = state.id.as_str(), "note not found, removing it from state");
            return Some((Value::Null, private_state));
        };

        let state = NoteState::from_api(&account_id, provider_id, note)
            .or_report(diags, "Failed to read note")?;
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
        if state.account_id.is_null() {
            state.account_id = Value::Unknown;
        }
        if state.shared.is_null() {
            state.shared = Value::Value(true);
        }
        state.create_time = Value::Unknown;
        state.update_time = Value::Unknown;

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
        force_new(&mut trigger_replace, "account_id", &prior_state.account_id, &state.account_id);
        force_new(&mut trigger_replace, "provider_id", &prior_state.provider_id, &state.provider_id);
        force_new(&mut trigger_replace, "note_id", &prior_state.note_id, &state.note_id);

        if state.shared.is_null() {
            state.shared = Value::Value(true);
        }
        if state != prior_state {
            state.update_time = Value::Unknown;
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
        let account_id = session
            .account_id(state.account_id.as_deref_option())
            .or_report(diags, "Failed to create note")?;
        let provider_id = state.provider_id.as_str();
        let note = state.to_api().or_report(diags, "Invalid note")?;

        let created = session
            .findings
            .create_note(&account_id, provider_id, &note)
            .await
            .or_report(diags, "Failed to create note")?;
        tracing::info!(
            account_id = %account_id,
            provider_id,
            note_id = created.id.as_deref().unwrap_or_default(),
            "note created"
        );

        let state = NoteState::from_api(&account_id, provider_id, created)
            .or_report(diags, "Failed to create note")?;
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
        let [provider_id, note_id] = split_id(prior_state.id.as_str(), ID_PARTS).or_report_at(
            diags,
            "Invalid note id",
            AttributePath::new("id"),
        )?;
        let account_id = session
            .account_id(state.account_id.as_deref_option())
            .or_report(diags, "Failed to update note")?;
        let note = state.to_api().or_report(diags, "Invalid note")?;

        let updated = session
            .findings
            .update_note(&account_id, provider_id, note_id, &note)
            .await
            .or_report(diags, "Failed to update note")?;
        tracing::info!(account_id = %account_id, provider_id, note_id, "note updated");

        let state = NoteState::from_api(&account_id, provider_id, updated)
            .or_report(diags, "Failed to update note")?;
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
        let [provider_id, note_id] = split_id(state.id.as_str(), ID_PARTS).or_report_at(
            diags,
            "Invalid note id",
            AttributePath::new("id"),
        )?;
        let account_id = session
            .account_id(state.account_id.as_deref_option())
            .or_report(diags, "Failed to delete note")?;

        if session
            .findings
            .delete_note(&account_id, provider_id, note_id)
            .await
            .or_report_missing(diags, "Failed to delete note")?
            .is_none()
        {
            tracing::debug!(provider_id, note_id, "note already deleted");
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let [provider_id, note_id] = split_id(&id, ID_PARTS).or_report(diags, "Invalid import id")?;
        let state = NoteState {
            provider_id: Value::Value(Cow::Owned(provider_id.to_owned())),
            note_id: Value::Value(Cow::Owned(note_id.to_owned())),
            id: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::super::state::tests::finding_note;
    use super::*;
    use crate::testing::{FakeCloud, ACCOUNT_ID};

    async fn create(
        resource: &NoteResource,
        config: NoteState<'static>,
    ) -> NoteState<'static> {
        let mut diags = Diagnostics::default();
        let (planned, private) = resource
            .plan_create(
                &mut diags,
                Value::Value(config.clone()),
                Value::Value(config.clone()),
                Default::default(),
            )
            .await
            .unwrap();
        let (state, _) = resource
            .create(&mut diags, planned, Value::Value(config), private, Default::default())
            .await
            .unwrap();
        assert!(diags.errors.is_empty());
        match state {
            Value::Value(state) => state,
            _ => panic!("created state should be known"),
        }
    }

    #[tokio::test]
    async fn create_finding_note() {
        let cloud = FakeCloud::default();
        let resource = NoteResource::new(cloud.handle());

        let state = create(&resource, finding_note("p1", "n1")).await;
        assert_eq!(state.id.as_str(), "p1/n1");
        assert_eq!(state.kind.as_str(), "FINDING");
        assert_eq!(state.account_id.as_str(), ACCOUNT_ID);
        assert_eq!(state.shared, Value::Value(true));
        assert!(matches!(state.create_time, Value::Value(_)));
        assert!(state.kpi.is_null());
    }

    #[tokio::test]
    async fn read_after_create_round_trips() {
        let cloud = FakeCloud::default();
        let resource = NoteResource::new(cloud.handle());
        let created = create(&resource, finding_note("p1", "n1")).await;

        let mut diags = Diagnostics::default();
        let (read, _) = resource
            .read(&mut diags, Value::Value(created.clone()), Default::default(), Default::default())
            .await
            .unwrap();
        assert_eq!(read, Value::Value(created));
    }

    #[tokio::test]
    async fn delete_then_read_removes_from_state() {
        let cloud = FakeCloud::default();
        let resource = NoteResource::new(cloud.handle());
        let created = create(&resource, finding_note("p1", "n1")).await;

        let mut diags = Diagnostics::default();
        resource
            .destroy(&mut diags, Value::Value(created.clone()), Default::default(), Default::default())
            .await
            .unwrap();
        assert!(cloud.findings.notes.lock().unwrap().is_empty());

        let (read, _) = resource
            .read(&mut diags, Value::Value(created.clone()), Default::default(), Default::default())
            .await
            .unwrap();
        assert_eq!(read, Value::Null);

        // deleting again is not an error
        resource
            .destroy(&mut diags, Value::Value(created), Default::default(), Default::default())
            .await
            .unwrap();
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_the_note() {
        let cloud = FakeCloud::default();
        let resource = NoteResource::new(cloud.handle());
        let created = create(&resource, finding_note("p1", "n1")).await;

        let mut proposed = created.clone();
        proposed.short_description = Value::Value(Cow::Borrowed("Updated"));

        let mut diags = Diagnostics::default();
        let (planned, private, replace) = resource
            .plan_update(
                &mut diags,
                Value::Value(created.clone()),
                Value::Value(proposed.clone()),
                Value::Value(proposed.clone()),
                Default::default(),
                Default::default(),
            )
            .await
            .unwrap();
        assert!(replace.is_empty());

        let (state, _) = resource
            .update(
                &mut diags,
                Value::Value(created),
                planned,
                Value::Value(proposed),
                private,
                Default::default(),
            )
            .await
            .unwrap();
        let Value::Value(state) = state else {
            panic!("updated state should be known");
        };
        assert_eq!(state.short_description.as_str(), "Updated");
        assert_eq!(state.create_time.as_str(), crate::testing::TIMESTAMP);
        assert_ne!(state.update_time.as_str(), crate::testing::TIMESTAMP);
    }

    #[tokio::test]
    async fn changing_identity_forces_replacement() {
        let resource = NoteResource::new(FakeCloud::default().handle());
        let prior = finding_note("p1", "n1");
        let proposed = finding_note("p1", "n2");

        let mut diags = Diagnostics::default();
        let (_, _, replace) = resource
            .plan_update(
                &mut diags,
                Value::Value(prior),
                Value::Value(proposed.clone()),
                Value::Value(proposed),
                Default::default(),
                Default::default(),
            )
            .await
            .unwrap();
        assert_eq!(replace.len(), 1);
    }

    #[tokio::test]
    async fn import_then_read() {
        let cloud = FakeCloud::default();
        let resource = NoteResource::new(cloud.handle());
        create(&resource, finding_note("p1", "n1")).await;

        let mut diags = Diagnostics::default();
        let (imported, _) = resource.import(&mut diags, "p1/n1".to_owned()).await.unwrap();
        let (read, _) = resource
            .read(&mut diags, imported, Default::default(), Default::default())
            .await
            .unwrap();
        let Value::Value(read) = read else {
            panic!("imported note should exist");
        };
        assert_eq!(read.short_description.as_str(), "Short");

        assert!(resource.import(&mut diags, "p1".to_owned()).await.is_none());
        assert_eq!(diags.errors.len(), 1);
    }

    #[tokio::test]
    async fn unconfigured_provider_is_reported() {
        let resource = NoteResource::new(SessionHandle::default());
        let mut diags = Diagnostics::default();
        let state = Value::Value(finding_note("p1", "n1"));
        assert!(resource
            .create(&mut diags, state.clone(), state, Default::default(), Default::default())
            .await
            .is_none());
        assert_eq!(diags.errors.len(), 1);
    }
}
