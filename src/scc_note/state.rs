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

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tf_provider::{
    map, value, Attribute, AttributeType, Block, Description, NestedBlock, Schema, Value,
    value::ValueBool, ValueList, ValueString,
};

use crate::api::findings::{
    ApiCard, ApiCardElement, ApiFindingType, ApiKpiType, ApiNote, ApiRelatedUrl,
    ApiRemediationStep, ApiReporter, ApiSection,
};
use crate::id::join_id;
use crate::utils::{
    all_computed, blocks_of, computed, computed_blocks, expand_list, optional, optional_computed,
    owned, owned_list, required, require, string_of, value_of, MappingError,
    WithSchema,
};

pub(super) const ID_PARTS: [&str; 2] = ["provider_id", "note_id"];

pub(super) const KINDS: [&str; 5] = ["FINDING", "KPI", "CARD", "CARD_CONFIGURED", "SECTION"];
pub(super) const SEVERITIES: [&str; 4] = ["LOW", "MEDIUM", "HIGH", "CRITICAL"];
pub(super) const AGGREGATION_TYPES: [&str; 1] = ["SUM"];
pub(super) const ELEMENT_KINDS: [&str; 3] = ["NUMERIC", "BREAKDOWN", "TIME_SERIES"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NoteState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub account_id: ValueString<'a>,
    pub provider_id: ValueString<'a>,
    pub note_id: ValueString<'a>,
    pub short_description: ValueString<'a>,
    pub long_description: ValueString<'a>,
    pub kind: ValueString<'a>,
    pub shared: ValueBool,
    pub create_time: ValueString<'a>,
    pub update_time: ValueString<'a>,
    pub related_url: ValueList<Value<RelatedUrlState<'a>>>,
    #[serde(with = "value::serde_as_vec")]
    pub reporter: Value<ReporterState<'a>>,
    #[serde(with = "value::serde_as_vec")]
    pub finding: Value<FindingState<'a>>,
    #[serde(with = "value::serde_as_vec")]
    pub kpi: Value<KpiState<'a>>,
    #[serde(with = "value::serde_as_vec")]
    pub card: Value<CardState<'a>>,
    #[serde(with = "value::serde_as_vec")]
    pub section: Value<SectionState<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RelatedUrlState<'a> {
    #[serde(borrow = "'a")]
    pub label: ValueString<'a>,
    pub url: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReporterState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub title: ValueString<'a>,
    pub url: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FindingState<'a> {
    #[serde(borrow = "'a")]
    pub severity: ValueString<'a>,
    pub next_steps: ValueList<Value<RemediationStepState<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RemediationStepState<'a> {
    #[serde(borrow = "'a")]
    pub title: ValueString<'a>,
    pub url: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KpiState<'a> {
    #[serde(borrow = "'a")]
    pub aggregation_type: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CardState<'a> {
    #[serde(borrow = "'a")]
    pub section: ValueString<'a>,
    pub title: ValueString<'a>,
    pub subtitle: ValueString<'a>,
    pub finding_note_names: ValueList<ValueString<'a>>,
    pub requires_configuration: ValueBool,
    pub badge_text: ValueString<'a>,
    pub badge_image: ValueString<'a>,
    pub elements: ValueList<Value<CardElementState<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CardElementState<'a> {
    #[serde(borrow = "'a")]
    pub kind: ValueString<'a>,
    pub text: ValueString<'a>,
    pub default_time_range: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SectionState<'a> {
    #[serde(borrow = "'a")]
    pub title: ValueString<'a>,
    pub image: ValueString<'a>,
}

/// Kind specific part of a note: exactly one detail block matches the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteDetails<'n> {
    Finding(&'n FindingState<'n>),
    Kpi(&'n KpiState<'n>),
    Card(&'n CardState<'n>),
    Section(&'n SectionState<'n>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailsError {
    #[error("unknown note kind `{0}`, expected one of: FINDING, KPI, CARD, CARD_CONFIGURED, SECTION")]
    UnknownKind(String),
    #[error("a note of kind `{kind}` requires a `{block}` block")]
    Missing { kind: String, block: &'static str },
    #[error("the `{block}` block is not allowed on a note of kind `{kind}`")]
    Unexpected { kind: String, block: &'static str },
}

impl DetailsError {
    /// Attribute the error relates to
    pub fn attribute(&self) -> &'static str {
        match self {
            DetailsError::UnknownKind(_) => "kind",
            DetailsError::Missing { block, .. } | DetailsError::Unexpected { block, .. } => block,
        }
    }
}

impl<'a> NoteState<'a> {
    /// Detail block selected by the kind.
    ///
    /// `Ok(None)` while the kind or the selected block is not known yet.
    pub fn details(&self) -> Result<Option<NoteDetails<'_>>, DetailsError> {
        let Value::Value(kind) = &self.kind else {
            return Ok(None);
        };
        let kind: &str = kind;
        let expected = match kind {
            "FINDING" => "finding",
            "KPI" => "kpi",
            "CARD" | "CARD_CONFIGURED" => "card",
            "SECTION" => "section",
            other => return Err(DetailsError::UnknownKind(other.to_owned())),
        };

        for (block, is_null) in [
            ("finding", self.finding.is_null()),
            ("kpi", self.kpi.is_null()),
            ("card", self.card.is_null()),
            ("section", self.section.is_null()),
        ] {
            if block != expected && !is_null {
                return Err(DetailsError::Unexpected {
                    kind: kind.to_string(),
                    block,
                });
            }
        }

        let missing = || DetailsError::Missing {
            kind: kind.to_string(),
            block: expected,
        };
        let details = match expected {
            "finding" => match &self.finding {
                Value::Value(finding) => NoteDetails::Finding(finding),
                Value::Null => return Err(missing()),
                Value::Unknown => return Ok(None),
            },
            "kpi" => match &self.kpi {
                Value::Value(kpi) => NoteDetails::Kpi(kpi),
                Value::Null => return Err(missing()),
                Value::Unknown => return Ok(None),
            },
            "card" => match &self.card {
                Value::Value(card) => NoteDetails::Card(card),
                Value::Null => return Err(missing()),
                Value::Unknown => return Ok(None),
            },
            _ => match &self.section {
                Value::Value(section) => NoteDetails::Section(section),
                Value::Null => return Err(missing()),
                Value::Unknown => return Ok(None),
            },
        };
        Ok(Some(details))
    }

    /// Build the state of a note returned by the API
    pub fn from_api(account_id: &str, provider_id: &str, note: ApiNote) -> Result<Self, MappingError> {
        let note_id = require(note.id, "id")?;
        Ok(Self {
            id: Value::Value(Cow::Owned(join_id(&[provider_id, &note_id]))),
            account_id: Value::Value(Cow::Owned(account_id.to_owned())),
            provider_id: Value::Value(Cow::Owned(provider_id.to_owned())),
            note_id: Value::Value(Cow::Owned(note_id)),
            short_description: string_of(note.short_description),
            long_description: string_of(note.long_description),
            kind: string_of(note.kind),
            shared: value_of(note.shared),
            create_time: string_of(note.create_time),
            update_time: string_of(note.update_time),
            related_url: blocks_of(note.related_url, RelatedUrlState::from),
            reporter: value_of(note.reporter.map(ReporterState::from)),
            finding: value_of(note.finding.map(FindingState::from)),
            kpi: value_of(note.kpi.map(KpiState::from)),
            card: value_of(note.card.map(CardState::from)),
            section: value_of(note.section.map(SectionState::from)),
        })
    }

    /// Request body of the note
    pub fn to_api(&self) -> Result<ApiNote, DetailsError> {
        let mut note = ApiNote {
            id: owned(&self.note_id),
            short_description: owned(&self.short_description),
            long_description: owned(&self.long_description),
            kind: owned(&self.kind),
            related_url: expand_list(&self.related_url, RelatedUrlState::to_api),
            shared: self.shared.as_ref_option().copied(),
            reporter: self.reporter.as_ref_option().map(ReporterState::to_api),
            ..Default::default()
        };
        match self.details()? {
            Some(NoteDetails::Finding(finding)) => note.finding = Some(finding.to_api()),
            Some(NoteDetails::Kpi(kpi)) => note.kpi = Some(kpi.to_api()),
            Some(NoteDetails::Card(card)) => note.card = Some(card.to_api()),
            Some(NoteDetails::Section(section)) => note.section = Some(section.to_api()),
            None => (),
        }
        Ok(note)
    }
}

impl<'a> From<ApiRelatedUrl> for RelatedUrlState<'a> {
    fn from(value: ApiRelatedUrl) -> Self {
        Self {
            label: string_of(value.label),
            url: string_of(value.url),
        }
    }
}

impl<'a> RelatedUrlState<'a> {
    fn to_api(&self) -> ApiRelatedUrl {
        ApiRelatedUrl {
            label: owned(&self.label),
            url: owned(&self.url),
        }
    }
}

impl<'a> From<ApiReporter> for ReporterState<'a> {
    fn from(value: ApiReporter) -> Self {
        Self {
            id: string_of(value.id),
            title: string_of(value.title),
            url: string_of(value.url),
        }
    }
}

impl<'a> ReporterState<'a> {
    fn to_api(&self) -> ApiReporter {
        ApiReporter {
            id: owned(&self.id),
            title: owned(&self.title),
            url: owned(&self.url),
        }
    }
}

impl<'a> From<ApiFindingType> for FindingState<'a> {
    fn from(value: ApiFindingType) -> Self {
        Self {
            severity: string_of(value.severity),
            next_steps: blocks_of(value.next_steps, |step: ApiRemediationStep| {
                RemediationStepState {
                    title: string_of(step.title),
                    url: string_of(step.url),
                }
            }),
        }
    }
}

impl<'a> FindingState<'a> {
    fn to_api(&self) -> ApiFindingType {
        ApiFindingType {
            severity: owned(&self.severity),
            next_steps: expand_list(&self.next_steps, |step| ApiRemediationStep {
                title: owned(&step.title),
                url: owned(&step.url),
            }),
        }
    }
}

impl<'a> From<ApiKpiType> for KpiState<'a> {
    fn from(value: ApiKpiType) -> Self {
        Self {
            aggregation_type: string_of(value.aggregation_type),
        }
    }
}

impl<'a> KpiState<'a> {
    fn to_api(&self) -> ApiKpiType {
        ApiKpiType {
            aggregation_type: owned(&self.aggregation_type),
        }
    }
}

impl<'a> From<ApiCard> for CardState<'a> {
    fn from(value: ApiCard) -> Self {
        Self {
            section: string_of(value.section),
            title: string_of(value.title),
            subtitle: string_of(value.subtitle),
            finding_note_names: value_of(
                value
                    .finding_note_names
                    .map(|names| names.into_iter().map(|name| string_of(Some(name))).collect()),
            ),
            requires_configuration: value_of(value.requires_configuration),
            badge_text: string_of(value.badge_text),
            badge_image: string_of(value.badge_image),
            elements: blocks_of(value.elements, |element: ApiCardElement| CardElementState {
                kind: string_of(element.kind),
                text: string_of(element.text),
                default_time_range: string_of(element.default_time_range),
            }),
        }
    }
}

impl<'a> CardState<'a> {
    fn to_api(&self) -> ApiCard {
        ApiCard {
            section: owned(&self.section),
            title: owned(&self.title),
            subtitle: owned(&self.subtitle),
            finding_note_names: owned_list(&self.finding_note_names),
            requires_configuration: self.requires_configuration.as_ref_option().copied(),
            badge_text: owned(&self.badge_text),
            badge_image: owned(&self.badge_image),
            elements: expand_list(&self.elements, |element| ApiCardElement {
                kind: owned(&element.kind),
                text: owned(&element.text),
                default_time_range: owned(&element.default_time_range),
            }),
        }
    }
}

impl<'a> From<ApiSection> for SectionState<'a> {
    fn from(value: ApiSection) -> Self {
        Self {
            title: string_of(value.title),
            image: string_of(value.image),
        }
    }
}

impl<'a> SectionState<'a> {
    fn to_api(&self) -> ApiSection {
        ApiSection {
            title: owned(&self.title),
            image: owned(&self.image),
        }
    }
}

fn related_url_attributes() -> HashMap<String, Attribute> {
    map! {
        "label" => optional(AttributeType::String, "Label of the URL"),
        "url" => optional(AttributeType::String, "The URL"),
    }
}

fn reporter_attributes() -> HashMap<String, Attribute> {
    map! {
        "id" => required(AttributeType::String, "Id of the reporter"),
        "title" => required(AttributeType::String, "Title of the reporter"),
        "url" => optional(AttributeType::String, "URL of the reporter"),
    }
}

fn next_step_attributes() -> HashMap<String, Attribute> {
    map! {
        "title" => optional(AttributeType::String, "Title of the remediation step"),
        "url" => optional(AttributeType::String, "URL detailing the remediation step"),
    }
}

fn finding_attributes() -> HashMap<String, Attribute> {
    map! {
        "severity" => optional(AttributeType::String, "Severity of the finding: LOW, MEDIUM, HIGH or CRITICAL"),
    }
}

fn kpi_attributes() -> HashMap<String, Attribute> {
    map! {
        "aggregation_type" => required(AttributeType::String, "Aggregation type of the KPI values: SUM"),
    }
}

fn card_attributes() -> HashMap<String, Attribute> {
    map! {
        "section" => required(AttributeType::String, "Section the card belongs to"),
        "title" => required(AttributeType::String, "Title of the card"),
        "subtitle" => required(AttributeType::String, "Subtitle of the card"),
        "finding_note_names" => required(
            AttributeType::List(AttributeType::String.into()),
            "Names of the finding notes associated with the card",
        ),
        "requires_configuration" => optional(AttributeType::Bool, "Whether the card needs to be configured"),
        "badge_text" => optional(AttributeType::String, "Text of the badge"),
        "badge_image" => optional(AttributeType::String, "Image of the badge"),
    }
}

fn card_element_attributes() -> HashMap<String, Attribute> {
    map! {
        "kind" => required(AttributeType::String, "Kind of element: NUMERIC, BREAKDOWN or TIME_SERIES"),
        "text" => required(AttributeType::String, "Text of the element"),
        "default_time_range" => optional(AttributeType::String, "Default time range of the element"),
    }
}

fn section_attributes() -> HashMap<String, Attribute> {
    map! {
        "title" => required(AttributeType::String, "Title of the section"),
        "image" => required(AttributeType::String, "Image of the section"),
    }
}

fn nested(attributes: HashMap<String, Attribute>, description: &str) -> Block {
    Block {
        attributes,
        description: Description::plain(description),
        ..Default::default()
    }
}

impl<'a> WithSchema for NoteState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => computed(AttributeType::String, "Id of the note: <provider_id>/<note_id>"),
                    "account_id" => optional_computed(AttributeType::String, "Account owning the note (defaults to the provider account)"),
                    "provider_id" => required(AttributeType::String, "Id of the findings provider"),
                    "note_id" => required(AttributeType::String, "Id of the note"),
                    "short_description" => required(AttributeType::String, "One sentence description of the note"),
                    "long_description" => required(AttributeType::String, "Detailed description of the note"),
                    "kind" => required(AttributeType::String, "Kind of note: FINDING, KPI, CARD, CARD_CONFIGURED or SECTION"),
                    "shared" => optional_computed(AttributeType::Bool, "Whether the note is shared (defaults to true)"),
                    "create_time" => computed(AttributeType::String, "Creation time of the note"),
                    "update_time" => computed(AttributeType::String, "Last update time of the note"),
                },
                blocks: map! {
                    "related_url" => NestedBlock::List(nested(related_url_attributes(), "URLs related to the note")),
                    "reporter" => NestedBlock::Optional(nested(reporter_attributes(), "Entity that reported the note")),
                    "finding" => NestedBlock::Optional(Block {
                        blocks: map! {
                            "next_steps" => NestedBlock::List(nested(next_step_attributes(), "Steps to remediate the finding")),
                        },
                        ..nested(finding_attributes(), "Details of a FINDING note")
                    }),
                    "kpi" => NestedBlock::Optional(nested(kpi_attributes(), "Details of a KPI note")),
                    "card" => NestedBlock::Optional(Block {
                        blocks: map! {
                            "elements" => NestedBlock::List(nested(card_element_attributes(), "Elements of the card")),
                        },
                        ..nested(card_attributes(), "Details of a CARD or CARD_CONFIGURED note")
                    }),
                    "section" => NestedBlock::Optional(nested(section_attributes(), "Details of a SECTION note")),
                },
                description: Description::plain("Note of the Security and Compliance Center findings API"),
                deprecated: false,
            },
        }
    }
}

/// Attributes of a note, all computed, nested blocks as object lists
pub(super) fn computed_note_attributes() -> HashMap<String, Attribute> {
    let mut finding = all_computed(finding_attributes());
    finding.insert(
        "next_steps".to_owned(),
        computed_blocks(&next_step_attributes(), "Steps to remediate the finding"),
    );
    let mut card = all_computed(card_attributes());
    card.insert(
        "elements".to_owned(),
        computed_blocks(&card_element_attributes(), "Elements of the card"),
    );

    let mut attributes = all_computed(
        NoteState::schema().block.attributes,
    );
    let extra: HashMap<String, Attribute> = map! {
        "related_url" => computed_blocks(&related_url_attributes(), "URLs related to the note"),
        "reporter" => computed_blocks(&reporter_attributes(), "Entity that reported the note"),
        "finding" => computed_blocks(&finding, "Details of a FINDING note"),
        "kpi" => computed_blocks(&kpi_attributes(), "Details of a KPI note"),
        "card" => computed_blocks(&card, "Details of a CARD or CARD_CONFIGURED note"),
        "section" => computed_blocks(&section_attributes(), "Details of a SECTION note"),
    };
    attributes.extend(extra);
    attributes
}

/// Schema of the single note data source
pub(super) fn data_source_schema() -> Schema {
    let mut attributes = computed_note_attributes();
    let extra: HashMap<String, Attribute> = map! {
        "account_id" => optional_computed(AttributeType::String, "Account owning the note (defaults to the provider account)"),
        "provider_id" => required(AttributeType::String, "Id of the findings provider"),
        "note_id" => required(AttributeType::String, "Id of the note"),
    };
    attributes.extend(extra);
    Schema {
        version: 1,
        block: Block {
            version: 1,
            attributes,
            description: Description::plain("Read a note of the Security and Compliance Center findings API"),
            ..Default::default()
        },
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;

    pub(crate) fn finding_note<'a>(provider_id: &'a str, note_id: &'a str) -> NoteState<'a> {
        NoteState {
            provider_id: Value::Value(Cow::Borrowed(provider_id)),
            note_id: Value::Value(Cow::Borrowed(note_id)),
            short_description: Value::Value(Cow::Borrowed("Short")),
            long_description: Value::Value(Cow::Borrowed("A longer description")),
            kind: Value::Value(Cow::Borrowed("FINDING")),
            reporter: Value::Value(ReporterState {
                id: Value::Value(Cow::Borrowed("rep-1")),
                title: Value::Value(Cow::Borrowed("Scanner")),
                url: Value::Null,
            }),
            finding: Value::Value(FindingState {
                severity: Value::Value(Cow::Borrowed("HIGH")),
                next_steps: Value::Value(vec![Value::Value(RemediationStepState {
                    title: Value::Value(Cow::Borrowed("Patch")),
                    url: Value::Null,
                })]),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn details_follow_kind() {
        let mut note = finding_note("p1", "n1");
        assert!(matches!(note.details(), Ok(Some(NoteDetails::Finding(_)))));

        note.kpi = Value::Value(KpiState::default());
        assert_eq!(note.details().unwrap_err().attribute(), "kpi");

        note.kind = Value::Value(Cow::Borrowed("KPI"));
        note.finding = Value::Null;
        assert!(matches!(note.details(), Ok(Some(NoteDetails::Kpi(_)))));

        note.kind = Value::Value(Cow::Borrowed("CARD_CONFIGURED"));
        note.kpi = Value::Null;
        assert!(matches!(
            note.details(),
            Err(DetailsError::Missing { block: "card", .. })
        ));

        note.kind = Value::Value(Cow::Borrowed("OTHER"));
        assert_eq!(note.details().unwrap_err().attribute(), "kind");

        note.kind = Value::Unknown;
        assert_eq!(note.details(), Ok(None));
    }

    #[test]
    fn expand_then_flatten_keeps_fields() {
        let note = finding_note("p1", "n1");
        let api = note.to_api().unwrap();
        assert_eq!(api.id.as_deref(), Some("n1"));
        assert!(api.kpi.is_none());

        let flattened = NoteState::from_api(crate::testing::ACCOUNT_ID, "p1", api).unwrap();
        assert_eq!(flattened.id.as_str(), "p1/n1");
        assert_eq!(flattened.short_description, note.short_description);
        assert_eq!(flattened.long_description, note.long_description);
        assert_eq!(flattened.kind, note.kind);
        assert_eq!(flattened.reporter, note.reporter);
        assert_eq!(flattened.finding, note.finding);
    }

    #[test]
    fn absent_fields_stay_null() {
        let api = ApiNote {
            id: Some("n1".to_owned()),
            kind: Some("SECTION".to_owned()),
            section: Some(ApiSection {
                title: Some("Overview".to_owned()),
                image: None,
            }),
            ..Default::default()
        };
        let note = NoteState::from_api("acc", "p1", api).unwrap();
        assert!(note.long_description.is_null());
        assert!(note.reporter.is_null());
        assert!(note.related_url.is_null());
        assert!(note.finding.is_null());
        assert!(note.shared.is_null());
        let Value::Value(section) = &note.section else {
            panic!("section should be set");
        };
        assert!(section.image.is_null());
    }

    #[test]
    fn missing_note_id_is_a_mapping_error() {
        let err = NoteState::from_api("acc", "p1", ApiNote::default()).unwrap_err();
        assert_eq!(err.field, "id");
    }

    #[test]
    fn data_source_nests_blocks_as_attributes() {
        let schema = data_source_schema();
        assert!(schema.block.blocks.is_empty());
        assert!(schema.block.attributes.contains_key("reporter"));
        assert!(schema.block.attributes.contains_key("finding"));
    }
}
