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
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::RangeInclusive;

use thiserror::Error;
use tf_provider::{
    Attribute, AttributeConstraint, AttributePath, AttributeType, Description, Diagnostics,
    Schema, Value, ValueList, ValueNumber, ValueString,
};

use crate::api::ApiResult;

pub(crate) trait WithSchema {
    fn schema() -> Schema;
}

pub(crate) trait WithValidate {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath);
}

/// Turn errors into diagnostics, logging the original error
pub(crate) trait ReportResult<T> {
    fn or_report(self, diags: &mut Diagnostics, summary: &'static str) -> Option<T>;
    fn or_report_at(self, diags: &mut Diagnostics, summary: &'static str, attr_path: AttributePath)
        -> Option<T>;
}

impl<T, E: Display> ReportResult<T> for Result<T, E> {
    fn or_report(self, diags: &mut Diagnostics, summary: &'static str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(error = %err, "{summary}");
                diags.root_error(summary, err.to_string());
                None
            }
        }
    }

    fn or_report_at(
        self,
        diags: &mut Diagnostics,
        summary: &'static str,
        attr_path: AttributePath,
    ) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(error = %err, "{summary}");
                diags.error(summary, err.to_string(), attr_path);
                None
            }
        }
    }
}

/// Like `or_report`, except a missing remote object is not an error: it
/// yields `Some(None)`
pub(crate) trait ReportMissing<T> {
    fn or_report_missing(self, diags: &mut Diagnostics, summary: &'static str) -> Option<Option<T>>;
}

impl<T> ReportMissing<T> for ApiResult<T> {
    fn or_report_missing(self, diags: &mut Diagnostics, summary: &'static str) -> Option<Option<T>> {
        match self {
            Ok(value) => Some(Some(value)),
            Err(err) if err.is_not_found() => {
                tracing::debug!(error = %err, "{summary}: not found");
                Some(None)
            }
            Err(err) => Err::<T, _>(err).or_report(diags, summary).map(Some),
        }
    }
}

pub(crate) trait IntoKnown<T> {
    /// Unwrap a whole state, reporting null or unknown ones
    fn into_known(self, diags: &mut Diagnostics) -> Option<T>;
}

impl<T> IntoKnown<T> for Value<T> {
    fn into_known(self, diags: &mut Diagnostics) -> Option<T> {
        match self {
            Value::Value(value) => Some(value),
            Value::Null => {
                diags.root_error_short("Unexpected null state");
                None
            }
            Value::Unknown => {
                diags.root_error_short("Unexpected unknown state");
                None
            }
        }
    }
}

/// A value the provider relies on is missing from an API response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing `{field}` in the API response")]
pub struct MappingError {
    pub field: &'static str,
}

pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T, MappingError> {
    value.ok_or(MappingError { field })
}

/// Request a replacement when an immutable attribute changes
pub(crate) fn force_new<T: PartialEq>(
    triggers: &mut Vec<AttributePath>,
    name: &'static str,
    prior: &Value<T>,
    proposed: &Value<T>,
) {
    if prior != proposed {
        triggers.push(AttributePath::new(name));
    }
}

/// Absent remote values stay null
pub(crate) fn value_of<T>(value: Option<T>) -> Value<T> {
    value.map_or(Value::Null, Value::Value)
}

pub(crate) fn string_of<'a>(value: Option<String>) -> ValueString<'a> {
    value_of(value.map(Cow::Owned))
}

pub(crate) fn list_of<T, U>(values: Option<Vec<T>>, f: impl FnMut(T) -> U) -> ValueList<U> {
    value_of(values.map(|values| values.into_iter().map(f).collect()))
}

/// Expand a list of nested blocks, skipping null or unknown elements
pub(crate) fn expand_list<T, U>(values: &ValueList<Value<T>>, f: impl FnMut(&T) -> U) -> Option<Vec<U>> {
    values
        .as_ref_option()
        .map(|values| values.iter().filter_map(Value::as_ref_option).map(f).collect())
}

/// Flatten a list of remote objects into nested blocks
pub(crate) fn blocks_of<T, U>(values: Option<Vec<T>>, mut f: impl FnMut(T) -> U) -> ValueList<Value<U>> {
    list_of(values, |value| Value::Value(f(value)))
}

pub(crate) fn owned(value: &ValueString) -> Option<String> {
    value.as_deref_option().map(str::to_owned)
}

pub(crate) fn owned_list<'a>(values: &ValueList<ValueString<'a>>) -> Option<Vec<String>> {
    values
        .as_ref_option()
        .map(|values| values.iter().filter_map(owned).collect())
}

pub(crate) fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

pub(crate) fn required(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Required, description)
}

pub(crate) fn optional(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Optional, description)
}

pub(crate) fn optional_computed(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::OptionalComputed, description)
}

pub(crate) fn computed(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Computed, description)
}

/// Object type matching a set of attributes, for computed nested values
pub(crate) fn object_of(attributes: &HashMap<String, Attribute>) -> AttributeType {
    AttributeType::Object(
        attributes
            .iter()
            .map(|(name, attribute)| (name.clone(), attribute.attr_type.clone()))
            .collect(),
    )
}

/// Computed list of objects, used by data sources in place of nested blocks
pub(crate) fn computed_blocks(attributes: &HashMap<String, Attribute>, description: &str) -> Attribute {
    computed(AttributeType::List(object_of(attributes).into()), description)
}

/// Same attributes, all computed
pub(crate) fn all_computed(attributes: HashMap<String, Attribute>) -> HashMap<String, Attribute> {
    attributes
        .into_iter()
        .map(|(name, attribute)| {
            (
                name,
                Attribute {
                    constraint: AttributeConstraint::Computed,
                    ..attribute
                },
            )
        })
        .collect()
}

pub(crate) fn validate_one_of(
    diags: &mut Diagnostics,
    value: &ValueString,
    allowed: &[&str],
    attr_path: AttributePath,
) {
    if let Value::Value(value) = value {
        let value: &str = value;
        if !allowed.contains(&value) {
            diags.error(
                "Invalid value",
                format!(
                    "`{value}` is not one of: {}",
                    allowed.iter().join_with(", ")
                ),
                attr_path,
            );
        }
    }
}

pub(crate) fn validate_number_in(
    diags: &mut Diagnostics,
    value: &ValueNumber,
    allowed: &[i64],
    attr_path: AttributePath,
) {
    if let Value::Value(value) = value {
        if !allowed.contains(value) {
            diags.error(
                "Invalid value",
                format!(
                    "`{value}` is not one of: {}",
                    allowed.iter().join_with(", ")
                ),
                attr_path,
            );
        }
    }
}

pub(crate) fn validate_range(
    diags: &mut Diagnostics,
    value: &ValueNumber,
    range: RangeInclusive<i64>,
    attr_path: AttributePath,
) {
    if let Value::Value(value) = value {
        if !range.contains(value) {
            diags.error(
                "Value out of range",
                format!(
                    "`{value}` must be between {} and {}",
                    range.start(),
                    range.end()
                ),
                attr_path,
            );
        }
    }
}

pub(crate) fn validate_not_empty(diags: &mut Diagnostics, value: &ValueString, attr_path: AttributePath) {
    if let Value::Value(value) = value {
        if value.trim().is_empty() {
            diags.error_short("Value must not be empty", attr_path);
        }
    }
}

pub struct DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    iter: RefCell<T>,
    sep: &'a str,
}

pub trait DisplayJoinable {
    type Joiner<'a>;
    fn join_with(self, sep: &str) -> Self::Joiner<'_>;
}

impl<T, I> DisplayJoinable for T
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    type Joiner<'a> = DisplayJoiner<'a, T, I>;

    fn join_with(self, sep: &str) -> Self::Joiner<'_> {
        DisplayJoiner {
            iter: RefCell::new(self),
            sep,
        }
    }
}

impl<'a, T, I> std::fmt::Display for DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        let mut iter = self.iter.try_borrow_mut().or(Err(std::fmt::Error))?;
        for elt in iter.by_ref() {
            f.write_str(sep)?;
            f.write_fmt(format_args!("{elt}"))?;
            sep = self.sep;
        }
        Ok(())
    }
}
