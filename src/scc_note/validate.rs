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

use tf_provider::{AttributePath, Diagnostics, Value};

use crate::utils::{validate_not_empty, validate_one_of, WithValidate};

use super::state::{
    DetailsError, NoteState, AGGREGATION_TYPES, ELEMENT_KINDS, KINDS, SEVERITIES,
};

impl<'a> WithValidate for NoteState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        validate_not_empty(diags, &self.provider_id, attr_path.clone().attribute("provider_id"));
        validate_not_empty(diags, &self.note_id, attr_path.clone().attribute("note_id"));
        validate_one_of(diags, &self.kind, &KINDS, attr_path.clone().attribute("kind"));

        if self.reporter.is_null() {
            diags.error_short(
                "A `reporter` block is required",
                attr_path.clone().attribute("reporter"),
            );
        }

        if let Value::Value(finding) = &self.finding {
            validate_one_of(
                diags,
                &finding.severity,
                &SEVERITIES,
                attr_path.clone().attribute("finding").index(0).attribute("severity"),
            );
        }
        if let Value::Value(kpi) = &self.kpi {
            validate_one_of(
                diags,
                &kpi.aggregation_type,
                &AGGREGATION_TYPES,
                attr_path.clone().attribute("kpi").index(0).attribute("aggregation_type"),
            );
        }
        if let Value::Value(card) = &self.card {
            for (i, element) in card.elements.iter().flatten().enumerate() {
                if let Value::Value(element) = element {
                    validate_one_of(
                        diags,
                        &element.kind,
                        &ELEMENT_KINDS,
                        attr_path
                            .clone()
                            .attribute("card")
                            .index(0)
                            .attribute("elements")
                            .index(i as i64)
                            .attribute("kind"),
                    );
                }
            }
        }

        match self.details() {
            // already reported on `kind`
            Ok(_) | Err(DetailsError::UnknownKind(_)) => (),
            Err(err) => diags.error(
                "Invalid note details",
                err.to_string(),
                attr_path.attribute(err.attribute()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::super::state::tests::finding_note;
    use super::super::state::KpiState;
    use super::*;

    #[test]
    fn valid_finding_note() {
        let mut diags = Diagnostics::default();
        finding_note("p1", "n1").validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut note = finding_note("p1", "");
        note.kind = Value::Value(Cow::Borrowed("ALERT"));
        note.reporter = Value::Null;

        let mut diags = Diagnostics::default();
        note.validate(&mut diags, AttributePath::default());
        // note_id, kind, reporter
        assert_eq!(diags.errors.len(), 3);
    }

    #[test]
    fn details_must_match_kind() {
        let mut note = finding_note("p1", "n1");
        note.kpi = Value::Value(KpiState {
            aggregation_type: Value::Value(Cow::Borrowed("SUM")),
        });

        let mut diags = Diagnostics::default();
        note.validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 1);
    }
}
