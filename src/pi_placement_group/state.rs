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

use tf_provider::{
    map, Attribute, AttributePath, AttributeType, Block, Description, Diagnostics, Schema, Value,
    ValueList, ValueString,
};

use crate::api::power::{ApiPlacementGroup, ApiPlacementGroupCreate};
use crate::id::join_id;
use crate::utils::{
    computed, computed_blocks, owned, require, required, string_of, validate_not_empty,
    validate_one_of, value_of, MappingError, WithSchema, WithValidate,
};

pub(super) const ID_PARTS: [&str; 2] = ["pi_cloud_instance_id", "placement_group_id"];
pub(super) const POLICIES: [&str; 2] = ["affinity", "anti-affinity"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlacementGroupState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub pi_cloud_instance_id: ValueString<'a>,
    pub pi_placement_group_name: ValueString<'a>,
    pub pi_placement_group_policy: ValueString<'a>,
    pub placement_group_id: ValueString<'a>,
    pub members: ValueList<ValueString<'a>>,
    pub crn: ValueString<'a>,
    pub user_tags: ValueList<ValueString<'a>>,
}

pub(super) fn strings_of<'a>(values: Option<Vec<String>>) -> ValueList<ValueString<'a>> {
    value_of(values.map(|values| {
        values
            .into_iter()
            .map(|value| string_of(Some(value)))
            .collect()
    }))
}

impl<'a> PlacementGroupState<'a> {
    /// `user_tags` are not part of the group and stay null
    pub fn from_api(cloud_instance_id: &str, group: ApiPlacementGroup) -> Result<Self, MappingError> {
        let group_id = require(group.id, "id")?;
        Ok(Self {
            id: Value::Value(Cow::Owned(join_id(&[cloud_instance_id, &group_id]))),
            pi_cloud_instance_id: Value::Value(Cow::Owned(cloud_instance_id.to_owned())),
            pi_placement_group_name: string_of(group.name),
            pi_placement_group_policy: string_of(group.policy),
            placement_group_id: Value::Value(Cow::Owned(group_id)),
            members: strings_of(group.members),
            crn: string_of(group.crn),
            user_tags: Value::Null,
        })
    }

    pub fn to_api(&self) -> Result<ApiPlacementGroupCreate, MappingError> {
        Ok(ApiPlacementGroupCreate {
            name: require(owned(&self.pi_placement_group_name), "pi_placement_group_name")?,
            policy: require(owned(&self.pi_placement_group_policy), "pi_placement_group_policy")?,
        })
    }
}

impl<'a> WithSchema for PlacementGroupState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => computed(AttributeType::String, "Id of the placement group: <pi_cloud_instance_id>/<placement_group_id>"),
                    "pi_cloud_instance_id" => required(AttributeType::String, "Id of the Power Systems workspace"),
                    "pi_placement_group_name" => required(AttributeType::String, "Name of the placement group"),
                    "pi_placement_group_policy" => required(AttributeType::String, "Policy of the placement group: affinity or anti-affinity"),
                    "placement_group_id" => computed(AttributeType::String, "Id of the placement group in the workspace"),
                    "members" => computed(AttributeType::List(AttributeType::String.into()), "Ids of the instances in the placement group"),
                    "crn" => computed(AttributeType::String, "CRN of the placement group"),
                    "user_tags" => computed(AttributeType::Set(AttributeType::String.into()), "User tags attached to the placement group"),
                },
                description: Description::plain("Power Systems placement group"),
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for PlacementGroupState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        validate_not_empty(
            diags,
            &self.pi_cloud_instance_id,
            attr_path.clone().attribute("pi_cloud_instance_id"),
        );
        validate_not_empty(
            diags,
            &self.pi_placement_group_name,
            attr_path.clone().attribute("pi_placement_group_name"),
        );
        validate_one_of(
            diags,
            &self.pi_placement_group_policy,
            &POLICIES,
            attr_path.attribute("pi_placement_group_policy"),
        );
    }
}

/// The data source looks a group up by name, everything else is computed
pub(super) fn data_source_schema() -> Schema {
    let mut schema = PlacementGroupState::schema();
    schema.block.attributes.insert(
        "pi_placement_group_policy".to_owned(),
        computed(AttributeType::String, "Policy of the placement group"),
    );
    schema.block.description = Description::plain("Read a Power Systems placement group");
    schema
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlacementGroupItem<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub policy: ValueString<'a>,
    pub members: ValueList<ValueString<'a>>,
    pub crn: ValueString<'a>,
}

impl<'a> From<ApiPlacementGroup> for PlacementGroupItem<'a> {
    fn from(group: ApiPlacementGroup) -> Self {
        Self {
            id: string_of(group.id),
            name: string_of(group.name),
            policy: string_of(group.policy),
            members: strings_of(group.members),
            crn: string_of(group.crn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlacementGroupsState<'a> {
    #[serde(borrow = "'a")]
    pub pi_cloud_instance_id: ValueString<'a>,
    pub placement_groups: ValueList<Value<PlacementGroupItem<'a>>>,
}

fn item_attributes() -> HashMap<String, Attribute> {
    map! {
        "id" => computed(AttributeType::String, "Id of the placement group"),
        "name" => computed(AttributeType::String, "Name of the placement group"),
        "policy" => computed(AttributeType::String, "Policy of the placement group"),
        "members" => computed(AttributeType::List(AttributeType::String.into()), "Ids of the instances in the placement group"),
        "crn" => computed(AttributeType::String, "CRN of the placement group"),
    }
}

impl<'a> WithSchema for PlacementGroupsState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "pi_cloud_instance_id" => required(AttributeType::String, "Id of the Power Systems workspace"),
                    "placement_groups" => computed_blocks(&item_attributes(), "Placement groups of the workspace"),
                },
                description: Description::plain("List the placement groups of a Power Systems workspace"),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_group() {
        let group = ApiPlacementGroup {
            id: Some("pg-1".to_owned()),
            name: Some("web".to_owned()),
            policy: Some("anti-affinity".to_owned()),
            crn: Some("crn:v1:bluemix:public:power-iaas:dal12:a/acc:cloud-1:placement-group:pg-1".to_owned()),
            members: None,
        };
        let state = PlacementGroupState::from_api("cloud-1", group).unwrap();
        assert_eq!(state.id.as_str(), "cloud-1/pg-1");
        assert_eq!(state.placement_group_id.as_str(), "pg-1");
        assert!(state.members.is_null());
        assert!(state.crn.as_str().ends_with(":placement-group:pg-1"));
        assert!(state.user_tags.is_null());

        let body = state.to_api().unwrap();
        assert_eq!(body.name, "web");
        assert_eq!(body.policy, "anti-affinity");
    }

    #[test]
    fn policy_is_validated() {
        let state = PlacementGroupState {
            pi_cloud_instance_id: Value::Value(Cow::Borrowed("cloud-1")),
            pi_placement_group_name: Value::Value(Cow::Borrowed("web")),
            pi_placement_group_policy: Value::Value(Cow::Borrowed("spread")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        state.validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 1);
    }
}
