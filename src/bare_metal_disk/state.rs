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
    map, value, Attribute, AttributePath, AttributeType, Block, Description, Diagnostics, Schema,
    Value, ValueList, ValueNumber, ValueString,
};

use crate::api::vpc::{ApiBareMetalServerDisk, ApiDiskAllowedUse};
use crate::id::join_id;
use crate::utils::{
    all_computed, computed, computed_blocks, optional_computed, require, required, string_of,
    validate_not_empty, value_of, MappingError, WithSchema, WithValidate,
};

pub(super) const ID_PARTS: [&str; 2] = ["bare_metal_server", "disk"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiskState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub bare_metal_server: ValueString<'a>,
    pub disk: ValueString<'a>,
    pub name: ValueString<'a>,
    pub href: ValueString<'a>,
    pub size: ValueNumber,
    pub interface_type: ValueString<'a>,
    pub resource_type: ValueString<'a>,
    pub created_at: ValueString<'a>,
    #[serde(with = "value::serde_as_vec")]
    pub allowed_use: Value<AllowedUseState<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AllowedUseState<'a> {
    #[serde(borrow = "'a")]
    pub api_version: ValueString<'a>,
    pub bare_metal_server: ValueString<'a>,
    pub instance: ValueString<'a>,
}

impl<'a> From<ApiDiskAllowedUse> for AllowedUseState<'a> {
    fn from(allowed_use: ApiDiskAllowedUse) -> Self {
        Self {
            api_version: string_of(allowed_use.api_version),
            bare_metal_server: string_of(allowed_use.bare_metal_server),
            instance: string_of(allowed_use.instance),
        }
    }
}

impl<'a> DiskState<'a> {
    pub fn from_api(bare_metal_server: &str, disk: ApiBareMetalServerDisk) -> Result<Self, MappingError> {
        let disk_id = require(disk.id, "id")?;
        Ok(Self {
            id: Value::Value(Cow::Owned(join_id(&[bare_metal_server, &disk_id]))),
            bare_metal_server: Value::Value(Cow::Owned(bare_metal_server.to_owned())),
            disk: Value::Value(Cow::Owned(disk_id)),
            name: string_of(disk.name),
            href: string_of(disk.href),
            size: value_of(disk.size),
            interface_type: string_of(disk.interface_type),
            resource_type: string_of(disk.resource_type),
            created_at: string_of(disk.created_at),
            allowed_use: value_of(disk.allowed_use.map(AllowedUseState::from)),
        })
    }
}

fn allowed_use_attributes() -> HashMap<String, Attribute> {
    map! {
        "api_version" => computed(AttributeType::String, "API version with which to evaluate the expressions"),
        "bare_metal_server" => computed(AttributeType::String, "Expression restricting the bare metal server images that can use the disk"),
        "instance" => computed(AttributeType::String, "Expression restricting the instance images that can use the disk"),
    }
}

impl<'a> WithSchema for DiskState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => computed(AttributeType::String, "Id of the disk: <bare_metal_server>/<disk>"),
                    "bare_metal_server" => required(AttributeType::String, "Id of the bare metal server"),
                    "disk" => required(AttributeType::String, "Id of the disk"),
                    "name" => optional_computed(AttributeType::String, "Name of the disk"),
                    "href" => computed(AttributeType::String, "URL of the disk"),
                    "size" => computed(AttributeType::Number, "Size of the disk in GB"),
                    "interface_type" => computed(AttributeType::String, "Disk interface used to attach the disk"),
                    "resource_type" => computed(AttributeType::String, "Resource type"),
                    "created_at" => computed(AttributeType::String, "Creation date of the disk"),
                    "allowed_use" => computed_blocks(&allowed_use_attributes(), "Usage constraints of the disk"),
                },
                description: Description::plain("Disk of a VPC bare metal server. Disks cannot be created or deleted: the resource only manages their name"),
                ..Default::default()
            },
        }
    }
}

/// Disk names: lowercase letters, digits and dashes, starting with a letter
/// and not ending with a dash
pub(super) fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= 63
                && first.is_ascii_lowercase()
                && *last != b'-'
                && bytes
                    .iter()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == b'-')
        }
        _ => false,
    }
}

impl<'a> WithValidate for DiskState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        validate_not_empty(
            diags,
            &self.bare_metal_server,
            attr_path.clone().attribute("bare_metal_server"),
        );
        validate_not_empty(diags, &self.disk, attr_path.clone().attribute("disk"));
        if let Value::Value(name) = &self.name {
            if !is_valid_name(name) {
                diags.error(
                    "Invalid disk name",
                    format!("`{name}` must be 1 to 63 lowercase letters, digits or dashes, start with a letter and not end with a dash"),
                    attr_path.attribute("name"),
                );
            }
        }
    }
}

/// Everything but the disk coordinates is computed
pub(super) fn data_source_schema() -> Schema {
    let mut schema = DiskState::schema();
    schema.block.attributes.insert(
        "name".to_owned(),
        computed(AttributeType::String, "Name of the disk"),
    );
    schema.block.description = Description::plain("Read a disk of a VPC bare metal server");
    schema
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DisksState<'a> {
    #[serde(borrow = "'a")]
    pub bare_metal_server: ValueString<'a>,
    pub disks: ValueList<Value<DiskState<'a>>>,
}

impl<'a> WithSchema for DisksState<'a> {
    fn schema() -> Schema {
        let disk = all_computed(DiskState::schema().block.attributes);
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "bare_metal_server" => required(AttributeType::String, "Id of the bare metal server"),
                    "disks" => computed_blocks(&disk, "Disks of the bare metal server"),
                },
                description: Description::plain("List the disks of a VPC bare metal server"),
                ..Default::default()
            },
        }
    }
}
