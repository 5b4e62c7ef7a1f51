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
    map, value, Attribute, AttributeType, Block, Description, Schema, Value, ValueList,
    ValueNumber, ValueString,
};

use crate::api::vpc::{
    ApiDeleted, ApiIkePolicy, ApiIkePolicyPatch, ApiIkePolicyPrototype,
    ApiResourceGroupIdentity, ApiResourceGroupReference, ApiVpnConnectionReference,
};
use crate::utils::{
    blocks_of, computed, computed_blocks, optional, optional_computed, owned,
    require, required, string_of, value_of, MappingError, WithSchema,
};

pub(super) const AUTHENTICATION_ALGORITHMS: [&str; 3] = ["sha256", "sha384", "sha512"];
pub(super) const ENCRYPTION_ALGORITHMS: [&str; 3] = ["aes128", "aes192", "aes256"];
pub(super) const DH_GROUPS: [i64; 12] = [14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 31];
pub(super) const IKE_VERSIONS: [i64; 2] = [1, 2];
pub(super) const KEY_LIFETIMES: std::ops::RangeInclusive<i64> = 1800..=86400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IkePolicyState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub authentication_algorithm: ValueString<'a>,
    pub encryption_algorithm: ValueString<'a>,
    pub dh_group: ValueNumber,
    pub ike_version: ValueNumber,
    pub key_lifetime: ValueNumber,
    pub resource_group: ValueString<'a>,
    pub href: ValueString<'a>,
    pub negotiation_mode: ValueString<'a>,
    pub resource_type: ValueString<'a>,
    pub created_at: ValueString<'a>,
    pub vpn_connections: ValueList<Value<VpnConnectionState<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VpnConnectionState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub href: ValueString<'a>,
    pub name: ValueString<'a>,
    pub resource_type: ValueString<'a>,
    #[serde(with = "value::serde_as_vec")]
    pub deleted: Value<DeletedState<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeletedState<'a> {
    #[serde(borrow = "'a")]
    pub more_info: ValueString<'a>,
}

impl<'a> From<ApiDeleted> for DeletedState<'a> {
    fn from(deleted: ApiDeleted) -> Self {
        Self {
            more_info: string_of(deleted.more_info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResourceGroupState<'a> {
    #[serde(borrow = "'a")]
    pub href: ValueString<'a>,
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
}

impl<'a> From<ApiResourceGroupReference> for ResourceGroupState<'a> {
    fn from(group: ApiResourceGroupReference) -> Self {
        Self {
            href: string_of(group.href),
            id: string_of(group.id),
            name: string_of(group.name),
        }
    }
}

impl<'a> From<ApiVpnConnectionReference> for VpnConnectionState<'a> {
    fn from(connection: ApiVpnConnectionReference) -> Self {
        Self {
            deleted: value_of(connection.deleted.map(DeletedState::from)),
            id: string_of(connection.id),
            href: string_of(connection.href),
            name: string_of(connection.name),
            resource_type: string_of(connection.resource_type),
        }
    }
}

impl<'a> IkePolicyState<'a> {
    /// Connections are left null when the response does not list them
    pub fn from_api(policy: ApiIkePolicy) -> Result<Self, MappingError> {
        Ok(Self {
            id: Value::Value(Cow::Owned(require(policy.id, "id")?)),
            name: string_of(policy.name),
            authentication_algorithm: string_of(policy.authentication_algorithm),
            encryption_algorithm: string_of(policy.encryption_algorithm),
            dh_group: value_of(policy.dh_group),
            ike_version: value_of(policy.ike_version),
            key_lifetime: value_of(policy.key_lifetime),
            resource_group: string_of(policy.resource_group.and_then(|group| group.id)),
            href: string_of(policy.href),
            negotiation_mode: string_of(policy.negotiation_mode),
            resource_type: string_of(policy.resource_type),
            created_at: string_of(policy.created_at),
            vpn_connections: blocks_of(policy.connections, VpnConnectionState::from),
        })
    }

    pub fn to_api(&self) -> Result<ApiIkePolicyPrototype, MappingError> {
        Ok(ApiIkePolicyPrototype {
            name: require(owned(&self.name), "name")?,
            authentication_algorithm: require(
                owned(&self.authentication_algorithm),
                "authentication_algorithm",
            )?,
            encryption_algorithm: require(owned(&self.encryption_algorithm), "encryption_algorithm")?,
            dh_group: require(self.dh_group.as_ref_option().copied(), "dh_group")?,
            ike_version: self.ike_version.as_ref_option().copied(),
            key_lifetime: self.key_lifetime.as_ref_option().copied(),
            resource_group: owned(&self.resource_group).map(|id| ApiResourceGroupIdentity { id }),
        })
    }

    /// Patch turning `prior` into `self`: only the known, modified fields
    pub fn patch_from(&self, prior: &IkePolicyState) -> ApiIkePolicyPatch {
        fn changed<T: PartialEq + Clone>(prior: &Value<T>, planned: &Value<T>) -> Option<T> {
            match planned {
                Value::Value(planned) if prior.as_ref_option() != Some(planned) => {
                    Some(planned.clone())
                }
                _ => None,
            }
        }
        ApiIkePolicyPatch {
            name: changed(&prior.name, &self.name).map(Cow::into_owned),
            authentication_algorithm: changed(
                &prior.authentication_algorithm,
                &self.authentication_algorithm,
            )
            .map(Cow::into_owned),
            encryption_algorithm: changed(&prior.encryption_algorithm, &self.encryption_algorithm)
                .map(Cow::into_owned),
            dh_group: changed(&prior.dh_group, &self.dh_group),
            ike_version: changed(&prior.ike_version, &self.ike_version),
            key_lifetime: changed(&prior.key_lifetime, &self.key_lifetime),
        }
    }
}

fn deleted_attributes() -> HashMap<String, Attribute> {
    map! {
        "more_info" => computed(AttributeType::String, "Link to documentation about deleted resources"),
    }
}

fn resource_group_attributes() -> HashMap<String, Attribute> {
    map! {
        "href" => computed(AttributeType::String, "URL of the resource group"),
        "id" => computed(AttributeType::String, "Id of the resource group"),
        "name" => computed(AttributeType::String, "Name of the resource group"),
    }
}

pub(super) fn vpn_connection_attributes() -> HashMap<String, Attribute> {
    map! {
        "deleted" => computed_blocks(&deleted_attributes(), "Set when the connection has been deleted"),
        "id" => computed(AttributeType::String, "Id of the VPN gateway connection"),
        "href" => computed(AttributeType::String, "URL of the VPN gateway connection"),
        "name" => computed(AttributeType::String, "Name of the VPN gateway connection"),
        "resource_type" => computed(AttributeType::String, "Resource type"),
    }
}

impl<'a> WithSchema for IkePolicyState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => computed(AttributeType::String, "Id of the IKE policy"),
                    "name" => required(AttributeType::String, "Name of the IKE policy"),
                    "authentication_algorithm" => required(AttributeType::String, "Authentication algorithm: sha256, sha384 or sha512"),
                    "encryption_algorithm" => required(AttributeType::String, "Encryption algorithm: aes128, aes192 or aes256"),
                    "dh_group" => required(AttributeType::Number, "Diffie-Hellman group: 14 to 24, or 31"),
                    "ike_version" => optional_computed(AttributeType::Number, "IKE protocol version: 1 or 2"),
                    "key_lifetime" => optional_computed(AttributeType::Number, "Key lifetime in seconds, between 1800 and 86400"),
                    "resource_group" => optional_computed(AttributeType::String, "Id of the resource group (defaults to the account default group)"),
                    "href" => computed(AttributeType::String, "URL of the IKE policy"),
                    "negotiation_mode" => computed(AttributeType::String, "IKE negotiation mode"),
                    "resource_type" => computed(AttributeType::String, "Resource type"),
                    "created_at" => computed(AttributeType::String, "Creation date of the IKE policy"),
                    "vpn_connections" => computed_blocks(&vpn_connection_attributes(), "VPN gateway connections using the IKE policy"),
                },
                description: Description::plain("VPC VPN IKE policy"),
                ..Default::default()
            },
        }
    }
}

/// IKE policy as read by the data sources: the resource group is expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IkePolicyDetails<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub authentication_algorithm: ValueString<'a>,
    pub encryption_algorithm: ValueString<'a>,
    pub dh_group: ValueNumber,
    pub ike_version: ValueNumber,
    pub key_lifetime: ValueNumber,
    pub href: ValueString<'a>,
    pub negotiation_mode: ValueString<'a>,
    pub resource_type: ValueString<'a>,
    pub created_at: ValueString<'a>,
    #[serde(with = "value::serde_as_vec")]
    pub resource_group: Value<ResourceGroupState<'a>>,
    pub connections: ValueList<Value<VpnConnectionState<'a>>>,
}

impl<'a> IkePolicyDetails<'a> {
    pub fn from_api(policy: ApiIkePolicy) -> Result<Self, MappingError> {
        Ok(Self {
            id: Value::Value(Cow::Owned(require(policy.id, "id")?)),
            name: string_of(policy.name),
            authentication_algorithm: string_of(policy.authentication_algorithm),
            encryption_algorithm: string_of(policy.encryption_algorithm),
            dh_group: value_of(policy.dh_group),
            ike_version: value_of(policy.ike_version),
            key_lifetime: value_of(policy.key_lifetime),
            href: string_of(policy.href),
            negotiation_mode: string_of(policy.negotiation_mode),
            resource_type: string_of(policy.resource_type),
            created_at: string_of(policy.created_at),
            resource_group: value_of(policy.resource_group.map(ResourceGroupState::from)),
            connections: blocks_of(policy.connections, VpnConnectionState::from),
        })
    }
}

fn details_attributes() -> HashMap<String, Attribute> {
    map! {
        "id" => computed(AttributeType::String, "Id of the IKE policy"),
        "name" => computed(AttributeType::String, "Name of the IKE policy"),
        "authentication_algorithm" => computed(AttributeType::String, "Authentication algorithm"),
        "encryption_algorithm" => computed(AttributeType::String, "Encryption algorithm"),
        "dh_group" => computed(AttributeType::Number, "Diffie-Hellman group"),
        "ike_version" => computed(AttributeType::Number, "IKE protocol version"),
        "key_lifetime" => computed(AttributeType::Number, "Key lifetime in seconds"),
        "href" => computed(AttributeType::String, "URL of the IKE policy"),
        "negotiation_mode" => computed(AttributeType::String, "IKE negotiation mode"),
        "resource_type" => computed(AttributeType::String, "Resource type"),
        "created_at" => computed(AttributeType::String, "Creation date of the IKE policy"),
        "resource_group" => computed_blocks(&resource_group_attributes(), "Resource group of the IKE policy"),
        "connections" => computed_blocks(&vpn_connection_attributes(), "VPN gateway connections using the IKE policy"),
    }
}

/// How the data source finds its policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IkePolicyLookup<'n> {
    ByName(&'n str),
    ById(&'n str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("one of `name` or `ike_policy` must be set")]
    Missing,
    #[error("only one of `name` or `ike_policy` can be set")]
    Ambiguous,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IkePolicyDataState<'a> {
    #[serde(borrow = "'a")]
    pub ike_policy: ValueString<'a>,
    #[serde(flatten)]
    pub policy: IkePolicyDetails<'a>,
}

impl<'a> IkePolicyDataState<'a> {
    /// `Ok(None)` while one of the keys is unknown
    pub fn lookup(&self) -> Result<Option<IkePolicyLookup<'_>>, LookupError> {
        match (&self.policy.name, &self.ike_policy) {
            (Value::Unknown, _) | (_, Value::Unknown) => Ok(None),
            (Value::Value(_), Value::Value(_)) => Err(LookupError::Ambiguous),
            (Value::Value(name), Value::Null) => Ok(Some(IkePolicyLookup::ByName(name))),
            (Value::Null, Value::Value(id)) => Ok(Some(IkePolicyLookup::ById(id))),
            (Value::Null, Value::Null) => Err(LookupError::Missing),
        }
    }
}

impl<'a> WithSchema for IkePolicyDataState<'a> {
    fn schema() -> Schema {
        let mut attributes = details_attributes();
        let extra: HashMap<String, Attribute> = map! {
            "name" => optional_computed(AttributeType::String, "Name of the IKE policy"),
            "ike_policy" => optional(AttributeType::String, "Id of the IKE policy"),
        };
        attributes.extend(extra);
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes,
                description: Description::plain("Read a VPC VPN IKE policy, by name or by id"),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IkePoliciesState<'a> {
    #[serde(borrow = "'a")]
    pub ike_policies: ValueList<Value<IkePolicyDetails<'a>>>,
}

impl<'a> WithSchema for IkePoliciesState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "ike_policies" => computed_blocks(&details_attributes(), "IKE policies of the region"),
                },
                description: Description::plain("List the VPC VPN IKE policies"),
                ..Default::default()
            },
        }
    }
}
