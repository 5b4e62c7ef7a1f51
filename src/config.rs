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

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tf_provider::{
    map, value, Attribute, AttributeConstraint, AttributePath, AttributeType, Block, Description,
    Diagnostics, NestedBlock, Schema, Value, ValueNumber, ValueString,
};
use url::Url;

use crate::utils::{WithSchema, WithValidate};

pub const DEFAULT_REGION: &str = "us-south";
pub const DEFAULT_TIMEOUT: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig<'a> {
    #[serde(borrow = "'a")]
    pub ibmcloud_api_key: ValueString<'a>,
    pub region: ValueString<'a>,
    pub zone: ValueString<'a>,
    pub account_id: ValueString<'a>,
    pub ibmcloud_timeout: ValueNumber,
    #[serde(with = "value::serde_as_vec")]
    pub endpoints: Value<EndpointsConfig<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EndpointsConfig<'a> {
    #[serde(borrow = "'a")]
    pub iam: ValueString<'a>,
    pub vpc: ValueString<'a>,
    pub power: ValueString<'a>,
    pub scc_findings: ValueString<'a>,
    pub global_tagging: ValueString<'a>,
}

impl<'a> WithSchema for ProviderConfig<'a> {
    fn schema() -> Schema {
        let endpoint_attribute = |service: &str| Attribute {
            attr_type: AttributeType::String,
            description: Description::plain(format!("Override of the {service} endpoint URL")),
            constraint: AttributeConstraint::Optional,
            ..Default::default()
        };
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "ibmcloud_api_key" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("IBM Cloud API key (defaults to IC_API_KEY or IBMCLOUD_API_KEY)"),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Region of the regional services (defaults to IC_REGION, then us-south)"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "zone" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Power Systems zone (defaults to IC_ZONE, then the region)"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "account_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Account id (defaults to IC_ACCOUNT_ID, then the account of the API key)"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "ibmcloud_timeout" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain("Timeout of the API calls in seconds (defaults to IC_TIMEOUT, then 60)"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                },
                blocks: map! {
                    "endpoints" => NestedBlock::Optional(Block {
                        attributes: map! {
                            "iam" => endpoint_attribute("IAM"),
                            "vpc" => endpoint_attribute("VPC"),
                            "power" => endpoint_attribute("Power Systems"),
                            "scc_findings" => endpoint_attribute("Security and Compliance findings"),
                            "global_tagging" => endpoint_attribute("Global Tagging"),
                        },
                        description: Description::plain("Custom service endpoints"),
                        ..Default::default()
                    }),
                },
                description: Description::plain("IBM Cloud"),
                deprecated: false,
            },
        }
    }
}

impl<'a> WithValidate for ProviderConfig<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Value::Value(timeout) = self.ibmcloud_timeout {
            if timeout <= 0 {
                diags.error_short(
                    "`ibmcloud_timeout` must be a positive number of seconds",
                    attr_path.clone().attribute("ibmcloud_timeout"),
                );
            }
        }
        if let Value::Value(region) = &self.region {
            if region.is_empty() {
                diags.error_short(
                    "`region` must not be empty",
                    attr_path.clone().attribute("region"),
                );
            }
        }
        if let Value::Value(endpoints) = &self.endpoints {
            for (name, endpoint) in [
                ("iam", &endpoints.iam),
                ("vpc", &endpoints.vpc),
                ("power", &endpoints.power),
                ("scc_findings", &endpoints.scc_findings),
                ("global_tagging", &endpoints.global_tagging),
            ] {
                if let Value::Value(endpoint) = endpoint {
                    if let Err(err) = Url::parse(endpoint) {
                        diags.error(
                            "Invalid endpoint URL",
                            format!("`{endpoint}` is not a valid URL: {err}"),
                            attr_path
                                .clone()
                                .attribute("endpoints")
                                .index(0)
                                .attribute(name),
                        );
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub iam: Url,
    pub vpc: Url,
    pub power: Url,
    pub scc_findings: Url,
    pub global_tagging: Url,
}

/// Provider configuration once environment fallbacks and defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub region: String,
    pub zone: String,
    pub account_id: Option<String>,
    pub timeout: Duration,
    pub endpoints: Endpoints,
}

impl Settings {
    pub fn from_env(config: &ProviderConfig) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve the settings, `env` looking up environment variables
    pub fn resolve(config: &ProviderConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |value: &ValueString, names: &[&str]| -> Option<String> {
            value
                .as_deref_option()
                .map(str::to_owned)
                .or_else(|| names.iter().find_map(|&name| env(name)))
                .filter(|value| !value.is_empty())
        };

        let api_key = lookup(&config.ibmcloud_api_key, &["IC_API_KEY", "IBMCLOUD_API_KEY"])
            .ok_or_else(|| {
                anyhow!("no API key: set `ibmcloud_api_key`, IC_API_KEY or IBMCLOUD_API_KEY")
            })?;
        let region = lookup(&config.region, &["IC_REGION", "IBMCLOUD_REGION"])
            .unwrap_or_else(|| DEFAULT_REGION.to_owned());
        let zone =
            lookup(&config.zone, &["IC_ZONE", "IBMCLOUD_ZONE"]).unwrap_or_else(|| region.clone());
        let account_id = lookup(&config.account_id, &["IC_ACCOUNT_ID"]);

        let timeout = match config.ibmcloud_timeout {
            Value::Value(timeout) => timeout,
            _ => match env("IC_TIMEOUT") {
                Some(timeout) => timeout
                    .parse()
                    .with_context(|| format!("IC_TIMEOUT is not a number: {timeout}"))?,
                None => DEFAULT_TIMEOUT as i64,
            },
        };
        let timeout = u64::try_from(timeout)
            .ok()
            .filter(|timeout| *timeout > 0)
            .ok_or_else(|| anyhow!("timeout must be a positive number of seconds"))?;

        let overrides = config.endpoints.as_ref_option();
        let endpoint = |name: &str, custom: Option<&ValueString>, default: String| -> Result<Url> {
            let url = custom
                .and_then(|custom| custom.as_deref_option())
                .map_or(default, str::to_owned);
            Url::parse(&url).with_context(|| format!("invalid {name} endpoint: {url}"))
        };
        let endpoints = Endpoints {
            iam: endpoint(
                "IAM",
                overrides.map(|e| &e.iam),
                "https://iam.cloud.ibm.com".to_owned(),
            )?,
            vpc: endpoint(
                "VPC",
                overrides.map(|e| &e.vpc),
                format!("https://{region}.iaas.cloud.ibm.com/v1"),
            )?,
            power: endpoint(
                "Power Systems",
                overrides.map(|e| &e.power),
                format!("https://{}.power-iaas.cloud.ibm.com", power_region(&zone)),
            )?,
            scc_findings: endpoint(
                "findings",
                overrides.map(|e| &e.scc_findings),
                format!("https://{region}.secadvisor.cloud.ibm.com/findings"),
            )?,
            global_tagging: endpoint(
                "Global Tagging",
                overrides.map(|e| &e.global_tagging),
                "https://tags.global-search-tagging.cloud.ibm.com".to_owned(),
            )?,
        };

        Ok(Self {
            api_key,
            region,
            zone,
            account_id,
            timeout: Duration::from_secs(timeout),
            endpoints,
        })
    }
}

/// Power endpoints are regional: `dal12` is served by `dal`, `us-south` by `us-south`
fn power_region(zone: &str) -> &str {
    let trimmed = zone.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.is_empty() || trimmed.ends_with('-') {
        zone
    } else {
        trimmed
    }
}
