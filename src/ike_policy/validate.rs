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

use tf_provider::{AttributePath, Diagnostics};

use crate::utils::{
    validate_not_empty, validate_number_in, validate_one_of, validate_range, WithValidate,
};

use super::state::{
    IkePolicyDataState, IkePolicyState, AUTHENTICATION_ALGORITHMS, DH_GROUPS,
    ENCRYPTION_ALGORITHMS, IKE_VERSIONS, KEY_LIFETIMES,
};

impl<'a> WithValidate for IkePolicyState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        validate_not_empty(diags, &self.name, attr_path.clone().attribute("name"));
        validate_one_of(
            diags,
            &self.authentication_algorithm,
            &AUTHENTICATION_ALGORITHMS,
            attr_path.clone().attribute("authentication_algorithm"),
        );
        validate_one_of(
            diags,
            &self.encryption_algorithm,
            &ENCRYPTION_ALGORITHMS,
            attr_path.clone().attribute("encryption_algorithm"),
        );
        validate_number_in(
            diags,
            &self.dh_group,
            &DH_GROUPS,
            attr_path.clone().attribute("dh_group"),
        );
        validate_number_in(
            diags,
            &self.ike_version,
            &IKE_VERSIONS,
            attr_path.clone().attribute("ike_version"),
        );
        validate_range(
            diags,
            &self.key_lifetime,
            KEY_LIFETIMES,
            attr_path.attribute("key_lifetime"),
        );
    }
}

impl<'a> WithValidate for IkePolicyDataState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Err(err) = self.lookup() {
            diags.error(
                "Invalid IKE policy lookup",
                err.to_string(),
                attr_path.clone(),
            );
        }
        validate_not_empty(diags, &self.policy.name, attr_path.clone().attribute("name"));
        validate_not_empty(diags, &self.ike_policy, attr_path.attribute("ike_policy"));
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use tf_provider::Value;

    use super::super::state::tests::policy_config;
    use super::*;

    #[test]
    fn valid_policy() {
        let mut diags = Diagnostics::default();
        let policy = IkePolicyState {
            ike_version: Value::Value(1),
            key_lifetime: Value::Value(1800),
            ..policy_config("vpn")
        };
        policy.validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn every_invalid_field_is_reported() {
        let policy = IkePolicyState {
            authentication_algorithm: Value::Value(Cow::Borrowed("md5")),
            encryption_algorithm: Value::Value(Cow::Borrowed("3des")),
            dh_group: Value::Value(2),
            ike_version: Value::Value(3),
            key_lifetime: Value::Value(86401),
            ..policy_config("vpn")
        };
        let mut diags = Diagnostics::default();
        policy.validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 5);
    }

    #[test]
    fn lookup_keys_are_exclusive() {
        let config = IkePolicyDataState {
            ike_policy: Value::Value(Cow::Borrowed("r006-1")),
            policy: super::super::state::IkePolicyDetails {
                name: Value::Value(Cow::Borrowed("vpn")),
                ..Default::default()
            },
        };
        let mut diags = Diagnostics::default();
        config.validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 1);
    }
}
