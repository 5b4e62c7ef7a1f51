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

//! VPC VPN IKE policies

use tf_provider::{Diagnostics, Value, ValueList};

use crate::api::VpcApi;
use crate::utils::blocks_of;

mod data_source;
mod resource;
mod state;
mod validate;

pub use data_source::{IkePoliciesDataSource, IkePolicyDataSource};
pub use resource::IkePolicyResource;

use state::VpnConnectionState;

/// List the connections of the policy when the policy itself does not carry
/// them. Failing to do so only warns, and leaves the connections null.
async fn fill_connections(
    vpc: &dyn VpcApi,
    diags: &mut Diagnostics,
    id: &str,
    connections: &mut ValueList<Value<VpnConnectionState<'_>>>,
) {
    if !connections.is_null() {
        return;
    }
    match vpc.list_ike_policy_connections(id).await {
        Ok(found) => {
            *connections = blocks_of(Some(found), VpnConnectionState::from);
        }
        Err(err) => {
            tracing::warn!(id, error = %err, "failed to list the connections of the IKE policy");
            diags.root_warning(
                "Failed to list the VPN connections of the IKE policy",
                err.to_string(),
            );
            *connections = Value::Null;
        }
    }
}
