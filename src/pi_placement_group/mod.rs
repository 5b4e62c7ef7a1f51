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

//! Power Systems placement groups

use tf_provider::{Diagnostics, Value};

use crate::api::TaggingApi;

mod data_source;
mod resource;
mod state;

pub use data_source::{PlacementGroupDataSource, PlacementGroupsDataSource};
pub use resource::PlacementGroupResource;

use state::{strings_of, PlacementGroupState};

/// Look the user tags of the group up by its CRN. Failing to do so only warns,
/// and leaves the tags null.
async fn fill_user_tags(
    tagging: &dyn TaggingApi,
    diags: &mut Diagnostics,
    group: &mut PlacementGroupState<'_>,
) {
    let Value::Value(crn) = &group.crn else {
        return;
    };
    match tagging.list_user_tags(crn).await {
        Ok(tags) => group.user_tags = strings_of(Some(tags)),
        Err(err) => {
            tracing::warn!(
                id = group.id.as_str(),
                error = %err,
                "failed to read the user tags of the placement group"
            );
            diags.root_warning(
                "Failed to read the user tags of the placement group",
                err.to_string(),
            );
            group.user_tags = Value::Null;
        }
    }
}
