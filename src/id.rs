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

//! Composite identifiers: `partA/partB[/...]`

use thiserror::Error;

pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected format of ID `{id}`, expected `{expected}`")]
pub struct IdError {
    pub id: String,
    pub expected: String,
}

pub fn join_id(parts: &[&str]) -> String {
    let mut id = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            id.push(SEPARATOR);
        }
        id.push_str(part);
    }
    id
}

/// Split an id into exactly `N` non-empty parts.
///
/// `parts` names the parts and is only used for the error message.
pub fn split_id<'a, const N: usize>(id: &'a str, parts: [&str; N]) -> Result<[&'a str; N], IdError> {
    let split: Vec<&str> = id.split(SEPARATOR).collect();
    let error = || IdError {
        id: id.to_owned(),
        expected: parts
            .iter()
            .map(|part| format!("<{part}>"))
            .collect::<Vec<_>>()
            .join("/"),
    };

    if split.iter().any(|part| part.is_empty()) {
        return Err(error());
    }
    split.try_into().map_err(|_| error())
}
