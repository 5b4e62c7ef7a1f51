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

use anyhow::Result;
use tf_provider::serve;
use tracing_subscriber::EnvFilter;

mod api;
mod bare_metal_disk;
mod config;
mod ibm_provider;
mod id;
mod ike_policy;
mod pi_placement_group;
mod scc_note;
mod scc_provider;
mod session;
mod utils;

#[cfg(test)]
mod testing;

use ibm_provider::IbmProvider;

/// Stdout carries the plugin handshake: logs go to stderr, which Terraform collects
fn init_logging() {
    let filter = EnvFilter::try_from_env("TF_PROVIDER_IBM_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    serve("ibm", IbmProvider::default()).await
}
