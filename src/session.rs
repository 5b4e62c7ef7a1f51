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

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use crate::api::findings::FindingsClient;
use crate::api::http::HttpClient;
use crate::api::iam::{self, Authenticator};
use crate::api::power::PowerClient;
use crate::api::tagging::TaggingClient;
use crate::api::vpc::VpcClient;
use crate::api::{ApiError, ApiResult, FindingsApi, PowerApi, TaggingApi, VpcApi};
use crate::config::Settings;

/// Service clients of a configured provider
pub struct Session {
    pub account_id: Option<String>,
    pub findings: Arc<dyn FindingsApi>,
    pub power: Arc<dyn PowerApi>,
    pub vpc: Arc<dyn VpcApi>,
    pub tagging: Arc<dyn TaggingApi>,
}

impl Session {
    /// Authenticate against IAM and build the service clients
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let token_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create IAM client")?;
        let auth = Arc::new(Authenticator::new(
            token_client,
            &settings.endpoints.iam,
            settings.api_key.clone(),
        ));

        let token = auth
            .token()
            .await
            .context("Failed to authenticate with the IBM Cloud API key")?;
        let account_id = settings
            .account_id
            .clone()
            .or_else(|| iam::account_id(&token));
        tracing::info!(
            region = %settings.region,
            account_id = account_id.as_deref().unwrap_or("<unknown>"),
            "IBM Cloud session configured"
        );

        let http = HttpClient::new(settings.timeout, auth)?;

        Ok(Self {
            findings: Arc::new(FindingsClient::new(
                http.clone(),
                settings.endpoints.scc_findings.clone(),
            )),
            power: Arc::new(PowerClient::new(
                http.clone(),
                settings.endpoints.power.clone(),
                account_id.clone().unwrap_or_default(),
                settings.zone.clone(),
            )),
            vpc: Arc::new(VpcClient::new(http.clone(), settings.endpoints.vpc.clone())),
            tagging: Arc::new(TaggingClient::new(
                http,
                settings.endpoints.global_tagging.clone(),
            )),
            account_id,
        })
    }

    /// Account to use: the explicit one, otherwise the session's
    pub fn account_id(&self, explicit: Option<&str>) -> ApiResult<String> {
        match explicit.or(self.account_id.as_deref()) {
            Some(account_id) if !account_id.is_empty() => Ok(account_id.to_owned()),
            _ => Err(ApiError::Config(
                "no account id: set `account_id` on the provider or the resource".to_owned(),
            )),
        }
    }
}

/// Shared slot for the session, handed to every resource and data source.
///
/// Terraform instantiates resources before configuring the provider, so the
/// slot is filled later by `configure`.
#[derive(Clone, Default)]
pub struct SessionHandle(Arc<RwLock<Option<Arc<Session>>>>);

impl SessionHandle {
    pub fn configured(session: Session) -> Self {
        Self(Arc::new(RwLock::new(Some(Arc::new(session)))))
    }

    pub async fn install(&self, session: Session) {
        *self.0.write().await = Some(Arc::new(session));
    }

    pub async fn get(&self) -> ApiResult<Arc<Session>> {
        self.0.read().await.clone().ok_or(ApiError::Unconfigured)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let configured = self.0.try_read().map_or(true, |session| session.is_some());
        f.debug_struct("SessionHandle")
            .field("configured", &configured)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCloud;

    #[tokio::test]
    async fn unconfigured_handle_fails() {
        let handle = SessionHandle::default();
        assert!(matches!(handle.get().await, Err(ApiError::Unconfigured)));

        handle.install(FakeCloud::default().session()).await;
        assert!(handle.get().await.is_ok());
    }

    #[test]
    fn explicit_account_wins() {
        let session = FakeCloud::default().session();
        assert_eq!(session.account_id(Some("other")).unwrap(), "other");
        assert_eq!(session.account_id(None).unwrap(), crate::testing::ACCOUNT_ID);

        let session = Session {
            account_id: None,
            ..FakeCloud::default().session()
        };
        assert!(matches!(session.account_id(None), Err(ApiError::Config(_))));
        assert!(matches!(session.account_id(Some("")), Err(ApiError::Config(_))));
    }
}
