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

use base64::Engine;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use url::Url;

use super::{http::error_message, ApiError, ApiResult};

const GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are refreshed this long before IAM considers them expired
const EXPIRY_MARGIN: Duration = Duration::seconds(60);

/// Lifetime assumed when IAM announces one that cannot be represented
const FALLBACK_LIFETIME: Duration = Duration::minutes(5);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expiration: Option<i64>,
    expires_in: Option<i64>,
}

/// Exchanges an API key for IAM bearer tokens, and caches them until they expire
#[derive(Debug)]
pub struct Authenticator {
    client: reqwest::Client,
    token_url: Url,
    api_key: String,
    cached: Mutex<Option<CachedToken>>,
}

impl Authenticator {
    pub fn new(client: reqwest::Client, iam_url: &Url, api_key: String) -> Self {
        let mut token_url = iam_url.clone();
        token_url.set_path("/identity/token");
        Self {
            client,
            token_url,
            api_key,
            cached: Mutex::new(None),
        }
    }

    pub async fn token(&self) -> ApiResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if OffsetDateTime::now_utc() + EXPIRY_MARGIN < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!(url = %self.token_url, "requesting IAM token");
        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> ApiResult<CachedToken> {
        let response = self
            .client
            .post(self.token_url.clone())
            .header("Accept", "application/json")
            .form(&[("grant_type", GRANT_TYPE), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: self.token_url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                url: self.token_url.to_string(),
                source,
            })?;
        if !status.is_success() {
            return Err(ApiError::Auth(format!(
                "IAM returned status {}: {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let response: TokenResponse =
            serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                url: self.token_url.to_string(),
                source,
            })?;

        let expires_at = expiry(
            OffsetDateTime::now_utc(),
            response.expiration,
            response.expires_in,
        )?;

        Ok(CachedToken {
            access_token: response.access_token,
            expires_at,
        })
    }
}

/// Expiry of a token: the absolute `expiration` if given, otherwise `expires_in`
/// seconds from `now`
fn expiry(
    now: OffsetDateTime,
    expiration: Option<i64>,
    expires_in: Option<i64>,
) -> ApiResult<OffsetDateTime> {
    match (expiration, expires_in) {
        (Some(expiration), _) => OffsetDateTime::from_unix_timestamp(expiration)
            .map_err(|err| ApiError::Auth(format!("invalid token expiration: {err}"))),
        (None, Some(expires_in)) => Ok(now
            .checked_add(Duration::seconds(expires_in))
            .unwrap_or(now + FALLBACK_LIFETIME)),
        (None, None) => Ok(now),
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    account: Option<AccountClaim>,
}

#[derive(Debug, Deserialize)]
struct AccountClaim {
    bss: Option<String>,
}

/// Read the account id (`account.bss` claim) out of an IAM access token
pub fn account_id(access_token: &str) -> Option<String> {
    let payload = access_token.split('.').nth(1)?;
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&payload).ok()?;
    claims.account?.bss
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    }

    #[test]
    fn account_id_from_token() {
        let token = format!(
            "{}.{}.signature",
            encode(r#"{"alg":"RS256"}"#),
            encode(r#"{"iam_id":"IBMid-1","account":{"bss":"abc123","valid":true}}"#)
        );
        assert_eq!(account_id(&token).as_deref(), Some("abc123"));
    }

    #[test]
    fn account_id_missing_claim() {
        let token = format!("{}.{}.sig", encode("{}"), encode(r#"{"iam_id":"x"}"#));
        assert_eq!(account_id(&token), None);
        assert_eq!(account_id("not-a-jwt"), None);
    }

    #[test]
    fn expiry_from_lifetime() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(
            expiry(now, None, Some(3600)).unwrap(),
            now + Duration::hours(1)
        );
        assert_eq!(
            expiry(now, Some(1_700_000_600), Some(3600)).unwrap(),
            now + Duration::minutes(10)
        );
        assert_eq!(expiry(now, None, None).unwrap(), now);
    }

    #[test]
    fn huge_lifetime_does_not_overflow() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(
            expiry(now, None, Some(i64::MAX)).unwrap(),
            now + FALLBACK_LIFETIME
        );
        assert!(matches!(
            expiry(now, Some(i64::MAX), None),
            Err(ApiError::Auth(_))
        ));
    }

    #[test]
    fn token_url_is_rooted() {
        let auth = Authenticator::new(
            reqwest::Client::new(),
            &Url::parse("https://iam.cloud.ibm.com").unwrap(),
            "key".to_owned(),
        );
        assert_eq!(auth.token_url.as_str(), "https://iam.cloud.ibm.com/identity/token");
    }
}
