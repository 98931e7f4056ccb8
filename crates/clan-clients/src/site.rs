//! Community-site client
//!
//! Rank reads are unauthenticated JSON GETs of the member profile. Rank
//! writes sign in for a fresh session token, PATCH the profile, and sign
//! out again; the token is never held across calls, so a crashed update
//! cannot leak a live session.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use clan_common::SiteConfig;
use clan_core::error::DomainError;
use clan_core::traits::{PortResult, SiteApi};
use clan_core::value_objects::{ProfileLink, SiteRank};

/// Live client for the community website's membership records
#[derive(Debug, Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    user_session: UserSession,
}

#[derive(Debug, Deserialize)]
struct UserSession {
    authentication_token: String,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    member: ProfileMember,
}

#[derive(Debug, Deserialize)]
struct ProfileMember {
    rank_id: u32,
}

impl SiteClient {
    /// Build a client from configuration
    pub fn new(config: &SiteConfig) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::External(format!("site client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            password: config.password.clone(),
        })
    }

    async fn sign_in(&self) -> PortResult<String> {
        let url = format!("{}/users/sign_in.json", self.base_url);
        let body = json!({
            "user": { "email": self.email, "password": self.password }
        });
        let response: SignInResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DomainError::External(format!("site sign-in: {e}")))?
            .json()
            .await
            .map_err(|e| DomainError::External(format!("site sign-in response: {e}")))?;
        debug!("Signed in to site");
        Ok(response.user_session.authentication_token)
    }

    /// Best effort; a failed sign-out only shortens the token's useful life
    async fn sign_out(&self, token: &str) {
        let url = format!("{}/users/sign_out.json?auth_token={token}", self.base_url);
        if let Err(e) = self.http.delete(&url).send().await {
            warn!(error = %e, "Site sign-out failed");
        }
    }

    async fn patch_rank(
        &self,
        token: &str,
        profile: &ProfileLink,
        rank: SiteRank,
    ) -> PortResult<()> {
        let url = format!("{}.json?auth_token={token}", profile.as_str());
        let body = json!({ "member": { "rank_id": rank.rank_id() } });
        self.http
            .patch(&url)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DomainError::External(format!("site rank update: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl SiteApi for SiteClient {
    #[instrument(skip(self), fields(profile = profile.as_str()))]
    async fn get_rank(&self, profile: &ProfileLink) -> PortResult<SiteRank> {
        let url = format!("{}.json", profile.as_str());
        let response: ProfileResponse = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DomainError::External(format!("site profile fetch: {e}")))?
            .json()
            .await
            .map_err(|e| DomainError::External(format!("site profile response: {e}")))?;
        SiteRank::from_rank_id(response.member.rank_id).ok_or_else(|| {
            DomainError::External(format!("unknown site rank id {}", response.member.rank_id))
        })
    }

    #[instrument(skip(self), fields(profile = profile.as_str(), rank = %rank))]
    async fn set_rank(&self, profile: &ProfileLink, rank: SiteRank) -> PortResult<()> {
        let token = self.sign_in().await?;
        let result = self.patch_rank(&token, profile, rank).await;
        // Sign out regardless of whether the PATCH succeeded.
        self.sign_out(&token).await;
        result
    }
}
