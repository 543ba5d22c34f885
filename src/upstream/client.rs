use crate::config::UpstreamConfig;
use crate::error::{AurigaError, Result};
use crate::logging::get_logger;
use crate::upstream::types::{Auth, Profile, Statistics};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;

/// Header carrying the opaque session token on every request
const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

/// Async source of the two upstream records.
///
/// The coordinator only depends on this trait; tests substitute scripted
/// implementations and production wires in [`FlitsmeisterClient`].
#[async_trait::async_trait]
pub trait StatisticsSource: Send + Sync {
    /// Fetch the account-level profile record
    async fn fetch_profile(&self) -> Result<Profile>;

    /// Fetch the aggregate usage statistics record
    async fn fetch_statistics(&self) -> Result<Statistics>;
}

/// HTTP client for the Flitsmeister API
pub struct FlitsmeisterClient {
    http: reqwest::Client,
    base_url: String,
    auth: Auth,
    logger: crate::logging::StructuredLogger,
}

impl FlitsmeisterClient {
    /// Build a client for one account from the shared endpoint config
    pub fn new(config: &UpstreamConfig, auth: Auth) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
            logger: get_logger("upstream"),
        })
    }

    /// GET a JSON resource, mapping transport and status failures to the
    /// error taxonomy: 401/403 become authentication errors, everything
    /// else stays transient.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .header(SESSION_TOKEN_HEADER, self.auth.session_token.as_str())
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.auth.access_token.trim()),
            )
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.logger
                .warn(&format!("Credentials rejected by /{} ({})", path, status));
            return Err(AurigaError::auth(format!(
                "Flitsmeister rejected credentials on /{} ({})",
                path, status
            )));
        }
        if !status.is_success() {
            return Err(AurigaError::api(format!(
                "Flitsmeister /{} returned HTTP {}",
                path, status
            )));
        }

        Ok(resp.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl StatisticsSource for FlitsmeisterClient {
    async fn fetch_profile(&self) -> Result<Profile> {
        self.logger.debug("Fetching user profile");
        self.get_json("user").await
    }

    async fn fetch_statistics(&self) -> Result<Statistics> {
        self.logger.debug("Fetching usage statistics");
        self.get_json("statistics").await
    }
}
