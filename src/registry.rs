//! Per-account integration lifecycle
//!
//! The registry owns one [`AccountIntegration`] per configured account and
//! is the only place coordinators are created and torn down. There is no
//! ambient global lookup; callers hold the registry and pass it around.

use crate::config::{AccountConfig, Config};
use crate::coordinator::RefreshCoordinator;
use crate::error::{AurigaError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::metrics::{MetricView, SENSOR_TYPES};
use crate::upstream::{Auth, FlitsmeisterClient, StatisticsSource};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Duration;

/// Device-identity record offered to the host for grouping an account's metrics
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// (domain, account id) pairs identifying the device
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub configuration_url: String,
}

impl DeviceInfo {
    fn for_account(account: &AccountConfig) -> Self {
        Self {
            identifiers: vec![("flitsmeister".to_string(), account.id.clone())],
            name: account.name.clone(),
            manufacturer: "Flitsmeister".to_string(),
            configuration_url: "https://www.flitsmeister.nl".to_string(),
        }
    }
}

/// Everything set up for one account: the coordinator, its metric views,
/// and the device identity they are grouped under.
pub struct AccountIntegration {
    coordinator: Arc<RefreshCoordinator>,
    views: Vec<MetricView>,
    device: DeviceInfo,
}

impl std::fmt::Debug for AccountIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountIntegration").finish_non_exhaustive()
    }
}

impl AccountIntegration {
    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn views(&self) -> &[MetricView] {
        &self.views
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }
}

/// Owning map of account id to integration
pub struct AccountRegistry {
    entries: HashMap<String, AccountIntegration>,
    logger: StructuredLogger,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            logger: get_logger("registry"),
        }
    }

    /// Set up one account against the real Flitsmeister API.
    ///
    /// Builds the HTTP client from the shared endpoint config and delegates
    /// to [`Self::add_account_with_source`].
    pub async fn add_account(
        &mut self,
        config: &Config,
        account: &AccountConfig,
    ) -> Result<&AccountIntegration> {
        let auth = Auth {
            session_token: account.session_token.clone(),
            access_token: account.access_token.clone(),
        };
        let source: Arc<dyn StatisticsSource> =
            Arc::new(FlitsmeisterClient::new(&config.upstream, auth)?);
        let interval = Duration::from_secs(config.poll_interval_minutes * 60);
        self.add_account_with_source(account, source, interval).await
    }

    /// Set up one account against an arbitrary data source.
    ///
    /// The coordinator's eager first refresh gates setup: on failure nothing
    /// is stored and the error (authentication or otherwise) is propagated
    /// so the caller can surface it.
    pub async fn add_account_with_source(
        &mut self,
        account: &AccountConfig,
        source: Arc<dyn StatisticsSource>,
        interval: Duration,
    ) -> Result<&AccountIntegration> {
        if self.entries.contains_key(&account.id) {
            return Err(AurigaError::validation(
                "accounts.id",
                "Account is already registered",
            ));
        }

        let coordinator = RefreshCoordinator::new(account.id.clone(), source);
        RefreshCoordinator::start(&coordinator, interval).await?;

        let views = SENSOR_TYPES
            .iter()
            .map(|descriptor| MetricView::new(coordinator.clone(), descriptor))
            .collect();

        let integration = AccountIntegration {
            coordinator,
            views,
            device: DeviceInfo::for_account(account),
        };

        self.logger.info(&format!(
            "Account {} set up with {} metrics",
            account.id,
            SENSOR_TYPES.len()
        ));
        Ok(self
            .entries
            .entry(account.id.clone())
            .or_insert(integration))
    }

    /// Look up an account's integration
    pub fn get(&self, account_id: &str) -> Option<&AccountIntegration> {
        self.entries.get(account_id)
    }

    /// Tear down one account: cancels its timer and drops all views.
    /// Returns false if the account was not registered.
    pub fn remove_account(&mut self, account_id: &str) -> bool {
        match self.entries.remove(account_id) {
            Some(integration) => {
                integration.coordinator.stop();
                self.logger
                    .info(&format!("Account {} removed", account_id));
                true
            }
            None => false,
        }
    }

    /// Registered account ids
    pub fn account_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tear down every account
    pub fn shutdown(&mut self) {
        for (_, integration) in self.entries.drain() {
            integration.coordinator.stop();
        }
        self.logger.info("All accounts torn down");
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{Profile, Statistics};
    use tokio::time::Duration;

    struct StaticSource {
        fail_auth: bool,
    }

    #[async_trait::async_trait]
    impl StatisticsSource for StaticSource {
        async fn fetch_profile(&self) -> Result<Profile> {
            if self.fail_auth {
                return Err(AurigaError::auth("expired"));
            }
            Ok(Profile::default())
        }

        async fn fetch_statistics(&self) -> Result<Statistics> {
            if self.fail_auth {
                return Err(AurigaError::auth("expired"));
            }
            Ok(Statistics {
                km_driven: Some(42.0),
                ..Statistics::default()
            })
        }
    }

    fn account(id: &str) -> AccountConfig {
        AccountConfig {
            id: id.to_string(),
            name: "Test".to_string(),
            session_token: "s".to_string(),
            access_token: "a".to_string(),
        }
    }

    fn source(fail_auth: bool) -> Arc<dyn StatisticsSource> {
        Arc::new(StaticSource { fail_auth })
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn add_account_builds_views_and_device() {
        let mut registry = AccountRegistry::new();
        registry
            .add_account_with_source(&account("main"), source(false), HOUR)
            .await
            .unwrap();

        let integration = registry.get("main").unwrap();
        assert_eq!(integration.views().len(), SENSOR_TYPES.len());
        assert_eq!(integration.device().manufacturer, "Flitsmeister");
        assert_eq!(
            integration.device().identifiers,
            vec![("flitsmeister".to_string(), "main".to_string())]
        );
        assert!(integration.coordinator().is_available());

        let km = integration
            .views()
            .iter()
            .find(|v| v.descriptor().key == "km_driven")
            .unwrap();
        assert_eq!(km.unique_id(), "main.km_driven");
        assert_eq!(km.current_value(), Some(42.0));
    }

    #[tokio::test]
    async fn setup_failure_stores_nothing() {
        let mut registry = AccountRegistry::new();
        let err = registry
            .add_account_with_source(&account("main"), source(true), HOUR)
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert!(registry.is_empty());
        assert!(registry.get("main").is_none());
    }

    #[tokio::test]
    async fn duplicate_account_is_rejected() {
        let mut registry = AccountRegistry::new();
        registry
            .add_account_with_source(&account("main"), source(false), HOUR)
            .await
            .unwrap();
        let err = registry
            .add_account_with_source(&account("main"), source(false), HOUR)
            .await
            .unwrap_err();
        assert!(matches!(err, AurigaError::Validation { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn remove_account_stops_coordinator() {
        let mut registry = AccountRegistry::new();
        registry
            .add_account_with_source(&account("main"), source(false), HOUR)
            .await
            .unwrap();
        let coordinator = registry.get("main").unwrap().coordinator().clone();

        assert!(registry.remove_account("main"));
        assert!(!coordinator.is_available());
        assert!(registry.is_empty());

        // Removing again is a no-op
        assert!(!registry.remove_account("main"));
    }

    #[tokio::test]
    async fn accounts_are_independent() {
        let mut registry = AccountRegistry::new();
        registry
            .add_account_with_source(&account("a"), source(false), HOUR)
            .await
            .unwrap();
        registry
            .add_account_with_source(&account("b"), source(false), HOUR)
            .await
            .unwrap();
        assert_eq!(registry.len(), 2);
        let mut ids: Vec<&str> = registry.account_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "b"]);

        registry.remove_account("a");
        let b = registry.get("b").unwrap();
        assert!(b.coordinator().is_available());

        registry.shutdown();
        assert!(registry.is_empty());
    }
}
