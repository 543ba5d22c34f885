use auriga::config::AccountConfig;
use auriga::error::{AurigaError, Result};
use auriga::registry::AccountRegistry;
use auriga::upstream::{Profile, Statistics, StatisticsSource};
use std::sync::Arc;
use tokio::time::Duration;

struct StubSource {
    km_driven: f64,
    fail_auth: bool,
}

#[async_trait::async_trait]
impl StatisticsSource for StubSource {
    async fn fetch_profile(&self) -> Result<Profile> {
        if self.fail_auth {
            return Err(AurigaError::auth("rejected"));
        }
        Ok(Profile::default())
    }

    async fn fetch_statistics(&self) -> Result<Statistics> {
        if self.fail_auth {
            return Err(AurigaError::auth("rejected"));
        }
        Ok(Statistics {
            km_driven: Some(self.km_driven),
            ..Statistics::default()
        })
    }
}

fn account(id: &str, name: &str) -> AccountConfig {
    AccountConfig {
        id: id.to_string(),
        name: name.to_string(),
        session_token: "sess".to_string(),
        access_token: "acc".to_string(),
    }
}

fn ok_source(km_driven: f64) -> Arc<dyn StatisticsSource> {
    Arc::new(StubSource {
        km_driven,
        fail_auth: false,
    })
}

const HOUR: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn two_accounts_are_fully_independent() {
    let mut registry = AccountRegistry::new();
    registry
        .add_account_with_source(&account("alice", "Alice"), ok_source(100.0), HOUR)
        .await
        .unwrap();
    registry
        .add_account_with_source(&account("bob", "Bob"), ok_source(200.0), HOUR)
        .await
        .unwrap();

    let alice_km = registry.get("alice").unwrap().views()[0].current_value();
    let bob_km = registry.get("bob").unwrap().views()[0].current_value();
    assert_eq!(alice_km, Some(100.0));
    assert_eq!(bob_km, Some(200.0));

    // Tearing down one account leaves the other running
    assert!(registry.remove_account("alice"));
    assert!(registry.get("bob").unwrap().coordinator().is_available());
}

#[tokio::test]
async fn auth_failure_at_setup_registers_nothing() {
    let mut registry = AccountRegistry::new();
    let source: Arc<dyn StatisticsSource> = Arc::new(StubSource {
        km_driven: 0.0,
        fail_auth: true,
    });
    let err = registry
        .add_account_with_source(&account("alice", "Alice"), source, HOUR)
        .await
        .unwrap_err();
    assert!(err.is_authentication());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn unique_ids_are_scoped_per_account() {
    let mut registry = AccountRegistry::new();
    registry
        .add_account_with_source(&account("alice", "Alice"), ok_source(1.0), HOUR)
        .await
        .unwrap();

    let ids: Vec<&str> = registry
        .get("alice")
        .unwrap()
        .views()
        .iter()
        .map(|v| v.unique_id())
        .collect();
    assert!(ids.contains(&"alice.km_driven"));
    assert!(ids.contains(&"alice.provinces_visited"));
    assert!(ids.iter().all(|id| id.starts_with("alice.")));
}

#[tokio::test]
async fn device_info_names_the_service() {
    let mut registry = AccountRegistry::new();
    registry
        .add_account_with_source(&account("alice", "Alice's car"), ok_source(1.0), HOUR)
        .await
        .unwrap();

    let device = registry.get("alice").unwrap().device();
    assert_eq!(device.name, "Alice's car");
    assert_eq!(device.manufacturer, "Flitsmeister");
    assert!(device.configuration_url.contains("flitsmeister"));
}
