//! Streamgate admin bootstrap runtime.
//!
//! Runs once at deployment and guarantees a singleton default admin
//! account. Safe to re-run; retry policy belongs to the invoking
//! deployment process.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use streamgate_application::{AdminProvisioner, ProvisionOutcome};
use streamgate_core::{AppError, AppResult};
use streamgate_infrastructure::{HttpIdentityProvider, HttpRoleStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct ProvisionerConfig {
    base_url: String,
    service_role_key: String,
    http_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ProvisionerConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let identity_provider = Arc::new(HttpIdentityProvider::new(
        http_client.clone(),
        config.base_url.as_str(),
        config.service_role_key.as_str(),
    ));
    let role_store = Arc::new(HttpRoleStore::new(
        http_client,
        config.base_url.as_str(),
        config.service_role_key.as_str(),
    ));
    let provisioner = AdminProvisioner::new(identity_provider, role_store);

    info!(base_url = %config.base_url, "streamgate-provisioner started");

    match provisioner.provision().await? {
        ProvisionOutcome::AlreadyProvisioned => {
            info!("admin account already provisioned; nothing to do");
        }
        ProvisionOutcome::Created { account_id } => {
            info!(account_id = %account_id, "default admin account provisioned");
        }
    }

    Ok(())
}

impl ProvisionerConfig {
    fn load() -> AppResult<Self> {
        let base_url = required_env("STREAMGATE_BASE_URL")?
            .trim_end_matches('/')
            .to_owned();
        let service_role_key = required_env("STREAMGATE_SERVICE_ROLE_KEY")?;
        let http_timeout_secs = parse_env_u64("STREAMGATE_HTTP_TIMEOUT_SECS", 15)?;

        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "STREAMGATE_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            base_url,
            service_role_key,
            http_timeout_secs,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
    }
}
