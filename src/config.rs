//! Process configuration, read from the environment before any network
//! endpoint is contacted.

use crate::error::MigrateError;
use crate::util::env::{env_flag, env_opt, env_parse};
use std::time::Duration;

/// Production defaults for the two stores; overridable for staging runs.
const DEFAULT_LEGACY_BASE: &str = "https://ciefact.herokuapp.com";
const DEFAULT_TARGET_BASE: &str = "https://fearless-boot-f25ab4f58d.strapiapp.com";

const DEFAULT_UPLOAD_PACING_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub legacy_base: String,
    pub target_base: String,
    pub api_token: String,
    pub dry_run: bool,
    /// Pause after each upload, to respect the target API's rate limits.
    pub upload_pacing: Duration,
}

impl MigrationConfig {
    /// Reads `STRAPI_API_TOKEN` (required), `DRY_RUN`, base URL overrides
    /// and the pacing override. Missing token is a startup-fatal error.
    pub fn from_env() -> Result<Self, MigrateError> {
        crate::util::env::init_env();

        let api_token = env_opt("STRAPI_API_TOKEN")
            .ok_or(MigrateError::StartupConfigMissing("STRAPI_API_TOKEN"))?;

        Ok(Self {
            legacy_base: env_opt("LEGACY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LEGACY_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            target_base: env_opt("TARGET_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TARGET_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_token,
            dry_run: env_flag("DRY_RUN", false),
            upload_pacing: Duration::from_millis(env_parse(
                "UPLOAD_PACING_MS",
                DEFAULT_UPLOAD_PACING_MS,
            )),
        })
    }
}
