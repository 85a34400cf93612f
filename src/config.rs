//! Runtime configuration from the environment.
//!
//! Values come from process environment variables, with a `.env` file in the
//! working directory loaded first. CLI flags take precedence over all of them.

use std::path::{Path, PathBuf};

use crate::category::ProfileTable;
use crate::error::AppError;

pub const ENV_PROFILES: &str = "CROPCAST_PROFILES";
pub const ENV_SEED: &str = "CROPCAST_SEED";
pub const ENV_LOG: &str = "CROPCAST_LOG";

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub profiles_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            profiles_path: None,
            seed: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let seed = get(ENV_SEED)
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|_| AppError::new(2, format!("{ENV_SEED} must be an unsigned integer, got '{raw}'.")))
            })
            .transpose()?;

        Ok(Self {
            profiles_path: get(ENV_PROFILES).map(PathBuf::from),
            seed,
            log_filter: get(ENV_LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Profile table from `flag`, else the configured path, else the built-in table.
    pub fn load_profiles(&self, flag: Option<&Path>) -> Result<ProfileTable, AppError> {
        match flag.or(self.profiles_path.as_deref()) {
            Some(path) => {
                let table = ProfileTable::from_json_path(path)?;
                tracing::info!(path = %path.display(), "loaded category profiles");
                Ok(table)
            }
            None => Ok(ProfileTable::builtin()),
        }
    }

    pub fn resolve_seed(&self, flag: Option<u64>) -> Option<u64> {
        flag.or(self.seed)
    }
}
