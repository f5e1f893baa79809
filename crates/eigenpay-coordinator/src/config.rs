//! Protocol parameters.
//!
//! Parameters load from an optional YAML file, then environment overrides
//! apply, then the result is validated. Defaults are one day for the
//! fraud-proof window and seven days for the claim challenge window.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`DisputeParams::fraud_proof_window_secs`].
pub const FRAUD_PROOF_WINDOW_ENV: &str = "EIGENPAY_FRAUD_PROOF_WINDOW_SECS";
/// Environment variable overriding [`DisputeParams::claim_challenge_window_secs`].
pub const CLAIM_CHALLENGE_WINDOW_ENV: &str = "EIGENPAY_CLAIM_CHALLENGE_WINDOW_SECS";

const DEFAULT_FRAUD_PROOF_WINDOW_SECS: u64 = 86_400;
const DEFAULT_CLAIM_CHALLENGE_WINDOW_SECS: u64 = 604_800;

/// Timing parameters for claims and disputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisputeParams {
    /// How long a turn-holder has to respond.
    pub fraud_proof_window_secs: u64,
    /// How long after commitment a claim may be challenged.
    pub claim_challenge_window_secs: u64,
}

impl Default for DisputeParams {
    fn default() -> Self {
        Self {
            fraud_proof_window_secs: DEFAULT_FRAUD_PROOF_WINDOW_SECS,
            claim_challenge_window_secs: DEFAULT_CLAIM_CHALLENGE_WINDOW_SECS,
        }
    }
}

impl DisputeParams {
    /// Load parameters: file (or defaults), then environment, then validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, an
    /// override is malformed, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        let params = base.with_overrides(|var| std::env::var(var).ok())?;
        params.validate()?;
        Ok(params)
    }

    /// Parse parameters from YAML. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a YAML parameter file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Apply overrides read through `lookup`, keyed by environment variable
    /// name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(secs) = parse_override(FRAUD_PROOF_WINDOW_ENV, &lookup)? {
            self.fraud_proof_window_secs = secs;
        }
        if let Some(secs) = parse_override(CLAIM_CHALLENGE_WINDOW_ENV, &lookup)? {
            self.claim_challenge_window_secs = secs;
        }
        Ok(self)
    }

    /// Reject zero windows and windows whose double does not fit a
    /// `chrono::Duration`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fraud_proof_window()?;
        self.claim_challenge_window()?;
        Ok(())
    }

    /// The fraud-proof window as a duration.
    pub fn fraud_proof_window(&self) -> Result<Duration, ConfigError> {
        window("fraud_proof_window_secs", self.fraud_proof_window_secs)
    }

    /// The claim challenge window as a duration.
    pub fn claim_challenge_window(&self) -> Result<Duration, ConfigError> {
        window("claim_challenge_window_secs", self.claim_challenge_window_secs)
    }
}

fn window(name: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ZeroWindow(name));
    }
    let too_large = || ConfigError::WindowTooLarge { name, secs };
    let signed = i64::try_from(secs).map_err(|_| too_large())?;
    signed
        .checked_mul(2)
        .and_then(Duration::try_seconds)
        .ok_or_else(too_large)?;
    Duration::try_seconds(signed).ok_or_else(too_large)
}

fn parse_override(var: &'static str, lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidOverride { var, value: raw }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid parameter file: {0}")]
    Parse(String),
    #[error("invalid value {value:?} for {var}: expected whole seconds")]
    InvalidOverride { var: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    ZeroWindow(&'static str),
    #[error("{name} of {secs}s is too large")]
    WindowTooLarge { name: &'static str, secs: u64 },
}
