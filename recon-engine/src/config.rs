//! Configuration for recon-engine
//!
//! Provides the immutable [`ReconConfig`] built once at startup:
//! queues (rule sets + endpoint sets), content validation families,
//! polling knobs and HTTP settings.
//!
//! **Priority:** CLI `--config` → `RECON_CONFIG` → platform config file → built-in defaults

use recon_common::config::{self, HttpSettings, LoggingConfig, CONFIG_ENV_VAR};
use recon_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

const EURO_BASE_URL: &str = "https://6dsz2xtbx4.execute-api.us-east-1.amazonaws.com/EUROMOTORS";
const UDEP_BASE_URL: &str = "https://rx06her9g5.execute-api.us-east-1.amazonaws.com/UDEP";

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub polling: PollingSettings,

    #[serde(default)]
    pub upload: UploadSettings,

    #[serde(default)]
    pub reconcile: ReconcileSettings,

    /// Empty-sensitive filename families checked before upload
    #[serde(default = "default_validation_families")]
    pub validation: Vec<EmptyContentFamily>,

    /// Destination queues in classification priority order
    #[serde(default = "default_queues")]
    pub queues: Vec<QueueConfig>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            http: HttpSettings::default(),
            polling: PollingSettings::default(),
            upload: UploadSettings::default(),
            reconcile: ReconcileSettings::default(),
            validation: default_validation_families(),
            queues: default_queues(),
        }
    }
}

/// One classification rule: first matching rule in a rule set wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub subscription_id: String,
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ClassificationRule {
    pub fn new(subscription_id: &str, include: &[&str], exclude: &[&str]) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The four stage URLs of one queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSet {
    pub submit_url: String,
    pub parse_url: String,
    pub sync_url: String,
    pub reconcile_url: String,
}

impl EndpointSet {
    /// Derive the stage URLs from a queue base URL
    pub fn from_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            submit_url: format!("{}/subir", base),
            parse_url: format!("{}/procesar", base),
            sync_url: format!("{}/sincronizar", base),
            reconcile_url: format!("{}/reconciliar", base),
        }
    }

    fn urls(&self) -> [(&'static str, &str); 4] {
        [
            ("submit_url", &self.submit_url),
            ("parse_url", &self.parse_url),
            ("sync_url", &self.sync_url),
            ("reconcile_url", &self.reconcile_url),
        ]
    }
}

/// A destination queue: its endpoints and its rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQueueConfig")]
pub struct QueueConfig {
    pub name: String,
    pub endpoints: EndpointSet,
    pub rules: Vec<ClassificationRule>,
}

/// File form of a queue: either `base_url` or an explicit `[endpoints]` table
#[derive(Deserialize)]
struct RawQueueConfig {
    name: String,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    endpoints: Option<EndpointSet>,
    #[serde(default)]
    rules: Vec<ClassificationRule>,
}

impl TryFrom<RawQueueConfig> for QueueConfig {
    type Error = String;

    fn try_from(raw: RawQueueConfig) -> std::result::Result<Self, Self::Error> {
        let endpoints = match (raw.endpoints, raw.base_url) {
            (Some(endpoints), _) => endpoints,
            (None, Some(base)) => EndpointSet::from_base(&base),
            (None, None) => {
                return Err(format!(
                    "queue '{}' needs either base_url or an [endpoints] table",
                    raw.name
                ))
            }
        };

        Ok(Self {
            name: raw.name,
            endpoints,
            rules: raw.rules,
        })
    }
}

impl QueueConfig {
    pub fn new(name: &str, endpoints: EndpointSet, rules: Vec<ClassificationRule>) -> Self {
        Self {
            name: name.to_string(),
            endpoints,
            rules,
        }
    }
}

/// Filename prefix family whose files are rejected when (nearly) empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyContentFamily {
    /// Reason reported when a file is rejected
    pub label: String,
    /// Lowercase filename prefixes belonging to this family
    pub prefixes: Vec<String>,
    /// Files with this many lines or fewer are rejected
    pub max_empty_lines: usize,
}

/// Size band for the reconciliation attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptBand {
    pub max_lines: usize,
    pub max_attempts: u32,
}

/// Polling knobs for the synchronize and reconcile stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Retries after the first synchronize call
    #[serde(default = "default_sync_max_attempts")]
    pub sync_max_attempts: u32,

    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,

    #[serde(default = "default_reconcile_interval_ms")]
    pub reconcile_interval_ms: u64,

    /// Consecutive unchanged reconcile observations before giving up
    #[serde(default = "default_stability_repeats")]
    pub stability_repeats: u32,

    /// Ordered by `max_lines`; first band covering the line count wins
    #[serde(default = "default_attempt_bands")]
    pub attempt_bands: Vec<AttemptBand>,

    /// Budget for files larger than every band
    #[serde(default = "default_fallback_attempts")]
    pub fallback_attempts: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            sync_max_attempts: default_sync_max_attempts(),
            sync_interval_ms: default_sync_interval_ms(),
            reconcile_interval_ms: default_reconcile_interval_ms(),
            stability_repeats: default_stability_repeats(),
            attempt_bands: default_attempt_bands(),
            fallback_attempts: default_fallback_attempts(),
        }
    }
}

impl PollingSettings {
    pub fn sync_interval(&self) -> Duration {
        recon_common::time::millis_to_duration(self.sync_interval_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        recon_common::time::millis_to_duration(self.reconcile_interval_ms)
    }

    /// Reconciliation attempt budget for a file of `line_count` lines
    pub fn reconcile_budget(&self, line_count: usize) -> u32 {
        self.attempt_bands
            .iter()
            .find(|band| line_count <= band.max_lines)
            .map(|band| band.max_attempts)
            .unwrap_or(self.fallback_attempts)
    }
}

fn default_sync_max_attempts() -> u32 {
    12
}

fn default_sync_interval_ms() -> u64 {
    2000
}

fn default_reconcile_interval_ms() -> u64 {
    1000
}

fn default_stability_repeats() -> u32 {
    2
}

fn default_attempt_bands() -> Vec<AttemptBand> {
    [(20, 3), (40, 4), (50, 5), (60, 8)]
        .into_iter()
        .map(|(max_lines, max_attempts)| AttemptBand {
            max_lines,
            max_attempts,
        })
        .collect()
}

fn default_fallback_attempts() -> u32 {
    10
}

/// Upload-time content handling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Convert CRLF line endings to LF before submitting
    #[serde(default)]
    pub normalize_crlf: bool,
}

/// How the reconciliation target is derived from the synchronize counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Target is the failed-record count
    #[default]
    FailedCount,
    /// Target is 0 when every record failed (failed == processed)
    ZeroWhenAllFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    #[serde(default)]
    pub target_policy: TargetPolicy,
}

fn default_validation_families() -> Vec<EmptyContentFamily> {
    vec![
        EmptyContentFamily {
            label: "SBP/BWS Vacío".to_string(),
            prefixes: vec!["sbp".to_string(), "bws".to_string()],
            max_empty_lines: 0,
        },
        EmptyContentFamily {
            label: "CDPG Vacío".to_string(),
            prefixes: vec!["cdpg".to_string()],
            max_empty_lines: 1,
        },
    ]
}

fn default_queues() -> Vec<QueueConfig> {
    vec![
        QueueConfig::new(
            "euro",
            EndpointSet::from_base(EURO_BASE_URL),
            vec![
                ClassificationRule::new("sub_YK5GU0000019", &["bws", "sbp"], &[]),
                ClassificationRule::new("sub_YK5GU0000020", &["cdpg"], &["dolares"]),
                ClassificationRule::new("sub_YK5GU0000022", &["dolares"], &[]),
                ClassificationRule::new("sub_YK5GU0000021", &["eur"], &[]),
            ],
        ),
        QueueConfig::new(
            "udep",
            EndpointSet::from_base(UDEP_BASE_URL),
            vec![
                ClassificationRule::new("sub_YK5GU0000025", &["cdpg"], &[]),
                ClassificationRule::new("sub_YK5GU0000022", &["rec"], &[]),
                ClassificationRule::new("sub_YK5GU0000023", &["bws", "sbp"], &[]),
                ClassificationRule::new("sub_YK5GU0000024", &["2103093"], &[]),
            ],
        ),
    ]
}

impl ReconConfig {
    /// Resolve, load and validate the configuration
    ///
    /// Returns the config together with the file it was read from (if any).
    pub fn load(cli_path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = config::resolve_config_path(cli_path, CONFIG_ENV_VAR);
        let config: Self = config::load_or_default(path.as_deref())?;
        config.validate()?;
        Ok((config, path.filter(|p| p.exists())))
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a queue by name (case-insensitive)
    pub fn queue(&self, name: &str) -> Option<&QueueConfig> {
        self.queues
            .iter()
            .find(|queue| queue.name.eq_ignore_ascii_case(name))
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.queues.is_empty() {
            return Err(Error::Config("at least one queue must be configured".to_string()));
        }

        let mut names = HashSet::new();
        for queue in &self.queues {
            if !names.insert(queue.name.to_lowercase()) {
                return Err(Error::Config(format!("duplicate queue name '{}'", queue.name)));
            }

            for (field, url) in queue.endpoints.urls() {
                reqwest::Url::parse(url).map_err(|e| {
                    Error::Config(format!(
                        "queue '{}': invalid {} '{}': {}",
                        queue.name, field, url, e
                    ))
                })?;
            }

            for rule in &queue.rules {
                if rule.subscription_id.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "queue '{}': rule with empty subscription_id",
                        queue.name
                    )));
                }
                if rule.include.iter().all(|k| k.trim().is_empty()) {
                    return Err(Error::Config(format!(
                        "queue '{}': rule {} has no include keywords",
                        queue.name, rule.subscription_id
                    )));
                }
            }
        }

        let bands = &self.polling.attempt_bands;
        if bands.windows(2).any(|pair| pair[0].max_lines >= pair[1].max_lines) {
            return Err(Error::Config(
                "polling.attempt_bands must be ordered by strictly increasing max_lines".to_string(),
            ));
        }
        if bands.iter().any(|band| band.max_attempts == 0) || self.polling.fallback_attempts == 0 {
            return Err(Error::Config(
                "reconcile attempt budgets must be at least 1".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::Config(
                "http.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.polling.stability_repeats == 0 {
            return Err(Error::Config(
                "polling.stability_repeats must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
