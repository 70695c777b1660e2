use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

/// Lifecycle-core knobs: fee schedule, default currency, pagination and
/// the reference-collision retry bound.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferConfig {
    pub default_currency: String,
    /// Fee percentage of the amount (0.8 means 0.8%)
    pub fee_percentage: f64,
    /// Fee floor, in the smallest currency unit
    pub min_fee: u64,
    /// Fee cap, in the smallest currency unit
    pub max_fee: u64,
    /// How many times create() regenerates a colliding reference
    /// before surfacing a conflict
    pub max_reference_attempts: u32,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            default_currency: "XOF".to_string(),
            fee_percentage: 0.8,
            min_fee: 100,
            max_fee: 1500,
            max_reference_attempts: 5,
            default_page_size: 20,
            max_page_size: 50,
        }
    }
}

/// Simulated provider behavior.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Probability that a simulated call succeeds
    pub success_rate: f64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            success_rate: 0.7,
            min_delay_ms: 2000,
            max_delay_ms: 3000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditConfig {
    /// Hard cap on retained audit entries; appends beyond it are dropped
    pub max_entries: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_entries: 100_000,
        }
    }
}

/// Stalled-transfer sweeper: re-fails PROCESSING rows left behind by a
/// crash between the two process() writes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecoveryConfig {
    pub enabled: bool,
    pub sweep_interval_secs: u64,
    /// A PROCESSING row untouched for this long is considered stranded
    pub stale_after_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_secs: 30,
            stale_after_secs: 120,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
