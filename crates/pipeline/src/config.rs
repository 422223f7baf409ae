//! Pipeline configuration
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables, e.g. `EEG_WAVELET_DECOMPOSITION__LEVELS=5`

use crate::error::PipelineError;
use band_table::ColumnSource;
use config::{Config, Environment, File, FileFormat};
use dwt_engine::ThresholdPolicy;
use event_detector::{DetectorConfig, KernelKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "EEG_WAVELET";

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub decomposition: DecompositionConfig,
    pub threshold: ThresholdConfig,
    pub detection: DetectionConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

/// Discrete decomposition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Registered wavelet family
    pub wavelet: String,
    /// Decomposition depth
    pub levels: usize,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            wavelet: "db4".to_string(),
            levels: 5,
        }
    }
}

/// Detail-band thresholding (denoised output)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Produce a denoised signal per channel
    pub enabled: bool,
    /// Cutoff rule and shrinkage mode
    pub policy: ThresholdPolicy,
}

/// Continuous-transform event detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Run the event detector per channel
    pub enabled: bool,
    /// Mother wavelet
    pub kernel: KernelKind,
    /// Scales in samples
    pub scales: Vec<f64>,
    /// Aggregate energy threshold
    pub threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let detector = DetectorConfig::default();
        Self {
            enabled: true,
            kernel: detector.kernel,
            scales: detector.scales,
            threshold: detector.threshold,
        }
    }
}

impl DetectionConfig {
    /// Detector settings without the on/off switch
    pub fn detector(&self) -> DetectorConfig {
        DetectorConfig {
            kernel: self.kernel,
            scales: self.scales.clone(),
            threshold: self.threshold,
        }
    }
}

/// JSON shape of the band table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableLayout {
    /// One object per sample, keyed by column name
    #[default]
    Rows,
    /// One array per column
    Columns,
}

/// What each channel report contains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Content of band table columns
    pub column_source: ColumnSource,
    /// Include the row-per-sample band table
    pub include_table: bool,
    /// How the band table is laid out in the report
    pub table_layout: TableLayout,
    /// Include per-band features
    pub include_features: bool,
    /// Include per-sample flags and energy next to the grouped events
    pub include_flags: bool,
    /// Write a binary coefficient tree per channel into this directory
    pub snapshot_dir: Option<PathBuf>,
    /// Pretty-print the JSON report
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            column_source: ColumnSource::Reconstructed,
            include_table: true,
            table_layout: TableLayout::Rows,
            include_features: true,
            include_flags: false,
            snapshot_dir: None,
            pretty: true,
        }
    }
}

/// Channel scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Channels processed at the same time
    pub max_concurrent_channels: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_channels: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Show the module path of each event
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            show_target: true,
        }
    }
}

impl LoggingConfig {
    /// Parsed maximum level
    pub fn max_level(&self) -> Result<Level, PipelineError> {
        self.level
            .parse::<Level>()
            .map_err(|_| PipelineError::InvalidConfig(format!("unknown log level '{}'", self.level)))
    }
}

impl PipelineConfig {
    /// Load from an optional TOML file plus `EEG_WAVELET_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load with a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, PipelineError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("detection.scales"),
        );

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would fail on every channel
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.decomposition.levels == 0 {
            return Err(PipelineError::InvalidConfig(
                "decomposition.levels must be at least 1".into(),
            ));
        }
        if self.decomposition.wavelet.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "decomposition.wavelet must name a registered family".into(),
            ));
        }
        if self.batch.max_concurrent_channels == 0 {
            return Err(PipelineError::InvalidConfig(
                "batch.max_concurrent_channels must be at least 1".into(),
            ));
        }

        self.threshold.policy.validate()?;
        if self.detection.enabled {
            self.detection.detector().validate()?;
        }
        self.logging.max_level()?;

        Ok(())
    }

    /// Detection tuned for short high-amplitude transients
    pub fn spike_detection() -> Self {
        Self {
            detection: DetectionConfig {
                enabled: true,
                kernel: KernelKind::MexicanHat,
                scales: vec![1.0, 2.0, 3.0, 4.0],
                threshold: 1.0,
            },
            output: OutputConfig {
                include_table: false,
                ..OutputConfig::default()
            },
            ..Self::default()
        }
    }

    /// Denoising only: universal soft thresholding, no detection
    pub fn denoising() -> Self {
        Self {
            threshold: ThresholdConfig {
                enabled: true,
                policy: ThresholdPolicy {
                    mode: dwt_engine::ThresholdMode::Soft,
                    rule: dwt_engine::CutoffRule::Universal,
                },
            },
            detection: DetectionConfig {
                enabled: false,
                ..DetectionConfig::default()
            },
            ..Self::default()
        }
    }
}
