//! Pipeline error types

use band_table::TableError;
use dwt_engine::DwtError;
use event_detector::DetectorError;
use feature_engine::FeatureError;
use filter_bank::FilterBankError;
use thiserror::Error;

/// Errors raised while configuring or running a batch
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    FilterBank(#[from] FilterBankError),

    #[error(transparent)]
    Dwt(#[from] DwtError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Channel '{channel}' failed: {source}")]
    Channel {
        channel: String,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("Processing task failed: {0}")]
    Task(String),

    #[error("Batch cancelled before channel '{0}'")]
    Cancelled(String),
}

impl PipelineError {
    /// Attach the name of the channel that produced this error
    pub fn in_channel(self, channel: &str) -> Self {
        match self {
            PipelineError::Channel { .. } | PipelineError::Cancelled(_) => self,
            other => PipelineError::Channel {
                channel: channel.to_string(),
                source: Box::new(other),
            },
        }
    }
}
