//! EEG Wavelet Pipeline
//!
//! Batch orchestration over multi-channel recordings: decomposition,
//! per-band features, optional denoising, event detection and the
//! row-per-sample band table, configured from TOML and the environment.

mod batch;
mod config;
mod error;
mod logging;

pub use batch::{
    BandInfo, BatchInput, BatchReport, CancelToken, Channel, ChannelReport, Pipeline,
    TableOutput,
};
pub use config::{
    BatchConfig, DecompositionConfig, DetectionConfig, LoggingConfig, OutputConfig,
    PipelineConfig, TableLayout, ThresholdConfig, ENV_PREFIX,
};
pub use error::PipelineError;
pub use logging::init_logging;
