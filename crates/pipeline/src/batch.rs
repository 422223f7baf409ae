//! Multi-channel batch processing
//!
//! Each channel is an independent unit of work run on the blocking thread
//! pool. Channels are dispatched in input order, at most
//! `batch.max_concurrent_channels` at a time, and the cancellation flag is
//! checked before every dispatch. Reports come back in input order; any
//! failure or cancellation fails the whole batch. Once a channel fails, the
//! channels still queued skip their work, and `run` returns only after every
//! dispatched channel has finished. Coefficient snapshots are written after
//! the whole batch has succeeded.

use crate::config::{PipelineConfig, TableLayout};
use crate::error::PipelineError;
use band_table::BandTable;
use dwt_engine::{decompose, reconstruct, threshold, Band, CoefficientTree};
use event_detector::{DetectionReport, EventDetector};
use feature_engine::{FeatureExtractor, FeatureVector};
use filter_bank::{Wavelet, WaveletRegistry};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// One named signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel label, e.g. an electrode name
    pub name: String,
    /// Samples in time order
    pub samples: Vec<f64>,
}

/// Batch input: channels sharing one sampling rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchInput {
    /// Samples per second
    pub sampling_rate: f64,
    /// Channels to analyze
    pub channels: Vec<Channel>,
}

/// Band identity and frequency coverage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandInfo {
    pub name: String,
    pub band: Band,
    pub low_hz: f64,
    pub high_hz: f64,
}

/// Band table of one channel, tagged with its JSON layout
#[derive(Debug, Clone, PartialEq)]
pub enum TableOutput {
    /// Serializes as an array of row objects
    Rows(BandTable),
    /// Serializes as the table's column arrays
    Columns(BandTable),
}

impl TableOutput {
    fn new(table: BandTable, layout: TableLayout) -> Self {
        match layout {
            TableLayout::Rows => TableOutput::Rows(table),
            TableLayout::Columns => TableOutput::Columns(table),
        }
    }

    /// Underlying table
    pub fn table(&self) -> &BandTable {
        match self {
            TableOutput::Rows(table) | TableOutput::Columns(table) => table,
        }
    }
}

impl Serialize for TableOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TableOutput::Rows(table) => serializer.collect_seq(table.rows()),
            TableOutput::Columns(table) => table.serialize(serializer),
        }
    }
}

/// Analysis results for one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelReport {
    pub name: String,
    pub samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denoised: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableOutput>,
}

/// Results for a whole batch, channels in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub wavelet: String,
    pub levels: usize,
    pub sampling_rate: f64,
    pub bands: Vec<BandInfo>,
    pub channels: Vec<ChannelReport>,
}

impl BatchReport {
    /// Events detected across all channels
    pub fn total_events(&self) -> usize {
        self.channels
            .iter()
            .filter_map(|c| c.detection.as_ref())
            .map(|d| d.events.len())
            .sum()
    }
}

/// Cooperative cancellation flag shared with a running batch
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that no further channels be started
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](Self::cancel) was called
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configured analysis pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    wavelet: Arc<Wavelet>,
    detector: Option<Arc<EventDetector>>,
    cancel: CancelToken,
}

impl Pipeline {
    /// Build a pipeline, resolving the wavelet in `registry`
    pub fn new(config: PipelineConfig, registry: &WaveletRegistry) -> Result<Self, PipelineError> {
        config.validate()?;
        let wavelet = registry.get(&config.decomposition.wavelet)?;

        let detector = if config.detection.enabled {
            Some(Arc::new(EventDetector::new(config.detection.detector())?))
        } else {
            None
        };

        info!(
            "Pipeline ready: {} to {} levels, threshold {}, detection {}",
            wavelet.name(),
            config.decomposition.levels,
            if config.threshold.enabled { "on" } else { "off" },
            if detector.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            config: Arc::new(config),
            wavelet,
            detector,
            cancel: CancelToken::new(),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Token that stops the batch before its next channel
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Frequency coverage of every band at `sampling_rate`, in table order
    pub fn band_info(&self, sampling_rate: f64) -> Vec<BandInfo> {
        let levels = self.config.decomposition.levels;
        std::iter::once(Band::Approximation)
            .chain((1..=levels).rev().map(Band::Detail))
            .map(|band| {
                let (low_hz, high_hz) = band.frequency_range(sampling_rate, levels);
                BandInfo {
                    name: band.column_name(levels),
                    band,
                    low_hz,
                    high_hz,
                }
            })
            .collect()
    }

    /// Analyze every channel of `input`
    pub async fn run(&self, input: BatchInput) -> Result<BatchReport, PipelineError> {
        let sampling_rate = input.sampling_rate;
        validate_sampling_rate(sampling_rate)?;
        if self.config.output.snapshot_dir.is_some() {
            check_snapshot_names(&input.channels)?;
        }

        info!(
            "Analyzing {} channels at {} Hz",
            input.channels.len(),
            sampling_rate
        );

        let permits = Arc::new(Semaphore::new(self.config.batch.max_concurrent_channels));
        // Raised by the first failing channel or by cancellation
        let abort = CancelToken::new();
        let mut cancelled_at = None;
        let mut pending = Vec::with_capacity(input.channels.len());

        for channel in input.channels {
            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))?;

            if abort.is_cancelled() {
                break;
            }
            if self.cancel.is_cancelled() {
                warn!("Batch cancelled before channel '{}'", channel.name);
                abort.cancel();
                cancelled_at = Some(channel.name);
                break;
            }

            let pipeline = self.clone();
            let abort = abort.clone();
            let name = channel.name.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                if abort.is_cancelled() {
                    return Ok(None);
                }
                let result = pipeline.analyze_channel(&channel, sampling_rate);
                if result.is_err() {
                    abort.cancel();
                }
                result.map(Some)
            });
            pending.push((name, handle));
        }

        let mut failure = None;
        let mut analyzed = Vec::with_capacity(pending.len());
        for (name, handle) in pending {
            match handle.await {
                Ok(Ok(Some(done))) => analyzed.push(done),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    failure.get_or_insert(e.in_channel(&name));
                }
                Err(e) => {
                    failure.get_or_insert(PipelineError::Task(e.to_string()));
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }
        if let Some(name) = cancelled_at {
            return Err(PipelineError::Cancelled(name));
        }

        let (channels, trees): (Vec<ChannelReport>, Vec<CoefficientTree>) = analyzed.into_iter().unzip();

        if let Some(dir) = self.config.output.snapshot_dir.clone() {
            let names: Vec<String> = channels.iter().map(|c| c.name.clone()).collect();
            tokio::task::spawn_blocking(move || {
                names
                    .iter()
                    .zip(&trees)
                    .try_for_each(|(name, tree)| write_snapshot(&dir, name, tree))
            })
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;
        }

        let report = BatchReport {
            wavelet: self.wavelet.name().to_string(),
            levels: self.config.decomposition.levels,
            sampling_rate,
            bands: self.band_info(sampling_rate),
            channels,
        };

        info!(
            "Batch complete: {} channels, {} events",
            report.channels.len(),
            report.total_events()
        );

        Ok(report)
    }

    /// Analyze one channel synchronously, writing its snapshot if configured
    pub fn process_channel(&self, channel: &Channel, sampling_rate: f64) -> Result<ChannelReport, PipelineError> {
        let (report, tree) = self.analyze_channel(channel, sampling_rate)?;
        if let Some(dir) = &self.config.output.snapshot_dir {
            write_snapshot(dir, &channel.name, &tree)?;
        }
        Ok(report)
    }

    fn analyze_channel(
        &self,
        channel: &Channel,
        sampling_rate: f64,
    ) -> Result<(ChannelReport, CoefficientTree), PipelineError> {
        validate_sampling_rate(sampling_rate)?;
        let started = Instant::now();
        let config = &self.config;
        let wavelet = self.wavelet.as_ref();

        let tree = decompose(&channel.samples, wavelet, config.decomposition.levels)?;
        debug!(
            "Channel '{}': {} samples, {} coefficients",
            channel.name,
            channel.samples.len(),
            tree.total_coefficients()
        );

        let features = if config.output.include_features {
            Some(FeatureExtractor::new(sampling_rate).extract(&tree)?)
        } else {
            None
        };

        let denoised = if config.threshold.enabled {
            let cleaned = threshold(&tree, &config.threshold.policy)?;
            Some(reconstruct(&cleaned, wavelet)?)
        } else {
            None
        };

        let table = if config.output.include_table {
            let table = BandTable::build(
                &channel.samples,
                &tree,
                wavelet,
                sampling_rate,
                config.output.column_source,
            )?;
            Some(TableOutput::new(table, config.output.table_layout))
        } else {
            None
        };

        let detection = match &self.detector {
            Some(detector) => {
                let mut report = detector.analyze(&channel.samples, sampling_rate)?;
                metrics::counter!("events_detected_total").increment(report.events.len() as u64);
                info!(
                    "Channel '{}': {} events ({} samples flagged)",
                    channel.name,
                    report.events.len(),
                    report.flagged_samples
                );
                if !config.output.include_flags {
                    report.flags.clear();
                    report.energy.clear();
                }
                Some(report)
            }
            None => None,
        };

        metrics::counter!("channels_processed_total").increment(1);
        metrics::histogram!("channel_processing_seconds").record(started.elapsed().as_secs_f64());

        let report = ChannelReport {
            name: channel.name.clone(),
            samples: channel.samples.len(),
            features,
            denoised,
            detection,
            table,
        };
        Ok((report, tree))
    }
}

fn validate_sampling_rate(sampling_rate: f64) -> Result<(), PipelineError> {
    if sampling_rate.is_finite() && sampling_rate > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidInput(format!(
            "sampling rate must be positive, got {}",
            sampling_rate
        )))
    }
}

fn snapshot_file_name(channel: &str) -> String {
    let stem: String = channel
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}.tree", stem)
}

/// Reject batches where two channels would write the same snapshot file
fn check_snapshot_names(channels: &[Channel]) -> Result<(), PipelineError> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(channels.len());
    for channel in channels {
        let file = snapshot_file_name(&channel.name);
        if let Some(previous) = seen.insert(file.clone(), &channel.name) {
            return Err(PipelineError::InvalidInput(format!(
                "channels '{}' and '{}' would share snapshot file {}",
                previous, channel.name, file
            )));
        }
    }
    Ok(())
}

fn write_snapshot(dir: &Path, channel: &str, tree: &CoefficientTree) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_file_name(channel));
    std::fs::write(&path, tree.to_bytes()?)?;
    debug!("Wrote coefficient snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(config: PipelineConfig) -> Pipeline {
        Pipeline::new(config, &WaveletRegistry::with_builtin()).unwrap()
    }

    fn channel(name: &str, len: usize) -> Channel {
        Channel {
            name: name.to_string(),
            samples: (0..len).map(|i| (i as f64 * 0.3).sin()).collect(),
        }
    }

    #[test]
    fn test_process_channel_sections() {
        let p = pipeline(PipelineConfig::default());
        let report = p.process_channel(&channel("Cz", 256), 128.0).unwrap();

        assert_eq!(report.samples, 256);
        assert_eq!(report.features.as_ref().unwrap().bands.len(), 6);
        assert_eq!(report.table.as_ref().unwrap().table().len(), 256);
        assert!(report.denoised.is_none());

        // Flags and energy are dropped unless requested
        let detection = report.detection.unwrap();
        assert!(detection.flags.is_empty());
    }

    #[test]
    fn test_denoising_preset() {
        let p = pipeline(PipelineConfig::denoising());
        let report = p.process_channel(&channel("O1", 200), 100.0).unwrap();
        assert_eq!(report.denoised.unwrap().len(), 200);
        assert!(report.detection.is_none());
    }

    #[test]
    fn test_channel_too_short() {
        let p = pipeline(PipelineConfig::default());
        assert!(matches!(
            p.process_channel(&channel("Fz", 16), 128.0),
            Err(PipelineError::Dwt(_))
        ));
    }

    #[test]
    fn test_unknown_wavelet() {
        let mut config = PipelineConfig::default();
        config.decomposition.wavelet = "db99".into();
        assert!(matches!(
            Pipeline::new(config, &WaveletRegistry::with_builtin()),
            Err(PipelineError::FilterBank(_))
        ));
    }

    #[test]
    fn test_band_info_order() {
        let mut config = PipelineConfig::default();
        config.decomposition.levels = 2;
        let info = pipeline(config).band_info(256.0);
        let names: Vec<&str> = info.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["approximation_L2", "detail_L2", "detail_L1"]);
        assert_eq!((info[2].low_hz, info[2].high_hz), (64.0, 128.0));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = std::env::temp_dir().join(format!("eeg-wavelet-snapshots-{}", std::process::id()));
        let mut config = PipelineConfig::default();
        config.output.snapshot_dir = Some(dir.clone());
        config.detection.enabled = false;

        let p = pipeline(config);
        let ch = channel("T3/T5", 128);
        p.process_channel(&ch, 128.0).unwrap();

        let bytes = std::fs::read(dir.join("T3_T5.tree")).unwrap();
        let tree = CoefficientTree::from_bytes(&bytes).unwrap();
        assert_eq!(tree.signal_len(), 128);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_run_preserves_input_order() {
        let p = pipeline(PipelineConfig::default());
        let input = BatchInput {
            sampling_rate: 128.0,
            channels: vec![channel("Fp1", 300), channel("Fp2", 128), channel("C3", 512)],
        };

        let report = p.run(input).await.unwrap();
        let names: Vec<&str> = report.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Fp1", "Fp2", "C3"]);
        assert_eq!(report.bands.len(), 6);
    }

    #[tokio::test]
    async fn test_cancelled_batch_returns_nothing() {
        let p = pipeline(PipelineConfig::default());
        p.cancel_token().cancel();

        let input = BatchInput {
            sampling_rate: 128.0,
            channels: vec![channel("Fp1", 256)],
        };
        assert!(matches!(p.run(input).await, Err(PipelineError::Cancelled(name)) if name == "Fp1"));
    }

    #[tokio::test]
    async fn test_failing_channel_is_named() {
        let p = pipeline(PipelineConfig::default());
        let input = BatchInput {
            sampling_rate: 128.0,
            channels: vec![channel("ok", 256), channel("short", 8)],
        };
        match p.run(input).await {
            Err(PipelineError::Channel { channel, .. }) => assert_eq!(channel, "short"),
            other => panic!("expected channel error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_sampling_rate() {
        let p = pipeline(PipelineConfig::default());
        let input = BatchInput {
            sampling_rate: 0.0,
            channels: vec![],
        };
        assert!(matches!(p.run(input).await, Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_table_layouts() {
        let mut config = PipelineConfig::default();
        config.detection.enabled = false;
        let report = pipeline(config.clone()).process_channel(&channel("Pz", 64), 64.0).unwrap();
        let rows = serde_json::to_value(report.table.unwrap()).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 64);
        assert_eq!(rows[1]["timestamp"], 1.0 / 64.0);
        assert!(rows[1]["approximation_L5"].is_number());

        config.output.table_layout = TableLayout::Columns;
        let report = pipeline(config).process_channel(&channel("Pz", 64), 64.0).unwrap();
        let columns = serde_json::to_value(report.table.unwrap()).unwrap();
        assert_eq!(columns["timestamp"].as_array().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_colliding_snapshot_names_are_rejected() {
        let dir = std::env::temp_dir().join(format!("eeg-wavelet-collide-{}", std::process::id()));
        let mut config = PipelineConfig::default();
        config.output.snapshot_dir = Some(dir.clone());

        let input = BatchInput {
            sampling_rate: 128.0,
            channels: vec![channel("T3/T5", 128), channel("T3_T5", 128)],
        };
        assert!(matches!(pipeline(config).run(input).await, Err(PipelineError::InvalidInput(_))));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_failed_batch_writes_no_snapshots() {
        let dir = std::env::temp_dir().join(format!("eeg-wavelet-failed-{}", std::process::id()));
        let mut config = PipelineConfig::default();
        config.output.snapshot_dir = Some(dir.clone());
        config.detection.enabled = false;
        config.batch.max_concurrent_channels = 1;

        let input = BatchInput {
            sampling_rate: 128.0,
            channels: vec![channel("F7", 256), channel("short", 8), channel("F8", 256)],
        };
        assert!(matches!(
            pipeline(config).run(input).await,
            Err(PipelineError::Channel { ref channel, .. }) if channel == "short"
        ));
        assert!(!dir.join("F7.tree").exists());
        assert!(!dir.join("F8.tree").exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
