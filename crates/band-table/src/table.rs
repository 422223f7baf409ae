//! Table assembly

use crate::error::TableError;
use dwt_engine::{isolate_band, Band, CoefficientTree};
use filter_bank::Wavelet;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a band column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    /// The band reconstructed alone at full signal length
    #[default]
    Reconstructed,
    /// Raw band coefficients, padded with missing cells
    Coefficients,
}

/// One band column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandColumn {
    /// Column header (`approximation_L{L}` or `detail_L{k}`)
    pub name: String,
    /// Band the column was built from
    pub band: Band,
    /// One cell per row; `None` past the band's valid range
    pub values: Vec<Option<f64>>,
}

/// Signal plus one column per band, one row per input sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    sampling_rate: f64,
    source: ColumnSource,
    timestamp: Vec<f64>,
    original_signal: Vec<f64>,
    columns: Vec<BandColumn>,
}

impl BandTable {
    /// Build a table from `signal` and its decomposition.
    ///
    /// Band columns run `approximation_L{L}`, `detail_L{L}` .. `detail_L1`.
    pub fn build(
        signal: &[f64],
        tree: &CoefficientTree,
        wavelet: &Wavelet,
        sampling_rate: f64,
        source: ColumnSource,
    ) -> Result<Self, TableError> {
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Err(TableError::InvalidSamplingRate(sampling_rate));
        }
        if signal.len() != tree.signal_len() {
            return Err(TableError::LengthMismatch {
                signal: signal.len(),
                tree: tree.signal_len(),
            });
        }
        tree.validate_shape()?;

        let rows = signal.len();
        let levels = tree.levels();

        let columns = table_order(levels)
            .map(|band| -> Result<BandColumn, TableError> {
                let cells = match source {
                    ColumnSource::Reconstructed => isolate_band(tree, band, wavelet)?,
                    ColumnSource::Coefficients => tree.band(band).unwrap_or_default().to_vec(),
                };
                Ok(BandColumn {
                    name: band.column_name(levels),
                    band,
                    values: pad(cells, rows),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Built band table: {} rows, {} band columns ({:?})",
            rows,
            columns.len(),
            source
        );

        Ok(Self {
            sampling_rate,
            source,
            timestamp: (0..rows).map(|i| i as f64 / sampling_rate).collect(),
            original_signal: signal.to_vec(),
            columns,
        })
    }

    /// Table of isolated band signals
    pub fn reconstructed(
        signal: &[f64],
        tree: &CoefficientTree,
        wavelet: &Wavelet,
        sampling_rate: f64,
    ) -> Result<Self, TableError> {
        Self::build(signal, tree, wavelet, sampling_rate, ColumnSource::Reconstructed)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    /// Sampling rate the timestamps were derived from
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Content of the band columns
    pub fn source(&self) -> ColumnSource {
        self.source
    }

    /// Seconds since the first sample
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamp
    }

    /// Raw input samples
    pub fn original_signal(&self) -> &[f64] {
        &self.original_signal
    }

    /// Band columns in table order
    pub fn columns(&self) -> &[BandColumn] {
        &self.columns
    }

    /// Band column by header
    pub fn column(&self, name: &str) -> Option<&BandColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All headers, including `timestamp` and `original_signal`
    pub fn column_names(&self) -> Vec<&str> {
        ["timestamp", "original_signal"]
            .into_iter()
            .chain(self.columns.iter().map(|c| c.name.as_str()))
            .collect()
    }

    /// Row at `index`
    pub fn row(&self, index: usize) -> Option<TableRow<'_>> {
        (index < self.len()).then_some(TableRow { table: self, index })
    }

    /// Rows in time order
    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> + '_ {
        (0..self.len()).map(move |index| TableRow { table: self, index })
    }
}

/// Borrowed view of one row; serializes as a header-keyed map
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a BandTable,
    index: usize,
}

impl TableRow<'_> {
    /// Row position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Seconds since the first sample
    pub fn timestamp(&self) -> f64 {
        self.table.timestamp[self.index]
    }

    /// Raw sample
    pub fn original_signal(&self) -> f64 {
        self.table.original_signal[self.index]
    }

    /// Band cells in column order
    pub fn bands(&self) -> Vec<Option<f64>> {
        self.table
            .columns
            .iter()
            .map(|c| c.values[self.index])
            .collect()
    }
}

impl Serialize for TableRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.table.columns.len()))?;
        map.serialize_entry("timestamp", &self.timestamp())?;
        map.serialize_entry("original_signal", &self.original_signal())?;
        for column in &self.table.columns {
            map.serialize_entry(&column.name, &column.values[self.index])?;
        }
        map.end()
    }
}

fn table_order(levels: usize) -> impl Iterator<Item = Band> {
    std::iter::once(Band::Approximation).chain((1..=levels).rev().map(Band::Detail))
}

fn pad(cells: Vec<f64>, rows: usize) -> Vec<Option<f64>> {
    let mut padded: Vec<Option<f64>> = cells.into_iter().take(rows).map(Some).collect();
    padded.resize(rows, None);
    padded
}
