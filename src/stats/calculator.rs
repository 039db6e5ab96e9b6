//! Statistics Calculator Module
//! Builds dorsal/volar paired series per channel and runs the paired t-test.

use crate::config::AnalysisConfig;
use crate::data::table;
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{column}' holds a non-numeric value '{value}'")]
    NonNumeric { column: String, value: String },
    #[error("Channel {channel}: {dorsal} dorsal values cannot be paired with {volar} volar values")]
    UnpairedSeries {
        channel: String,
        dorsal: usize,
        volar: usize,
    },
}

/// How cells that do not parse as numbers are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    /// Non-numeric cells become missing and are dropped.
    #[default]
    Lenient,
    /// Non-numeric cells are an error.
    Strict,
}

/// Descriptive statistics for one measurement site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub variance: f64,
}

impl Default for SiteStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
        }
    }
}

/// Dorsal and volar readings of one channel, index-aligned by sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSeries {
    pub channel: String,
    pub samples: Vec<String>,
    pub dorsal: Vec<f64>,
    pub volar: Vec<f64>,
}

impl PairedSeries {
    pub fn new(
        channel: &str,
        samples: Vec<String>,
        dorsal: Vec<f64>,
        volar: Vec<f64>,
    ) -> Result<Self, StatsError> {
        if dorsal.len() != volar.len() {
            return Err(StatsError::UnpairedSeries {
                channel: channel.to_string(),
                dorsal: dorsal.len(),
                volar: volar.len(),
            });
        }

        Ok(Self {
            channel: channel.to_string(),
            samples,
            dorsal,
            volar,
        })
    }

    pub fn len(&self) -> usize {
        self.dorsal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dorsal.is_empty()
    }
}

/// Result of a two-sided paired t-test.
#[derive(Debug, Clone, Serialize)]
pub struct PairedTTest {
    pub n: usize,
    pub mean_difference: f64,
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    pub is_significant: bool,
}

/// Everything computed for one channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelComparison {
    pub channel: String,
    pub dorsal_column: String,
    pub volar_column: String,
    pub test: PairedTTest,
    pub dorsal_stats: SiteStats,
    pub volar_stats: SiteStats,
    #[serde(skip)]
    pub series: PairedSeries,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> SiteStats {
        let n = values.len();
        if n == 0 {
            return SiteStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        SiteStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            variance,
        }
    }

    /// Sample label of every row, taken from the index column.
    fn sample_labels(df: &DataFrame) -> Result<Vec<String>, StatsError> {
        Ok(match table::index_name(df) {
            Some(index) => table::column_strings(df.column(&index)?)?
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect(),
            None => vec![String::new(); df.height()],
        })
    }

    /// Numeric value of every row of a column; `None` marks a missing cell.
    ///
    /// Returns `None` when the column does not exist. Cells that do not parse
    /// to a finite number are dropped under `Lenient` and rejected under `Strict`.
    pub fn site_cells(
        df: &DataFrame,
        column: &str,
        policy: NumericPolicy,
    ) -> Result<Option<Vec<Option<f64>>>, StatsError> {
        let Ok(raw) = df.column(column) else {
            return Ok(None);
        };

        let text = table::column_strings(raw)?;

        // Non-strict cast: unparseable cells come back null
        let numeric = raw.cast(&DataType::Float64)?;
        let numeric = numeric.f64()?;

        let mut cells = Vec::with_capacity(numeric.len());
        for (value, cell) in numeric.into_iter().zip(&text) {
            match (value, cell) {
                (Some(v), _) if v.is_finite() => cells.push(Some(v)),
                (_, Some(cell)) if policy == NumericPolicy::Strict => {
                    return Err(StatsError::NonNumeric {
                        column: column.to_string(),
                        value: cell.clone(),
                    });
                }
                _ => cells.push(None),
            }
        }

        Ok(Some(cells))
    }

    /// Dorsal and volar series for one channel, paired row by row.
    ///
    /// A sample enters the series only when both of its readings are present.
    /// When one site's column is absent the other must hold no values either.
    pub fn paired_series(
        df: &DataFrame,
        channel: &str,
        config: &AnalysisConfig,
        policy: NumericPolicy,
    ) -> Result<PairedSeries, StatsError> {
        let dorsal_cells = Self::site_cells(df, &config.dorsal_column(channel), policy)?;
        let volar_cells = Self::site_cells(df, &config.volar_column(channel), policy)?;

        let (dorsal_cells, volar_cells) = match (dorsal_cells, volar_cells) {
            (Some(dorsal), Some(volar)) => (dorsal, volar),
            (dorsal, volar) => {
                let present = |cells: Option<Vec<Option<f64>>>| -> Vec<f64> {
                    cells.into_iter().flatten().flatten().collect()
                };
                return PairedSeries::new(channel, Vec::new(), present(dorsal), present(volar));
            }
        };

        let labels = Self::sample_labels(df)?;
        let mut samples = Vec::new();
        let mut dorsal = Vec::new();
        let mut volar = Vec::new();
        for ((label, d), v) in labels.into_iter().zip(&dorsal_cells).zip(&volar_cells) {
            if let (Some(d), Some(v)) = (d, v) {
                samples.push(label);
                dorsal.push(*d);
                volar.push(*v);
            }
        }

        let unpaired = dorsal_cells.iter().chain(&volar_cells).flatten().count() - 2 * samples.len();
        if unpaired > 0 {
            debug!("{}: dropped {} readings without a partner", channel, unpaired);
        }

        PairedSeries::new(channel, samples, dorsal, volar)
    }

    /// Two-sided paired t-test on the dorsal minus volar differences.
    pub fn paired_ttest(series: &PairedSeries) -> PairedTTest {
        let n = series.len();
        let diffs: Vec<f64> = series
            .dorsal
            .iter()
            .zip(&series.volar)
            .map(|(d, v)| d - v)
            .collect();

        let mean = if n > 0 {
            diffs.iter().sum::<f64>() / n as f64
        } else {
            f64::NAN
        };

        if n < 2 {
            return PairedTTest {
                n,
                mean_difference: mean,
                statistic: f64::NAN,
                degrees_of_freedom: f64::NAN,
                p_value: f64::NAN,
                is_significant: false,
            };
        }

        let df = (n - 1) as f64;
        let sd = (diffs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / df).sqrt();

        let (statistic, p_value) = if sd == 0.0 {
            // No spread in the differences
            if mean == 0.0 {
                (0.0, 1.0)
            } else {
                (mean.signum() * f64::INFINITY, 0.0)
            }
        } else {
            let t = mean / (sd / (n as f64).sqrt());
            match StudentsT::new(0.0, 1.0, df) {
                Ok(dist) => (t, 2.0 * (1.0 - dist.cdf(t.abs()))),
                Err(_) => (t, f64::NAN),
            }
        };

        PairedTTest {
            n,
            mean_difference: mean,
            statistic,
            degrees_of_freedom: df,
            p_value,
            is_significant: p_value <= SIGNIFICANCE_THRESHOLD,
        }
    }

    /// Compare dorsal and volar readings for every configured channel.
    pub fn compare_channels(
        df: &DataFrame,
        config: &AnalysisConfig,
        policy: NumericPolicy,
    ) -> Result<Vec<ChannelComparison>, StatsError> {
        config
            .channels
            .iter()
            .map(|channel| -> Result<ChannelComparison, StatsError> {
                let series = Self::paired_series(df, channel, config, policy)?;
                let test = Self::paired_ttest(&series);
                debug!(
                    "{}: n={} t={:.4} p={:.4}",
                    channel, test.n, test.statistic, test.p_value
                );

                Ok(ChannelComparison {
                    channel: channel.clone(),
                    dorsal_column: config.dorsal_column(channel),
                    volar_column: config.volar_column(channel),
                    dorsal_stats: Self::compute_descriptive_stats(&series.dorsal),
                    volar_stats: Self::compute_descriptive_stats(&series.volar),
                    test,
                    series,
                })
            })
            .collect()
    }
}
