//! Pipeline Module
//! load -> reshape -> keep complete readings -> export -> compare -> plot.
//! Every stage returns an error instead of exiting; `main` decides the exit code.

use crate::charts::{ensure_chart_font, ChartOptions, ComparisonChartRenderer};
use crate::config::AnalysisConfig;
use crate::data::{export_csv, export_json, DataProcessor, LoadMode, SheetLoader};
use crate::stats::{ChannelComparison, NumericPolicy, StatsCalculator};
use anyhow::{Context, Result};
use log::{debug, info};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How the device sheet is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetLayout {
    /// Channels down the first column, samples across the first row.
    #[default]
    Transposed,
    /// Samples already in rows: first row headers, first column sample ids.
    Indexed,
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sp_file: PathBuf,
    pub pt_file: Option<PathBuf>,
    pub layout: SheetLayout,
    pub policy: NumericPolicy,
    pub analysis: AnalysisConfig,
}

/// Files written next to the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    pub table: PathBuf,
    pub chart: PathBuf,
    pub summary: PathBuf,
}

impl OutputPaths {
    /// `<base>.csv`, `<base>_comparison.png` and `<base>_stats.json` beside `input`.
    pub fn for_input(input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            table: input.with_extension("csv"),
            chart: input.with_file_name(format!("{}_comparison.png", stem)),
            summary: input.with_file_name(format!("{}_stats.json", stem)),
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outputs: OutputPaths,
    pub complete_readings: usize,
    pub eligible_participants: Option<usize>,
    pub comparisons: Vec<ChannelComparison>,
}

/// Load the device export in the requested layout, samples as rows.
pub fn load_measurements(path: &Path, layout: SheetLayout) -> Result<DataFrame> {
    let df = match layout {
        SheetLayout::Indexed => SheetLoader::load(path, LoadMode::Indexed)?,
        SheetLayout::Transposed => {
            let raw = SheetLoader::load(path, LoadMode::Raw)?;
            DataProcessor::transpose_and_promote(&raw)
                .with_context(|| format!("Reshaping '{}'", path.display()))?
        }
    };
    debug!("Measurement table: {} samples x {} columns", df.height(), df.width());
    Ok(df)
}

/// Participant to group mapping for fully eligible participants.
pub fn load_roster(path: &Path, config: &AnalysisConfig) -> Result<DataFrame> {
    let roster = SheetLoader::load(path, LoadMode::Indexed)?;
    let groups = DataProcessor::eligible_groups(&roster, &config.roster_flags, &config.group_column)
        .with_context(|| format!("Filtering roster '{}'", path.display()))?;
    Ok(groups)
}

pub fn run(config: &RunConfig) -> Result<RunReport> {
    let outputs = OutputPaths::for_input(&config.sp_file);

    info!("Loading {}", config.sp_file.display());
    let measurements = load_measurements(&config.sp_file, config.layout)?;

    // The mapping is not joined against the measurements yet
    let eligible_participants = match &config.pt_file {
        Some(path) => {
            info!("Loading roster {}", path.display());
            let groups = load_roster(path, &config.analysis)?;
            info!("{} eligible participants", groups.height());
            Some(groups.height())
        }
        None => None,
    };

    let complete = DataProcessor::filter_by_suffix(&measurements, &config.analysis.reading_suffix)
        .context("Selecting complete readings")?;
    info!(
        "{} of {} samples are complete readings",
        complete.height(),
        measurements.height()
    );

    export_csv(&complete, &outputs.table)?;
    info!("Wrote {}", outputs.table.display());

    let comparisons = StatsCalculator::compare_channels(&complete, &config.analysis, config.policy)?;
    for c in &comparisons {
        info!(
            "{}: n={} mean diff={:.4} t={:.4} p={:.4}",
            c.channel, c.test.n, c.test.mean_difference, c.test.statistic, c.test.p_value
        );
    }

    let options = ChartOptions {
        width: config.analysis.chart.width,
        height: config.analysis.chart.height,
        draw_text: ensure_chart_font(&config.analysis.chart.font_candidates),
    };
    ComparisonChartRenderer::render_to_file(&comparisons, &outputs.chart, &options)?;
    info!("Wrote {}", outputs.chart.display());

    let report = RunReport {
        outputs,
        complete_readings: complete.height(),
        eligible_participants,
        comparisons,
    };
    export_json(&report, &report.outputs.summary)?;
    info!("Wrote {}", report.outputs.summary.display());

    Ok(report)
}
