//! Command-line interface definitions.

use crate::config::AnalysisConfig;
use crate::pipeline::{RunConfig, SheetLayout};
use crate::stats::NumericPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Clean a spectrophotometer export and compare dorsal vs. volar readings.
#[derive(Parser, Debug)]
#[command(name = "spectro_compare", version, about)]
pub struct Cli {
    /// Spectrophotometer export (.ods).
    #[arg(short = 'd', long = "dir", visible_alias = "SP_file", value_name = "PATH")]
    pub sp_file: PathBuf,

    /// Participant eligibility roster (.ods).
    #[arg(long = "PT_file", value_name = "PATH")]
    pub pt_file: Option<PathBuf>,

    /// How the export is laid out.
    #[arg(long, value_enum, default_value_t = LayoutArg::Transposed)]
    pub layout: LayoutArg,

    /// Fail on non-numeric measurement cells instead of dropping them.
    #[arg(long)]
    pub strict: bool,

    /// JSON file overriding analysis settings.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Font file for chart text; tried before the built-in candidates.
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutArg {
    /// Channels down, samples across (raw device export).
    Transposed,
    /// Samples down, channels across.
    Indexed,
}

impl Cli {
    /// Resolve flags and the optional config file into a run configuration.
    pub fn into_run_config(self) -> Result<RunConfig, crate::config::ConfigError> {
        let mut analysis = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(font) = self.font {
            analysis.chart.font_candidates.insert(0, font);
        }

        Ok(RunConfig {
            sp_file: self.sp_file,
            pt_file: self.pt_file,
            layout: match self.layout {
                LayoutArg::Transposed => SheetLayout::Transposed,
                LayoutArg::Indexed => SheetLayout::Indexed,
            },
            policy: if self.strict {
                NumericPolicy::Strict
            } else {
                NumericPolicy::Lenient
            },
            analysis,
        })
    }
}
