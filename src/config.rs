//! Analysis settings: channel names, site prefixes, roster flags and chart
//! geometry. Defaults match the device export; a JSON file may override any field.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Colorimetric channels compared between sites, in panel order.
    pub channels: Vec<String>,
    pub dorsal_prefix: String,
    pub volar_prefix: String,
    /// Suffix marking the complete reading, on sample labels and channel columns.
    pub reading_suffix: String,
    /// Roster columns that must all be true for a participant to count.
    pub roster_flags: Vec<String>,
    pub group_column: String,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Font files tried in order for chart text.
    pub font_candidates: Vec<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            channels: ["SCI_L", "SCI_a", "SCI_b", "SCE_L", "SCE_a", "SCE_b"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            dorsal_prefix: "D".to_string(),
            volar_prefix: "V".to_string(),
            reading_suffix: "2".to_string(),
            roster_flags: ["MRI_Scanned", "Spectrophotometer", "DermaLab"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            group_column: "Group".to_string(),
            chart: ChartConfig::default(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
            font_candidates: [
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/TTF/DejaVuSans.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
                "C:\\Windows\\Fonts\\arial.ttf",
            ]
            .iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Column holding a channel's complete reading at the dorsal site, e.g. `D_SCI_L_2`.
    pub fn dorsal_column(&self, channel: &str) -> String {
        self.site_column(&self.dorsal_prefix, channel)
    }

    /// Column holding a channel's complete reading at the volar site, e.g. `V_SCI_L_2`.
    pub fn volar_column(&self, channel: &str) -> String {
        self.site_column(&self.volar_prefix, channel)
    }

    fn site_column(&self, prefix: &str, channel: &str) -> String {
        format!("{}_{}_{}", prefix, channel, self.reading_suffix)
    }
}
