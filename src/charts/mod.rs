//! Charts module - static comparison chart rendering

mod font;
mod renderer;

pub use font::ensure_chart_font;
pub use renderer::{ChartOptions, ComparisonChartRenderer};
