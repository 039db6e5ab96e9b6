//! Stats module - paired dorsal/volar comparison

mod calculator;

pub use calculator::{
    ChannelComparison, NumericPolicy, PairedSeries, PairedTTest, SiteStats, StatsCalculator,
};
