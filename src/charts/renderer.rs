//! Static Chart Renderer
//! Draws the dorsal/volar comparison as a PNG.
//!
//! Layout:
//! 1. One panel per channel, three panels per row (2 x 3 for the default channels)
//! 2. Each panel: a faint line per sample from its dorsal value (x = 0) to its
//!    volar value (x = 1), a shaded +/- 1 std band, and a bold mean line
//! 3. Panel title: "<channel> (p = <p-value>)", x ticks "Dorsal" / "Volar"

use super::font::CHART_FONT_FAMILY;
use crate::stats::{ChannelComparison, StatsCalculator};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

const PANEL_COLUMNS: usize = 3;

// Colors
const SAMPLE_LINE: RGBColor = RGBColor(110, 110, 110); // Individual samples
const BAND_FILL: RGBColor = RGBColor(91, 155, 213); // +/- 1 std
const SAMPLE_ALPHA: f64 = 0.3;
const BAND_ALPHA: f64 = 0.25;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to render chart '{}': {message}", .path.display())]
    Render { path: PathBuf, message: String },
}

/// Output geometry and whether text (titles, tick labels) is drawn.
#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub draw_text: bool,
}

/// Mean of one site with its +/- 1 standard deviation band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteBand {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl SiteBand {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let stats = StatsCalculator::compute_descriptive_stats(values);
        Some(Self {
            mean: stats.mean,
            lower: stats.mean - stats.std,
            upper: stats.mean + stats.std,
        })
    }
}

pub struct ComparisonChartRenderer;

impl ComparisonChartRenderer {
    /// Rows and columns of panels for `panels` channels.
    pub fn panel_grid(panels: usize) -> (usize, usize) {
        (panels.div_ceil(PANEL_COLUMNS).max(1), PANEL_COLUMNS)
    }

    pub fn panel_title(comparison: &ChannelComparison) -> String {
        format!("{} (p = {:.4})", comparison.channel, comparison.test.p_value)
    }

    /// Tick label at `x`; only the two site positions are named.
    fn site_label(x: f64) -> String {
        let label = if x.abs() < 1e-6 {
            "Dorsal"
        } else if (x - 1.0).abs() < 1e-6 {
            "Volar"
        } else {
            ""
        };
        label.to_string()
    }

    /// Y range covering every sample and both bands, padded by 10%.
    pub fn y_range(comparison: &ChannelComparison) -> (f64, f64) {
        let series = &comparison.series;
        let bands = [
            SiteBand::from_values(&series.dorsal),
            SiteBand::from_values(&series.volar),
        ];

        let values = series
            .dorsal
            .iter()
            .chain(&series.volar)
            .copied()
            .chain(bands.iter().flatten().flat_map(|b| [b.lower, b.upper]))
            .filter(|v| v.is_finite());

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            min = min.min(v);
            max = max.max(v);
        }

        if min.is_infinite() {
            return (0.0, 1.0);
        }
        if max - min < f64::EPSILON {
            return (min - 1.0, max + 1.0);
        }
        let pad = (max - min) * 0.1;
        (min - pad, max + pad)
    }

    /// Render every comparison into one image at `path`.
    pub fn render_to_file(
        comparisons: &[ChannelComparison],
        path: &Path,
        options: &ChartOptions,
    ) -> Result<(), ChartError> {
        let render_err = |e: &dyn std::fmt::Display| ChartError::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| render_err(&e))?;

        let panels = root.split_evenly(Self::panel_grid(comparisons.len()));
        for (area, comparison) in panels.iter().zip(comparisons) {
            Self::draw_panel(area, comparison, options).map_err(|e| render_err(&e))?;
        }

        root.present().map_err(|e| render_err(&e))?;
        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        comparison: &ChannelComparison,
        options: &ChartOptions,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let (y_min, y_max) = Self::y_range(comparison);

        let mut builder = ChartBuilder::on(area);
        builder.margin(12);
        if options.draw_text {
            builder
                .caption(
                    Self::panel_title(comparison),
                    (CHART_FONT_FAMILY, 20).into_font(),
                )
                .x_label_area_size(30)
                .y_label_area_size(50);
        }

        let mut chart = builder.build_cartesian_2d(-0.25f64..1.25f64, y_min..y_max)?;

        if options.draw_text {
            // Two x ticks over this range land on 0 and 1
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(2)
                .x_label_formatter(&|x| Self::site_label(*x))
                .y_labels(6)
                .draw()?;
        }

        let series = &comparison.series;

        // One faint line per sample
        chart.draw_series(series.dorsal.iter().zip(&series.volar).map(|(&d, &v)| {
            PathElement::new(
                vec![(0.0, d), (1.0, v)],
                SAMPLE_LINE.mix(SAMPLE_ALPHA).stroke_width(1),
            )
        }))?;

        if let (Some(dorsal), Some(volar)) = (
            SiteBand::from_values(&series.dorsal),
            SiteBand::from_values(&series.volar),
        ) {
            chart.draw_series(std::iter::once(Polygon::new(
                vec![
                    (0.0, dorsal.upper),
                    (1.0, volar.upper),
                    (1.0, volar.lower),
                    (0.0, dorsal.lower),
                ],
                BAND_FILL.mix(BAND_ALPHA).filled(),
            )))?;

            chart.draw_series(LineSeries::new(
                vec![(0.0, dorsal.mean), (1.0, volar.mean)],
                BLACK.stroke_width(3),
            ))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ensure_chart_font;
    use crate::config::ChartConfig;
    use crate::stats::{PairedSeries, PairedTTest, SiteStats};
    use tempfile::tempdir;

    fn comparison(channel: &str, dorsal: &[f64], volar: &[f64], p_value: f64) -> ChannelComparison {
        let samples = (0..dorsal.len()).map(|i| format!("S{}_2", i + 1)).collect();
        let series = PairedSeries::new(channel, samples, dorsal.to_vec(), volar.to_vec()).unwrap();
        ChannelComparison {
            channel: channel.to_string(),
            dorsal_column: format!("D_{}_2", channel),
            volar_column: format!("V_{}_2", channel),
            test: PairedTTest {
                n: dorsal.len(),
                mean_difference: 0.0,
                statistic: 0.0,
                degrees_of_freedom: f64::NAN,
                p_value,
                is_significant: false,
            },
            dorsal_stats: SiteStats::default(),
            volar_stats: SiteStats::default(),
            series,
        }
    }

    #[test]
    fn six_channels_fill_two_rows() {
        assert_eq!(ComparisonChartRenderer::panel_grid(6), (2, 3));
        assert_eq!(ComparisonChartRenderer::panel_grid(4), (2, 3));
        assert_eq!(ComparisonChartRenderer::panel_grid(0), (1, 3));
    }

    #[test]
    fn titles_carry_four_decimal_p_values() {
        let c = comparison("SCI_L", &[1.0, 2.0], &[1.0, 3.0], 0.123456);
        assert_eq!(ComparisonChartRenderer::panel_title(&c), "SCI_L (p = 0.1235)");

        let empty = comparison("SCE_b", &[], &[], f64::NAN);
        assert_eq!(ComparisonChartRenderer::panel_title(&empty), "SCE_b (p = NaN)");
    }

    #[test]
    fn band_is_one_std_around_mean() {
        let band = SiteBand::from_values(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(band.mean, 2.0);
        assert_eq!(band.lower, 1.0);
        assert_eq!(band.upper, 3.0);
        assert!(SiteBand::from_values(&[]).is_none());
    }

    #[test]
    fn y_range_covers_data_and_handles_empty_panels() {
        let c = comparison("SCI_L", &[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0], 1.0);
        let (lo, hi) = ComparisonChartRenderer::y_range(&c);
        assert!(lo < 1.0 && hi > 3.0);

        let empty = comparison("SCI_a", &[], &[], f64::NAN);
        assert_eq!(ComparisonChartRenderer::y_range(&empty), (0.0, 1.0));

        let flat = comparison("SCI_b", &[5.0], &[5.0], f64::NAN);
        assert_eq!(ComparisonChartRenderer::y_range(&flat), (4.0, 6.0));
    }

    #[test]
    fn renders_png_with_empty_panels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export_comparison.png");
        let mut comparisons = vec![comparison("SCI_L", &[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0], 1.0)];
        for channel in ["SCI_a", "SCI_b", "SCE_L", "SCE_a", "SCE_b"] {
            comparisons.push(comparison(channel, &[], &[], f64::NAN));
        }

        let options = ChartOptions {
            width: 600,
            height: 400,
            draw_text: ensure_chart_font(&ChartConfig::default().font_candidates),
        };
        ComparisonChartRenderer::render_to_file(&comparisons, &path, &options).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (600, 400));
    }

    #[test]
    fn site_labels_name_only_the_two_sites() {
        assert_eq!(ComparisonChartRenderer::site_label(0.0), "Dorsal");
        assert_eq!(ComparisonChartRenderer::site_label(1.0), "Volar");
        assert_eq!(ComparisonChartRenderer::site_label(0.5), "");
    }

    /// Pixels of panel `index` in a 2 x 3 grid.
    fn panel_pixels(img: &image::RgbImage, index: u32) -> Vec<[u8; 3]> {
        let (w, h) = (img.width() / 3, img.height() / 2);
        let (x0, y0) = ((index % 3) * w, (index / 3) * h);
        (y0..y0 + h)
            .flat_map(|y| (x0..x0 + w).map(move |x| (x, y)))
            .map(|(x, y)| img.get_pixel(x, y).0)
            .collect()
    }

    fn is_mean_line(p: &[u8; 3]) -> bool {
        *p == [0, 0, 0]
    }

    fn is_band(p: &[u8; 3]) -> bool {
        p[2] as i32 - p[0] as i32 > 20
    }

    fn is_sample_line(p: &[u8; 3]) -> bool {
        p[0] == p[1] && p[1] == p[2] && (150..245).contains(&p[0])
    }

    #[test]
    fn panels_show_lines_band_and_mean_in_channel_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export_comparison.png");
        // Dorsal 6.0 sits outside the band so part of its sample line is bare grey
        let mut comparisons = vec![comparison("SCI_L", &[1.0, 2.0, 6.0], &[1.0, 3.0, 2.0], 0.5)];
        for channel in ["SCI_a", "SCI_b", "SCE_L", "SCE_a"] {
            comparisons.push(comparison(channel, &[], &[], f64::NAN));
        }
        comparisons.push(comparison("SCE_b", &[4.0, 5.0], &[6.0, 5.5], 0.3));

        let options = ChartOptions {
            width: 600,
            height: 400,
            draw_text: false,
        };
        ComparisonChartRenderer::render_to_file(&comparisons, &path, &options).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();

        for drawn in [0, 5] {
            let pixels = panel_pixels(&img, drawn);
            assert!(pixels.iter().any(is_mean_line), "panel {drawn} has no mean line");
            assert!(pixels.iter().any(is_band), "panel {drawn} has no band");
        }
        assert!(panel_pixels(&img, 0).iter().any(is_sample_line));

        for empty in 1..5 {
            assert!(
                panel_pixels(&img, empty).iter().all(|p| *p == [255, 255, 255]),
                "panel {empty} should be blank"
            );
        }
    }
}
