use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::ops::Range;
use std::path::Path;

use latplot_common::{LatplotError, Result};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::stats::{bin_count, cdf_points, density_histogram, Analysis, HistogramBin};

const FIGURE_WIDTH_IN: u32 = 16;
const FIGURE_HEIGHT_IN: u32 = 6;
const METERS_PER_INCH: f64 = 0.0254;

const CDF_COLOR: RGBColor = RGBColor(0x2E, 0x86, 0xAB);
const HIST_COLOR: RGBColor = RGBColor(0xA2, 0x3B, 0x72);
const P50_COLOR: RGBColor = RGBColor(0x00, 0x80, 0x00);
const P90_COLOR: RGBColor = RGBColor(0xFF, 0xA5, 0x00);

type DrawResult = std::result::Result<(), Box<dyn Error>>;
type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Sizes are specified in points and scaled to pixels at the figure's DPI.
struct Scale {
    dpi: u32,
}

impl Scale {
    fn px(&self, points: f64) -> u32 {
        ((points * self.dpi as f64 / 72.0).round() as u32).max(1)
    }

    fn font(&self, points: f64) -> (&'static str, u32) {
        ("sans-serif", self.px(points))
    }
}

/// Pixel size of the figure at `dpi`.
pub fn figure_size(dpi: u32) -> (u32, u32) {
    (FIGURE_WIDTH_IN * dpi, FIGURE_HEIGHT_IN * dpi)
}

/// X-axis window shared by both panels: `[0.95 * filtered min, 1.05 * P99]`.
///
/// A window that collapses (all samples zero) is widened by one cycle.
pub fn x_range(analysis: &Analysis) -> Range<f64> {
    let lo = analysis.filtered_summary.min as f64 * 0.95;
    let mut hi = analysis.summary.percentiles.p99 * 1.05;
    if hi <= lo {
        hi = lo + 1.0;
    }
    lo..hi
}

/// Histogram drawn in the PDF panel, over the filtered samples.
pub fn pdf_bins(analysis: &Analysis) -> Vec<HistogramBin> {
    density_histogram(&analysis.filtered, bin_count(analysis.filtered.len()))
}

/// Write the CDF and PDF panels side by side as a PNG at `path`.
///
/// The figure measures 16 x 6 inches at `dpi`, which is also recorded in the
/// file's pHYs chunk. An existing file is replaced.
pub fn render(path: &Path, analysis: &Analysis, dpi: u32) -> Result<()> {
    let render_err = |reason: String| LatplotError::Render { path: path.to_path_buf(), reason };

    let scale = Scale { dpi };
    let (width, height) = figure_size(dpi);
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    draw_figure(&mut pixels, (width, height), analysis, &scale).map_err(|e| render_err(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LatplotError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| LatplotError::io(path, e))?;
    write_png(BufWriter::new(file), &pixels, (width, height), dpi)
        .map_err(|e| render_err(e.to_string()))
}

fn draw_figure(pixels: &mut [u8], size: (u32, u32), analysis: &Analysis, scale: &Scale) -> DrawResult {
    let root = BitMapBackend::with_buffer(pixels, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let x = x_range(analysis);
    draw_cdf(&panels[0], analysis, x.clone(), scale)?;
    draw_pdf(&panels[1], analysis, x, scale)?;

    root.present()?;
    Ok(())
}

/// Encode an RGB buffer, tagging it with the resolution in pixels per meter.
fn write_png<W: std::io::Write>(
    out: W,
    pixels: &[u8],
    (width, height): (u32, u32),
    dpi: u32,
) -> std::result::Result<(), png::EncodingError> {
    let ppm = (dpi as f64 / METERS_PER_INCH).round() as u32;
    let mut encoder = png::Encoder::new(out, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)?;
    writer.finish()
}

fn draw_cdf(panel: &Panel<'_>, analysis: &Analysis, x: Range<f64>, scale: &Scale) -> DrawResult {
    let mut chart = ChartBuilder::on(panel)
        .caption("Latency CDF (<= P99)", scale.font(16.0))
        .margin(scale.px(10.0))
        .x_label_area_size(scale.px(36.0))
        .y_label_area_size(scale.px(48.0))
        .build_cartesian_2d(x, 0.0f64..100.0f64)?;
    draw_mesh(&mut chart, "Latency (CPU cycles)", "Cumulative probability (%)", scale)?;

    chart.draw_series(LineSeries::new(
        cdf_points(&analysis.filtered),
        CDF_COLOR.mix(0.8).stroke_width(scale.px(2.5)),
    ))?;

    let p = &analysis.summary.percentiles;
    draw_marker(&mut chart, p.p50, 100.0, P50_COLOR, format!("P50: {:.0} cycles", p.p50), scale)?;
    draw_marker(&mut chart, p.p90, 100.0, P90_COLOR, format!("P90: {:.0} cycles", p.p90), scale)?;
    draw_marker(&mut chart, p.p99, 100.0, RED, format!("P99: {:.0} cycles", p.p99), scale)?;

    draw_legend(&mut chart, SeriesLabelPosition::LowerRight, scale)
}

fn draw_pdf(panel: &Panel<'_>, analysis: &Analysis, x: Range<f64>, scale: &Scale) -> DrawResult {
    let bins = pdf_bins(analysis);
    let y_max = bins.iter().map(|b| b.density).fold(0.0f64, f64::max).max(1e-12) * 1.1;

    let mut chart = ChartBuilder::on(panel)
        .caption("Latency PDF (<= P99)", scale.font(16.0))
        .margin(scale.px(10.0))
        .x_label_area_size(scale.px(36.0))
        .y_label_area_size(scale.px(60.0))
        .build_cartesian_2d(x.clone(), 0.0f64..y_max)?;
    draw_mesh(&mut chart, "Latency (CPU cycles)", "Probability density", scale)?;

    // Bins can stick out of the window when every sample is equal.
    let clipped: Vec<(f64, f64, f64)> = bins
        .iter()
        .map(|b| (b.start.max(x.start), b.end.min(x.end), b.density))
        .filter(|(x0, x1, _)| x1 > x0)
        .collect();
    let fill = HIST_COLOR.mix(0.7).filled();
    let edge = BLACK.stroke_width(scale.px(0.5));
    chart.draw_series(
        clipped.iter().map(|&(x0, x1, d)| Rectangle::new([(x0, 0.0), (x1, d)], fill)),
    )?;
    chart.draw_series(
        clipped.iter().map(|&(x0, x1, d)| Rectangle::new([(x0, 0.0), (x1, d)], edge)),
    )?;

    let f = &analysis.filtered_summary;
    draw_marker(&mut chart, f.mean, y_max, RED, format!("Mean: {:.1} cycles", f.mean), scale)?;
    draw_marker(&mut chart, f.median, y_max, BLUE, format!("Median: {:.0} cycles", f.median), scale)?;

    draw_legend(&mut chart, SeriesLabelPosition::UpperRight, scale)
}

fn draw_mesh<'a, 'b: 'a>(
    chart: &mut Chart<'a, 'b>,
    x_desc: &str,
    y_desc: &str,
    scale: &Scale,
) -> DrawResult {
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(scale.font(11.0))
        .axis_desc_style(scale.font(12.0))
        .draw()?;
    Ok(())
}

/// Vertical reference line spanning the full height, with a legend entry.
fn draw_marker<'a, 'b: 'a>(
    chart: &mut Chart<'a, 'b>,
    x: f64,
    y_max: f64,
    color: RGBColor,
    label: String,
    scale: &Scale,
) -> DrawResult {
    let width = scale.px(1.5);
    let len = scale.px(20.0) as i32;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x, 0.0), (x, y_max)],
            color.mix(0.8).stroke_width(width),
        )))?
        .label(label)
        .legend(move |(lx, ly)| PathElement::new(vec![(lx, ly), (lx + len, ly)], color.stroke_width(width)));
    Ok(())
}

fn draw_legend<'a, 'b: 'a>(
    chart: &mut Chart<'a, 'b>,
    position: SeriesLabelPosition,
    scale: &Scale,
) -> DrawResult {
    chart
        .configure_series_labels()
        .position(position)
        .legend_area_size(scale.px(24.0))
        .label_font(scale.font(10.0))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}
