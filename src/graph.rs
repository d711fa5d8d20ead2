use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::data::Quartiles;
use plotters::prelude::*;
use std::ops::Range;

use crate::assemble::GroupedDataset;
use crate::{OutputFormat, RenderOptions};

/// Consumer of assembled buckets: computes box statistics and draws them
pub trait ChartEngine {
    type Output;

    fn render(&mut self, dataset: &GroupedDataset) -> Result<Self::Output>;
}

/// How a single value sits relative to its box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClass {
    Regular,
    /// Between 1.5 and 2 IQR outside the box
    Outlier,
    /// More than 2 IQR outside the box
    FarOut,
}

/// Box statistics for one bucket
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub outliers: Vec<f64>,
    pub far_outs: Vec<f64>,
}

impl BoxSummary {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn classify(&self, value: f64) -> PointClass {
        let iqr = self.iqr();
        if value < self.q1 - 2.0 * iqr || value > self.q3 + 2.0 * iqr {
            PointClass::FarOut
        } else if value < self.q1 - 1.5 * iqr || value > self.q3 + 1.5 * iqr {
            PointClass::Outlier
        } else {
            PointClass::Regular
        }
    }
}

/// Summarize a bucket. NaN values are skipped; a bucket with no finite
/// values has no box and renders as a gap.
pub fn summarize(values: &[f64]) -> Option<BoxSummary> {
    let finite = finite_values(values);
    if finite.is_empty() {
        return None;
    }

    // plotters reports quartiles as f32; values are classified against those
    let [_, q1, median, q3, _] = Quartiles::new(&finite).values();
    let mut summary = BoxSummary {
        q1: q1 as f64,
        median: median as f64,
        q3: q3 as f64,
        outliers: Vec::new(),
        far_outs: Vec::new(),
    };

    for &v in &finite {
        match summary.classify(v) {
            PointClass::Outlier => summary.outliers.push(v),
            PointClass::FarOut => summary.far_outs.push(v),
            PointClass::Regular => {}
        }
    }

    Some(summary)
}

fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Box-and-whisker chart drawn with plotters
pub struct BoxplotChart {
    options: RenderOptions,
}

impl BoxplotChart {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn render_png(&self, dataset: &GroupedDataset) -> Result<Vec<u8>> {
        let (width, height) = (self.options.width, self.options.height);
        let size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| anyhow::anyhow!("Canvas {}x{} is too large", width, height))?;
        let mut buffer = vec![0u8; size];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            draw_boxplot(&root, dataset, &self.options)?;
            root.present().context("Failed to present drawing")?;
        }

        let mut png_bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_bytes)
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
        Ok(png_bytes)
    }

    fn render_svg(&self, dataset: &GroupedDataset) -> Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.options.width, self.options.height))
                .into_drawing_area();
            draw_boxplot(&root, dataset, &self.options)?;
            root.present().context("Failed to present drawing")?;
        }
        Ok(svg.into_bytes())
    }
}

impl ChartEngine for BoxplotChart {
    type Output = Vec<u8>;

    fn render(&mut self, dataset: &GroupedDataset) -> Result<Vec<u8>> {
        self.options.validate()?;
        log::debug!(
            "Rendering {:?} boxplot {}x{}",
            self.options.format,
            self.options.width,
            self.options.height
        );
        match self.options.format {
            OutputFormat::Png => self.render_png(dataset),
            OutputFormat::Svg => self.render_svg(dataset),
        }
    }
}

/// Value range over every finite value, padded by 5% on each side
fn value_range(dataset: &GroupedDataset) -> Result<Range<f32>> {
    let all: Vec<f64> = dataset
        .buckets
        .iter()
        .flat_map(|b| finite_values(&b.values))
        .collect();
    if all.is_empty() {
        anyhow::bail!("Selected columns contain no numeric values");
    }

    let min = all.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = all.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    };
    Ok(range.start as f32..range.end as f32)
}

/// X position of a (series, category) box. Categories sit on integers;
/// series are dodged side by side within 0.8 of a category slot.
fn box_position(category: usize, series: usize, n_series: usize) -> f64 {
    let slot = 0.8 / n_series as f64;
    category as f64 + (series as f64 - (n_series as f64 - 1.0) / 2.0) * slot
}

fn draw_boxplot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    dataset: &GroupedDataset,
    options: &RenderOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let n_categories = dataset.categories.len();
    let n_series = dataset.series.len().max(1);
    let y_range = value_range(dataset)?;
    let x_range = -0.5..(n_categories as f64 - 0.5);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(options.title.as_deref().unwrap_or(""), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    let categories = dataset.categories.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n_categories + 1)
        .x_label_formatter(&|x| {
            let idx = x.round();
            if (x - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            categories.get(idx as usize).cloned().unwrap_or_default()
        })
        .y_desc(options.y_label.as_deref().unwrap_or("Value"))
        .draw()
        .context("Failed to draw mesh")?;

    let box_px = ((options.width as f64 * 0.6) / (n_categories * n_series) as f64).clamp(4.0, 60.0) as u32;

    for (s, key) in dataset.series.iter().enumerate() {
        let color = Palette99::pick(s).to_rgba();
        let mut boxes = Vec::new();
        let mut outliers = Vec::new();
        let mut far_outs = Vec::new();

        for (c, category) in dataset.categories.iter().enumerate() {
            let Some(bucket) = dataset.bucket(key, category) else {
                continue;
            };
            let finite = finite_values(&bucket.values);
            let Some(summary) = summarize(&finite) else {
                log::debug!("Empty bucket ({key:?}, {category:?}) left as a gap");
                continue;
            };

            let x = box_position(c, s, n_series);
            boxes.push(
                Boxplot::new_vertical(x, &Quartiles::new(&finite))
                    .width(box_px)
                    .whisker_width(0.5)
                    .style(color.stroke_width(2)),
            );
            outliers.extend(summary.outliers.iter().map(|&v| (x, v as f32)));
            far_outs.extend(summary.far_outs.iter().map(|&v| (x, v as f32)));
        }

        let anno = chart
            .draw_series(boxes)
            .context("Failed to draw boxes")?;
        if !dataset.is_single_series() {
            anno.label(key.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
        }

        chart
            .draw_series(outliers.into_iter().map(|p| Circle::new(p, 3, color.stroke_width(1))))
            .context("Failed to draw outliers")?;
        chart
            .draw_series(far_outs.into_iter().map(|p| Circle::new(p, 3, color.filled())))
            .context("Failed to draw far-outs")?;
    }

    if !dataset.is_single_series() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .draw()
            .context("Failed to draw legend")?;
    }

    Ok(())
}
