// Runtime executor: table + column selection -> chart bytes

use anyhow::{Context, Result};
use std::path::Path;

use crate::assemble::{self, GroupedDataset};
use crate::graph::{BoxplotChart, ChartEngine};
use crate::grouping::{GroupingConfig, NO_GROUPING};
use crate::table::TabularSource;
use crate::{OutputFormat, RenderOptions};

/// Raw column choices as the user made them
#[derive(Debug, Clone)]
pub struct Selection {
    pub categories: Vec<String>,
    pub group_by: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            group_by: NO_GROUPING.to_string(),
        }
    }
}

/// Resolve a selection against a table and assemble its buckets
pub fn prepare<T: TabularSource + ?Sized>(table: &T, selection: &Selection) -> Result<GroupedDataset> {
    let config = GroupingConfig::resolve(table, &selection.categories, &selection.group_by)?;
    log::debug!("Resolved grouping: {:?}", config);
    let dataset = assemble::assemble(table, &config)?;
    log::info!(
        "Grouped {} values into {} series over {} categories",
        dataset.total_values(),
        dataset.series.len(),
        dataset.categories.len()
    );
    Ok(dataset)
}

/// Assemble and hand the dataset to any chart engine
pub fn render_with<T, E>(table: &T, selection: &Selection, engine: &mut E) -> Result<E::Output>
where
    T: TabularSource + ?Sized,
    E: ChartEngine,
{
    let dataset = prepare(table, selection)?;
    engine.render(&dataset).context("Failed to render chart")
}

/// Render a box-and-whisker chart to PNG or SVG bytes
pub fn render_boxplot<T: TabularSource + ?Sized>(
    table: &T,
    selection: &Selection,
    options: RenderOptions,
) -> Result<Vec<u8>> {
    render_with(table, selection, &mut BoxplotChart::new(options))
}

/// Load render options from a JSON file; defaults when no file is given
pub fn load_render_options(path: Option<&Path>) -> Result<RenderOptions> {
    let Some(path) = path else {
        return Ok(RenderOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse options file '{}'", path.display()))
}

/// Format implied by an output file name. No extension leaves the choice
/// to the options; an extension no backend can write is an error.
pub fn output_format_for(path: &Path) -> Result<Option<OutputFormat>> {
    let Some(ext) = path.extension() else {
        return Ok(None);
    };
    let ext = ext.to_string_lossy();
    match OutputFormat::from_extension(&ext) {
        Some(format) => Ok(Some(format)),
        None => anyhow::bail!(
            "Unsupported output extension '.{}' for '{}' (use .png or .svg)",
            ext,
            path.display()
        ),
    }
}
