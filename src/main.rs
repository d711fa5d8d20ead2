use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use groupplot::grouping::NO_GROUPING;
use groupplot::runtime::{self, Selection};
use groupplot::table::{ResultsTable, TabularSource};
use groupplot::{csv_reader, parser, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "groupplot")]
#[command(about = "Build box-and-whisker charts from a results table", long_about = None)]
struct Args {
    /// Columns to plot as categories (e.g. 'Area, Mean, "Feret, max"')
    #[arg(short, long, default_value = "")]
    categories: String,

    /// Column whose values split rows into series; "*None*" for a single series
    #[arg(short, long, default_value = NO_GROUPING)]
    group_by: String,

    /// Table file (.csv, .tsv, .xls, .json); CSV from stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file; chart bytes go to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with render options (width, height, type, title, y_label)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format, overrides the config file and output extension
    #[arg(short, long, value_parser = ["png", "svg"])]
    format: Option<String>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    title: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut options = runtime::load_render_options(args.config.as_deref())?;
    if let Some(path) = &args.output {
        if let Some(format) = runtime::output_format_for(path)? {
            options.format = format;
        }
    }
    if let Some(format) = args.format.as_deref().and_then(OutputFormat::from_extension) {
        options.format = format;
    }
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    if args.title.is_some() {
        options.title = args.title.clone();
    }
    options.validate()?;

    let table = match &args.input {
        Some(path) => ResultsTable::from_path(path)?,
        None => ResultsTable::from_csv(
            csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?,
        ),
    };
    log::info!("Loaded table with {} rows", table.row_count());

    let selection = Selection {
        categories: parser::parse_column_list(&args.categories)?,
        group_by: args.group_by,
    };

    let bytes = runtime::render_boxplot(&table, &selection, options)?;

    match &args.output {
        Some(path) => std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .context("Failed to write chart to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
