use std::collections::HashMap;

use crate::error::AssemblyError;
use crate::grouping::{ColumnRef, GroupingConfig};
use crate::table::TabularSource;

/// Values feeding one (series, category) box, in table row order.
/// NaN cells are kept; the chart engine decides what to do with them.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub series: String,
    pub category: String,
    pub values: Vec<f64>,
}

/// Output of the assembler: every (series, category) pair has a bucket,
/// stored category-major in selection order, series in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedDataset {
    pub categories: Vec<String>,
    pub series: Vec<String>,
    pub buckets: Vec<Bucket>,
}

impl GroupedDataset {
    pub fn bucket(&self, series: &str, category: &str) -> Option<&Bucket> {
        let c = self.categories.iter().position(|c| c == category)?;
        let s = self.series.iter().position(|s| s == series)?;
        self.buckets.get(c * self.series.len() + s)
    }

    /// (series, values) pairs for one category, in series order
    pub fn category_series(&self, category: &str) -> Vec<(&str, &[f64])> {
        let Some(c) = self.categories.iter().position(|c| c == category) else {
            return Vec::new();
        };
        let n = self.series.len();
        self.buckets[c * n..(c + 1) * n]
            .iter()
            .map(|b| (b.series.as_str(), b.values.as_slice()))
            .collect()
    }

    pub fn is_single_series(&self) -> bool {
        self.series.len() == 1
    }

    pub fn total_values(&self) -> usize {
        self.buckets.iter().map(|b| b.values.len()).sum()
    }
}

/// Partition a table into (series, category) buckets.
///
/// Single pass over the rows: each row lands in exactly one series and adds
/// one value to that series' bucket for every selected category.
pub fn assemble<T: TabularSource + ?Sized>(
    table: &T,
    config: &GroupingConfig,
) -> Result<GroupedDataset, AssemblyError> {
    if config.categories.is_empty() {
        log::warn!("No category columns selected, nothing to plot");
        return Err(AssemblyError::NothingToPlot);
    }

    let mut series: Vec<String> = Vec::new();
    let mut series_index: HashMap<String, usize> = HashMap::new();
    // values[series][category]
    let mut values: Vec<Vec<Vec<f64>>> = Vec::new();

    if config.group_by == ColumnRef::NoGrouping {
        series.push(String::new());
        series_index.insert(String::new(), 0);
        values.push(vec![Vec::new(); config.categories.len()]);
    }

    for row in 0..table.row_count() {
        let key = config.group_by.series_key(table, row);
        let s = match series_index.get(&key) {
            Some(&s) => s,
            None => {
                let s = series.len();
                series.push(key.clone());
                series_index.insert(key, s);
                values.push(vec![Vec::new(); config.categories.len()]);
                s
            }
        };

        for (c, category) in config.categories.iter().enumerate() {
            values[s][c].push(table.numeric_value(category, row));
        }
    }

    let mut buckets = Vec::with_capacity(series.len() * config.categories.len());
    for (c, category) in config.categories.iter().enumerate() {
        for (s, key) in series.iter().enumerate() {
            buckets.push(Bucket {
                series: key.clone(),
                category: category.clone(),
                values: std::mem::take(&mut values[s][c]),
            });
        }
    }

    log::debug!(
        "Assembled {} rows into {} series x {} categories",
        table.row_count(),
        series.len(),
        config.categories.len()
    );

    Ok(GroupedDataset {
        categories: config.categories.clone(),
        series,
        buckets,
    })
}
