use std::collections::HashSet;

use crate::error::AssemblyError;
use crate::table::TabularSource;

/// Choice offered to the user for "no grouping column"
pub const NO_GROUPING: &str = "*None*";

/// Where a row's series key comes from. Decided once, against the table,
/// when the configuration is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// Every row belongs to the single series keyed by ""
    NoGrouping,
    LabelColumn,
    Named(String),
}

impl ColumnRef {
    /// Resolve the user's group-by choice.
    ///
    /// An exact match to a regular column wins over the label column. A name
    /// that matches neither is an error, never an implicit label fallback.
    pub fn from_choice<T: TabularSource + ?Sized>(
        table: &T,
        choice: &str,
    ) -> Result<Self, AssemblyError> {
        if choice == NO_GROUPING {
            return Ok(ColumnRef::NoGrouping);
        }

        let label = table.label_column();
        if let Some(idx) = table.column_index(choice) {
            if Some(idx) != label {
                return Ok(ColumnRef::Named(choice.to_string()));
            }
            return Ok(ColumnRef::LabelColumn);
        }

        // "Label" also names a label column detected without that heading
        if choice == crate::table::LABEL_HEADING {
            return match label {
                Some(_) => Ok(ColumnRef::LabelColumn),
                None => Err(AssemblyError::NoLabelColumn),
            };
        }
        Err(AssemblyError::UnknownGroupColumn(choice.to_string()))
    }

    /// Series key of one row
    pub fn series_key<T: TabularSource + ?Sized>(&self, table: &T, row: usize) -> String {
        match self {
            ColumnRef::NoGrouping => String::new(),
            ColumnRef::LabelColumn => table.label_value(row),
            ColumnRef::Named(heading) => table.string_value(heading, row),
        }
    }
}

/// Validated column selection: which columns become categories and how
/// rows split into series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingConfig {
    pub categories: Vec<String>,
    pub group_by: ColumnRef,
}

impl GroupingConfig {
    /// Build a configuration from raw user choices.
    ///
    /// Categories keep selection order with duplicates dropped. An empty
    /// category list is accepted here and reported by the assembler.
    pub fn resolve<T: TabularSource + ?Sized>(
        table: &T,
        categories: &[String],
        group_by: &str,
    ) -> Result<Self, AssemblyError> {
        let group_by = ColumnRef::from_choice(table, group_by)?;

        let label = table.label_column();
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(categories.len());
        for name in categories {
            match table.column_index(name) {
                None => return Err(AssemblyError::UnknownCategory(name.clone())),
                Some(idx) if Some(idx) == label => {
                    return Err(AssemblyError::LabelAsCategory(name.clone()))
                }
                Some(_) => {
                    if seen.insert(name.as_str()) {
                        resolved.push(name.clone());
                    }
                }
            }
        }

        Ok(Self {
            categories: resolved,
            group_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ResultsTable;

    fn make_table() -> ResultsTable {
        ResultsTable::new(
            vec!["Label".into(), "A".into(), "B".into(), "Group".into()],
            vec![
                vec!["g1".into(), "1".into(), "10".into(), "x".into()],
                vec!["g2".into(), "2".into(), "20".into(), "y".into()],
            ],
        )
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_none_choice() {
        let t = make_table();
        assert_eq!(ColumnRef::from_choice(&t, "*None*").unwrap(), ColumnRef::NoGrouping);
    }

    #[test]
    fn test_label_choice() {
        let t = make_table();
        assert_eq!(ColumnRef::from_choice(&t, "Label").unwrap(), ColumnRef::LabelColumn);
    }

    #[test]
    fn test_named_choice() {
        let t = make_table();
        assert_eq!(
            ColumnRef::from_choice(&t, "Group").unwrap(),
            ColumnRef::Named("Group".into())
        );
    }

    #[test]
    fn test_unknown_choice_is_error() {
        let t = make_table();
        assert_eq!(
            ColumnRef::from_choice(&t, "Missing"),
            Err(AssemblyError::UnknownGroupColumn("Missing".into()))
        );
    }

    #[test]
    fn test_label_choice_without_label_column() {
        let t = ResultsTable::new(vec!["A".into()], vec![vec!["1".into()]]);
        assert_eq!(
            ColumnRef::from_choice(&t, "Label"),
            Err(AssemblyError::NoLabelColumn)
        );
    }

    #[test]
    fn test_implicit_label_column_by_its_heading() {
        let t = ResultsTable::new(
            vec!["Name".into(), "A".into()],
            vec![vec!["roi".into(), "1".into()]],
        );
        assert_eq!(ColumnRef::from_choice(&t, "Name").unwrap(), ColumnRef::LabelColumn);
    }

    #[test]
    fn test_label_choice_with_implicit_label_column() {
        let t = ResultsTable::new(
            vec!["Name".into(), "A".into()],
            vec![vec!["roi1".into(), "1".into()], vec!["roi2".into(), "2".into()]],
        );
        assert_eq!(t.label_column(), Some(0));
        assert_eq!(ColumnRef::from_choice(&t, "Label").unwrap(), ColumnRef::LabelColumn);
        assert_eq!(ColumnRef::LabelColumn.series_key(&t, 1), "roi2");
    }

    #[test]
    fn test_series_key() {
        let t = make_table();
        assert_eq!(ColumnRef::NoGrouping.series_key(&t, 0), "");
        assert_eq!(ColumnRef::LabelColumn.series_key(&t, 1), "g2");
        assert_eq!(ColumnRef::Named("Group".into()).series_key(&t, 0), "x");
    }

    #[test]
    fn test_resolve_dedupes_categories_in_order() {
        let t = make_table();
        let cfg = GroupingConfig::resolve(&t, &names(&["B", "A", "B"]), "Label").unwrap();
        assert_eq!(cfg.categories, names(&["B", "A"]));
        assert_eq!(cfg.group_by, ColumnRef::LabelColumn);
    }

    #[test]
    fn test_resolve_unknown_category() {
        let t = make_table();
        assert_eq!(
            GroupingConfig::resolve(&t, &names(&["A", "C"]), "*None*"),
            Err(AssemblyError::UnknownCategory("C".into()))
        );
    }

    #[test]
    fn test_resolve_label_as_category() {
        let t = make_table();
        assert_eq!(
            GroupingConfig::resolve(&t, &names(&["Label"]), "*None*"),
            Err(AssemblyError::LabelAsCategory("Label".into()))
        );
    }

    #[test]
    fn test_resolve_empty_categories_accepted() {
        let t = make_table();
        let cfg = GroupingConfig::resolve(&t, &[], "*None*").unwrap();
        assert!(cfg.categories.is_empty());
    }
}
