use thiserror::Error;

/// Configuration problems detected while turning a column selection into
/// grouped buckets. None of these are fatal: the caller reports them and
/// produces no chart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("nothing to plot: no category columns were selected")]
    NothingToPlot,

    #[error("group-by column '{0}' does not exist in the table")]
    UnknownGroupColumn(String),

    #[error("table has no label column to group by")]
    NoLabelColumn,

    #[error("category column '{0}' does not exist in the table")]
    UnknownCategory(String),

    #[error("label column '{0}' cannot be plotted as a category")]
    LabelAsCategory(String),
}
