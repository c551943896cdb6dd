use thiserror::Error;

/// Required columns absent from the input table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("CSV file must contain these columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<&'static str>,
}
