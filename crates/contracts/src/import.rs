//! Shared shapes for the spreadsheet import result.
//!
//! Row numbers are 1-indexed spreadsheet rows: the header occupies row 1, so
//! the first data row is reported as row 2.

use serde::{Deserialize, Serialize};

use crate::domain::client::Client;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub field: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowWarning {
    pub row: usize,
    pub field: String,
    pub warning: String,
}

/// Aggregated outcome of an import batch. Rows with errors are excluded from
/// `imported` but never abort the batch; warnings are informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub success: bool,
    pub imported: usize,
    pub total: usize,
    pub errors: Vec<RowError>,
    pub warnings: Vec<RowWarning>,
    pub clients: Vec<Client>,
}

/// Spreadsheet row offset: one header row before the first data row.
pub const HEADER_ROWS: usize = 1;

/// Reported spreadsheet row for a 0-based data row index.
pub fn spreadsheet_row(data_index: usize) -> usize {
    data_index + HEADER_ROWS + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_data_row_is_row_two() {
        assert_eq!(spreadsheet_row(0), 2);
        assert_eq!(spreadsheet_row(2), 4);
    }
}
