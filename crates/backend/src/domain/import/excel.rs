//! Spreadsheet parsing: uploaded bytes to raw client drafts.
//!
//! Columns are located by header name, so users may reorder or drop columns.
//! Cell-level problems never fail the parse; every data row becomes a draft
//! and the shared normalization pass decides what is an error.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use contracts::domain::client::ClientDraft;
use contracts::import::spreadsheet_row;

/// Column order of the generated template. Import matches by name, not
/// position.
pub const HEADERS: [&str; 19] = [
    "Company Name",
    "Contact Person",
    "Email",
    "Phone",
    "Stage",
    "Status",
    "Priority",
    "Value",
    "Country",
    "Responsible Person",
    "Service",
    "Source",
    "Industry",
    "LinkedIn",
    "Notes",
    "Win Probability",
    "Estimated Close Date",
    "Last Follow Up",
    "Next Follow Up",
];

/// One data row with the spreadsheet row number it came from.
#[derive(Debug)]
pub struct ParsedRow {
    pub row: usize,
    pub draft: ClientDraft,
}

pub fn parse_rows(bytes: &[u8]) -> anyhow::Result<Vec<ParsedRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("workbook has no sheets"))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| anyhow::anyhow!("sheet \"{sheet_name}\" is empty"))?;

    let mut columns: HashMap<String, usize> = HashMap::new();
    for (idx, cell) in header.iter().enumerate() {
        let name = cell_to_string(cell).trim().to_lowercase();
        if !name.is_empty() {
            columns.entry(name).or_insert(idx);
        }
    }

    let mut parsed = Vec::new();
    for (data_index, row) in rows.enumerate() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let get = |name: &str| -> Option<String> {
            columns
                .get(&name.to_lowercase())
                .and_then(|idx| row.get(*idx))
                .map(cell_to_string)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let draft = ClientDraft {
            company_name: get("Company Name"),
            contact_person: get("Contact Person"),
            email: get("Email"),
            phone: get("Phone"),
            stage: get("Stage"),
            status: get("Status"),
            value: get("Value").map(serde_json::Value::String),
            priority: get("Priority"),
            country: get("Country"),
            responsible_person: get("Responsible Person"),
            service: get("Service"),
            source: get("Source"),
            industry: get("Industry"),
            linkedin: get("LinkedIn"),
            notes: get("Notes"),
            win_probability: get("Win Probability").map(serde_json::Value::String),
            estimated_close_date: get("Estimated Close Date"),
            last_follow_up: get("Last Follow Up"),
            next_follow_up: get("Next Follow Up"),
        };
        parsed.push(ParsedRow {
            row: spreadsheet_row(data_index),
            draft,
        });
    }
    Ok(parsed)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format!("{f}"),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({e:?})"),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| naive.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
