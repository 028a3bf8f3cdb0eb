//! Downloadable import template: a `Clients` sheet with a bold header, one
//! sample row and dropdown validation on the closed columns, plus an
//! `Instructions` sheet.

use rust_xlsxwriter::{DataValidation, Format, Workbook, XlsxError};

use contracts::domain::client::{ClientStatus, LeadSource, Priority, Stage};
use contracts::reference::SERVICE_SUGGESTIONS;

use super::excel::HEADERS;

pub const TEMPLATE_FILENAME: &str = "clients_import_template.xlsx";

/// Dropdowns cover this many data rows below the header.
const VALIDATED_ROWS: u32 = 500;

pub fn build_template() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name("Clients")?;
    let header_format = Format::new().set_bold();
    for (col, name) in HEADERS.iter().enumerate() {
        sheet.write_with_format(0, col as u16, *name, &header_format)?;
        sheet.set_column_width(col as u16, 20)?;
    }

    // Sample row users can overwrite or copy.
    sheet.write(1, 0, "Acme Corporation")?;
    sheet.write(1, 1, "Jane Cooper")?;
    sheet.write(1, 2, "jane.cooper@acme.com")?;
    sheet.write(1, 3, "+1 555 0100")?;
    sheet.write(1, 4, Stage::Lead.as_str())?;
    sheet.write(1, 5, ClientStatus::New.as_str())?;
    sheet.write(1, 6, Priority::High.as_str())?;
    sheet.write(1, 7, 100_000)?;
    sheet.write(1, 8, "United States")?;
    sheet.write(1, 9, "Alex Morgan")?;
    sheet.write(1, 10, "CRM")?;
    sheet.write(1, 11, LeadSource::Website.as_str())?;
    sheet.write(1, 12, "Software")?;
    sheet.write(1, 15, 60)?;

    let stages: Vec<&str> = Stage::ALL.iter().map(|s| s.as_str()).collect();
    let statuses: Vec<&str> = ClientStatus::ALL.iter().map(|s| s.as_str()).collect();
    let priorities: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
    let sources: Vec<&str> = LeadSource::ALL.iter().map(|s| s.as_str()).collect();

    let dropdown = |list: &[&str]| DataValidation::new().allow_list_strings(list);
    sheet.add_data_validation(1, 4, VALIDATED_ROWS, 4, &dropdown(&stages)?)?;
    sheet.add_data_validation(1, 5, VALIDATED_ROWS, 5, &dropdown(&statuses)?)?;
    sheet.add_data_validation(1, 6, VALIDATED_ROWS, 6, &dropdown(&priorities)?)?;
    sheet.add_data_validation(1, 10, VALIDATED_ROWS, 10, &dropdown(SERVICE_SUGGESTIONS)?)?;
    sheet.add_data_validation(1, 11, VALIDATED_ROWS, 11, &dropdown(&sources)?)?;

    let instructions = workbook.add_worksheet().set_name("Instructions")?;
    instructions.set_column_width(0, 90)?;
    let title_format = Format::new().set_bold();
    instructions.write_with_format(0, 0, "How to fill in the Clients sheet", &title_format)?;
    let lines = [
        "Row 2 is a sample you can overwrite. Keep the header row unchanged.",
        "Company Name is the only required column. Rows without it are reported and skipped.",
        "Email must be a valid address when present; invalid addresses skip the row.",
        "Stage, Status, Priority and Source offer dropdowns. Unknown values fall back to defaults (Lead / empty / Medium / Other).",
        "Status is advisory per stage: an unusual Stage/Status pairing imports anyway with a warning.",
        "Value accepts plain numbers or light formatting such as $100,000. Negative values are raised to 0.",
        "Service is free text; the dropdown only lists suggestions. Blank defaults to Product Development.",
        "Win Probability accepts 0-100, with or without a % sign.",
        "Dates accept YYYY-MM-DD, DD.MM.YYYY or MM/DD/YYYY. Blank follow-up dates default to today and today + 7 days.",
        "Files must be .xlsx or .xls and at most 5 MB.",
    ];
    for (i, line) in lines.iter().enumerate() {
        instructions.write(i as u32 + 2, 0, *line)?;
    }

    workbook.save_to_buffer()
}
