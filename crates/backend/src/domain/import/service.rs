//! Import loop: parse, normalize each row through the same layer as manual
//! edits, persist the clean rows, report the rest per row.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use contracts::domain::validate::normalize;
use contracts::import::{ImportSummary, RowError, RowWarning};

use super::excel;
use crate::domain::clients;
use crate::shared::error::ApiError;

pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

pub async fn run_import(
    db: &DatabaseConnection,
    filename: &str,
    bytes: &[u8],
) -> Result<ImportSummary, ApiError> {
    let lowered = filename.to_ascii_lowercase();
    if !lowered.ends_with(".xlsx") && !lowered.ends_with(".xls") {
        return Err(ApiError::BadRequest(
            "Only .xlsx and .xls files are accepted".into(),
        ));
    }
    if bytes.len() > MAX_FILE_BYTES {
        return Err(ApiError::BadRequest("File exceeds the 5 MB limit".into()));
    }
    let rows = excel::parse_rows(bytes)
        .map_err(|e| ApiError::BadRequest(format!("Could not read spreadsheet: {e}")))?;

    let total = rows.len();
    let now = Utc::now();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut imported_ids = Vec::new();

    for parsed in rows {
        let outcome = normalize(&parsed.draft, now);
        for warning in &outcome.warnings {
            warnings.push(RowWarning {
                row: parsed.row,
                field: warning.field.to_string(),
                warning: warning.message.clone(),
            });
        }
        if !outcome.errors.is_empty() {
            for error in &outcome.errors {
                errors.push(RowError {
                    row: parsed.row,
                    field: error.field.to_string(),
                    error: error.message.clone(),
                });
            }
            continue;
        }
        let model = clients::service::create_from_candidate(db, &outcome.candidate, now).await?;
        imported_ids.push(model.id);
    }

    let id_set: HashSet<&String> = imported_ids.iter().collect();
    let clients = clients::service::list_clients(db)
        .await?
        .into_iter()
        .filter(|c| id_set.contains(&c.id))
        .collect::<Vec<_>>();

    tracing::info!(
        imported = imported_ids.len(),
        total,
        errors = errors.len(),
        warnings = warnings.len(),
        "spreadsheet import finished"
    );

    Ok(ImportSummary {
        success: errors.is_empty(),
        imported: imported_ids.len(),
        total,
        errors,
        warnings,
        clients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::excel::HEADERS;
    use crate::domain::import::template::build_template;
    use crate::shared::data::db;
    use contracts::domain::client::{Priority, Stage};
    use rust_xlsxwriter::Workbook;

    async fn setup() -> DatabaseConnection {
        let conn = db::connect_in_memory().await.unwrap();
        db::init_schema(&conn).await.unwrap();
        conn
    }

    /// Minimal workbook in template column order, all cells as text.
    fn sheet_with_rows(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in HEADERS.iter().enumerate() {
            sheet.write(0, col as u16, *name).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                sheet.write(r as u32 + 1, c as u16, *cell).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[tokio::test]
    async fn rejects_wrong_extension_and_oversized_files() {
        let conn = setup().await;
        let err = run_import(&conn, "clients.csv", b"whatever").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let oversized = vec![0u8; MAX_FILE_BYTES + 1];
        let err = run_import(&conn, "clients.xlsx", &oversized).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn template_sample_row_imports_cleanly() {
        let conn = setup().await;
        let bytes = build_template().unwrap();
        let summary = run_import(&conn, "template.xlsx", &bytes).await.unwrap();

        assert!(summary.success);
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.total, 1);
        assert!(summary.errors.is_empty());
        assert!(summary.warnings.is_empty());

        let client = &summary.clients[0];
        assert_eq!(client.stage, Stage::Lead);
        assert_eq!(client.priority, Priority::High);
        assert_eq!(client.value, 100_000.0);
        assert_eq!(client.service.as_deref(), Some("CRM"));
    }

    #[tokio::test]
    async fn bad_email_row_is_skipped_without_aborting_the_batch() {
        let conn = setup().await;
        let bytes = sheet_with_rows(&[
            &["Alpha Ltd", "", "alpha@alpha.io"],
            &["Beta GmbH", "", "not-an-email"],
            &["Gamma Inc"],
        ]);
        let summary = run_import(&conn, "clients.xlsx", &bytes).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.imported, 2);
        assert!(!summary.success);
        assert_eq!(summary.errors.len(), 1);
        // Data row 2 sits on spreadsheet row 3.
        assert_eq!(summary.errors[0].row, 3);
        assert_eq!(summary.errors[0].field, "Email");
        assert!(summary.clients.iter().all(|c| c.company_name != "Beta GmbH"));
    }

    #[tokio::test]
    async fn incompatible_status_imports_with_a_warning() {
        let conn = setup().await;
        let bytes = sheet_with_rows(&[&["Acme", "", "", "", "Won", "In Negotiation"]]);
        let summary = run_import(&conn, "clients.xlsx", &bytes).await.unwrap();

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.warnings[0].row, 2);
        assert_eq!(summary.warnings[0].field, "Status");
        assert!(summary.warnings[0].warning.contains("\"Won\" accepts no status"));
        // The status is stored as given, not silently corrected.
        assert_eq!(
            summary.clients[0].status.map(|s| s.as_str()),
            Some("In Negotiation")
        );
    }

    #[tokio::test]
    async fn negative_value_clamps_instead_of_erroring() {
        let conn = setup().await;
        let bytes = sheet_with_rows(&[&["Acme", "", "", "", "", "", "", "-500"]]);
        let summary = run_import(&conn, "clients.xlsx", &bytes).await.unwrap();

        assert_eq!(summary.imported, 1);
        assert!(summary.errors.is_empty());
        assert_eq!(summary.clients[0].value, 0.0);
    }

    #[tokio::test]
    async fn imported_rows_get_stage_history() {
        let conn = setup().await;
        let bytes = sheet_with_rows(&[&["Acme", "", "", "", "Qualified"]]);
        let summary = run_import(&conn, "clients.xlsx", &bytes).await.unwrap();

        let history =
            crate::domain::stage_history::service::list_history(&conn, &summary.clients[0].id)
                .await
                .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].stage, Stage::Qualified);
    }
}
