use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use contracts::import::ImportSummary;

use crate::domain::import::{service, template};
use crate::shared::error::ApiError;
use crate::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// POST /clients/import — multipart upload, field name `file`.
pub async fn import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {e}")))?;
        let summary = service::run_import(&state.db, &filename, &bytes).await?;
        return Ok(Json(summary));
    }
    Err(ApiError::BadRequest(
        "Multipart field \"file\" is required".into(),
    ))
}

/// GET /clients/export/template
pub async fn download_template() -> Result<Response, ApiError> {
    let bytes = template::build_template()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("template generation failed: {e}")))?;
    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", template::TEMPLATE_FILENAME),
        ),
    ];
    Ok((headers, bytes).into_response())
}
