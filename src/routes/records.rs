use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};

use crate::{
    dto::auth_dto::MessageResponse,
    dto::record_dto::{ExportFormat, RecordListQuery, RecordPayload},
    error::Result,
    routes::parse_id,
    services::export_service::{ExportService, CSV_FILE_NAME, XLSX_FILE_NAME},
    AppState,
};

const NOT_FOUND: &str = "Запись не найдена";

#[utoipa::path(
    get,
    path = "/api/records",
    params(
        ("AccessStartDateFrom" = Option<String>, Query, description = "Inclusive lower day bound, YYYY-MM-DD"),
        ("AccessStartDateTo" = Option<String>, Query, description = "Inclusive upper day bound, YYYY-MM-DD"),
        ("sort" = Option<String>, Query, description = "Record field to sort by"),
        ("direction" = Option<String>, Query, description = "asc or desc"),
        ("page" = Option<i64>, Query, description = "Page number; omit for the full list"),
        ("perPage" = Option<i64>, Query, description = "Page size, default 10")
    ),
    responses(
        (status = 200, description = "Filtered and sorted journal"),
        (status = 400, description = "Bad filter date or sort key")
    )
)]
#[axum::debug_handler]
pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    let query = RecordListQuery::from_params(params);
    let records = state.record_service.list().await?;
    let view = query.into_view(records)?;

    if query.page().is_some() {
        Ok(Json(view.current_page()).into_response())
    } else {
        Ok(Json(view.into_processed()).into_response())
    }
}

#[utoipa::path(
    get,
    path = "/api/records/export",
    params(
        ("format" = Option<String>, Query, description = "csv (default) or xlsx")
    ),
    responses(
        (status = 200, description = "Journal file download"),
        (status = 400, description = "Nothing to export")
    )
)]
#[axum::debug_handler]
pub async fn export_records(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    let query = RecordListQuery::from_params(params);
    let format = query.export_format()?;
    let records = state.record_service.list().await?;
    let processed = query.into_view(records)?.into_processed();

    let (content_type, file_name, body) = match format {
        ExportFormat::Csv => (
            "text/csv; charset=utf-8",
            CSV_FILE_NAME,
            ExportService::generate_records_csv(&processed)?,
        ),
        ExportFormat::Xlsx => (
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            XLSX_FILE_NAME,
            ExportService::generate_records_xlsx(&processed)?,
        ),
    };
    tracing::info!(rows = processed.len(), file = file_name, "journal exported");

    let disposition = format!("attachment; filename=\"{}\"", file_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/records",
    responses(
        (status = 201, description = "Record created"),
        (status = 400, description = "Missing required fields or invalid values")
    )
)]
#[axum::debug_handler]
pub async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<RecordPayload>,
) -> Result<impl IntoResponse> {
    let new = payload.into_new_record()?;
    let record = state.record_service.create(new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/api/records/{id}",
    params(("id" = i32, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record replaced"),
        (status = 400, description = "Missing required fields or invalid values"),
        (status = 404, description = "Record not found")
    )
)]
#[axum::debug_handler]
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RecordPayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let new = payload.into_new_record()?;
    let record = state.record_service.update(id, new).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/records/{id}",
    params(("id" = i32, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 404, description = "Record not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.record_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Запись успешно удалена")))
}
