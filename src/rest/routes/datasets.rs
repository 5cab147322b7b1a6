// rest/routes/datasets.rs — generation, dataset CRUD, and export.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::{bad_gateway, bad_request, internal, not_found, ApiError};
use crate::auth::AuthUser;
use crate::export;
use crate::generate::{self, Generate as _, GenerateRequest, Record};
use crate::observability::LatencyTracker;
use crate::storage::DatasetRow;
use crate::AppContext;

const DEFAULT_COUNT: i64 = 10;

// ─── Request bodies ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDatasetRequest {
    pub name: String,
    pub prompt: String,
    #[serde(default = "default_count")]
    pub count: i64,
    /// Explicit column names; skips prompt inference when present.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub data_type: Option<String>,
    /// Context interpolated into description values.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_count() -> i64 {
    DEFAULT_COUNT
}

#[derive(Deserialize)]
pub struct UpdateDatasetRequest {
    pub data: Vec<Record>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

pub async fn generate(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Json(body): Json<GenerateDatasetRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(bad_request("name must be 1-100 characters"));
    }
    let prompt_len = body.prompt.trim().chars().count();
    if !(10..=500).contains(&prompt_len) {
        return Err(bad_request("prompt must be 10-500 characters"));
    }
    let max = ctx.config.generation.max_count;
    if !(1..=max).contains(&body.count) {
        return Err(bad_request(format!("count must be between 1 and {max}")));
    }

    let request = GenerateRequest {
        prompt: body.prompt.trim().to_string(),
        count: body.count,
        fields: body.fields.clone(),
        context: body.description.clone(),
    };

    let tracker = LatencyTracker::start("data.generate");
    let result = ctx.generator.generate(&request).await;
    tracker.finish();

    let records = match result {
        Ok(records) => records,
        Err(e) if e.is_invalid_argument() => return Err(bad_request(e.to_string())),
        Err(e) => {
            warn!("generation failed: {e}");
            return Err(bad_gateway("Failed to generate data"));
        }
    };

    let field_list = generate::field_names(&records);
    let fields_json =
        serde_json::to_string(&field_list).map_err(|_| internal("Failed to save dataset"))?;
    let data_json =
        serde_json::to_string(&records).map_err(|_| internal("Failed to save dataset"))?;
    let data_type = body.data_type.as_deref().unwrap_or("custom");

    let dataset = ctx
        .storage
        .create_dataset(
            &user.user_id,
            name,
            &request.prompt,
            data_type,
            &fields_json,
            &data_json,
            records.len() as i64,
        )
        .await
        .map_err(|_| internal("Failed to save dataset"))?;

    info!(
        dataset_id = %dataset.id,
        records = records.len(),
        "dataset generated"
    );
    Ok(Json(dataset_with_data(&dataset, records)))
}

pub async fn list_datasets(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let rows = ctx
        .storage
        .list_datasets(&user.user_id)
        .await
        .map_err(|_| internal("Database error"))?;

    let list: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "id": row.id,
                "name": row.name,
                "prompt": row.prompt,
                "dataType": row.data_type,
                "fields": parse_fields(&row.fields),
                "count": row.record_count,
                "createdAt": row.created_at,
                "updatedAt": row.updated_at,
            })
        })
        .collect();
    Ok(Json(json!({ "datasets": list })))
}

pub async fn get_dataset(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let dataset = fetch_dataset(&ctx, &id, &user.user_id).await?;
    let records = parse_records(&dataset)?;
    Ok(Json(dataset_with_data(&dataset, records)))
}

pub async fn update_dataset(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateDatasetRequest>,
) -> Result<Json<Value>, ApiError> {
    let existing = fetch_dataset(&ctx, &id, &user.user_id).await?;

    // Column list follows the edited rows; an emptied dataset keeps its
    // original columns so the table stays renderable.
    let fields_json = if body.data.is_empty() {
        existing.fields.clone()
    } else {
        serde_json::to_string(&generate::field_names(&body.data))
            .map_err(|_| internal("Failed to update dataset"))?
    };
    let data_json =
        serde_json::to_string(&body.data).map_err(|_| internal("Failed to update dataset"))?;

    let updated = ctx
        .storage
        .update_dataset_data(
            &id,
            &user.user_id,
            &fields_json,
            &data_json,
            body.data.len() as i64,
        )
        .await
        .map_err(|_| internal("Failed to update dataset"))?;
    if !updated {
        return Err(not_found("Dataset not found"));
    }
    Ok(Json(json!({ "message": "Dataset updated successfully" })))
}

pub async fn delete_dataset(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = ctx
        .storage
        .delete_dataset(&id, &user.user_id)
        .await
        .map_err(|_| internal("Database error"))?;
    if !deleted {
        return Err(not_found("Dataset not found"));
    }
    Ok(Json(json!({ "message": "Dataset deleted successfully" })))
}

pub async fn export_dataset(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let dataset = fetch_dataset(&ctx, &id, &user.user_id).await?;
    let records = parse_records(&dataset)?;
    let filename = sanitize_filename(&dataset.name);

    match query.format.as_deref().unwrap_or("json") {
        "json" => {
            let body = export::to_json(&records).map_err(|_| internal("Export failed"))?;
            Ok(download_response(
                "application/json",
                &format!("{filename}.json"),
                body,
            ))
        }
        "csv" => {
            let fields = parse_fields(&dataset.fields);
            let body =
                export::to_csv(&fields, &records).map_err(|_| internal("Export failed"))?;
            Ok(download_response("text/csv", &format!("{filename}.csv"), body))
        }
        other => Err(bad_request(format!("unsupported export format '{other}'"))),
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn fetch_dataset(
    ctx: &Arc<AppContext>,
    id: &str,
    user_id: &str,
) -> Result<DatasetRow, ApiError> {
    ctx.storage
        .get_dataset(id, user_id)
        .await
        .map_err(|_| internal("Database error"))?
        .ok_or_else(|| not_found("Dataset not found"))
}

fn parse_fields(fields_json: &str) -> Vec<String> {
    serde_json::from_str(fields_json).unwrap_or_default()
}

fn parse_records(dataset: &DatasetRow) -> Result<Vec<Record>, ApiError> {
    serde_json::from_str(&dataset.data).map_err(|_| internal("Stored dataset is corrupted"))
}

fn dataset_with_data(dataset: &DatasetRow, records: Vec<Record>) -> Value {
    json!({
        "id": dataset.id,
        "name": dataset.name,
        "prompt": dataset.prompt,
        "dataType": dataset.data_type,
        "fields": parse_fields(&dataset.fields),
        "data": records,
        "count": dataset.record_count,
        "createdAt": dataset.created_at,
        "updatedAt": dataset.updated_at,
    })
}

fn download_response(content_type: &str, filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Keep dataset names shell- and header-safe when used as filenames.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "dataset".to_string()
    } else {
        cleaned
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_sanitization_replaces_separators() {
        assert_eq!(sanitize_filename("Q3 customers / staging"), "Q3_customers___staging");
        assert_eq!(sanitize_filename("  "), "dataset");
        assert_eq!(sanitize_filename("plain-name_1"), "plain-name_1");
    }

    #[test]
    fn generate_request_defaults_count() {
        let body: GenerateDatasetRequest = serde_json::from_str(
            r#"{"name": "test", "prompt": "customers with name and email"}"#,
        )
        .unwrap();
        assert_eq!(body.count, DEFAULT_COUNT);
        assert!(body.fields.is_none());
    }

    #[test]
    fn generate_request_accepts_camel_case_data_type() {
        let body: GenerateDatasetRequest = serde_json::from_str(
            r#"{"name": "t", "prompt": "p", "dataType": "customers", "count": 3}"#,
        )
        .unwrap();
        assert_eq!(body.data_type.as_deref(), Some("customers"));
    }
}
