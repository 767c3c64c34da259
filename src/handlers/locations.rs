use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::locations::CreateLocationCommand;
use crate::ApiResponse;

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new("^[A-Z0-9_-]+$").unwrap());

fn default_kind() -> String {
    "STORAGE".to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LocationRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, max = 20, message = "Code is required"),
        regex(
            path = "CODE_RE",
            message = "Code must contain only uppercase letters, numbers, hyphens, and underscores"
        )
    )]
    pub code: String,
    pub warehouse_id: Uuid,
    #[serde(default = "default_kind")]
    pub kind: String,
}

impl From<LocationRequest> for CreateLocationCommand {
    fn from(req: LocationRequest) -> Self {
        Self {
            name: req.name,
            code: req.code,
            warehouse_id: req.warehouse_id,
            kind: req.kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationListParams {
    pub warehouse_id: Option<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations))
        .route("/", post(create_location))
        .route("/:id", get(get_location))
        .route("/:id", put(update_location))
        .route("/:id", delete(delete_location))
}

async fn list_locations(
    State(state): State<AppState>,
    Query(params): Query<LocationListParams>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let locations = state.services.locations.list(params.warehouse_id).await?;
    Ok(Json(ApiResponse::success(locations)))
}

async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.locations.get(id).await?;
    Ok(Json(ApiResponse::success(location)))
}

async fn create_location(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<LocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let location = state.services.locations.create(payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            location,
            "Location created successfully",
        )),
    ))
}

async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(payload): Json<LocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let location = state.services.locations.update(id, payload.into()).await?;
    Ok(Json(ApiResponse::with_message(
        location,
        "Location updated successfully",
    )))
}

async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.locations.delete(id).await?;
    Ok(Json(ApiResponse::with_message(
        serde_json::json!(null),
        "Location deleted successfully",
    )))
}
