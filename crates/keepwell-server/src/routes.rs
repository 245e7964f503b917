use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use keepwell_core::enums::{ContentCategory, ItemStatus};
use keepwell_core::error::CoreError;
use keepwell_domains::auth::{hash_password, verify_password};
use keepwell_domains::models::User;
use keepwell_domains::retrieval::{ListFilters, RetrievalService};
use keepwell_domains::save_service::SaveService;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::auth::{AuthUser, JwtService};
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_service: JwtService,
    pub save_service: Arc<SaveService>,
    pub retrieval: Arc<RetrievalService>,
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/items", post(create_item).get(list_items))
        .route("/items/categories", get(item_categories))
        .route("/items/{id}", get(get_item).patch(update_item).delete(delete_item))
        .route("/items/{id}/favorite", post(toggle_favorite))
        .route("/items/{id}/archive", post(toggle_archive))
        .route("/items/{id}/retry", post(retry_item))
        .route("/clusters", get(list_clusters))
        .route("/clusters/{id}", get(get_cluster).delete(delete_cluster))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/live", get(live))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn live() -> &'static str {
    "ok"
}

async fn ready(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(CoreError::from)?;
    Ok("ok")
}

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if body.password.len() < 8 {
        return Err(CoreError::Validation("password must be at least 8 characters".to_string()).into());
    }

    if User::find_by_email(&body.email, &state.pool).await?.is_some() {
        return Err(CoreError::Conflict("EmailAlreadyRegistered".to_string()).into());
    }

    let password_hash = hash_password(&body.password)?;
    let user = User::create(&body.email, &password_hash, &state.pool).await?;
    let token = state.jwt_service.create_token(user.id, &user.email)?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = User::find_by_email(&body.email, &state.pool)
        .await?
        .ok_or_else(|| CoreError::Auth("invalid email or password".to_string()))?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(CoreError::Auth("invalid email or password".to_string()).into());
    }

    let token = state.jwt_service.create_token(user.id, &user.email)?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Deserialize)]
struct CreateItemRequest {
    url: String,
    raw_share_text: Option<String>,
}

async fn create_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<CreateItemRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state
        .save_service
        .save_url(claims.sub, &body.url, body.raw_share_text.as_deref())
        .await?;

    Ok(Json(serde_json::json!({
        "save": outcome.save,
        "content": outcome.content,
        "is_new_content": outcome.is_new_content,
    })))
}

#[derive(Deserialize)]
struct ListItemsQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    category: Option<String>,
    status: Option<String>,
    include_archived: Option<bool>,
}

async fn list_items(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(|c| c.parse::<ContentCategory>())
        .transpose()
        .map_err(|_| CoreError::Validation("unrecognised category".to_string()))?;

    let status = query
        .status
        .as_deref()
        .map(parse_item_status)
        .transpose()?;

    let filters = ListFilters {
        category,
        status,
        include_archived: query.include_archived.unwrap_or(false),
    };

    let page = state
        .retrieval
        .list_saves(claims.sub, filters, query.page.unwrap_or(1), query.page_size.unwrap_or(20))
        .await?;

    Ok(Json(serde_json::json!({
        "items": page.items,
        "page": page.page,
        "page_size": page.page_size,
    })))
}

fn parse_item_status(s: &str) -> Result<ItemStatus, ApiError> {
    match s.to_uppercase().as_str() {
        "PENDING" => Ok(ItemStatus::Pending),
        "PROCESSING" => Ok(ItemStatus::Processing),
        "READY" => Ok(ItemStatus::Ready),
        "FAILED" => Ok(ItemStatus::Failed),
        _ => Err(CoreError::Validation("unrecognised status".to_string()).into()),
    }
}

async fn item_categories(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let counts = state.retrieval.category_counts(claims.sub).await?;
    Ok(Json(serde_json::to_value(counts).unwrap_or_default()))
}

async fn get_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (save, content) = state.retrieval.get_save(claims.sub, id).await?;
    Ok(Json(serde_json::json!({ "save": save, "content": content })))
}

#[derive(Deserialize)]
struct UpdateItemRequest {
    raw_share_text: Option<String>,
    is_favorited: Option<bool>,
    is_archived: Option<bool>,
}

async fn update_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let save = state
        .retrieval
        .update_save(
            claims.sub,
            id,
            body.raw_share_text.as_deref(),
            body.is_favorited,
            body.is_archived,
        )
        .await?;
    Ok(Json(serde_json::json!({ "save": save })))
}

async fn delete_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.retrieval.delete_save(claims.sub, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (existing, _) = state.retrieval.get_save(claims.sub, id).await?;
    let save = state
        .retrieval
        .update_save(claims.sub, id, None, Some(!existing.is_favorited), None)
        .await?;
    Ok(Json(serde_json::json!({ "save": save })))
}

async fn toggle_archive(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (existing, _) = state.retrieval.get_save(claims.sub, id).await?;
    let save = state
        .retrieval
        .update_save(claims.sub, id, None, None, Some(!existing.is_archived))
        .await?;
    Ok(Json(serde_json::json!({ "save": save })))
}

/// Operator-triggered re-enqueue of a FAILED item back through the content
/// pipeline. There is no automatic retry policy; this is the only way a
/// FAILED save returns to PENDING.
async fn retry_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (_, content) = state.retrieval.get_save(claims.sub, id).await?;

    if content.status != ItemStatus::Failed {
        return Err(CoreError::Conflict("NotFailed".to_string()).into());
    }

    let content = state.save_service.retry_content(content.id).await?;
    Ok(Json(serde_json::json!({ "content": content })))
}

#[derive(Deserialize)]
struct ListClustersQuery {
    category: Option<String>,
}

async fn list_clusters(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListClustersQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(|c| c.parse::<ContentCategory>())
        .transpose()
        .map_err(|_| CoreError::Validation("unrecognised category".to_string()))?;

    let clusters = state.retrieval.list_clusters(claims.sub, category).await?;
    let clusters: Vec<_> = clusters
        .into_iter()
        .map(|(cluster, count)| serde_json::json!({ "cluster": cluster, "item_count": count }))
        .collect();

    Ok(Json(serde_json::json!({ "clusters": clusters })))
}

async fn get_cluster(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (cluster, items) = state.retrieval.get_cluster_with_items(claims.sub, id).await?;
    Ok(Json(serde_json::json!({ "cluster": cluster, "items": items })))
}

async fn delete_cluster(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.retrieval.delete_cluster(claims.sub, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
