//! Plant record CRUD handlers.
//!
//! All routes require an authenticated session. Ownership is enforced per
//! plant: regular users only see and touch their own plants, admins see
//! everything.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    AppState,
    api::models::{
        plants::{PlantCreate, PlantResponse, PlantUpdate},
        users::CurrentUser,
    },
    db::handlers::{Plants, Repository, plants::PlantFilter},
    errors::{Error, Result},
    types::{Operation, PlantId, UserId},
};

/// Maximum page size for plant listings
const MAX_PAGE_SIZE: i64 = 1000;

/// Pagination parameters for plant listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPlantsQuery {
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

fn validate_frequency(frequency_days: i32) -> Result<()> {
    if frequency_days < 1 {
        return Err(Error::BadRequest {
            message: "watering_frequency_days must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::BadRequest {
            message: format!("{field} cannot be empty"),
        });
    }
    Ok(())
}

/// Create a new plant
#[utoipa::path(
    post,
    path = "/plants",
    request_body = PlantCreate,
    tag = "plants",
    responses(
        (status = 201, description = "Plant created", body = PlantResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Cannot create plants for another user"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_plant(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<PlantCreate>,
) -> Result<(StatusCode, Json<PlantResponse>)> {
    current_user.require_owner(request.user_id, Operation::CreateOwn, "plants")?;

    validate_non_empty(&request.name, "name")?;
    validate_non_empty(&request.species, "species")?;
    validate_frequency(request.watering_frequency_days)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Plants::new(&mut conn);

    let plant = repo.create(&request.into()).await?;

    Ok((StatusCode::CREATED, Json(plant.into())))
}

/// List plants
#[utoipa::path(
    get,
    path = "/plants",
    params(ListPlantsQuery),
    tag = "plants",
    responses(
        (status = 200, description = "Plants, newest first", body = Vec<PlantResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_plants(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListPlantsQuery>,
) -> Result<Json<Vec<PlantResponse>>> {
    let limit = query.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE).max(0);
    let skip = query.skip.max(0);

    let mut filter = PlantFilter::new(skip, limit);
    // Regular users only see their own plants
    if !current_user.is_admin {
        filter.user_id = Some(current_user.id);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Plants::new(&mut conn);

    let plants = repo.list(&filter).await?;

    Ok(Json(plants.into_iter().map(PlantResponse::from).collect()))
}

/// List all plants belonging to a user
#[utoipa::path(
    get,
    path = "/users/{user_id}/plants",
    params(("user_id" = uuid::Uuid, Path, description = "Owner of the plants")),
    tag = "plants",
    responses(
        (status = 200, description = "The user's plants, newest first", body = Vec<PlantResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Cannot list another user's plants"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_user_plants(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<PlantResponse>>> {
    current_user.require_owner(user_id, Operation::ReadOwn, "plants")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Plants::new(&mut conn);

    let plants = repo.list(&PlantFilter::for_user(user_id)).await?;

    Ok(Json(plants.into_iter().map(PlantResponse::from).collect()))
}

/// Get a plant by id
#[utoipa::path(
    get,
    path = "/plants/{id}",
    params(("id" = uuid::Uuid, Path, description = "Plant id")),
    tag = "plants",
    responses(
        (status = 200, description = "The plant", body = PlantResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Plant not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_plant(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<PlantId>,
) -> Result<Json<PlantResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Plants::new(&mut conn);

    let plant = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Plant".to_string(),
        id: id.to_string(),
    })?;

    current_user.require_owner(plant.user_id, Operation::ReadOwn, "plants")?;

    Ok(Json(plant.into()))
}

/// Partially update a plant
#[utoipa::path(
    patch,
    path = "/plants/{id}",
    params(("id" = uuid::Uuid, Path, description = "Plant id")),
    request_body = PlantUpdate,
    tag = "plants",
    responses(
        (status = 200, description = "The updated plant", body = PlantResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Plant not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_plant(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<PlantId>,
    Json(request): Json<PlantUpdate>,
) -> Result<Json<PlantResponse>> {
    if let Some(name) = &request.name {
        validate_non_empty(name, "name")?;
    }
    if let Some(species) = &request.species {
        validate_non_empty(species, "species")?;
    }
    if let Some(frequency_days) = request.watering_frequency_days {
        validate_frequency(frequency_days)?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Plants::new(&mut conn);

    let existing = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Plant".to_string(),
        id: id.to_string(),
    })?;
    current_user.require_owner(existing.user_id, Operation::UpdateOwn, "plants")?;

    let plant = repo.update(id, &request.into()).await.map_err(|e| match e {
        // Deleted between the ownership check and the update
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Plant".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(plant.into()))
}

/// Delete a plant
#[utoipa::path(
    delete,
    path = "/plants/{id}",
    params(("id" = uuid::Uuid, Path, description = "Plant id")),
    tag = "plants",
    responses(
        (status = 204, description = "Plant deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Plant not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_plant(State(state): State<AppState>, current_user: CurrentUser, Path(id): Path<PlantId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Plants::new(&mut conn);

    let plant = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Plant".to_string(),
        id: id.to_string(),
    })?;
    current_user.require_owner(plant.user_id, Operation::DeleteOwn, "plants")?;

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Plant".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
