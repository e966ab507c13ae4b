//! Nearby nursery lookup handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    AppState,
    api::models::{nurseries::NurseryResponse, users::CurrentUser},
    errors::{Error, Result},
};

/// Query parameters for the nearby-nurseries lookup.
///
/// Both coordinates are optional at the deserialization layer so that a
/// missing parameter becomes a 400 rather than a 422.
#[derive(Debug, Deserialize, IntoParams)]
pub struct NearbyNurseriesQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Find nurseries and garden centres near a point
#[utoipa::path(
    get,
    path = "/nurseries/nearby",
    params(NearbyNurseriesQuery),
    tag = "nurseries",
    responses(
        (status = 200, description = "Nearby nurseries", body = Vec<NurseryResponse>),
        (status = 400, description = "Missing or invalid coordinates"),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn nearby_nurseries(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<NearbyNurseriesQuery>,
) -> Result<Json<Vec<NurseryResponse>>> {
    let (lat, lon) = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(Error::BadRequest {
                message: "Latitude and longitude are required".to_string(),
            });
        }
    };

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(Error::BadRequest {
            message: "Latitude must be within [-90, 90] and longitude within [-180, 180]".to_string(),
        });
    }

    let nurseries = state.nurseries.find_nearby(lat, lon).await;
    Ok(Json(nurseries))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, create_test_user, session_header};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_coordinates_is_bad_request(pool: PgPool) {
        let (server, config, _uploads_dir) = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, false).await;
        let (name, value) = session_header(&user, &config);

        let response = server.get("/api/v1/nurseries/nearby?lat=51.5").add_header(name, value).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_out_of_range_coordinates_is_bad_request(pool: PgPool) {
        let (server, config, _uploads_dir) = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, false).await;
        let (name, value) = session_header(&user, &config);

        let response = server
            .get("/api/v1/nurseries/nearby?lat=123.0&lon=0.0")
            .add_header(name, value)
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_requires_auth(pool: PgPool) {
        let (server, _config, _uploads_dir) = create_test_app(pool).await;

        let response = server.get("/api/v1/nurseries/nearby?lat=51.5&lon=-0.12").await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unreachable_overpass_falls_back(pool: PgPool) {
        // The test config points Overpass at an unroutable address, so the
        // handler serves the synthetic fallback list.
        let (server, config, _uploads_dir) = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, false).await;
        let (name, value) = session_header(&user, &config);

        let response = server
            .get("/api/v1/nurseries/nearby?lat=51.5&lon=-0.12")
            .add_header(name, value)
            .await;
        response.assert_status_ok();

        let nurseries: Vec<crate::api::models::nurseries::NurseryResponse> = response.json();
        assert_eq!(nurseries.len(), 2);
        assert_eq!(nurseries[0].name, "Nursery Near You 1");
    }
}
