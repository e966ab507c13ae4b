//! Database repository for plant records.
//!
//! The repository owns the derived-field rule: `next_watering_date` is
//! computed from the last watered date and the watering frequency on create,
//! and recomputed on update only when the patch supplies at least one of
//! those inputs.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::plants::{PlantCreateDBRequest, PlantDBResponse, PlantUpdateDBRequest},
};
use crate::schedule;
use crate::types::{PlantId, UserId, abbrev_uuid};
use sqlx::{Connection, PgConnection};
use tracing::instrument;

/// Filter for listing plants
#[derive(Debug, Clone)]
pub struct PlantFilter {
    pub skip: i64,
    pub limit: i64,
    /// Restrict the listing to a single owner
    pub user_id: Option<UserId>,
}

impl PlantFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            user_id: None,
        }
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self {
            skip: 0,
            limit: 1000,
            user_id: Some(user_id),
        }
    }
}

pub struct Plants<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Plants<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Plants<'c> {
    type CreateRequest = PlantCreateDBRequest;
    type UpdateRequest = PlantUpdateDBRequest;
    type Response = PlantDBResponse;
    type Id = PlantId;
    type Filter = PlantFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id), name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Mirrors the plants_watering_frequency_days_check constraint so a
        // negative frequency is never coerced into a valid day count.
        let frequency_days = u32::try_from(request.watering_frequency_days).map_err(|_| DbError::CheckViolation {
            constraint: Some("plants_watering_frequency_days_check".to_string()),
            table: Some("plants".to_string()),
            message: "watering_frequency_days must be >= 1".to_string(),
        })?;
        let next_watering_date = schedule::next_watering_date(request.last_watered_date, frequency_days);

        let plant = sqlx::query_as::<_, PlantDBResponse>(
            r#"
            INSERT INTO plants
                (user_id, name, species, watering_frequency_days, last_watered_date,
                 next_watering_date, is_indoor, location, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.name)
        .bind(&request.species)
        .bind(request.watering_frequency_days)
        .bind(request.last_watered_date)
        .bind(next_watering_date)
        .bind(request.is_indoor)
        .bind(&request.location)
        .bind(&request.image_url)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(plant)
    }

    #[instrument(skip(self), fields(plant_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let plant = sqlx::query_as::<_, PlantDBResponse>("SELECT * FROM plants WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(plant)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<PlantId>) -> Result<std::collections::HashMap<Self::Id, PlantDBResponse>> {
        if ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }

        let plants = sqlx::query_as::<_, PlantDBResponse>("SELECT * FROM plants WHERE id = ANY($1)")
            .bind(ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        Ok(plants.into_iter().map(|plant| (plant.id, plant)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let plants = sqlx::query_as::<_, PlantDBResponse>(
            r#"
            SELECT * FROM plants
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(plants)
    }

    #[instrument(skip(self), fields(plant_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM plants WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(plant_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // The schedule resolution needs the stored row, so this is a
        // read-modify-write inside a transaction. The row is locked to keep
        // concurrent patches from resolving against stale values.
        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, PlantDBResponse>("SELECT * FROM plants WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

        // Recompute the next watering date only when the patch touches a
        // schedule input; otherwise the stored value stands.
        let (last_watered_date, watering_frequency_days, next_watering_date) = match schedule::resolve_patch(
            existing.last_watered_date,
            existing.watering_frequency_days,
            request.last_watered_date,
            request.watering_frequency_days,
        ) {
            Some(resolved) => (
                resolved.last_watered_date,
                resolved.watering_frequency_days,
                resolved.next_watering_date,
            ),
            None => (
                existing.last_watered_date,
                existing.watering_frequency_days,
                existing.next_watering_date,
            ),
        };

        let name = request.name.clone().unwrap_or(existing.name);
        let species = request.species.clone().unwrap_or(existing.species);
        let is_indoor = request.is_indoor.unwrap_or(existing.is_indoor);
        let location = request.location.clone().unwrap_or(existing.location);
        let image_url = request.image_url.clone().unwrap_or(existing.image_url);

        let plant = sqlx::query_as::<_, PlantDBResponse>(
            r#"
            UPDATE plants SET
                name = $2,
                species = $3,
                watering_frequency_days = $4,
                last_watered_date = $5,
                next_watering_date = $6,
                is_indoor = $7,
                location = $8,
                image_url = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&species)
        .bind(watering_frequency_days)
        .bind(last_watered_date)
        .bind(next_watering_date)
        .bind(is_indoor)
        .bind(&location)
        .bind(&image_url)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(plant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::users::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use chrono::NaiveDate;
    use sqlx::PgPool;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn create_owner(pool: &PgPool) -> crate::types::UserId {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let user = users
            .create(&UserCreateDBRequest {
                name: "Owner".to_string(),
                email: format!("owner_{}@example.com", uuid::Uuid::new_v4().simple()),
                password_hash: None,
                profile_pic_url: None,
                is_admin: false,
            })
            .await
            .unwrap();
        user.id
    }

    fn create_request(user_id: crate::types::UserId) -> PlantCreateDBRequest {
        PlantCreateDBRequest {
            user_id,
            name: "Monstera".to_string(),
            species: "Monstera deliciosa".to_string(),
            watering_frequency_days: 7,
            last_watered_date: date(2024, 3, 1),
            is_indoor: true,
            location: Some("living room".to_string()),
            image_url: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_derives_next_watering_date(pool: PgPool) {
        let owner = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let plant = repo.create(&create_request(owner)).await.unwrap();
        assert_eq!(plant.next_watering_date, date(2024, 3, 8));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_with_unknown_owner_is_fk_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let err = repo.create(&create_request(uuid::Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_frequency_check_constraint(pool: PgPool) {
        let owner = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let mut request = create_request(owner);
        request.watering_frequency_days = 0;
        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_negative_frequency_is_not_coerced(pool: PgPool) {
        let owner = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        // A negative frequency must fail the constraint check, not be
        // absolute-valued into a plausible schedule.
        let mut request = create_request(owner);
        request.watering_frequency_days = -7;
        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_without_schedule_fields_keeps_next_date(pool: PgPool) {
        let owner = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let plant = repo.create(&create_request(owner)).await.unwrap();

        let patch = PlantUpdateDBRequest {
            name: Some("Swiss cheese plant".to_string()),
            ..Default::default()
        };
        let updated = repo.update(plant.id, &patch).await.unwrap();

        assert_eq!(updated.name, "Swiss cheese plant");
        assert_eq!(updated.next_watering_date, plant.next_watering_date);
        assert_eq!(updated.last_watered_date, plant.last_watered_date);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_frequency_resolves_against_stored_date(pool: PgPool) {
        let owner = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let plant = repo.create(&create_request(owner)).await.unwrap();

        // Only the frequency changes; last watered date comes from storage
        let patch = PlantUpdateDBRequest {
            watering_frequency_days: Some(3),
            ..Default::default()
        };
        let updated = repo.update(plant.id, &patch).await.unwrap();

        assert_eq!(updated.watering_frequency_days, 3);
        assert_eq!(updated.next_watering_date, date(2024, 3, 4));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_last_watered_resolves_against_stored_frequency(pool: PgPool) {
        let owner = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let plant = repo.create(&create_request(owner)).await.unwrap();

        let patch = PlantUpdateDBRequest {
            last_watered_date: Some(date(2024, 3, 10)),
            ..Default::default()
        };
        let updated = repo.update(plant.id, &patch).await.unwrap();

        assert_eq!(updated.last_watered_date, date(2024, 3, 10));
        assert_eq!(updated.next_watering_date, date(2024, 3, 17));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_can_null_out_location(pool: PgPool) {
        let owner = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let plant = repo.create(&create_request(owner)).await.unwrap();
        assert!(plant.location.is_some());

        let patch = PlantUpdateDBRequest {
            location: Some(None),
            ..Default::default()
        };
        let updated = repo.update(plant.id, &patch).await.unwrap();
        assert!(updated.location.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_plant_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let err = repo
            .update(uuid::Uuid::new_v4(), &PlantUpdateDBRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_owner(pool: PgPool) {
        let owner_a = create_owner(&pool).await;
        let owner_b = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        repo.create(&create_request(owner_a)).await.unwrap();
        repo.create(&create_request(owner_a)).await.unwrap();
        repo.create(&create_request(owner_b)).await.unwrap();

        let for_a = repo.list(&PlantFilter::for_user(owner_a)).await.unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|p| p.user_id == owner_a));

        let all = repo.list(&PlantFilter::new(0, 100)).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete(pool: PgPool) {
        let owner = create_owner(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Plants::new(&mut conn);

        let plant = repo.create(&create_request(owner)).await.unwrap();
        assert!(repo.delete(plant.id).await.unwrap());
        assert!(!repo.delete(plant.id).await.unwrap());
        assert!(repo.get_by_id(plant.id).await.unwrap().is_none());
    }
}
