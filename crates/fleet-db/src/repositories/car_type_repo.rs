//! Car type (rate table) repository implementation
//!
//! Rate changes here never touch existing bookings; bookings carry their own
//! snapshot of the rates.

use crate::rows::{CarTypeRow, CAR_TYPE_COLUMNS};
use async_trait::async_trait;
use fleet_core::{
    models::{CarType, UpdateCarTypeRates},
    traits::{CarTypeRepository, Repository},
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of CarTypeRepository
pub struct PgCarTypeRepository {
    pool: PgPool,
}

impl PgCarTypeRepository {
    /// Create a new car type repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<CarType, i32> for PgCarTypeRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<CarType>> {
        debug!("Finding car type by id: {}", id);

        let sql = format!("SELECT {} FROM car_types WHERE id = $1", CAR_TYPE_COLUMNS);
        let result = sqlx::query_as::<sqlx::Postgres, CarTypeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding car type {}: {}", id, e);
                AppError::Database(format!("Failed to find car type: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<CarType>> {
        let sql = format!(
            "SELECT {} FROM car_types ORDER BY id LIMIT $1 OFFSET $2",
            CAR_TYPE_COLUMNS
        );
        let rows = sqlx::query_as::<sqlx::Postgres, CarTypeRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing car types: {}", e);
                AppError::Database(format!("Failed to fetch car types: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM car_types")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting car types: {}", e);
                AppError::Database(format!("Failed to count car types: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity), fields(name = %entity.name))]
    async fn create(&self, entity: &CarType) -> AppResult<CarType> {
        let sql = format!(
            r#"
            INSERT INTO car_types (name, daily_rate, weekly_rate, monthly_rate, image_ref)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CAR_TYPE_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CarTypeRow>(&sql)
            .bind(&entity.name)
            .bind(entity.daily_rate)
            .bind(entity.weekly_rate)
            .bind(entity.monthly_rate)
            .bind(&entity.image_ref)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating car type: {}", e);
                AppError::Database(format!("Failed to create car type: {}", e))
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity), fields(id = entity.id))]
    async fn update(&self, entity: &CarType) -> AppResult<CarType> {
        let sql = format!(
            r#"
            UPDATE car_types
            SET name = $2,
                daily_rate = $3,
                weekly_rate = $4,
                monthly_rate = $5,
                image_ref = $6
            WHERE id = $1
            RETURNING {}
            "#,
            CAR_TYPE_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CarTypeRow>(&sql)
            .bind(entity.id)
            .bind(&entity.name)
            .bind(entity.daily_rate)
            .bind(entity.weekly_rate)
            .bind(entity.monthly_rate)
            .bind(&entity.image_ref)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating car type {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update car type: {}", e))
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM car_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting car type {}: {}", id, e);
                AppError::Database(format!("Failed to delete car type: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CarTypeRepository for PgCarTypeRepository {
    #[instrument(skip(self, rates))]
    async fn update_rates(
        &self,
        id: i32,
        rates: &UpdateCarTypeRates,
    ) -> AppResult<Option<CarType>> {
        let sql = format!(
            r#"
            UPDATE car_types
            SET daily_rate = $2, weekly_rate = $3, monthly_rate = $4
            WHERE id = $1
            RETURNING {}
            "#,
            CAR_TYPE_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CarTypeRow>(&sql)
            .bind(id)
            .bind(rates.daily_rate)
            .bind(rates.weekly_rate)
            .bind(rates.monthly_rate)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating rates of car type {}: {}", id, e);
                AppError::Database(format!("Failed to update rates: {}", e))
            })?;

        Ok(row.map(Into::into))
    }
}
