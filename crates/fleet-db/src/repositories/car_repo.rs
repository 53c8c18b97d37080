//! Car repository implementation
//!
//! Registration and lookup of fleet inventory. Availability is written only
//! by the booking lifecycle, so `update` leaves it alone.

use crate::rows::{CarRow, CAR_COLUMNS};
use async_trait::async_trait;
use fleet_core::{
    models::Car,
    traits::{CarRepository, Repository},
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of CarRepository
pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    /// Create a new car repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Car, i32> for PgCarRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Car>> {
        debug!("Finding car by id: {}", id);

        let sql = format!("SELECT {} FROM cars WHERE id = $1", CAR_COLUMNS);
        let result = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding car {}: {}", id, e);
                AppError::Database(format!("Failed to find car: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Car>> {
        let sql = format!(
            "SELECT {} FROM cars ORDER BY id LIMIT $1 OFFSET $2",
            CAR_COLUMNS
        );
        let rows = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing cars: {}", e);
                AppError::Database(format!("Failed to fetch cars: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting cars: {}", e);
                AppError::Database(format!("Failed to count cars: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity), fields(plate = %entity.number_plate))]
    async fn create(&self, entity: &Car) -> AppResult<Car> {
        let sql = format!(
            r#"
            INSERT INTO cars (
                car_type_id, hub_id, name, number_plate, mileage,
                maintenance_due, availability
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CAR_COLUMNS
        );

        // Unique violations on number_plate surface as AlreadyExists
        let row = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(entity.car_type_id)
            .bind(entity.hub_id)
            .bind(&entity.name)
            .bind(&entity.number_plate)
            .bind(entity.mileage)
            .bind(entity.maintenance_due)
            .bind(entity.availability.as_flag())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating car: {}", e);
                AppError::from(e)
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity), fields(id = entity.id))]
    async fn update(&self, entity: &Car) -> AppResult<Car> {
        let sql = format!(
            r#"
            UPDATE cars
            SET car_type_id = $2,
                hub_id = $3,
                name = $4,
                number_plate = $5,
                mileage = $6,
                maintenance_due = $7
            WHERE id = $1
            RETURNING {}
            "#,
            CAR_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(entity.id)
            .bind(entity.car_type_id)
            .bind(entity.hub_id)
            .bind(&entity.name)
            .bind(&entity.number_plate)
            .bind(entity.mileage)
            .bind(entity.maintenance_due)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating car {}: {}", entity.id, e);
                AppError::from(e)
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting car {}: {}", id, e);
                AppError::Database(format!("Failed to delete car: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    #[instrument(skip(self))]
    async fn find_by_plate(&self, number_plate: &str) -> AppResult<Option<Car>> {
        let sql = format!("SELECT {} FROM cars WHERE number_plate = $1", CAR_COLUMNS);
        let result = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(number_plate)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding car by plate: {}", e);
                AppError::Database(format!("Failed to find car: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_by_hub(&self, hub_id: i32) -> AppResult<Vec<Car>> {
        let sql = format!(
            "SELECT {} FROM cars WHERE hub_id = $1 ORDER BY id",
            CAR_COLUMNS
        );
        let rows = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(hub_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing cars at hub {}: {}", hub_id, e);
                AppError::Database(format!("Failed to fetch cars: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
