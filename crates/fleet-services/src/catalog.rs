//! Reference data service
//!
//! Hubs and the add-on catalog. Add-on rates are copied onto a booking when
//! it is created, so catalog changes never reprice existing bookings.

use fleet_core::{
    models::{AddOn, CreateAddOn, Hub},
    traits::{RentalStore, RentalTransaction},
    AppError, AppResult, EntityKind,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

pub struct Catalog<S: RentalStore> {
    store: Arc<S>,
}

impl<S: RentalStore> Catalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All hubs, ordered by id
    #[instrument(skip(self))]
    pub async fn list_hubs(&self) -> AppResult<Vec<Hub>> {
        let mut tx = self.store.begin().await?;
        let hubs = tx.list_hubs().await?;

        debug!("Listed {} hubs", hubs.len());
        Ok(hubs)
    }

    /// All add-ons, ordered by id
    #[instrument(skip(self))]
    pub async fn list_add_ons(&self) -> AppResult<Vec<AddOn>> {
        let mut tx = self.store.begin().await?;
        tx.list_add_ons().await
    }

    #[instrument(skip(self))]
    pub async fn get_add_on(&self, id: i32) -> AppResult<AddOn> {
        let mut tx = self.store.begin().await?;
        tx.find_add_on(id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::AddOn, id))
    }

    /// Add an entry to the add-on catalog
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_add_on(&self, request: CreateAddOn) -> AppResult<AddOn> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let created = tx.insert_add_on(&request.to_add_on()).await?;
        tx.commit().await?;

        info!(
            "Add-on {} ({}) created at {} per day",
            created.id, created.name, created.daily_rate
        );
        Ok(created)
    }
}
