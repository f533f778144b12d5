//! Generic CRUD handlers for the catalog collections (patients,
//! departments, diseases, and doctor reads/deletes).
//!
//! Routes instantiate them per record type, e.g. `get(catalog::list::<Patient>)`.

use crate::errors::HospitalError;
use crate::handlers::{IdQuery, JsonBody};
use crate::models::{Department, Disease, Doctor, MessageResponse, Patient};
use crate::repositories::{JsonStore, Record, Stores};
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// A record type served by the generic catalog handlers.
pub trait CatalogRecord: Record {
    /// Acknowledgement returned by the delete route.
    const DELETED_MESSAGE: &'static str;

    fn store(stores: &Stores) -> &JsonStore<Self>;
}

impl CatalogRecord for Patient {
    const DELETED_MESSAGE: &'static str = "Patient deleted successfully";

    fn store(stores: &Stores) -> &JsonStore<Self> {
        &stores.patients
    }
}

impl CatalogRecord for Doctor {
    const DELETED_MESSAGE: &'static str = "Doctor deleted successfully";

    fn store(stores: &Stores) -> &JsonStore<Self> {
        &stores.doctors
    }
}

impl CatalogRecord for Department {
    const DELETED_MESSAGE: &'static str = "Department deleted successfully";

    fn store(stores: &Stores) -> &JsonStore<Self> {
        &stores.departments
    }
}

impl CatalogRecord for Disease {
    const DELETED_MESSAGE: &'static str = "Disease deleted successfully";

    fn store(stores: &Stores) -> &JsonStore<Self> {
        &stores.diseases
    }
}

pub async fn list<T: CatalogRecord>(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<T>>, HospitalError> {
    Ok(Json(T::store(&state.stores).read_all().await?))
}

pub async fn get_one<T: CatalogRecord>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<T>, HospitalError> {
    let record = T::store(&state.stores).get_by_id(query.required()?).await?;
    Ok(Json(record))
}

pub async fn create<T: CatalogRecord>(
    State(state): State<Arc<AppState>>,
    JsonBody(record): JsonBody<T>,
) -> Result<(StatusCode, Json<T>), HospitalError> {
    let created = T::store(&state.stores).create(record).await?;
    tracing::info!(target: "hospital.handlers.catalog", collection = T::COLLECTION, id = %created.id(), "Record created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<T: CatalogRecord>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
    JsonBody(record): JsonBody<T>,
) -> Result<Json<T>, HospitalError> {
    let updated = T::store(&state.stores)
        .update(query.required()?, record)
        .await?;
    Ok(Json(updated))
}

/// Deleting an absent id is a no-op and still acknowledged.
pub async fn delete<T: CatalogRecord>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<MessageResponse>, HospitalError> {
    let removed = T::store(&state.stores).delete(query.required()?).await?;
    tracing::info!(target: "hospital.handlers.catalog", collection = T::COLLECTION, removed, "Record delete");
    Ok(Json(MessageResponse::new(T::DELETED_MESSAGE)))
}
