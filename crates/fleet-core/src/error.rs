//! Unified error handling for the fleet rental backend
//!
//! Every failure in the booking lifecycle, the persistence layer and the HTTP
//! surface is expressed as an [`AppError`], with automatic HTTP response mapping.

use crate::models::BookingStatus;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Kind of entity a lookup was performed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Booking,
    Customer,
    Car,
    CarType,
    Hub,
    AddOn,
    Invoice,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Booking => write!(f, "booking"),
            EntityKind::Customer => write!(f, "customer"),
            EntityKind::Car => write!(f, "car"),
            EntityKind::CarType => write!(f, "car type"),
            EntityKind::Hub => write!(f, "hub"),
            EntityKind::AddOn => write!(f, "add-on"),
            EntityKind::Invoice => write!(f, "invoice"),
        }
    }
}

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Lifecycle Errors ====================
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    #[error("Booking is {current}, operation requires {required}")]
    InvalidState {
        current: BookingStatus,
        required: BookingStatus,
    },

    #[error("Car {car_id} is not available")]
    CarUnavailable { car_id: i32 },

    #[error("Booking is already {status}")]
    AlreadyTerminal { status: BookingStatus },

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Resource Errors ====================
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ==================== Collaborator Errors ====================
    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Document generation failed: {0}")]
    Document(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Shorthand for a lookup miss
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::InvalidState { .. }
            | AppError::CarUnavailable { .. }
            | AppError::AlreadyTerminal { .. }
            | AppError::Conflict(_)
            | AppError::AlreadyExists(_) => StatusCode::CONFLICT,

            // 502 Bad Gateway
            AppError::Notification(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::NotFound { .. } => "not_found",
            AppError::InvalidState { .. } => "invalid_state",
            AppError::CarUnavailable { .. } => "car_unavailable",
            AppError::AlreadyTerminal { .. } => "already_terminal",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Conflict(_) => "conflict",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Notification(_) => "notification_error",
            AppError::Document(_) => "document_error",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::AlreadyExists(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::InvalidInput(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => AppError::Pool(err.to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
