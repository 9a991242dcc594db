use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub mod canton;
pub mod clock;
pub mod permission;
pub mod statistics;
pub mod time_record;
pub mod user_category;
pub mod uuid_service;

pub use permission::{MockPermissionService, PermissionService};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] dao::DaoError),

    #[error("Forbidden")]
    Forbidden,

    #[error("Entity {0} not found")]
    EntityNotFound(Uuid),

    #[error("Entity {0} was changed concurrently: expected version {1}, found {2}")]
    EntityConflicts(Uuid, Uuid, Uuid),

    #[error("Id must not be set on create")]
    IdSetOnCreate,

    #[error("Version must not be set on create")]
    VersionSetOnCreate,

    #[error("Created timestamp must not be set on create")]
    CreatedSetOnCreate,

    #[error("Deleted timestamp must not be set on create")]
    DeletedSetOnCreate,

    #[error("Validation error: {0}")]
    ValidationError(Arc<str>),

    #[error("Invalid date component: {0}")]
    DateComponentError(#[from] time::error::ComponentRange),

    #[error("Internal error")]
    InternalError,
}
