use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

/// Which category a time record is booked on.
///
/// The store keeps this as two nullable id columns plus a discriminator
/// flag; in memory it is a proper sum type so the flag can never disagree
/// with the populated id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryRefEntity {
    /// A category from the canton's category sets.
    Canton(Uuid),
    /// A user-defined further-employment category.
    UserDefined(Uuid),
    /// No category assigned.
    None,
}

impl CategoryRefEntity {
    /// Reconstruct the reference from the raw store columns. The
    /// discriminator flag wins; a row carrying both ids is tolerated with a
    /// warning.
    pub fn from_columns(
        is_user_category: bool,
        category_id: Option<Uuid>,
        user_category_id: Option<Uuid>,
    ) -> Self {
        if category_id.is_some() && user_category_id.is_some() {
            tracing::warn!(
                ?category_id,
                ?user_category_id,
                "time record row carries both category ids, trusting is_user_category flag"
            );
        }
        if is_user_category {
            match user_category_id {
                Some(id) => Self::UserDefined(id),
                None => {
                    tracing::warn!(
                        "time record row flagged as user category but has no user_category_id"
                    );
                    Self::None
                }
            }
        } else {
            match category_id {
                Some(id) => Self::Canton(id),
                None => Self::None,
            }
        }
    }

    pub fn canton_category_id(&self) -> Option<Uuid> {
        match self {
            Self::Canton(id) => Some(*id),
            _ => None,
        }
    }

    pub fn user_category_id(&self) -> Option<Uuid> {
        match self {
            Self::UserDefined(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_user_category(&self) -> bool {
        matches!(self, Self::UserDefined(_))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimeRecordEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: time::Date,
    pub duration_minutes: u32,
    pub category: CategoryRefEntity,
    pub comment: Option<Arc<str>>,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait TimeRecordDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<TimeRecordEntity>, DaoError>;

    /// All not-deleted records of a user with a date inside the inclusive
    /// range.
    async fn find_by_user_in_range(
        &self,
        user_id: Uuid,
        from: time::Date,
        to: time::Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[TimeRecordEntity]>, DaoError>;

    async fn create(
        &self,
        entity: &TimeRecordEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    async fn update(
        &self,
        entity: &TimeRecordEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    async fn delete(
        &self,
        id: Uuid,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
