use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::time_record::{CategoryRefEntity, TimeRecordEntity};
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryRef {
    Canton(Uuid),
    UserDefined(Uuid),
    None,
}

impl From<&CategoryRefEntity> for CategoryRef {
    fn from(category: &CategoryRefEntity) -> Self {
        match category {
            CategoryRefEntity::Canton(id) => Self::Canton(*id),
            CategoryRefEntity::UserDefined(id) => Self::UserDefined(*id),
            CategoryRefEntity::None => Self::None,
        }
    }
}
impl From<&CategoryRef> for CategoryRefEntity {
    fn from(category: &CategoryRef) -> Self {
        match category {
            CategoryRef::Canton(id) => Self::Canton(*id),
            CategoryRef::UserDefined(id) => Self::UserDefined(*id),
            CategoryRef::None => Self::None,
        }
    }
}

/// One logged working-time entry.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: time::Date,
    pub duration_minutes: u32,
    pub category: CategoryRef,
    pub comment: Option<Arc<str>>,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl From<&TimeRecordEntity> for TimeRecord {
    fn from(entity: &TimeRecordEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            date: entity.date,
            duration_minutes: entity.duration_minutes,
            category: (&entity.category).into(),
            comment: entity.comment.clone(),
            created: Some(entity.created),
            deleted: entity.deleted,
            version: entity.version,
        }
    }
}
pensum_utils::derive_from_reference!(TimeRecordEntity, TimeRecord);

impl TryFrom<&TimeRecord> for TimeRecordEntity {
    type Error = ServiceError;
    fn try_from(record: &TimeRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            user_id: record.user_id,
            date: record.date,
            duration_minutes: record.duration_minutes,
            category: (&record.category).into(),
            comment: record.comment.clone(),
            created: record.created.ok_or(ServiceError::InternalError)?,
            deleted: record.deleted,
            version: record.version,
        })
    }
}
pensum_utils::derive_try_from_reference!(TimeRecord, TimeRecordEntity, ServiceError);

#[automock(type Context=(); type Transaction=dao::MockTransaction;)]
#[async_trait]
pub trait TimeRecordService {
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    async fn get_by_id(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<TimeRecord, ServiceError>;

    async fn find_in_range(
        &self,
        user_id: Uuid,
        from: time::Date,
        to: time::Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[TimeRecord]>, ServiceError>;

    async fn create(
        &self,
        record: &TimeRecord,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<TimeRecord, ServiceError>;

    async fn update(
        &self,
        record: &TimeRecord,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<TimeRecord, ServiceError>;

    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
}
