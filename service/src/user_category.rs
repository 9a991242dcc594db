use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::user_category::UserCategoryEntity;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

/// A further-employment category owned by a user, with its own workload
/// percentage.
#[derive(Clone, Debug, PartialEq)]
pub struct UserCategory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Arc<str>,
    pub workload: f64,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl From<&UserCategoryEntity> for UserCategory {
    fn from(entity: &UserCategoryEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            title: entity.title.clone(),
            workload: entity.workload,
            created: Some(entity.created),
            deleted: entity.deleted,
            version: entity.version,
        }
    }
}
pensum_utils::derive_from_reference!(UserCategoryEntity, UserCategory);

impl TryFrom<&UserCategory> for UserCategoryEntity {
    type Error = ServiceError;
    fn try_from(category: &UserCategory) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id,
            user_id: category.user_id,
            title: category.title.clone(),
            workload: category.workload,
            created: category.created.ok_or(ServiceError::InternalError)?,
            deleted: category.deleted,
            version: category.version,
        })
    }
}
pensum_utils::derive_try_from_reference!(UserCategory, UserCategoryEntity, ServiceError);

#[automock(type Context=(); type Transaction=dao::MockTransaction;)]
#[async_trait]
pub trait UserCategoryService {
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[UserCategory]>, ServiceError>;

    /// Batched workload lookup. The result only contains ids with a
    /// matching category; the caller decides how to treat missing ones.
    async fn workloads_by_ids(
        &self,
        ids: Arc<[Uuid]>,
        user_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HashMap<Uuid, f64>, ServiceError>;

    async fn create(
        &self,
        category: &UserCategory,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<UserCategory, ServiceError>;

    async fn update(
        &self,
        category: &UserCategory,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<UserCategory, ServiceError>;

    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
}
