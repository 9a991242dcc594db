use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

/// A user-defined further-employment category with its own workload
/// percentage, independent of the canton's category sets.
#[derive(Clone, Debug, PartialEq)]
pub struct UserCategoryEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Arc<str>,
    pub workload: f64,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

/// Projection used by the batched workload lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct UserCategoryWorkloadEntity {
    pub id: Uuid,
    pub workload: f64,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait UserCategoryDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<UserCategoryEntity>, DaoError>;

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[UserCategoryEntity]>, DaoError>;

    /// One batched lookup; ids without a matching row are simply absent
    /// from the result.
    async fn find_workloads_by_ids(
        &self,
        ids: Arc<[Uuid]>,
        user_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[UserCategoryWorkloadEntity]>, DaoError>;

    async fn create(
        &self,
        entity: &UserCategoryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    async fn update(
        &self,
        entity: &UserCategoryEntity,
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
