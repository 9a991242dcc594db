use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

/// A user's override of one category set's target percentage. Unique per
/// (user, category set) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomTargetEntity {
    pub user_id: Uuid,
    pub category_set_id: Uuid,
    pub percentage: f64,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait CustomTargetDao {
    type Transaction: crate::Transaction;

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CustomTargetEntity]>, DaoError>;

    async fn upsert(
        &self,
        entity: &CustomTargetEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
