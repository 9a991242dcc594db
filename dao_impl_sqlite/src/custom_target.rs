use std::sync::Arc;

use crate::{uuid_from_blob, ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    custom_target::{CustomTargetDao, CustomTargetEntity},
    DaoError,
};
use sqlx::{query, query_as};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct CustomTargetDb {
    user_id: Vec<u8>,
    category_set_id: Vec<u8>,
    percentage: f64,
}
impl TryFrom<&CustomTargetDb> for CustomTargetEntity {
    type Error = DaoError;
    fn try_from(target: &CustomTargetDb) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: uuid_from_blob(&target.user_id)?,
            category_set_id: uuid_from_blob(&target.category_set_id)?,
            percentage: target.percentage,
        })
    }
}

pub struct CustomTargetDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl CustomTargetDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl CustomTargetDao for CustomTargetDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CustomTargetEntity]>, DaoError> {
        query_as::<_, CustomTargetDb>(
            "SELECT user_id, category_set_id, percentage FROM custom_target \
             WHERE user_id = ?",
        )
        .bind(user_id.as_bytes().to_vec())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(CustomTargetEntity::try_from)
        .collect::<Result<Arc<[CustomTargetEntity]>, DaoError>>()
    }

    async fn upsert(
        &self,
        entity: &CustomTargetEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        query(
            "INSERT INTO custom_target (user_id, category_set_id, percentage, update_process) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (user_id, category_set_id) \
             DO UPDATE SET percentage = excluded.percentage, \
             update_process = excluded.update_process",
        )
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(entity.category_set_id.as_bytes().to_vec())
        .bind(entity.percentage)
        .bind(process)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}
