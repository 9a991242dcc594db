use std::sync::Arc;

use crate::{uuid_from_blob, ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    user::{UserDao, UserEntity},
    DaoError,
};
use sqlx::query_as;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct UserDb {
    id: Vec<u8>,
    canton_id: Vec<u8>,
    workload: Option<f64>,
    custom_work_hours: Option<f64>,
}
impl TryFrom<&UserDb> for UserEntity {
    type Error = DaoError;
    fn try_from(user: &UserDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_blob(&user.id)?,
            canton_id: uuid_from_blob(&user.canton_id)?,
            workload: user.workload,
            custom_work_hours: user.custom_work_hours,
        })
    }
}

pub struct UserDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl UserDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl UserDao for UserDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<UserEntity>, DaoError> {
        query_as::<_, UserDb>(
            "SELECT id, canton_id, workload, custom_work_hours FROM user WHERE id = ?",
        )
        .bind(id.as_bytes().to_vec())
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(UserEntity::try_from)
        .transpose()
    }
}
