use std::sync::Arc;

use crate::{uuid_from_blob, ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    user_category::{UserCategoryDao, UserCategoryEntity, UserCategoryWorkloadEntity},
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, PrimitiveDateTime};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct UserCategoryDb {
    id: Vec<u8>,
    user_id: Vec<u8>,
    title: String,
    workload: f64,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}
impl TryFrom<&UserCategoryDb> for UserCategoryEntity {
    type Error = DaoError;
    fn try_from(category: &UserCategoryDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_blob(&category.id)?,
            user_id: uuid_from_blob(&category.user_id)?,
            title: category.title.as_str().into(),
            workload: category.workload,
            created: PrimitiveDateTime::parse(&category.created, &Iso8601::DATE_TIME)?,
            deleted: category
                .deleted
                .as_ref()
                .map(|deleted| PrimitiveDateTime::parse(deleted, &Iso8601::DATE_TIME))
                .transpose()?,
            version: uuid_from_blob(&category.update_version)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserCategoryWorkloadDb {
    id: Vec<u8>,
    workload: f64,
}
impl TryFrom<&UserCategoryWorkloadDb> for UserCategoryWorkloadEntity {
    type Error = DaoError;
    fn try_from(workload: &UserCategoryWorkloadDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_blob(&workload.id)?,
            workload: workload.workload,
        })
    }
}

pub struct UserCategoryDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl UserCategoryDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl UserCategoryDao for UserCategoryDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<UserCategoryEntity>, DaoError> {
        query_as::<_, UserCategoryDb>(
            "SELECT id, user_id, title, workload, created, deleted, update_version \
             FROM user_category WHERE id = ?",
        )
        .bind(id.as_bytes().to_vec())
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(UserCategoryEntity::try_from)
        .transpose()
    }

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[UserCategoryEntity]>, DaoError> {
        query_as::<_, UserCategoryDb>(
            "SELECT id, user_id, title, workload, created, deleted, update_version \
             FROM user_category WHERE user_id = ? AND deleted IS NULL ORDER BY created",
        )
        .bind(user_id.as_bytes().to_vec())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(UserCategoryEntity::try_from)
        .collect::<Result<Arc<[UserCategoryEntity]>, DaoError>>()
    }

    async fn find_workloads_by_ids(
        &self,
        ids: Arc<[Uuid]>,
        user_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[UserCategoryWorkloadEntity]>, DaoError> {
        if ids.is_empty() {
            return Ok(Arc::new([]));
        }
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT id, workload FROM user_category \
             WHERE user_id = ? AND deleted IS NULL AND id IN ({placeholders})"
        );
        let mut select = query_as::<_, UserCategoryWorkloadDb>(&sql)
            .bind(user_id.as_bytes().to_vec());
        for id in ids.iter() {
            select = select.bind(id.as_bytes().to_vec());
        }
        select
            .fetch_all(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .iter()
            .map(UserCategoryWorkloadEntity::try_from)
            .collect::<Result<Arc<[UserCategoryWorkloadEntity]>, DaoError>>()
    }

    async fn create(
        &self,
        entity: &UserCategoryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        query(
            "INSERT INTO user_category (id, user_id, title, workload, created, \
             update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(entity.title.to_string())
        .bind(entity.workload)
        .bind(entity.created.format(&Iso8601::DATE_TIME)?)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &UserCategoryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        query(
            "UPDATE user_category SET title = ?, workload = ?, update_version = ?, \
             update_process = ? WHERE id = ?",
        )
        .bind(entity.title.to_string())
        .bind(entity.workload)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .bind(entity.id.as_bytes().to_vec())
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete(
        &self,
        id: Uuid,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        query(
            "UPDATE user_category SET deleted = strftime('%Y-%m-%dT%H:%M:%S', 'now'), \
             update_process = ? WHERE id = ? AND deleted IS NULL",
        )
        .bind(process)
        .bind(id.as_bytes().to_vec())
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}
