use std::sync::Arc;

use crate::{uuid_from_blob, ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    time_record::{CategoryRefEntity, TimeRecordDao, TimeRecordEntity},
    DaoError,
};
use pensum_utils::date_utils::parse_iso_date;
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, PrimitiveDateTime};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, user_id, date, duration_minutes, is_user_category, \
     category_id, user_category_id, comment, created, deleted, update_version";

#[derive(Debug, sqlx::FromRow)]
struct TimeRecordDb {
    id: Vec<u8>,
    user_id: Vec<u8>,
    date: String,
    duration_minutes: i64,
    is_user_category: i64,
    category_id: Option<Vec<u8>>,
    user_category_id: Option<Vec<u8>>,
    comment: Option<String>,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}

impl TryFrom<&TimeRecordDb> for TimeRecordEntity {
    type Error = DaoError;
    fn try_from(record: &TimeRecordDb) -> Result<Self, Self::Error> {
        let category_id = record
            .category_id
            .as_deref()
            .map(uuid_from_blob)
            .transpose()?;
        let user_category_id = record
            .user_category_id
            .as_deref()
            .map(uuid_from_blob)
            .transpose()?;
        Ok(Self {
            id: uuid_from_blob(&record.id)?,
            user_id: uuid_from_blob(&record.user_id)?,
            date: parse_iso_date(&record.date)?,
            duration_minutes: record.duration_minutes.max(0) as u32,
            category: CategoryRefEntity::from_columns(
                record.is_user_category != 0,
                category_id,
                user_category_id,
            ),
            comment: record.comment.as_ref().map(|comment| comment.as_str().into()),
            created: PrimitiveDateTime::parse(&record.created, &Iso8601::DATE_TIME)?,
            deleted: record
                .deleted
                .as_ref()
                .map(|deleted| PrimitiveDateTime::parse(deleted, &Iso8601::DATE_TIME))
                .transpose()?,
            version: uuid_from_blob(&record.update_version)?,
        })
    }
}

fn category_columns(
    category: &CategoryRefEntity,
) -> (i64, Option<Vec<u8>>, Option<Vec<u8>>) {
    match category {
        CategoryRefEntity::Canton(id) => (0, Some(id.as_bytes().to_vec()), None),
        CategoryRefEntity::UserDefined(id) => (1, None, Some(id.as_bytes().to_vec())),
        CategoryRefEntity::None => (0, None, None),
    }
}

pub struct TimeRecordDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl TimeRecordDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl TimeRecordDao for TimeRecordDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<TimeRecordEntity>, DaoError> {
        let id_vec = id.as_bytes().to_vec();
        query_as::<_, TimeRecordDb>(&format!(
            "SELECT {SELECT_COLUMNS} FROM time_record WHERE id = ?"
        ))
        .bind(id_vec)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(TimeRecordEntity::try_from)
        .transpose()
    }

    async fn find_by_user_in_range(
        &self,
        user_id: Uuid,
        from: time::Date,
        to: time::Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[TimeRecordEntity]>, DaoError> {
        let user_id_vec = user_id.as_bytes().to_vec();
        let from = from.format(&Iso8601::DATE)?;
        let to = to.format(&Iso8601::DATE)?;
        query_as::<_, TimeRecordDb>(&format!(
            "SELECT {SELECT_COLUMNS} FROM time_record \
             WHERE user_id = ? AND date >= ? AND date <= ? AND deleted IS NULL \
             ORDER BY date"
        ))
        .bind(user_id_vec)
        .bind(from)
        .bind(to)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(TimeRecordEntity::try_from)
        .collect::<Result<Arc<[TimeRecordEntity]>, DaoError>>()
    }

    async fn create(
        &self,
        entity: &TimeRecordEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let (is_user_category, category_id, user_category_id) =
            category_columns(&entity.category);
        query(
            "INSERT INTO time_record (id, user_id, date, duration_minutes, is_user_category, \
             category_id, user_category_id, comment, created, update_version, update_process) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(entity.date.format(&Iso8601::DATE)?)
        .bind(i64::from(entity.duration_minutes))
        .bind(is_user_category)
        .bind(category_id)
        .bind(user_category_id)
        .bind(entity.comment.as_ref().map(|comment| comment.to_string()))
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
        entity: &TimeRecordEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let (is_user_category, category_id, user_category_id) =
            category_columns(&entity.category);
        query(
            "UPDATE time_record SET date = ?, duration_minutes = ?, is_user_category = ?, \
             category_id = ?, user_category_id = ?, comment = ?, update_version = ?, \
             update_process = ? WHERE id = ?",
        )
        .bind(entity.date.format(&Iso8601::DATE)?)
        .bind(i64::from(entity.duration_minutes))
        .bind(is_user_category)
        .bind(category_id)
        .bind(user_category_id)
        .bind(entity.comment.as_ref().map(|comment| comment.to_string()))
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
            "UPDATE time_record SET deleted = strftime('%Y-%m-%dT%H:%M:%S', 'now'), \
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
