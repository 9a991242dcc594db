use std::sync::Arc;

use crate::{uuid_from_blob, ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    canton::{CantonConfigurationEntity, CantonDao, CategoryEntity, CategorySetEntity},
    DaoError,
};
use sqlx::query_as;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct CantonDb {
    id: Vec<u8>,
    name: String,
    annual_work_hours: f64,
    is_configurable: i64,
    use_custom_work_hours: i64,
    show_subcategories: i64,
}
impl TryFrom<&CantonDb> for CantonConfigurationEntity {
    type Error = DaoError;
    fn try_from(canton: &CantonDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_blob(&canton.id)?,
            name: canton.name.as_str().into(),
            annual_work_hours: canton.annual_work_hours,
            is_configurable: canton.is_configurable != 0,
            use_custom_work_hours: canton.use_custom_work_hours != 0,
            show_subcategories: canton.show_subcategories != 0,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategorySetDb {
    id: Vec<u8>,
    canton_id: Vec<u8>,
    title: String,
    percentage: f64,
    min_target_percentage: f64,
    max_target_percentage: f64,
}
impl TryFrom<&CategorySetDb> for CategorySetEntity {
    type Error = DaoError;
    fn try_from(set: &CategorySetDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_blob(&set.id)?,
            canton_id: uuid_from_blob(&set.canton_id)?,
            title: set.title.as_str().into(),
            percentage: set.percentage,
            min_target_percentage: set.min_target_percentage,
            max_target_percentage: set.max_target_percentage,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryDb {
    id: Vec<u8>,
    category_set_id: Vec<u8>,
    title: String,
}
impl TryFrom<&CategoryDb> for CategoryEntity {
    type Error = DaoError;
    fn try_from(category: &CategoryDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: uuid_from_blob(&category.id)?,
            category_set_id: uuid_from_blob(&category.category_set_id)?,
            title: category.title.as_str().into(),
        })
    }
}

pub struct CantonDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl CantonDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl CantonDao for CantonDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_configuration(
        &self,
        canton_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<CantonConfigurationEntity>, DaoError> {
        query_as::<_, CantonDb>(
            "SELECT id, name, annual_work_hours, is_configurable, use_custom_work_hours, \
             show_subcategories FROM canton WHERE id = ?",
        )
        .bind(canton_id.as_bytes().to_vec())
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(CantonConfigurationEntity::try_from)
        .transpose()
    }

    async fn find_category_sets(
        &self,
        canton_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CategorySetEntity]>, DaoError> {
        query_as::<_, CategorySetDb>(
            "SELECT id, canton_id, title, percentage, min_target_percentage, \
             max_target_percentage FROM category_set WHERE canton_id = ? ORDER BY title",
        )
        .bind(canton_id.as_bytes().to_vec())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(CategorySetEntity::try_from)
        .collect::<Result<Arc<[CategorySetEntity]>, DaoError>>()
    }

    async fn find_categories(
        &self,
        canton_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CategoryEntity]>, DaoError> {
        query_as::<_, CategoryDb>(
            "SELECT category.id, category.category_set_id, category.title FROM category \
             JOIN category_set ON category_set.id = category.category_set_id \
             WHERE category_set.canton_id = ? ORDER BY category_set.title, category.title",
        )
        .bind(canton_id.as_bytes().to_vec())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(CategoryEntity::try_from)
        .collect::<Result<Arc<[CategoryEntity]>, DaoError>>()
    }
}
