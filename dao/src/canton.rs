use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

/// Per-canton working-time policy constants.
#[derive(Clone, Debug, PartialEq)]
pub struct CantonConfigurationEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    /// Full-time annual work hour baseline.
    pub annual_work_hours: f64,
    /// Whether users may override the category-set percentages.
    pub is_configurable: bool,
    /// Whether a user-level annual hours override replaces the baseline.
    pub use_custom_work_hours: bool,
    /// Whether the UI shows a per-category breakdown inside each set.
    pub show_subcategories: bool,
}

/// A named grouping of categories sharing one target percentage of the
/// annual hours.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySetEntity {
    pub id: Uuid,
    pub canton_id: Uuid,
    pub title: Arc<str>,
    pub percentage: f64,
    pub min_target_percentage: f64,
    pub max_target_percentage: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryEntity {
    pub id: Uuid,
    pub category_set_id: Uuid,
    pub title: Arc<str>,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait CantonDao {
    type Transaction: crate::Transaction;

    async fn find_configuration(
        &self,
        canton_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<CantonConfigurationEntity>, DaoError>;

    async fn find_category_sets(
        &self,
        canton_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CategorySetEntity]>, DaoError>;

    async fn find_categories(
        &self,
        canton_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CategoryEntity]>, DaoError>;
}
