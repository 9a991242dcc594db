use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

/// Per-category minutes inside one category set, shown when the canton
/// exposes subcategories. Display only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubcategoryStatistics {
    pub category_id: Uuid,
    pub title: Arc<str>,
    pub effective_minutes: u32,
}

/// Statistics of one category set over the queried range.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryStatisticsRow {
    pub set_title: Arc<str>,
    /// The target percentage the row was computed with.
    pub target_percentage: f64,
    /// Minutes actually logged.
    pub effective_minutes: u32,
    /// Prorated required minutes.
    pub target_minutes: u32,
    /// Share of the total logged time, two decimals, e.g. `"42.86"`.
    pub effective_workload: Arc<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Arc<[SubcategoryStatistics]>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryStatistics {
    pub rows: Arc<[CategoryStatisticsRow]>,
    /// Always 0 here; the no-category bucket lives in the remaining
    /// statistics.
    pub no_category_minutes: u32,
    pub total_effective_minutes: u32,
    pub total_target_minutes: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RemainingCategoryKind {
    /// One further-employment category, with its own workload percentage.
    FurtherEmployment {
        category_id: Uuid,
        title: Arc<str>,
        workload: f64,
    },
    /// Records without any category.
    NoCategory,
    /// Records booked on a canton category that is not part of the user's
    /// current canton.
    OtherCanton,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RemainingCategoryRow {
    pub kind: RemainingCategoryKind,
    pub effective_minutes: u32,
    pub target_minutes: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RemainingCategoryStatistics {
    pub rows: Arc<[RemainingCategoryRow]>,
}

#[automock(type Context=(); type Transaction=dao::MockTransaction;)]
#[async_trait]
pub trait StatisticsService {
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    /// Statistics per category set of the user's canton over the inclusive
    /// date range.
    async fn category_statistics(
        &self,
        user_id: Uuid,
        from: time::Date,
        to: time::Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<CategoryStatistics, ServiceError>;

    /// Statistics for everything outside the canton's category sets:
    /// further-employment categories, uncategorized records, and records
    /// from another canton.
    async fn remaining_category_statistics(
        &self,
        user_id: Uuid,
        from: time::Date,
        to: time::Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<RemainingCategoryStatistics, ServiceError>;
}
