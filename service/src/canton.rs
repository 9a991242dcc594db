use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::canton::{CantonConfigurationEntity, CategoryEntity, CategorySetEntity};
use mockall::automock;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

/// A category set of a canton, with the user's custom target merged in when
/// one exists.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySet {
    pub id: Uuid,
    pub title: Arc<str>,
    /// Canton-configured target percentage of annual hours.
    pub percentage: f64,
    /// User override, present in configurable cantons once the user saved
    /// custom targets.
    pub user_percentage: Option<f64>,
    pub min_target_percentage: f64,
    pub max_target_percentage: f64,
}

impl From<&CategorySetEntity> for CategorySet {
    fn from(entity: &CategorySetEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title.clone(),
            percentage: entity.percentage,
            user_percentage: None,
            min_target_percentage: entity.min_target_percentage,
            max_target_percentage: entity.max_target_percentage,
        }
    }
}
pensum_utils::derive_from_reference!(CategorySetEntity, CategorySet);

impl CategorySet {
    /// The percentage the target computation uses: the user override in a
    /// configurable canton, the canton value otherwise. A configurable
    /// canton without a saved override counts as 0.
    pub fn effective_target_percentage(&self, is_configurable: bool) -> f64 {
        if is_configurable {
            self.user_percentage.unwrap_or(0.0)
        } else {
            self.percentage
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CantonConfiguration {
    pub id: Uuid,
    pub name: Arc<str>,
    pub annual_work_hours: f64,
    pub is_configurable: bool,
    pub use_custom_work_hours: bool,
    pub show_subcategories: bool,
    pub category_sets: Arc<[CategorySet]>,
}

impl CantonConfiguration {
    pub fn from_entities(
        canton: &CantonConfigurationEntity,
        category_sets: Arc<[CategorySet]>,
    ) -> Self {
        Self {
            id: canton.id,
            name: canton.name.clone(),
            annual_work_hours: canton.annual_work_hours,
            is_configurable: canton.is_configurable,
            use_custom_work_hours: canton.use_custom_work_hours,
            show_subcategories: canton.show_subcategories,
            category_sets,
        }
    }
}

/// A canton category tagged with the title of the set it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct CantonCategory {
    pub id: Uuid,
    pub category_set_id: Uuid,
    pub title: Arc<str>,
    pub set_title: Arc<str>,
}

impl CantonCategory {
    pub fn from_entity(entity: &CategoryEntity, set_title: Arc<str>) -> Self {
        Self {
            id: entity.id,
            category_set_id: entity.category_set_id,
            title: entity.title.clone(),
            set_title,
        }
    }
}

/// One user-entered target percentage for a category set.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomTarget {
    pub category_set_id: Uuid,
    pub percentage: f64,
}

#[automock(type Context=(); type Transaction=dao::MockTransaction;)]
#[async_trait]
pub trait CantonService {
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    /// The configuration of the user's canton with the user's custom
    /// targets merged into the category sets.
    async fn configuration_for_user(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<CantonConfiguration, ServiceError>;

    /// All categories of the user's canton, each tagged with its set title.
    async fn categories_for_user(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[CantonCategory]>, ServiceError>;

    /// Store the user's custom target percentages. Only valid for
    /// configurable cantons; the percentages must sum to 100 and respect
    /// each set's bounds.
    async fn set_custom_targets(
        &self,
        user_id: Uuid,
        targets: Arc<[CustomTarget]>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
}
