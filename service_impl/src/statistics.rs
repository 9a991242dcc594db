use crate::gen_service_impl;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    time_record::{CategoryRefEntity, TimeRecordDao, TimeRecordEntity},
    user::{UserDao, UserEntity},
    TransactionDao,
};
use pensum_utils::{days_in_year, inclusive_day_span};
use service::{
    canton::{CantonCategory, CantonConfiguration, CantonService},
    permission::Authentication,
    statistics::{
        CategoryStatistics, CategoryStatisticsRow, RemainingCategoryKind, RemainingCategoryRow,
        RemainingCategoryStatistics, StatisticsService, SubcategoryStatistics,
    },
    user_category::UserCategoryService,
    PermissionService, ServiceError,
};
use tokio::join;
use uuid::Uuid;

/// Aggregation key for logged minutes. Canton categories and user-defined
/// further-employment categories live in separate id namespaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    Canton(Uuid),
    UserDefined(Uuid),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordAggregation {
    pub minutes_by_key: HashMap<CategoryKey, u32>,
    /// Minutes of records without any category. Never part of the map.
    pub no_category_minutes: u32,
}

/// Sum record durations per category key. Duplicate keys accumulate.
pub fn aggregate_records(records: &[TimeRecordEntity]) -> RecordAggregation {
    let mut aggregation = RecordAggregation::default();
    for record in records {
        match record.category {
            CategoryRefEntity::Canton(id) => {
                *aggregation
                    .minutes_by_key
                    .entry(CategoryKey::Canton(id))
                    .or_insert(0) += record.duration_minutes;
            }
            CategoryRefEntity::UserDefined(id) => {
                *aggregation
                    .minutes_by_key
                    .entry(CategoryKey::UserDefined(id))
                    .or_insert(0) += record.duration_minutes;
            }
            CategoryRefEntity::None => {
                aggregation.no_category_minutes += record.duration_minutes;
            }
        }
    }
    aggregation
}

/// Prorate an annual hour budget down to the inclusive date range, the
/// target percentage, and the employment fraction.
///
/// Days in year come from the calendar year of the range *end*. Both
/// percentages are expressed 0-100 and divided by 100 exactly once here.
pub fn required_minutes(
    annual_hours: f64,
    target_percentage: f64,
    from: time::Date,
    to: time::Date,
    workload_percentage: f64,
) -> u32 {
    let days_in_year = f64::from(days_in_year(to.year()));
    let working_days = f64::from(inclusive_day_span(from, to));
    let minutes = annual_hours * 60.0 / days_in_year
        * working_days
        * (target_percentage / 100.0)
        * (workload_percentage / 100.0);
    if minutes <= 0.0 {
        0
    } else {
        minutes.round() as u32
    }
}

/// The annual hour baseline the targets are computed from: the user's
/// override when the canton honors custom work hours and the user set a
/// non-zero value, the canton baseline otherwise.
pub fn effective_annual_hours(configuration: &CantonConfiguration, user: &UserEntity) -> f64 {
    match user.custom_work_hours {
        Some(hours) if configuration.use_custom_work_hours && hours > 0.0 => hours,
        _ => configuration.annual_work_hours,
    }
}

/// Share of `part` in `total` as a percentage with two decimals. A zero
/// total renders as `"0.00"` instead of a non-numeric value.
pub fn format_share(part: u32, total: u32) -> Arc<str> {
    if total == 0 {
        "0.00".into()
    } else {
        format!("{:.2}", f64::from(part) / f64::from(total) * 100.0).into()
    }
}

/// Minutes logged on one category id, looked up in both key namespaces.
/// The namespaces never collide in practice; the lookup stays key-based
/// regardless.
fn minutes_for_category(minutes_by_key: &HashMap<CategoryKey, u32>, category_id: Uuid) -> u32 {
    minutes_by_key
        .get(&CategoryKey::Canton(category_id))
        .copied()
        .unwrap_or(0)
        + minutes_by_key
            .get(&CategoryKey::UserDefined(category_id))
            .copied()
            .unwrap_or(0)
}

/// Group canton categories by their set title, preserving first-seen order.
/// Sets sharing a title collapse into one group, which resolves to the
/// first matching set's target percentage.
fn group_by_set_title(categories: &[CantonCategory]) -> Vec<(Arc<str>, Vec<&CantonCategory>)> {
    let mut groups: Vec<(Arc<str>, Vec<&CantonCategory>)> = Vec::new();
    for category in categories {
        match groups
            .iter_mut()
            .find(|(title, _)| *title == category.set_title)
        {
            Some((_, members)) => members.push(category),
            None => groups.push((category.set_title.clone(), vec![category])),
        }
    }
    groups
}

gen_service_impl! {
    struct StatisticsServiceImpl: StatisticsService = StatisticsServiceDeps {
        TimeRecordDao: TimeRecordDao<Transaction = Self::Transaction> = time_record_dao,
        UserDao: UserDao<Transaction = Self::Transaction> = user_dao,
        CantonService: CantonService<Context = Self::Context, Transaction = Self::Transaction> = canton_service,
        UserCategoryService: UserCategoryService<Context = Self::Context, Transaction = Self::Transaction> = user_category_service,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

impl<Deps: StatisticsServiceDeps> StatisticsServiceImpl<Deps> {
    /// Workloads for every further-employment category id referenced by the
    /// aggregation, resolved with one batched lookup. Referenced ids
    /// without a workload row are a tolerated data-integrity issue and
    /// resolve to 0.
    async fn resolve_workloads(
        &self,
        referenced: &[Uuid],
        user_id: Uuid,
        tx: Deps::Transaction,
    ) -> Result<HashMap<Uuid, f64>, ServiceError> {
        if referenced.is_empty() {
            return Ok(HashMap::new());
        }
        let workloads = self
            .user_category_service
            .workloads_by_ids(
                referenced.to_vec().into(),
                user_id,
                Authentication::Full,
                tx.into(),
            )
            .await?;
        for id in referenced {
            if !workloads.contains_key(id) {
                tracing::warn!(
                    user_category_id = %id,
                    "time records reference a missing further-employment category, \
                     treating its workload as 0"
                );
            }
        }
        Ok(workloads)
    }
}

#[async_trait]
impl<Deps: StatisticsServiceDeps> StatisticsService for StatisticsServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn category_statistics(
        &self,
        user_id: Uuid,
        from: time::Date,
        to: time::Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<CategoryStatistics, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(user_id, context)
            .await?;

        let user = self
            .user_dao
            .find_by_id(user_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(user_id))?;
        let (records, configuration, categories) = join!(
            self.time_record_dao
                .find_by_user_in_range(user_id, from, to, tx.clone()),
            self.canton_service.configuration_for_user(
                user_id,
                Authentication::Full,
                tx.clone().into()
            ),
            self.canton_service
                .categories_for_user(user_id, Authentication::Full, tx.clone().into()),
        );
        let (records, configuration, categories) = (records?, configuration?, categories?);

        let aggregation = aggregate_records(&records);
        let annual_hours = effective_annual_hours(&configuration, &user);
        let workload = user.workload.unwrap_or(100.0);

        let mut rows = Vec::new();
        for (set_title, members) in group_by_set_title(&categories) {
            let effective_minutes = members
                .iter()
                .map(|category| minutes_for_category(&aggregation.minutes_by_key, category.id))
                .sum();
            let target_percentage = configuration
                .category_sets
                .iter()
                .find(|set| set.title == set_title)
                .map(|set| set.effective_target_percentage(configuration.is_configurable))
                .unwrap_or(0.0);
            let target_minutes =
                required_minutes(annual_hours, target_percentage, from, to, workload);
            let subcategories = if configuration.show_subcategories {
                Some(
                    members
                        .iter()
                        .map(|category| SubcategoryStatistics {
                            category_id: category.id,
                            title: category.title.clone(),
                            effective_minutes: minutes_for_category(
                                &aggregation.minutes_by_key,
                                category.id,
                            ),
                        })
                        .collect(),
                )
            } else {
                None
            };
            rows.push(CategoryStatisticsRow {
                set_title,
                target_percentage,
                effective_minutes,
                target_minutes,
                // Back-filled once all groups are known.
                effective_workload: "0.00".into(),
                subcategories,
            });
        }

        let total_effective_minutes = rows.iter().map(|row| row.effective_minutes).sum();
        let total_target_minutes = rows.iter().map(|row| row.target_minutes).sum();
        for row in &mut rows {
            row.effective_workload = format_share(row.effective_minutes, total_effective_minutes);
        }

        let res = Ok(CategoryStatistics {
            rows: rows.into(),
            no_category_minutes: 0,
            total_effective_minutes,
            total_target_minutes,
        });

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn remaining_category_statistics(
        &self,
        user_id: Uuid,
        from: time::Date,
        to: time::Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<RemainingCategoryStatistics, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(user_id, context)
            .await?;

        let user = self
            .user_dao
            .find_by_id(user_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(user_id))?;
        let (records, configuration, categories, user_categories) = join!(
            self.time_record_dao
                .find_by_user_in_range(user_id, from, to, tx.clone()),
            self.canton_service.configuration_for_user(
                user_id,
                Authentication::Full,
                tx.clone().into()
            ),
            self.canton_service
                .categories_for_user(user_id, Authentication::Full, tx.clone().into()),
            self.user_category_service
                .get_all(user_id, Authentication::Full, tx.clone().into()),
        );
        let (records, configuration, categories, user_categories) =
            (records?, configuration?, categories?, user_categories?);

        let aggregation = aggregate_records(&records);
        let annual_hours = effective_annual_hours(&configuration, &user);

        let mut referenced: Vec<Uuid> = aggregation
            .minutes_by_key
            .keys()
            .filter_map(|key| match key {
                CategoryKey::UserDefined(id) => Some(*id),
                CategoryKey::Canton(_) => None,
            })
            .collect();
        referenced.sort();
        let workloads = self.resolve_workloads(&referenced, user_id, tx.clone()).await?;

        let mut rows = Vec::new();
        // One row per category of the user in list order. A category keeps
        // its row even when nothing was logged on it, the target stands
        // regardless. Stray references come afterwards.
        let known: HashSet<Uuid> = user_categories.iter().map(|category| category.id).collect();
        for category in user_categories.iter() {
            rows.push(RemainingCategoryRow {
                kind: RemainingCategoryKind::FurtherEmployment {
                    category_id: category.id,
                    title: category.title.clone(),
                    workload: category.workload,
                },
                effective_minutes: aggregation
                    .minutes_by_key
                    .get(&CategoryKey::UserDefined(category.id))
                    .copied()
                    .unwrap_or(0),
                target_minutes: required_minutes(annual_hours, 100.0, from, to, category.workload),
            });
        }
        for id in referenced.iter().filter(|id| !known.contains(*id)) {
            let workload = workloads.get(id).copied().unwrap_or(0.0);
            rows.push(RemainingCategoryRow {
                kind: RemainingCategoryKind::FurtherEmployment {
                    category_id: *id,
                    title: "".into(),
                    workload,
                },
                effective_minutes: minutes_for_category(&aggregation.minutes_by_key, *id),
                target_minutes: required_minutes(annual_hours, 100.0, from, to, workload),
            });
        }

        if aggregation.no_category_minutes > 0 {
            rows.push(RemainingCategoryRow {
                kind: RemainingCategoryKind::NoCategory,
                effective_minutes: aggregation.no_category_minutes,
                target_minutes: 0,
            });
        }

        // Canton category ids the record store may still reference from a
        // previously selected canton.
        let canton_category_ids: HashSet<Uuid> =
            categories.iter().map(|category| category.id).collect();
        let other_canton_minutes: u32 = aggregation
            .minutes_by_key
            .iter()
            .filter_map(|(key, minutes)| match key {
                CategoryKey::Canton(id) if !canton_category_ids.contains(id) => Some(*minutes),
                _ => None,
            })
            .sum();
        if other_canton_minutes > 0 {
            rows.push(RemainingCategoryRow {
                kind: RemainingCategoryKind::OtherCanton,
                effective_minutes: other_canton_minutes,
                target_minutes: 0,
            });
        }

        let res = Ok(RemainingCategoryStatistics { rows: rows.into() });

        self.transaction_dao.commit(tx).await?;
        res
    }
}
