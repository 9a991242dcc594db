use crate::gen_service_impl;
use async_trait::async_trait;
use dao::{
    canton::CantonDao, custom_target::CustomTargetDao, custom_target::CustomTargetEntity,
    user::UserDao, TransactionDao,
};
use service::{
    canton::{CantonCategory, CantonConfiguration, CantonService, CategorySet, CustomTarget},
    permission::Authentication,
    PermissionService, ServiceError,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

const CANTON_SERVICE_PROCESS: &str = "canton-service";

/// Tolerance when checking that target percentages add up to 100.
const PERCENTAGE_SUM_EPSILON: f64 = 0.01;

gen_service_impl! {
    struct CantonServiceImpl: CantonService = CantonServiceDeps {
        CantonDao: CantonDao<Transaction = Self::Transaction> = canton_dao,
        CustomTargetDao: CustomTargetDao<Transaction = Self::Transaction> = custom_target_dao,
        UserDao: UserDao<Transaction = Self::Transaction> = user_dao,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[async_trait]
impl<Deps: CantonServiceDeps> CantonService for CantonServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn configuration_for_user(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<CantonConfiguration, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(user_id, context)
            .await?;

        let user = self
            .user_dao
            .find_by_id(user_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(user_id))?;
        let canton = self
            .canton_dao
            .find_configuration(user.canton_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(user.canton_id))?;
        let set_entities = self
            .canton_dao
            .find_category_sets(user.canton_id, tx.clone())
            .await?;
        let custom_targets: HashMap<Uuid, f64> = self
            .custom_target_dao
            .find_by_user_id(user_id, tx.clone())
            .await?
            .iter()
            .map(|target| (target.category_set_id, target.percentage))
            .collect();

        let category_sets: Arc<[CategorySet]> = set_entities
            .iter()
            .map(|entity| {
                let mut set = CategorySet::from(entity);
                set.user_percentage = custom_targets.get(&entity.id).copied();
                set
            })
            .collect();

        if !canton.is_configurable {
            let sum: f64 = category_sets.iter().map(|set| set.percentage).sum();
            if (sum - 100.0).abs() > PERCENTAGE_SUM_EPSILON {
                tracing::warn!(
                    canton = %canton.name,
                    sum,
                    "category set percentages of fixed canton do not add up to 100"
                );
            }
        }

        let res = Ok(CantonConfiguration::from_entities(&canton, category_sets));

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn categories_for_user(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[CantonCategory]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(user_id, context)
            .await?;

        let user = self
            .user_dao
            .find_by_id(user_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(user_id))?;
        let set_titles: HashMap<Uuid, Arc<str>> = self
            .canton_dao
            .find_category_sets(user.canton_id, tx.clone())
            .await?
            .iter()
            .map(|set| (set.id, set.title.clone()))
            .collect();
        let res = Ok(self
            .canton_dao
            .find_categories(user.canton_id, tx.clone())
            .await?
            .iter()
            .filter_map(|entity| match set_titles.get(&entity.category_set_id) {
                Some(title) => Some(CantonCategory::from_entity(entity, title.clone())),
                None => {
                    tracing::warn!(
                        category_id = %entity.id,
                        category_set_id = %entity.category_set_id,
                        "category references a category set outside its canton, skipping"
                    );
                    None
                }
            })
            .collect());

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn set_custom_targets(
        &self,
        user_id: Uuid,
        targets: Arc<[CustomTarget]>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(user_id, context)
            .await?;

        let user = self
            .user_dao
            .find_by_id(user_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(user_id))?;
        let canton = self
            .canton_dao
            .find_configuration(user.canton_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(user.canton_id))?;
        if !canton.is_configurable {
            return Err(ServiceError::ValidationError(
                "canton does not allow custom target percentages".into(),
            ));
        }

        let sets: HashMap<Uuid, (f64, f64)> = self
            .canton_dao
            .find_category_sets(user.canton_id, tx.clone())
            .await?
            .iter()
            .map(|set| {
                (
                    set.id,
                    (set.min_target_percentage, set.max_target_percentage),
                )
            })
            .collect();
        for target in targets.iter() {
            let (min, max) = sets
                .get(&target.category_set_id)
                .ok_or(ServiceError::EntityNotFound(target.category_set_id))?;
            if target.percentage < *min || target.percentage > *max {
                return Err(ServiceError::ValidationError(
                    "target percentage outside the allowed range of its category set".into(),
                ));
            }
        }
        let sum: f64 = targets.iter().map(|target| target.percentage).sum();
        if (sum - 100.0).abs() > PERCENTAGE_SUM_EPSILON {
            return Err(ServiceError::ValidationError(
                "target percentages must add up to 100".into(),
            ));
        }

        for target in targets.iter() {
            let entity = CustomTargetEntity {
                user_id,
                category_set_id: target.category_set_id,
                percentage: target.percentage,
            };
            self.custom_target_dao
                .upsert(&entity, CANTON_SERVICE_PROCESS, tx.clone())
                .await?;
        }

        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}
