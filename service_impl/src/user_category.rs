use crate::gen_service_impl;
use async_trait::async_trait;
use dao::{
    user_category::{UserCategoryDao, UserCategoryEntity},
    TransactionDao,
};
use service::{
    clock::ClockService,
    permission::Authentication,
    user_category::{UserCategory, UserCategoryService},
    uuid_service::UuidService,
    PermissionService, ServiceError,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

const USER_CATEGORY_SERVICE_PROCESS: &str = "user-category-service";

fn verify_workload_bounds(workload: f64) -> Result<(), ServiceError> {
    if !(0.0..=100.0).contains(&workload) {
        return Err(ServiceError::ValidationError(
            "workload must be between 0 and 100 percent".into(),
        ));
    }
    Ok(())
}

gen_service_impl! {
    struct UserCategoryServiceImpl: UserCategoryService = UserCategoryServiceDeps {
        UserCategoryDao: UserCategoryDao<Transaction = Self::Transaction> = user_category_dao,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[async_trait]
impl<Deps: UserCategoryServiceDeps> UserCategoryService for UserCategoryServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[UserCategory]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(user_id, context)
            .await?;
        let res = Ok(self
            .user_category_dao
            .find_by_user_id(user_id, tx.clone())
            .await?
            .iter()
            .filter(|entity| entity.deleted.is_none())
            .map(UserCategory::from)
            .collect());

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn workloads_by_ids(
        &self,
        ids: Arc<[Uuid]>,
        user_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HashMap<Uuid, f64>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(user_id, context)
            .await?;
        let res = Ok(self
            .user_category_dao
            .find_workloads_by_ids(ids, user_id, tx.clone())
            .await?
            .iter()
            .map(|entity| (entity.id, entity.workload))
            .collect());

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn create(
        &self,
        category: &UserCategory,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<UserCategory, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(category.user_id, context)
            .await?;

        if !category.id.is_nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if !category.version.is_nil() {
            return Err(ServiceError::VersionSetOnCreate);
        }
        if category.deleted.is_some() {
            return Err(ServiceError::DeletedSetOnCreate);
        }
        if category.created.is_some() {
            return Err(ServiceError::CreatedSetOnCreate);
        }
        verify_workload_bounds(category.workload)?;

        let mut category = category.clone();
        category.created = Some(self.clock_service.date_time_now());
        let mut entity: UserCategoryEntity = (&category).try_into()?;
        entity.id = self.uuid_service.new_uuid("create-id");
        entity.version = self.uuid_service.new_uuid("create-version");

        self.user_category_dao
            .create(&entity, USER_CATEGORY_SERVICE_PROCESS, tx.clone())
            .await?;
        let res = Ok(UserCategory::from(&entity));

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn update(
        &self,
        category: &UserCategory,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<UserCategory, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;

        let mut entity = self
            .user_category_dao
            .find_by_id(category.id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(category.id))?;
        self.permission_service
            .verify_user_access(entity.user_id, context)
            .await?;
        if entity.version != category.version {
            return Err(ServiceError::EntityConflicts(
                category.id,
                category.version,
                entity.version,
            ));
        }
        verify_workload_bounds(category.workload)?;

        entity.title = category.title.clone();
        entity.workload = category.workload;
        entity.version = self.uuid_service.new_uuid("update-version");

        self.user_category_dao
            .update(&entity, USER_CATEGORY_SERVICE_PROCESS, tx.clone())
            .await?;
        let res = Ok(UserCategory::from(&entity));

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .user_category_dao
            .find_by_id(id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.permission_service
            .verify_user_access(entity.user_id, context)
            .await?;

        self.user_category_dao
            .delete(id, USER_CATEGORY_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}
