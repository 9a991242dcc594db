use crate::gen_service_impl;
use async_trait::async_trait;
use dao::{
    time_record::{TimeRecordDao, TimeRecordEntity},
    TransactionDao,
};
use service::{
    clock::ClockService,
    permission::Authentication,
    time_record::{TimeRecord, TimeRecordService},
    uuid_service::UuidService,
    PermissionService, ServiceError,
};
use std::sync::Arc;
use uuid::Uuid;

const TIME_RECORD_SERVICE_PROCESS: &str = "time-record-service";

gen_service_impl! {
    struct TimeRecordServiceImpl: TimeRecordService = TimeRecordServiceDeps {
        TimeRecordDao: TimeRecordDao<Transaction = Self::Transaction> = time_record_dao,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[async_trait]
impl<Deps: TimeRecordServiceDeps> TimeRecordService for TimeRecordServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_by_id(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<TimeRecord, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .time_record_dao
            .find_by_id(id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.permission_service
            .verify_user_access(entity.user_id, context)
            .await?;
        let res = Ok(TimeRecord::from(&entity));

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn find_in_range(
        &self,
        user_id: Uuid,
        from: time::Date,
        to: time::Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[TimeRecord]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(user_id, context)
            .await?;
        let res = Ok(self
            .time_record_dao
            .find_by_user_in_range(user_id, from, to, tx.clone())
            .await?
            .iter()
            .filter(|entity| entity.deleted.is_none())
            .map(TimeRecord::from)
            .collect());

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn create(
        &self,
        record: &TimeRecord,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<TimeRecord, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.permission_service
            .verify_user_access(record.user_id, context)
            .await?;

        if !record.id.is_nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if !record.version.is_nil() {
            return Err(ServiceError::VersionSetOnCreate);
        }
        if record.deleted.is_some() {
            return Err(ServiceError::DeletedSetOnCreate);
        }
        if record.created.is_some() {
            return Err(ServiceError::CreatedSetOnCreate);
        }

        let mut record = record.clone();
        record.created = Some(self.clock_service.date_time_now());
        let mut entity: TimeRecordEntity = (&record).try_into()?;
        entity.id = self.uuid_service.new_uuid("create-id");
        entity.version = self.uuid_service.new_uuid("create-version");

        self.time_record_dao
            .create(&entity, TIME_RECORD_SERVICE_PROCESS, tx.clone())
            .await?;
        let res = Ok(TimeRecord::from(&entity));

        self.transaction_dao.commit(tx).await?;
        res
    }

    async fn update(
        &self,
        record: &TimeRecord,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<TimeRecord, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;

        let mut entity = self
            .time_record_dao
            .find_by_id(record.id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(record.id))?;
        self.permission_service
            .verify_user_access(entity.user_id, context)
            .await?;
        if entity.version != record.version {
            return Err(ServiceError::EntityConflicts(
                record.id,
                record.version,
                entity.version,
            ));
        }

        entity.date = record.date;
        entity.duration_minutes = record.duration_minutes;
        entity.category = (&record.category).into();
        entity.comment = record.comment.clone();
        entity.version = self.uuid_service.new_uuid("update-version");

        self.time_record_dao
            .update(&entity, TIME_RECORD_SERVICE_PROCESS, tx.clone())
            .await?;
        let res = Ok(TimeRecord::from(&entity));

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
            .time_record_dao
            .find_by_id(id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.permission_service
            .verify_user_access(entity.user_id, context)
            .await?;

        self.time_record_dao
            .delete(id, TIME_RECORD_SERVICE_PROCESS, tx.clone())
            .await?;

        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}
