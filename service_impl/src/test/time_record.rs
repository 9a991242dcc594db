use std::sync::Arc;

use crate::test::error_test::*;
use crate::time_record::{TimeRecordServiceDeps, TimeRecordServiceImpl};
use dao::time_record::{CategoryRefEntity, MockTimeRecordDao, TimeRecordEntity};
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::{always, eq};
use service::clock::MockClockService;
use service::time_record::{TimeRecord, TimeRecordService};
use service::uuid_service::MockUuidService;
use service::MockPermissionService;
use time::macros::{date, datetime};
use uuid::{uuid, Uuid};

pub fn default_id() -> Uuid {
    uuid!("CEA260A0-112B-4970-936C-F7E529955BD0")
}
pub fn default_user_id() -> Uuid {
    uuid!("04215DFE-13C4-413C-8C66-77AC741BB5F0")
}
pub fn default_version() -> Uuid {
    uuid!("F79C462A-8D4E-42E1-8171-DB4DBD019E50")
}
pub fn alternate_version() -> Uuid {
    uuid!("F79C462A-8D4E-42E1-8171-DB4DBD019E51")
}
pub fn default_category_id() -> Uuid {
    uuid!("7A7FF57A-782B-4C2E-A68B-4E2D81D79380")
}

pub fn default_time_record_entity() -> TimeRecordEntity {
    TimeRecordEntity {
        id: default_id(),
        user_id: default_user_id(),
        date: date!(2023 - 05 - 15),
        duration_minutes: 90,
        category: CategoryRefEntity::Canton(default_category_id()),
        comment: Some("lesson preparation".into()),
        created: datetime!(2023 - 05 - 15 12:00),
        deleted: None,
        version: default_version(),
    }
}

pub fn default_time_record() -> TimeRecord {
    TimeRecord::from(&default_time_record_entity())
}

pub struct TimeRecordServiceDependencies {
    pub time_record_dao: MockTimeRecordDao,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
}
impl TimeRecordServiceDeps for TimeRecordServiceDependencies {
    type Context = ();
    type Transaction = MockTransaction;

    type TimeRecordDao = MockTimeRecordDao;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
    type TransactionDao = MockTransactionDao;
}
impl TimeRecordServiceDependencies {
    pub fn build_service(self) -> TimeRecordServiceImpl<TimeRecordServiceDependencies> {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao
            .expect_use_transaction()
            .returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        TimeRecordServiceImpl {
            time_record_dao: self.time_record_dao.into(),
            permission_service: self.permission_service.into(),
            clock_service: self.clock_service.into(),
            uuid_service: self.uuid_service.into(),
            transaction_dao: Arc::new(transaction_dao),
        }
    }
}

pub fn build_dependencies(permission: bool) -> TimeRecordServiceDependencies {
    let mut permission_service = MockPermissionService::new();
    permission_service
        .expect_verify_user_access()
        .returning(move |_, _| {
            if permission {
                Ok(())
            } else {
                Err(service::ServiceError::Forbidden)
            }
        });
    let mut clock_service = MockClockService::new();
    clock_service
        .expect_date_time_now()
        .returning(|| datetime!(2023 - 05 - 15 12:00));

    TimeRecordServiceDependencies {
        time_record_dao: MockTimeRecordDao::new(),
        permission_service,
        clock_service,
        uuid_service: MockUuidService::new(),
    }
}

#[tokio::test]
async fn test_get_by_id() {
    let mut deps = build_dependencies(true);
    deps.time_record_dao
        .expect_find_by_id()
        .with(eq(default_id()), always())
        .returning(|_, _| Ok(Some(default_time_record_entity())));
    let service = deps.build_service();
    let result = service.get_by_id(default_id(), ().auth(), None).await;
    assert_eq!(result.unwrap(), default_time_record());
}

#[tokio::test]
async fn test_get_by_id_not_found() {
    let mut deps = build_dependencies(true);
    deps.time_record_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let service = deps.build_service();
    let result = service.get_by_id(default_id(), ().auth(), None).await;
    test_not_found(&result, &default_id());
}

#[tokio::test]
async fn test_get_by_id_no_permission() {
    let mut deps = build_dependencies(false);
    deps.time_record_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(default_time_record_entity())));
    let service = deps.build_service();
    let result = service.get_by_id(default_id(), ().auth(), None).await;
    test_forbidden(&result);
}

#[tokio::test]
async fn test_find_in_range_filters_deleted() {
    let mut deps = build_dependencies(true);
    deps.time_record_dao
        .expect_find_by_user_in_range()
        .with(
            eq(default_user_id()),
            eq(date!(2023 - 05 - 01)),
            eq(date!(2023 - 05 - 31)),
            always(),
        )
        .returning(|_, _, _, _| {
            Ok([
                default_time_record_entity(),
                TimeRecordEntity {
                    deleted: Some(datetime!(2023 - 05 - 20 08:00)),
                    ..default_time_record_entity()
                },
            ]
            .into())
        });
    let service = deps.build_service();
    let result = service
        .find_in_range(
            default_user_id(),
            date!(2023 - 05 - 01),
            date!(2023 - 05 - 31),
            ().auth(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0], default_time_record());
}

#[tokio::test]
async fn test_create() {
    let mut deps = build_dependencies(true);
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("create-id"))
        .returning(|_| default_id());
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("create-version"))
        .returning(|_| default_version());
    deps.time_record_dao
        .expect_create()
        .with(
            eq(default_time_record_entity()),
            eq("time-record-service"),
            always(),
        )
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();
    let record = TimeRecord {
        id: Uuid::nil(),
        version: Uuid::nil(),
        created: None,
        ..default_time_record()
    };
    let result = service.create(&record, ().auth(), None).await;
    assert_eq!(result.unwrap(), default_time_record());
}

#[tokio::test]
async fn test_create_id_set() {
    let deps = build_dependencies(true);
    let service = deps.build_service();
    let record = TimeRecord {
        version: Uuid::nil(),
        created: None,
        ..default_time_record()
    };
    let result = service.create(&record, ().auth(), None).await;
    test_zero_id_error(&result);
}

#[tokio::test]
async fn test_create_version_set() {
    let deps = build_dependencies(true);
    let service = deps.build_service();
    let record = TimeRecord {
        id: Uuid::nil(),
        created: None,
        ..default_time_record()
    };
    let result = service.create(&record, ().auth(), None).await;
    test_zero_version_error(&result);
}

#[tokio::test]
async fn test_create_created_set() {
    let deps = build_dependencies(true);
    let service = deps.build_service();
    let record = TimeRecord {
        id: Uuid::nil(),
        version: Uuid::nil(),
        ..default_time_record()
    };
    let result = service.create(&record, ().auth(), None).await;
    test_created_set_error(&result);
}

#[tokio::test]
async fn test_create_deleted_set() {
    let deps = build_dependencies(true);
    let service = deps.build_service();
    let record = TimeRecord {
        id: Uuid::nil(),
        version: Uuid::nil(),
        created: None,
        deleted: Some(datetime!(2023 - 05 - 20 08:00)),
        ..default_time_record()
    };
    let result = service.create(&record, ().auth(), None).await;
    test_deleted_set_error(&result);
}

#[tokio::test]
async fn test_create_no_permission() {
    let deps = build_dependencies(false);
    let service = deps.build_service();
    let record = TimeRecord {
        id: Uuid::nil(),
        version: Uuid::nil(),
        created: None,
        ..default_time_record()
    };
    let result = service.create(&record, ().auth(), None).await;
    test_forbidden(&result);
}

#[tokio::test]
async fn test_update() {
    let mut deps = build_dependencies(true);
    deps.time_record_dao
        .expect_find_by_id()
        .with(eq(default_id()), always())
        .returning(|_, _| Ok(Some(default_time_record_entity())));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("update-version"))
        .returning(|_| alternate_version());
    deps.time_record_dao
        .expect_update()
        .with(
            eq(TimeRecordEntity {
                duration_minutes: 120,
                version: alternate_version(),
                ..default_time_record_entity()
            }),
            eq("time-record-service"),
            always(),
        )
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();
    let record = TimeRecord {
        duration_minutes: 120,
        ..default_time_record()
    };
    let result = service.update(&record, ().auth(), None).await.unwrap();
    assert_eq!(result.duration_minutes, 120);
    assert_eq!(result.version, alternate_version());
}

#[tokio::test]
async fn test_update_version_conflict() {
    let mut deps = build_dependencies(true);
    deps.time_record_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(default_time_record_entity())));
    let service = deps.build_service();
    let record = TimeRecord {
        version: alternate_version(),
        ..default_time_record()
    };
    let result = service.update(&record, ().auth(), None).await;
    test_conflicts(
        &result,
        &default_id(),
        &alternate_version(),
        &default_version(),
    );
}

#[tokio::test]
async fn test_update_not_found() {
    let mut deps = build_dependencies(true);
    deps.time_record_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let service = deps.build_service();
    let result = service
        .update(&default_time_record(), ().auth(), None)
        .await;
    test_not_found(&result, &default_id());
}

#[tokio::test]
async fn test_delete() {
    let mut deps = build_dependencies(true);
    deps.time_record_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(default_time_record_entity())));
    deps.time_record_dao
        .expect_delete()
        .with(eq(default_id()), eq("time-record-service"), always())
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();
    let result = service.delete(default_id(), ().auth(), None).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_delete_not_found() {
    let mut deps = build_dependencies(true);
    deps.time_record_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let service = deps.build_service();
    let result = service.delete(default_id(), ().auth(), None).await;
    test_not_found(&result, &default_id());
}
