use std::sync::Arc;

use crate::canton::{CantonServiceDeps, CantonServiceImpl};
use crate::test::error_test::*;
use dao::canton::{
    CantonConfigurationEntity, CategoryEntity, CategorySetEntity, MockCantonDao,
};
use dao::custom_target::{CustomTargetEntity, MockCustomTargetDao};
use dao::user::{MockUserDao, UserEntity};
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::{always, eq};
use service::canton::{CantonService, CustomTarget};
use service::MockPermissionService;
use uuid::{uuid, Uuid};

pub fn default_canton_id() -> Uuid {
    uuid!("D2A4B6C8-1E3F-4A5B-8C7D-9E0F1A2B3C40")
}
pub fn default_user_id() -> Uuid {
    uuid!("04215DFE-13C4-413C-8C66-77AC741BB5F0")
}
pub fn teaching_set_id() -> Uuid {
    uuid!("AA11BB22-CC33-4D44-8E55-FF6677889900")
}
pub fn admin_set_id() -> Uuid {
    uuid!("AA11BB22-CC33-4D44-8E55-FF6677889901")
}
pub fn teaching_category_id() -> Uuid {
    uuid!("11111111-1111-4111-8111-111111111111")
}

pub fn default_canton_entity() -> CantonConfigurationEntity {
    CantonConfigurationEntity {
        id: default_canton_id(),
        name: "Zürich".into(),
        annual_work_hours: 1890.0,
        is_configurable: false,
        use_custom_work_hours: false,
        show_subcategories: false,
    }
}

pub fn default_user_entity() -> UserEntity {
    UserEntity {
        id: default_user_id(),
        canton_id: default_canton_id(),
        workload: Some(100.0),
        custom_work_hours: None,
    }
}

pub fn default_category_sets() -> Vec<CategorySetEntity> {
    vec![
        CategorySetEntity {
            id: teaching_set_id(),
            canton_id: default_canton_id(),
            title: "teaching".into(),
            percentage: 60.0,
            min_target_percentage: 40.0,
            max_target_percentage: 80.0,
        },
        CategorySetEntity {
            id: admin_set_id(),
            canton_id: default_canton_id(),
            title: "administration".into(),
            percentage: 40.0,
            min_target_percentage: 20.0,
            max_target_percentage: 60.0,
        },
    ]
}

pub struct CantonServiceDependencies {
    pub canton_dao: MockCantonDao,
    pub custom_target_dao: MockCustomTargetDao,
    pub user_dao: MockUserDao,
    pub permission_service: MockPermissionService,
}
impl CantonServiceDeps for CantonServiceDependencies {
    type Context = ();
    type Transaction = MockTransaction;

    type CantonDao = MockCantonDao;
    type CustomTargetDao = MockCustomTargetDao;
    type UserDao = MockUserDao;
    type PermissionService = MockPermissionService;
    type TransactionDao = MockTransactionDao;
}
impl CantonServiceDependencies {
    pub fn build_service(self) -> CantonServiceImpl<CantonServiceDependencies> {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao
            .expect_use_transaction()
            .returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        CantonServiceImpl {
            canton_dao: self.canton_dao.into(),
            custom_target_dao: self.custom_target_dao.into(),
            user_dao: self.user_dao.into(),
            permission_service: self.permission_service.into(),
            transaction_dao: Arc::new(transaction_dao),
        }
    }
}

pub fn build_dependencies(permission: bool) -> CantonServiceDependencies {
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
    CantonServiceDependencies {
        canton_dao: MockCantonDao::new(),
        custom_target_dao: MockCustomTargetDao::new(),
        user_dao: MockUserDao::new(),
        permission_service,
    }
}

fn expect_default_user(deps: &mut CantonServiceDependencies) {
    deps.user_dao
        .expect_find_by_id()
        .with(eq(default_user_id()), always())
        .returning(|_, _| Ok(Some(default_user_entity())));
}

#[tokio::test]
async fn test_configuration_for_user_merges_custom_targets() {
    let mut deps = build_dependencies(true);
    expect_default_user(&mut deps);
    deps.canton_dao
        .expect_find_configuration()
        .with(eq(default_canton_id()), always())
        .returning(|_, _| {
            Ok(Some(CantonConfigurationEntity {
                is_configurable: true,
                ..default_canton_entity()
            }))
        });
    deps.canton_dao
        .expect_find_category_sets()
        .with(eq(default_canton_id()), always())
        .returning(|_, _| Ok(default_category_sets().into()));
    deps.custom_target_dao
        .expect_find_by_user_id()
        .with(eq(default_user_id()), always())
        .returning(|_, _| {
            Ok([CustomTargetEntity {
                user_id: default_user_id(),
                category_set_id: teaching_set_id(),
                percentage: 70.0,
            }]
            .into())
        });
    let service = deps.build_service();
    let configuration = service
        .configuration_for_user(default_user_id(), ().auth(), None)
        .await
        .unwrap();
    assert_eq!(configuration.annual_work_hours, 1890.0);
    assert!(configuration.is_configurable);
    assert_eq!(configuration.category_sets.len(), 2);
    assert_eq!(configuration.category_sets[0].user_percentage, Some(70.0));
    assert_eq!(configuration.category_sets[1].user_percentage, None);
}

#[tokio::test]
async fn test_configuration_for_user_tolerates_fixed_percentage_sum_off_100() {
    let mut deps = build_dependencies(true);
    expect_default_user(&mut deps);
    deps.canton_dao
        .expect_find_configuration()
        .returning(|_, _| Ok(Some(default_canton_entity())));
    // A fixed canton whose percentages add up to 90 is a data-integrity
    // issue, not an error. The call warns and returns the sets as stored.
    deps.canton_dao.expect_find_category_sets().returning(|_, _| {
        let mut sets = default_category_sets();
        sets[1].percentage = 30.0;
        Ok(sets.into())
    });
    deps.custom_target_dao
        .expect_find_by_user_id()
        .returning(|_, _| Ok([].into()));
    let service = deps.build_service();
    let configuration = service
        .configuration_for_user(default_user_id(), ().auth(), None)
        .await
        .unwrap();
    assert!(!configuration.is_configurable);
    assert_eq!(configuration.category_sets[0].percentage, 60.0);
    assert_eq!(configuration.category_sets[1].percentage, 30.0);
}

#[tokio::test]
async fn test_configuration_for_user_not_found() {
    let mut deps = build_dependencies(true);
    deps.user_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let service = deps.build_service();
    let result = service
        .configuration_for_user(default_user_id(), ().auth(), None)
        .await;
    test_not_found(&result, &default_user_id());
}

#[tokio::test]
async fn test_configuration_for_user_no_permission() {
    let deps = build_dependencies(false);
    let service = deps.build_service();
    let result = service
        .configuration_for_user(default_user_id(), ().auth(), None)
        .await;
    test_forbidden(&result);
}

#[tokio::test]
async fn test_categories_for_user_tags_set_titles() {
    let mut deps = build_dependencies(true);
    expect_default_user(&mut deps);
    deps.canton_dao
        .expect_find_category_sets()
        .returning(|_, _| Ok(default_category_sets().into()));
    deps.canton_dao
        .expect_find_categories()
        .with(eq(default_canton_id()), always())
        .returning(|_, _| {
            Ok([
                CategoryEntity {
                    id: teaching_category_id(),
                    category_set_id: teaching_set_id(),
                    title: "lessons".into(),
                },
                // References a set outside the canton and is skipped.
                CategoryEntity {
                    id: Uuid::new_v4(),
                    category_set_id: Uuid::new_v4(),
                    title: "stray".into(),
                },
            ]
            .into())
        });
    let service = deps.build_service();
    let categories = service
        .categories_for_user(default_user_id(), ().auth(), None)
        .await
        .unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, teaching_category_id());
    assert_eq!(categories[0].set_title.as_ref(), "teaching");
}

#[tokio::test]
async fn test_set_custom_targets() {
    let mut deps = build_dependencies(true);
    expect_default_user(&mut deps);
    deps.canton_dao.expect_find_configuration().returning(|_, _| {
        Ok(Some(CantonConfigurationEntity {
            is_configurable: true,
            ..default_canton_entity()
        }))
    });
    deps.canton_dao
        .expect_find_category_sets()
        .returning(|_, _| Ok(default_category_sets().into()));
    deps.custom_target_dao
        .expect_upsert()
        .with(always(), eq("canton-service"), always())
        .times(2)
        .returning(|_, _, _| Ok(()));
    let service = deps.build_service();
    let targets: Arc<[CustomTarget]> = [
        CustomTarget {
            category_set_id: teaching_set_id(),
            percentage: 70.0,
        },
        CustomTarget {
            category_set_id: admin_set_id(),
            percentage: 30.0,
        },
    ]
    .into();
    let result = service
        .set_custom_targets(default_user_id(), targets, ().auth(), None)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_set_custom_targets_fixed_canton() {
    let mut deps = build_dependencies(true);
    expect_default_user(&mut deps);
    deps.canton_dao
        .expect_find_configuration()
        .returning(|_, _| Ok(Some(default_canton_entity())));
    let service = deps.build_service();
    let targets: Arc<[CustomTarget]> = [CustomTarget {
        category_set_id: teaching_set_id(),
        percentage: 100.0,
    }]
    .into();
    let result = service
        .set_custom_targets(default_user_id(), targets, ().auth(), None)
        .await;
    test_validation_error(&result);
}

#[tokio::test]
async fn test_set_custom_targets_out_of_bounds() {
    let mut deps = build_dependencies(true);
    expect_default_user(&mut deps);
    deps.canton_dao.expect_find_configuration().returning(|_, _| {
        Ok(Some(CantonConfigurationEntity {
            is_configurable: true,
            ..default_canton_entity()
        }))
    });
    deps.canton_dao
        .expect_find_category_sets()
        .returning(|_, _| Ok(default_category_sets().into()));
    let service = deps.build_service();
    // 90 exceeds the teaching set's maximum of 80.
    let targets: Arc<[CustomTarget]> = [
        CustomTarget {
            category_set_id: teaching_set_id(),
            percentage: 90.0,
        },
        CustomTarget {
            category_set_id: admin_set_id(),
            percentage: 10.0,
        },
    ]
    .into();
    let result = service
        .set_custom_targets(default_user_id(), targets, ().auth(), None)
        .await;
    test_validation_error(&result);
}

#[tokio::test]
async fn test_set_custom_targets_sum_must_be_100() {
    let mut deps = build_dependencies(true);
    expect_default_user(&mut deps);
    deps.canton_dao.expect_find_configuration().returning(|_, _| {
        Ok(Some(CantonConfigurationEntity {
            is_configurable: true,
            ..default_canton_entity()
        }))
    });
    deps.canton_dao
        .expect_find_category_sets()
        .returning(|_, _| Ok(default_category_sets().into()));
    let service = deps.build_service();
    let targets: Arc<[CustomTarget]> = [
        CustomTarget {
            category_set_id: teaching_set_id(),
            percentage: 60.0,
        },
        CustomTarget {
            category_set_id: admin_set_id(),
            percentage: 30.0,
        },
    ]
    .into();
    let result = service
        .set_custom_targets(default_user_id(), targets, ().auth(), None)
        .await;
    test_validation_error(&result);
}

#[tokio::test]
async fn test_set_custom_targets_unknown_set() {
    let mut deps = build_dependencies(true);
    expect_default_user(&mut deps);
    deps.canton_dao.expect_find_configuration().returning(|_, _| {
        Ok(Some(CantonConfigurationEntity {
            is_configurable: true,
            ..default_canton_entity()
        }))
    });
    deps.canton_dao
        .expect_find_category_sets()
        .returning(|_, _| Ok(default_category_sets().into()));
    let service = deps.build_service();
    let unknown = Uuid::new_v4();
    let targets: Arc<[CustomTarget]> = [CustomTarget {
        category_set_id: unknown,
        percentage: 100.0,
    }]
    .into();
    let result = service
        .set_custom_targets(default_user_id(), targets, ().auth(), None)
        .await;
    test_not_found(&result, &unknown);
}
