use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq)]
pub struct UserEntity {
    pub id: Uuid,
    pub canton_id: Uuid,
    /// Employment fraction in percent of full-time. `None` means the user
    /// never set it.
    pub workload: Option<f64>,
    /// User-level annual hours override, only honored when the canton
    /// flags `use_custom_work_hours`.
    pub custom_work_hours: Option<f64>,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait UserDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<UserEntity>, DaoError>;
}
