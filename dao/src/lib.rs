use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub mod canton;
pub mod custom_target;
pub mod time_record;
pub mod user;
pub mod user_category;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Date parse error: {0}")]
    DateParseError(#[from] time::error::Parse),

    #[error("Date format error: {0}")]
    DateFormatError(#[from] time::error::Format),

    #[error("Invalid date component: {0}")]
    DateComponentError(#[from] time::error::ComponentRange),
}

pub trait Transaction {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockTransaction;
impl Transaction for MockTransaction {}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait TransactionDao {
    type Transaction: Transaction;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError>;

    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError>;

    async fn commit(&self, tx: Self::Transaction) -> Result<(), DaoError>;
}
