use std::sync::Arc;

use async_trait::async_trait;
use dao::{DaoError, Transaction};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

pub mod canton;
pub mod custom_target;
pub mod time_record;
pub mod user;
pub mod user_category;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

pub trait ResultDbErrorExt<T, E> {
    fn map_db_error(self) -> Result<T, DaoError>;
}
impl<T, E: std::error::Error + Send + Sync + 'static> ResultDbErrorExt<T, E> for Result<T, E> {
    fn map_db_error(self) -> Result<T, DaoError> {
        self.map_err(|err| DaoError::DatabaseQueryError(Box::new(err)))
    }
}

pub(crate) fn uuid_from_blob(blob: &[u8]) -> Result<uuid::Uuid, DaoError> {
    uuid::Uuid::from_slice(blob).map_db_error()
}

#[derive(Clone, Debug)]
pub struct TransactionImpl {
    tx: Arc<Mutex<sqlx::Transaction<'static, sqlx::Sqlite>>>,
}

impl Transaction for TransactionImpl {}

pub struct TransactionDaoImpl {
    pool: Arc<SqlitePool>,
}
impl TransactionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}
#[async_trait]
impl dao::TransactionDao for TransactionDaoImpl {
    type Transaction = TransactionImpl;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError> {
        let tx = self.pool.begin().await.map_db_error()?;
        Ok(TransactionImpl {
            tx: Arc::new(tx.into()),
        })
    }

    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError> {
        match tx {
            Some(tx) => Ok(tx),
            None => self.new_transaction().await,
        }
    }

    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError> {
        if let Some(tx) = Arc::into_inner(transaction.tx) {
            tx.into_inner().commit().await.map_db_error()?;
        }
        Ok(())
    }
}
