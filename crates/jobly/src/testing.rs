//! Stub clients for exercising accessors without a database.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::sync::Mutex;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A statement seen by [`EmptyClient`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Recorded {
    pub sql: String,
    pub params: usize,
}

/// Answers every statement with zero rows and remembers what it was asked.
#[derive(Default)]
pub(crate) struct EmptyClient {
    statements: Mutex<Vec<Recorded>>,
}

impl EmptyClient {
    pub fn statements(&self) -> Vec<Recorded> {
        self.statements.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        self.statements.lock().unwrap().push(Recorded {
            sql: sql.to_string(),
            params: params.len(),
        });
    }
}

impl GenericClient for EmptyClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.record(sql, params);
        Ok(vec![])
    }
}

/// Fails the test if any statement reaches it.
pub(crate) struct PanicClient;

impl GenericClient for PanicClient {
    async fn query(&self, sql: &str, _params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        panic!("unexpected query() call: {sql}")
    }
}
