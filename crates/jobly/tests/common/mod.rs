//! Shared fixtures for database-backed tests.
//!
//! Tests connect through `DATABASE_URL` and skip themselves when it is unset.
//! Every test works inside its own transaction on temporary tables that
//! shadow the real ones, so nothing outlives the test.

#![allow(dead_code)]

use tokio_postgres::Transaction;

pub async fn try_connect() -> Option<tokio_postgres::Client> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some(client)
}

const TEMP_SCHEMA: &str = r#"
CREATE TEMP TABLE companies (
  handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
  name TEXT UNIQUE NOT NULL,
  num_employees INTEGER CHECK (num_employees >= 0),
  description TEXT NOT NULL,
  logo_url TEXT
) ON COMMIT DROP;

CREATE TEMP TABLE jobs (
  id SERIAL PRIMARY KEY,
  title TEXT NOT NULL,
  salary INTEGER CHECK (salary >= 0),
  equity NUMERIC CHECK (equity <= 1.0),
  company_handle VARCHAR(25) NOT NULL
    REFERENCES companies ON DELETE CASCADE
) ON COMMIT DROP;

INSERT INTO companies (handle, name, num_employees, description, logo_url)
VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
       ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
       ('c3', 'C3', 3, 'Desc3', 'http://c3.img');
"#;

/// Seeded jobs as `(title, salary, equity, company_handle)`, in id order.
pub const JOBS: &[(&str, i32, &str, &str)] = &[
    ("firstJob", 45, "0.1", "c1"),
    ("c2Job", 4, "0.01", "c2"),
    ("c3Job", 5, "0.0011", "c3"),
    ("secondJob", 45, "0", "c1"),
];

/// Create and seed the temporary tables. Returns the seeded job ids in order.
pub async fn seed(tx: &Transaction<'_>) -> Vec<i32> {
    tx.batch_execute(TEMP_SCHEMA)
        .await
        .expect("failed to create temporary schema");

    let mut ids = Vec::with_capacity(JOBS.len());
    for (title, salary, equity, handle) in JOBS {
        let row = tx
            .query_one(
                "INSERT INTO jobs (title, salary, equity, company_handle) \
                 VALUES ($1, $2, $3::TEXT::NUMERIC, $4) RETURNING id",
                &[title, salary, equity, handle],
            )
            .await
            .expect("failed to seed job");
        ids.push(row.get("id"));
    }
    ids
}
