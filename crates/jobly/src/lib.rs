//! # jobly
//!
//! Data layer for the companies/jobs API, over PostgreSQL with hand-written,
//! parameterized SQL.
//!
//! ## Features
//!
//! - **SQL explicit**: every statement is plain SQL with `$n` placeholders
//! - **Partial updates**: [`partial_update::build`] turns a sparse payload into a `SET` list
//! - **Declarative filters**: [`filter::build`] evaluates a resource's filter table in a fixed order
//! - **Client-agnostic accessors**: pass a connection, pooled connection or transaction
//!   anywhere a [`GenericClient`] is expected
//! - **Typed errors**: [`JoblyError`] tells bad requests, missing rows and duplicates apart
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{company, job, DatabaseConfig};
//!
//! let pool = jobly::create_pool(&DatabaseConfig::from_env()?)?;
//! let conn = pool.get().await?;
//!
//! let filters = job::JobFilter { title: Some("engineer".into()), has_equity: Some(true), ..Default::default() };
//! let jobs = job::find_all(&conn, &filters).await?;
//!
//! let update = company::CompanyUpdate { num_employees: Some(Some(120)), ..Default::default() };
//! let acme = company::update(&conn, "acme", &update).await?;
//! ```

pub mod client;
pub mod company;
pub mod config;
pub mod error;
pub mod filter;
pub mod fragment;
pub mod job;
pub mod partial_update;
pub mod row;
pub mod value;

pub use client::GenericClient;
pub use company::{Company, CompanyDetail, CompanyFilter, CompanyUpdate, NewCompany};
pub use config::DatabaseConfig;
pub use error::{JoblyError, JoblyResult};
pub use filter::Filter;
pub use fragment::SqlFragment;
pub use job::{Job, JobFilter, JobUpdate, NewJob};
pub use partial_update::{FieldTranslation, UpdateSpec};
pub use row::{FromRow, RowExt};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;

#[cfg(test)]
mod testing;
