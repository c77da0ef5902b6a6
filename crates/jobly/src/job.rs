//! Job accessors.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{self, Filter};
use crate::fragment::SqlFragment;
use crate::partial_update::{self, FieldTranslation, UpdateSpec};
use crate::row::{FromRow, RowExt, map_rows};
use crate::value::SqlValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Job fields already match their column names.
pub const JOB_FIELDS: FieldTranslation<'static> = FieldTranslation::identity();

/// A row of the `jobs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    #[serde(rename = "company_handle", alias = "companyHandle")]
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &tokio_postgres::Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Payload for [`create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    #[serde(rename = "company_handle", alias = "companyHandle")]
    pub company_handle: String,
}

/// Payload for [`update`]. A job cannot move to another company.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "partial_update::nullable")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "partial_update::nullable")]
    pub equity: Option<Option<Decimal>>,
}

impl JobUpdate {
    pub fn to_update_spec(&self) -> UpdateSpec {
        let mut spec = UpdateSpec::new();
        if let Some(title) = &self.title {
            spec.insert("title", title.as_str());
        }
        if let Some(salary) = self.salary {
            spec.insert("salary", salary);
        }
        if let Some(equity) = self.equity {
            spec.insert("equity", equity);
        }
        spec
    }
}

/// Criteria for [`find_all`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    #[serde(default)]
    pub min_salary: Option<i32>,
    #[serde(default)]
    pub has_equity: Option<bool>,
    #[serde(default)]
    pub title: Option<String>,
}

impl JobFilter {
    pub fn where_clause(&self) -> SqlFragment {
        filter::build(self, JOB_FILTERS)
    }
}

fn min_salary(f: &JobFilter) -> Option<SqlValue> {
    f.min_salary.map(SqlValue::from)
}

fn title(f: &JobFilter) -> Option<SqlValue> {
    f.title.as_deref().map(SqlValue::from)
}

fn has_equity(f: &JobFilter) -> Option<SqlValue> {
    f.has_equity.map(SqlValue::from)
}

const JOB_FILTERS: &[Filter<JobFilter>] = &[
    Filter::AtLeast {
        column: "salary",
        value: min_salary,
    },
    Filter::Contains {
        column: "title",
        value: title,
    },
    Filter::Flag {
        predicate: "equity > 0",
        value: has_equity,
    },
];

/// Create a job.
///
/// Jobs have no natural key, so there is no duplicate check. An unknown
/// `company_handle` surfaces as [`JoblyError::ForeignKeyViolation`].
pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
    let sql = format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) \
         VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
    );
    tracing::debug!(target: "jobly.sql", sql = %sql, params = 4, "create job");

    let row = conn
        .query_one(
            &sql,
            &[&data.title, &data.salary, &data.equity, &data.company_handle],
        )
        .await?;

    Job::from_row(&row)
}

/// List jobs matching `filters`, ordered by id.
pub async fn find_all(conn: &impl GenericClient, filters: &JobFilter) -> JoblyResult<Vec<Job>> {
    let where_clause = filters.where_clause();
    let sql = format!(
        "SELECT {COLUMNS} FROM jobs {} ORDER BY id",
        where_clause.clause
    );
    let params = where_clause.params_ref();
    tracing::debug!(target: "jobly.sql", sql = %sql, params = params.len(), "find jobs");

    let rows = conn.query(&sql, &params).await?;
    map_rows(&rows)
}

/// Jobs posted by one company, ordered by id.
pub async fn for_company(conn: &impl GenericClient, handle: &str) -> JoblyResult<Vec<Job>> {
    let sql = format!("SELECT {COLUMNS} FROM jobs WHERE company_handle = $1 ORDER BY id");
    tracing::debug!(target: "jobly.sql", sql = %sql, params = 1, "find company jobs");

    let rows = conn.query(&sql, &[&handle]).await?;
    map_rows(&rows)
}

/// Fetch one job.
///
/// Returns [`JoblyError::NotFound`] if there is no such id.
pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
    let sql = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
    tracing::debug!(target: "jobly.sql", sql = %sql, params = 1, "get job");

    let Some(row) = conn.query_opt(&sql, &[&id]).await? else {
        return Err(JoblyError::not_found(format!("No job with id: {id}")));
    };
    Job::from_row(&row)
}

/// Apply a partial update.
///
/// Returns [`JoblyError::BadRequest`] for an empty payload and
/// [`JoblyError::NotFound`] if there is no such id.
pub async fn update(conn: &impl GenericClient, id: i32, data: &JobUpdate) -> JoblyResult<Job> {
    let set = partial_update::build(&data.to_update_spec(), &JOB_FIELDS)?;
    let sql = format!(
        "UPDATE jobs SET {} WHERE id = {} RETURNING {COLUMNS}",
        set.clause,
        set.next_placeholder()
    );
    let mut params = set.params_ref();
    params.push(&id);
    tracing::debug!(target: "jobly.sql", sql = %sql, params = params.len(), "update job");

    let Some(row) = conn.query_opt(&sql, &params).await? else {
        return Err(JoblyError::not_found(format!("No job with id: {id}")));
    };
    Job::from_row(&row)
}

/// Delete a job.
///
/// Returns [`JoblyError::NotFound`] if there is no such id.
pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
    let sql = "DELETE FROM jobs WHERE id = $1 RETURNING id";
    tracing::debug!(target: "jobly.sql", sql = %sql, params = 1, "remove job");

    match conn.query_opt(sql, &[&id]).await? {
        Some(_) => Ok(()),
        None => Err(JoblyError::not_found(format!("No job with id: {id}"))),
    }
}
