//! Company accessors.
//!
//! Companies are keyed by their caller-supplied `handle`. All functions take
//! any [`GenericClient`], so they run equally on a pooled connection or inside
//! a transaction the caller controls.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{self, Filter};
use crate::job::{self, Job};
use crate::partial_update::{self, FieldTranslation, UpdateSpec};
use crate::row::{FromRow, RowExt, map_rows};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// API field name → `companies` column.
pub const COMPANY_FIELDS: FieldTranslation<'static> =
    FieldTranslation::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

/// A row of the `companies` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &tokio_postgres::Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A company together with its jobs, ordered by job id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

/// Payload for [`create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Payload for [`update`]. Only the fields that are present are changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "partial_update::nullable")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "partial_update::nullable")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    /// The present fields, keyed by their API names.
    pub fn to_update_spec(&self) -> UpdateSpec {
        let mut spec = UpdateSpec::new();
        if let Some(name) = &self.name {
            spec.insert("name", name.as_str());
        }
        if let Some(description) = &self.description {
            spec.insert("description", description.as_str());
        }
        if let Some(num_employees) = self.num_employees {
            spec.insert("numEmployees", num_employees);
        }
        if let Some(logo_url) = &self.logo_url {
            spec.insert("logoUrl", logo_url.clone());
        }
        spec
    }
}

/// Criteria for [`find_all`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    #[serde(default)]
    pub min_employees: Option<i32>,
    #[serde(default)]
    pub max_employees: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CompanyFilter {
    /// Reject an employee range that cannot match anything.
    pub fn validate(&self) -> JoblyResult<()> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees)
            && min > max
        {
            return Err(JoblyError::bad_request(
                "minEmployees cannot be greater than maxEmployees",
            ));
        }
        Ok(())
    }

    /// The `WHERE` clause selecting the matching companies.
    pub fn where_clause(&self) -> crate::SqlFragment {
        filter::build(self, COMPANY_FILTERS)
    }
}

fn min_employees(f: &CompanyFilter) -> Option<SqlValue> {
    f.min_employees.map(SqlValue::from)
}

fn max_employees(f: &CompanyFilter) -> Option<SqlValue> {
    f.max_employees.map(SqlValue::from)
}

fn name(f: &CompanyFilter) -> Option<SqlValue> {
    f.name.as_deref().map(SqlValue::from)
}

const COMPANY_FILTERS: &[Filter<CompanyFilter>] = &[
    Filter::AtLeast {
        column: "num_employees",
        value: min_employees,
    },
    Filter::AtMost {
        column: "num_employees",
        value: max_employees,
    },
    Filter::Contains {
        column: "name",
        value: name,
    },
];

/// Create a company.
///
/// Returns [`JoblyError::Duplicate`] if the handle (or name) is taken.
pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> JoblyResult<Company> {
    let existing = conn
        .query_opt(
            "SELECT handle FROM companies WHERE handle = $1",
            &[&data.handle],
        )
        .await?;
    if existing.is_some() {
        tracing::debug!(target: "jobly.sql", handle = %data.handle, "duplicate company");
        return Err(JoblyError::duplicate(format!(
            "Duplicate company: {}",
            data.handle
        )));
    }

    let sql = format!(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    );
    tracing::debug!(target: "jobly.sql", sql = %sql, params = 5, "create company");

    let row = conn
        .query_one(
            &sql,
            &[
                &data.handle,
                &data.name,
                &data.description,
                &data.num_employees,
                &data.logo_url,
            ],
        )
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                JoblyError::duplicate(format!("Duplicate company: {}", data.handle))
            } else {
                e
            }
        })?;

    Company::from_row(&row)
}

/// List companies matching `filters`, ordered by name.
pub async fn find_all(conn: &impl GenericClient, filters: &CompanyFilter) -> JoblyResult<Vec<Company>> {
    filters.validate()?;

    let where_clause = filters.where_clause();
    let sql = format!(
        "SELECT {COLUMNS} FROM companies {} ORDER BY name",
        where_clause.clause
    );
    let params = where_clause.params_ref();
    tracing::debug!(target: "jobly.sql", sql = %sql, params = params.len(), "find companies");

    let rows = conn.query(&sql, &params).await?;
    map_rows(&rows)
}

/// Fetch one company and its jobs.
///
/// Returns [`JoblyError::NotFound`] if there is no such handle.
pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
    let sql = format!("SELECT {COLUMNS} FROM companies WHERE handle = $1");
    tracing::debug!(target: "jobly.sql", sql = %sql, params = 1, "get company");

    let Some(row) = conn.query_opt(&sql, &[&handle]).await? else {
        return Err(JoblyError::not_found(format!("No company: {handle}")));
    };
    let company = Company::from_row(&row)?;
    let jobs = job::for_company(conn, handle).await?;

    Ok(CompanyDetail { company, jobs })
}

/// Apply a partial update.
///
/// Returns [`JoblyError::BadRequest`] for an empty payload (before touching the
/// database) and [`JoblyError::NotFound`] if there is no such handle.
pub async fn update(
    conn: &impl GenericClient,
    handle: &str,
    data: &CompanyUpdate,
) -> JoblyResult<Company> {
    let set = partial_update::build(&data.to_update_spec(), &COMPANY_FIELDS)?;
    let sql = format!(
        "UPDATE companies SET {} WHERE handle = {} RETURNING {COLUMNS}",
        set.clause,
        set.next_placeholder()
    );
    let mut params = set.params_ref();
    params.push(&handle);
    tracing::debug!(target: "jobly.sql", sql = %sql, params = params.len(), "update company");

    let Some(row) = conn.query_opt(&sql, &params).await? else {
        return Err(JoblyError::not_found(format!("No company: {handle}")));
    };
    Company::from_row(&row)
}

/// Delete a company (its jobs go with it).
///
/// Returns [`JoblyError::NotFound`] if there is no such handle.
pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
    let sql = "DELETE FROM companies WHERE handle = $1 RETURNING handle";
    tracing::debug!(target: "jobly.sql", sql = %sql, params = 1, "remove company");

    match conn.query_opt(sql, &[&handle]).await? {
        Some(_) => Ok(()),
        None => Err(JoblyError::not_found(format!("No company: {handle}"))),
    }
}
