//! Parameters for the Dovetail list endpoints
//!
//! Each parameter group deserializes from tool input, validates itself, and
//! appends its bracket-notation pairs to a [`QueryBuilder`]. Pairs are
//! emitted in a fixed order: page, created_at, project_id, published, title,
//! sort.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::query::QueryBuilder;

/// Accepted date formats: `YYYY-MM-DD`, optionally followed by
/// `THH:MM:SS`, six fractional digits, and `Z` or a `+HHMM`/`-HHMM` offset
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}(\.\d{6})?(Z|[+-]\d{4})?)?$")
        .expect("date regex is valid")
});

/// Largest accepted page size
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A single value or a list of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// View the values as a slice
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }
}

/// Cursor pagination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Page {
    /// Cursor to start from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,

    /// Number of items per page (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Page {
    fn validate(&self) -> Result<()> {
        match self.limit {
            Some(limit) if limit > MAX_PAGE_LIMIT => Err(ApiError::invalid_parameter(
                "page.limit",
                format!("must be between 0 and {}, got {}", MAX_PAGE_LIMIT, limit),
            )),
            _ => Ok(()),
        }
    }

    fn append_to(&self, query: &mut QueryBuilder) {
        query.append_non_empty("page[start_cursor]", self.start_cursor.as_deref());
        if let Some(limit) = self.limit {
            query.append("page[limit]", &limit.to_string());
        }
    }
}

/// Creation date range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatedAtFilter {
    /// Greater than date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,

    /// Greater than or equal to date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,

    /// Less than date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,

    /// Less than or equal to date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
}

impl CreatedAtFilter {
    fn bounds(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("gt", self.gt.as_deref()),
            ("gte", self.gte.as_deref()),
            ("lt", self.lt.as_deref()),
            ("lte", self.lte.as_deref()),
        ]
    }

    fn validate(&self) -> Result<()> {
        for (op, value) in self.bounds() {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                if !DATE_RE.is_match(value) {
                    return Err(ApiError::invalid_parameter(
                        format!("filter.created_at.{}", op),
                        format!(
                            "'{}' must be in format YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS, \
                             YYYY-MM-DDTHH:MM:SSZ, YYYY-MM-DDTHH:MM:SS+0000, or \
                             YYYY-MM-DDTHH:MM:SS.SSSSSS+0000",
                            value
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    fn append_to(&self, query: &mut QueryBuilder) {
        for (op, value) in self.bounds() {
            query.append_non_empty(&format!("filter[created_at][{}]", op), value);
        }
    }
}

/// Title match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TitleFilter {
    /// Substring match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,

    /// Exact match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal_to: Option<String>,
}

impl TitleFilter {
    fn append_to(&self, query: &mut QueryBuilder) {
        query
            .append_non_empty("filter[title][contains]", self.contains.as_deref())
            .append_non_empty("filter[title][equal_to]", self.equal_to.as_deref());
    }
}

fn append_project_id(query: &mut QueryBuilder, project_id: &OneOrMany<String>) {
    match project_id {
        OneOrMany::One(id) => {
            query.append_non_empty("filter[project_id]", Some(id.as_str()));
        }
        OneOrMany::Many(ids) => {
            query.append_indexed("filter[project_id]", ids);
        }
    }
}

fn append_sort(query: &mut QueryBuilder, sort: &OneOrMany<String>) {
    query.append_indexed("sort", sort.as_slice());
}

/// Filters accepted by the insight list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsightFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<CreatedAtFilter>,

    /// Project ID or array of project IDs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<OneOrMany<String>>,

    /// Filter by published status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleFilter>,
}

/// Filters accepted by the data list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<CreatedAtFilter>,

    /// Project ID or array of project IDs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleFilter>,
}

/// Filters accepted by the project list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleFilter>,
}

/// `GET /insights` and `GET /insights/user/{id}` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsightListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<InsightFilter>,

    /// Sort in `property:direction` form, one or many
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<OneOrMany<String>>,
}

/// `GET /data` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<DataFilter>,

    /// Sort in `property:direction` form, one or many
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<OneOrMany<String>>,
}

/// `GET /projects` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ProjectFilter>,

    /// Sort in `property:direction` form, one or many
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<OneOrMany<String>>,
}

impl InsightListParams {
    /// Validate and render the query string
    pub fn to_query(&self) -> Result<Option<String>> {
        let mut query = QueryBuilder::new();

        if let Some(page) = &self.page {
            page.validate()?;
            page.append_to(&mut query);
        }
        if let Some(filter) = &self.filter {
            if let Some(created_at) = &filter.created_at {
                created_at.validate()?;
                created_at.append_to(&mut query);
            }
            if let Some(project_id) = &filter.project_id {
                append_project_id(&mut query, project_id);
            }
            if let Some(published) = filter.published {
                query.append("filter[published]", if published { "true" } else { "false" });
            }
            if let Some(title) = &filter.title {
                title.append_to(&mut query);
            }
        }
        if let Some(sort) = &self.sort {
            append_sort(&mut query, sort);
        }

        Ok(query.finish())
    }
}

impl DataListParams {
    /// Validate and render the query string
    pub fn to_query(&self) -> Result<Option<String>> {
        let mut query = QueryBuilder::new();

        if let Some(page) = &self.page {
            page.validate()?;
            page.append_to(&mut query);
        }
        if let Some(filter) = &self.filter {
            if let Some(created_at) = &filter.created_at {
                created_at.validate()?;
                created_at.append_to(&mut query);
            }
            if let Some(project_id) = &filter.project_id {
                append_project_id(&mut query, project_id);
            }
            if let Some(title) = &filter.title {
                title.append_to(&mut query);
            }
        }
        if let Some(sort) = &self.sort {
            append_sort(&mut query, sort);
        }

        Ok(query.finish())
    }
}

impl ProjectListParams {
    /// Validate and render the query string
    pub fn to_query(&self) -> Result<Option<String>> {
        let mut query = QueryBuilder::new();

        if let Some(page) = &self.page {
            page.validate()?;
            page.append_to(&mut query);
        }
        if let Some(title) = self.filter.as_ref().and_then(|f| f.title.as_ref()) {
            title.append_to(&mut query);
        }
        if let Some(sort) = &self.sort {
            append_sort(&mut query, sort);
        }

        Ok(query.finish())
    }
}
