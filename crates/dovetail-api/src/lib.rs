//! # dovetail-api
//!
//! Client for the Dovetail REST API providing:
//! - Bearer-authenticated GET requests wrapped in the retry engine
//! - Bracket-notation query-string construction
//! - Parameter types for the list endpoints

pub mod client;
pub mod error;
pub mod params;
pub mod query;

pub use client::DovetailClient;
pub use error::{ApiError, Result};
pub use params::{
    CreatedAtFilter, DataFilter, DataListParams, InsightFilter, InsightListParams, OneOrMany,
    Page, ProjectFilter, ProjectListParams, TitleFilter,
};
pub use query::QueryBuilder;
