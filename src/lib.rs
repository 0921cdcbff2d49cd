//! Generic attribute search for relational entities.
//!
//! Any entity declared in a [`SchemaRegistry`] can be searched across its
//! own columns and across columns one relation away, with a configurable
//! match type and boolean combination of terms. Searches compile to
//! sea-query conditions and are applied to a caller-owned select; the query
//! is never executed here.
//!
//! ```no_run
//! use entity_search::{Dialect, EntityQuery, SchemaRegistry, SearchOptions};
//!
//! let registry = SchemaRegistry::cms_default();
//! let posts = registry.entity("posts").unwrap();
//! let sql = EntityQuery::for_dialect(posts, Dialect::Postgres)
//!     .search(vec!["title", "user.name"], "ada", SearchOptions::default())?
//!     .paginate(1, 20)
//!     .to_sql();
//! # Ok::<(), entity_search::SearchError>(())
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod plan;
pub mod query;
pub mod schema;
pub mod sql_compiler;
pub mod token;

pub use ast::{BooleanMode, CompOp, FieldPath, MatchType, SearchOptions, SearchSpec};
pub use config::ConfigError;
pub use error::SearchError;
pub use normalize::SearchList;
pub use plan::QueryPlan;
pub use query::{EntityQuery, SearchExt};
pub use schema::{EntitySchema, RelationSchema, SchemaRegistry};
pub use sql_compiler::Dialect;
