//! Entry points: [`SearchExt::search`] on any select statement, and the
//! [`EntityQuery`] handle that callers keep composing after a search.
//!
//! Nothing here executes SQL. The caller renders or builds the final
//! statement and runs it with whatever driver it owns.

use crate::ast::{SearchOptions, SearchSpec};
use crate::error::Result;
use crate::normalize::SearchList;
use crate::plan::QueryPlan;
use crate::schema::EntitySchema;
use crate::sql_compiler::{self, Dialect, Ident, SqlCompiler};
use sea_query::{IntoCondition, Order, SelectStatement, Values};

/// Adds attribute search to a select over an entity's table.
pub trait SearchExt {
    /// Normalize, plan and AND the resulting condition into the statement.
    /// The statement must later be rendered with the same `dialect`.
    ///
    /// On error the statement is left untouched.
    fn search(
        &mut self,
        schema: &EntitySchema,
        dialect: Dialect,
        fields: impl Into<SearchList>,
        terms: impl Into<SearchList>,
        options: SearchOptions,
    ) -> Result<&mut Self>;
}

impl SearchExt for SelectStatement {
    fn search(
        &mut self,
        schema: &EntitySchema,
        dialect: Dialect,
        fields: impl Into<SearchList>,
        terms: impl Into<SearchList>,
        options: SearchOptions,
    ) -> Result<&mut Self> {
        let spec = SearchSpec::parse(fields, terms, options)?;
        let plan = QueryPlan::build(&spec, schema)?;
        tracing::debug!(
            entity = %schema.name,
            %dialect,
            fields = spec.fields.len(),
            terms = spec.terms.len(),
            boolean = ?spec.options.boolean,
            "applying search"
        );

        let condition = SqlCompiler::new(schema).dialect(dialect).compile(&plan);
        tracing::trace!(leaves = plan.leaf_count(), "compiled search condition");
        self.cond_where(condition);
        Ok(self)
    }
}

/// A `SELECT * FROM <table>` for one entity, still open for composition.
///
/// The handle is bound to one [`Dialect`]; searches compile for it and
/// [`to_sql`](Self::to_sql) / [`build`](Self::build) render with it.
#[derive(Debug, Clone)]
pub struct EntityQuery<'a> {
    schema: &'a EntitySchema,
    dialect: Dialect,
    select: SelectStatement,
    ordered: bool,
}

impl<'a> EntityQuery<'a> {
    /// A handle targeting [`Dialect::Postgres`].
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self::for_dialect(schema, Dialect::default())
    }

    pub fn for_dialect(schema: &'a EntitySchema, dialect: Dialect) -> Self {
        Self {
            schema,
            dialect,
            select: sql_compiler::select_all(schema),
            ordered: false,
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        self.schema
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Apply an attribute search; may be called more than once.
    pub fn search(
        mut self,
        fields: impl Into<SearchList>,
        terms: impl Into<SearchList>,
        options: SearchOptions,
    ) -> Result<Self> {
        self.select
            .search(self.schema, self.dialect, fields, terms, options)?;
        Ok(self)
    }

    /// AND an arbitrary caller condition into the query.
    pub fn filter<C: IntoCondition>(mut self, condition: C) -> Self {
        self.select.cond_where(condition);
        self
    }

    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.select
            .order_by((Ident(self.schema.table.clone()), Ident(column.to_string())), order);
        self.ordered = true;
        self
    }

    /// Limit to one 1-based page. Without an explicit order the rows are
    /// ordered by primary key so pages stay stable. `page` and `per_page`
    /// are clamped to at least 1.
    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        if !self.ordered {
            let key = self.schema.primary_key.clone();
            self = self.order_by(&key, Order::Asc);
        }
        let page = page.max(1);
        let per_page = per_page.max(1);
        self.select
            .limit(per_page)
            .offset((page - 1).saturating_mul(per_page));
        self
    }

    pub fn statement(&self) -> &SelectStatement {
        &self.select
    }

    pub fn into_statement(self) -> SelectStatement {
        self.select
    }

    /// Render with values inlined.
    pub fn to_sql(&self) -> String {
        self.dialect.render(&self.select)
    }

    /// Render with placeholders plus the values to bind.
    pub fn build(&self) -> (String, Values) {
        self.dialect.build(&self.select)
    }
}
