//! SQL compiler that turns a [`QueryPlan`] into sea-query conditions.
//!
//! Local leaves compare a column of the owner table. Related leaves become
//! `EXISTS` subqueries over the related table, aliased as `rel_<relation>`
//! and correlated through the relation keys:
//!
//! ```text
//! EXISTS (SELECT 1 FROM "users" AS "rel_user"
//!         WHERE "rel_user"."id" = "posts"."user_id"
//!           AND LOWER("rel_user"."name") LIKE '%ada%' ESCAPE '!')
//! ```

use crate::ast::{CompOp, MatchType};
use crate::plan::{Leaf, PlanNode, Predicate, QueryPlan, TermValue};
use crate::schema::{EntitySchema, ResolvedField};
use sea_query::extension::sqlite::SqliteExpr;
use sea_query::{
    Condition, Expr, Func, Iden, LikeExpr, MysqlQueryBuilder, PostgresQueryBuilder, Query,
    QueryStatementWriter, SelectStatement, SimpleExpr, SqliteQueryBuilder, Value, Values,
};
use std::fmt;
use std::str::FromStr;

/// Escape character used in every generated LIKE pattern.
pub const LIKE_ESCAPE: char = '!';

/// Table, alias or column identifier.
#[derive(Debug, Clone)]
pub struct Ident(pub String);

impl Iden for Ident {
    fn unquoted(&self, s: &mut dyn fmt::Write) {
        write!(s, "{}", self.0).unwrap();
    }
}

/// SQL flavour used to render a statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Render with values inlined.
    pub fn render<S: QueryStatementWriter>(&self, statement: &S) -> String {
        match self {
            Dialect::Postgres => statement.to_string(PostgresQueryBuilder),
            Dialect::MySql => statement.to_string(MysqlQueryBuilder),
            Dialect::Sqlite => statement.to_string(SqliteQueryBuilder),
        }
    }

    /// Render with placeholders plus the values to bind.
    pub fn build<S: QueryStatementWriter>(&self, statement: &S) -> (String, Values) {
        match self {
            Dialect::Postgres => statement.build(PostgresQueryBuilder),
            Dialect::MySql => statement.build(MysqlQueryBuilder),
            Dialect::Sqlite => statement.build(SqliteQueryBuilder),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(format!("unknown dialect '{}'", other)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

/// Compiles plans for one entity.
pub struct SqlCompiler<'a> {
    schema: &'a EntitySchema,
    dialect: Dialect,
}

impl<'a> SqlCompiler<'a> {
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self { schema, dialect: Dialect::default() }
    }

    /// Target dialect. Case-sensitive matching is spelled differently per
    /// backend, so a condition must be rendered with the dialect it was
    /// compiled for.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Compile the whole plan into a single condition.
    pub fn compile(&self, plan: &QueryPlan) -> Condition {
        self.compile_node(&plan.root)
    }

    fn compile_node(&self, node: &PlanNode) -> Condition {
        match node {
            PlanNode::All(children) => self.compile_children(Condition::all(), children),
            PlanNode::Any(children) => self.compile_children(Condition::any(), children),
            PlanNode::Leaf(leaf) => Condition::all().add(self.compile_leaf(leaf)),
        }
    }

    fn compile_children(&self, group: Condition, children: &[PlanNode]) -> Condition {
        children.iter().fold(group, |group, child| match child {
            PlanNode::Leaf(leaf) => group.add(self.compile_leaf(leaf)),
            nested => group.add(self.compile_node(nested)),
        })
    }

    fn compile_leaf(&self, leaf: &Leaf) -> SimpleExpr {
        match &leaf.field {
            ResolvedField::Local { column } => {
                let col = Expr::col((Ident(self.schema.table.clone()), Ident(column.clone())));
                self.compile_predicate(col, &leaf.predicate)
            }
            ResolvedField::Related { relation, schema, column } => {
                let alias = format!("rel_{}", relation);
                let col = Expr::col((Ident(alias.clone()), Ident(column.clone())));

                let subquery = Query::select()
                    .expr(Expr::val(1))
                    .from_as(Ident(schema.table.clone()), Ident(alias.clone()))
                    .and_where(
                        Expr::col((Ident(alias), Ident(schema.foreign_key.clone()))).equals((
                            Ident(self.schema.table.clone()),
                            Ident(schema.local_key.clone()),
                        )),
                    )
                    .and_where(self.compile_predicate(col, &leaf.predicate))
                    .to_owned();

                Expr::exists(subquery)
            }
        }
    }

    fn compile_predicate(&self, col: Expr, predicate: &Predicate) -> SimpleExpr {
        match predicate {
            Predicate::Compare { op, value } => {
                let val = term_to_value(value);
                match op {
                    CompOp::Eq => col.eq(val),
                    CompOp::NotEq => col.ne(val),
                    CompOp::Gt => col.gt(val),
                    CompOp::Lt => col.lt(val),
                    CompOp::Gte => col.gte(val),
                    CompOp::Lte => col.lte(val),
                }
            }
            Predicate::Match { match_type, term, case_sensitive: false } => {
                like_match(Func::lower(col).into(), *match_type, &term.to_lowercase())
            }
            Predicate::Match { match_type, term, case_sensitive: true } => match self.dialect {
                Dialect::Postgres => like_match(col.into(), *match_type, term),
                // the default collations compare case-insensitively
                Dialect::MySql => like_match(col.cast_as(Ident("BINARY".to_string())), *match_type, term),
                // LIKE ignores ASCII case; GLOB and `=` do not
                Dialect::Sqlite => glob_match(col.into(), *match_type, term),
            },
        }
    }
}

fn like_match(lhs: SimpleExpr, match_type: MatchType, needle: &str) -> SimpleExpr {
    match match_type {
        MatchType::Exact => lhs.eq(Value::String(Some(Box::new(needle.to_string())))),
        MatchType::Contains => lhs.like(like(format!("%{}%", escape_like(needle)))),
        MatchType::StartsWith => lhs.like(like(format!("{}%", escape_like(needle)))),
        MatchType::EndsWith => lhs.like(like(format!("%{}", escape_like(needle)))),
    }
}

fn glob_match(lhs: SimpleExpr, match_type: MatchType, needle: &str) -> SimpleExpr {
    let pattern = match match_type {
        MatchType::Exact => return lhs.eq(Value::String(Some(Box::new(needle.to_string())))),
        MatchType::Contains => format!("*{}*", escape_glob(needle)),
        MatchType::StartsWith => format!("{}*", escape_glob(needle)),
        MatchType::EndsWith => format!("*{}", escape_glob(needle)),
    };
    lhs.glob(pattern)
}

fn like(pattern: String) -> LikeExpr {
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

/// Wrap GLOB metacharacters in a one-character class so they match literally.
pub fn escape_glob(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '*' | '?' | '[' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape LIKE metacharacters so the term is matched literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn term_to_value(value: &TermValue) -> Value {
    match value {
        TermValue::Integer(n) => Value::BigInt(Some(*n)),
        TermValue::Float(f) => Value::Double(Some(*f)),
        TermValue::Text(s) => Value::String(Some(Box::new(s.clone()))),
    }
}

/// `SELECT * FROM <table>` for an entity.
pub fn select_all(schema: &EntitySchema) -> SelectStatement {
    Query::select()
        .column(sea_query::Asterisk)
        .from(Ident(schema.table.clone()))
        .to_owned()
}
