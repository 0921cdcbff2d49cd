//! Normalized search request types.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fully normalized search request, consumed immediately to build a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpec {
    /// Field paths in caller order, never empty.
    pub fields: Vec<FieldPath>,
    /// Search terms in caller order, never empty.
    pub terms: Vec<String>,
    pub options: SearchOptions,
}

/// A local column or a column one relation away, e.g. `title` or `user.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Local(String),
    Related { relation: String, column: String },
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Local(column) => write!(f, "{}", column),
            FieldPath::Related { relation, column } => write!(f, "{}.{}", relation, column),
        }
    }
}

/// Typed search options.
///
/// | key             | default    |
/// |-----------------|------------|
/// | `caseSensitive` | `false`    |
/// | `matchType`     | `contains` |
/// | `boolean`       | `or`       |
/// | `operator`      | none       |
///
/// `matchType` and `operator` are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchOptions {
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub match_type: Option<MatchType>,
    #[serde(default)]
    pub boolean: BooleanMode,
    #[serde(default)]
    pub operator: Option<CompOp>,
}

impl SearchOptions {
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    pub fn with_boolean(mut self, boolean: BooleanMode) -> Self {
        self.boolean = boolean;
        self
    }

    pub fn with_operator(mut self, operator: CompOp) -> Self {
        self.operator = Some(operator);
        self
    }

    /// The match type in force when none was given explicitly.
    pub fn effective_match_type(&self) -> MatchType {
        self.match_type.unwrap_or_default()
    }
}

/// String comparison strategy for a single term.
///
/// Parsed without regard to case, so `startsWith`, `startswith` and
/// `STARTSWITH` are the same value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchType {
    #[default]
    Contains,
    Exact,
    StartsWith,
    EndsWith,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Contains => "contains",
            MatchType::Exact => "exact",
            MatchType::StartsWith => "startsWith",
            MatchType::EndsWith => "endsWith",
        }
    }
}

impl FromStr for MatchType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contains" => Ok(MatchType::Contains),
            "exact" => Ok(MatchType::Exact),
            "startswith" => Ok(MatchType::StartsWith),
            "endswith" => Ok(MatchType::EndsWith),
            _ => Err(SearchError::invalid(format!("unknown matchType '{}'", s))),
        }
    }
}

impl TryFrom<String> for MatchType {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatchType> for String {
    fn from(match_type: MatchType) -> Self {
        match_type.as_str().to_string()
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How per-term groups combine. Parsed without regard to case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BooleanMode {
    /// A record matches if it matches any term.
    #[default]
    Or,
    /// A record matches only if it matches every term.
    And,
}

impl BooleanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanMode::Or => "or",
            BooleanMode::And => "and",
        }
    }
}

impl FromStr for BooleanMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "or" => Ok(BooleanMode::Or),
            "and" => Ok(BooleanMode::And),
            _ => Err(SearchError::invalid(format!("unknown boolean mode '{}'", s))),
        }
    }
}

impl TryFrom<String> for BooleanMode {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BooleanMode> for String {
    fn from(mode: BooleanMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Direct comparison operators, used instead of a match type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompOp {
    Eq,    // =
    NotEq, // != or <>
    Gt,    // >
    Lt,    // <
    Gte,   // >=
    Lte,   // <=
}

impl CompOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompOp::Eq => "=",
            CompOp::NotEq => "!=",
            CompOp::Gt => ">",
            CompOp::Lt => "<",
            CompOp::Gte => ">=",
            CompOp::Lte => "<=",
        }
    }
}

impl FromStr for CompOp {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Ok(CompOp::Eq),
            "!=" | "<>" | "ne" => Ok(CompOp::NotEq),
            ">" | "gt" => Ok(CompOp::Gt),
            "<" | "lt" => Ok(CompOp::Lt),
            ">=" | "gte" => Ok(CompOp::Gte),
            "<=" | "lte" => Ok(CompOp::Lte),
            _ => Err(SearchError::invalid(format!("unknown operator '{}'", s))),
        }
    }
}

impl TryFrom<String> for CompOp {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompOp> for String {
    fn from(op: CompOp) -> Self {
        op.symbol().to_string()
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
