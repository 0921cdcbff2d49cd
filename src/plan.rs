//! Boolean query plan built from a [`SearchSpec`].
//!
//! One leaf per (field x term). Leaves for the same term are OR-ed, and the
//! per-term groups are combined according to [`BooleanMode`]:
//!
//! ```text
//! fields [title, user.name], terms [a, b], boolean = and
//!
//! All
//!  ├─ Any
//!  │   ├─ Leaf(title ~ a)
//!  │   └─ Leaf(user.name ~ a)
//!  └─ Any
//!      ├─ Leaf(title ~ b)
//!      └─ Leaf(user.name ~ b)
//! ```

use crate::ast::{BooleanMode, CompOp, MatchType, SearchSpec};
use crate::error::Result;
use crate::schema::{EntitySchema, ResolvedField};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub root: PlanNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    /// Every child must hold.
    All(Vec<PlanNode>),
    /// At least one child must hold.
    Any(Vec<PlanNode>),
    Leaf(Leaf),
}

/// A single field compared against a single term.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub field: ResolvedField,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// String matching, optionally case-folded.
    Match {
        match_type: MatchType,
        term: String,
        case_sensitive: bool,
    },
    /// Direct comparison; `match_type` is ignored.
    Compare { op: CompOp, value: TermValue },
}

/// A term typed for direct comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum TermValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl TermValue {
    /// Integers first, then floats, otherwise the raw text.
    pub fn infer(term: &str) -> TermValue {
        let trimmed = term.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            TermValue::Integer(n)
        } else if let Some(f) = trimmed.parse::<f64>().ok().filter(|f| f.is_finite()) {
            TermValue::Float(f)
        } else {
            TermValue::Text(term.to_string())
        }
    }
}

impl QueryPlan {
    /// Resolve every field against `schema` and build the boolean tree.
    pub fn build(spec: &SearchSpec, schema: &EntitySchema) -> Result<QueryPlan> {
        let fields = spec
            .fields
            .iter()
            .map(|path| schema.resolve(path))
            .collect::<Result<Vec<_>>>()?;

        let groups: Vec<PlanNode> = spec
            .terms
            .iter()
            .map(|term| {
                let predicate = predicate_for(spec, term);
                let leaves = fields
                    .iter()
                    .map(|field| {
                        PlanNode::Leaf(Leaf {
                            field: field.clone(),
                            predicate: predicate.clone(),
                        })
                    })
                    .collect();
                PlanNode::Any(leaves)
            })
            .collect();

        let root = match spec.options.boolean {
            BooleanMode::Or => PlanNode::Any(groups),
            BooleanMode::And => PlanNode::All(groups),
        };
        Ok(QueryPlan { root })
    }

    pub fn leaf_count(&self) -> usize {
        fn count(node: &PlanNode) -> usize {
            match node {
                PlanNode::All(children) | PlanNode::Any(children) => children.iter().map(count).sum(),
                PlanNode::Leaf(_) => 1,
            }
        }
        count(&self.root)
    }
}

fn predicate_for(spec: &SearchSpec, term: &str) -> Predicate {
    match spec.options.operator {
        Some(op) => Predicate::Compare {
            op,
            value: TermValue::infer(term),
        },
        None => Predicate::Match {
            match_type: spec.options.effective_match_type(),
            term: term.to_string(),
            case_sensitive: spec.options.case_sensitive,
        },
    }
}
