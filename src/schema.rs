//! Capability map: which entities exist, which of their columns may be
//! searched and which relations can be traversed.

use crate::ast::FieldPath;
use crate::error::{Result, SearchError};
use std::collections::BTreeMap;

/// A searchable entity backed by one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub name: String,
    pub table: String,
    pub primary_key: String,
    /// Columns that may appear in a local field path.
    pub columns: Vec<String>,
    pub relations: BTreeMap<String, RelationSchema>,
}

/// A relation one level away from its owner.
///
/// Rows are related when `related.foreign_key = owner.local_key`, which
/// covers both to-one and to-many relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSchema {
    pub table: String,
    pub foreign_key: String,
    pub local_key: String,
    /// Columns of the related table that may be searched.
    pub columns: Vec<String>,
}

/// A field path checked against an [`EntitySchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedField {
    Local {
        column: String,
    },
    Related {
        relation: String,
        schema: RelationSchema,
        column: String,
    },
}

impl EntitySchema {
    /// An entity whose table shares its name and whose key is `id`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            primary_key: "id".to_string(),
            columns: Vec::new(),
            relations: BTreeMap::new(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = key.into();
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn relation(mut self, name: impl Into<String>, relation: RelationSchema) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Check a field path against the declared columns and relations.
    pub fn resolve(&self, path: &FieldPath) -> Result<ResolvedField> {
        match path {
            FieldPath::Local(column) => {
                if self.has_column(column) {
                    Ok(ResolvedField::Local { column: column.clone() })
                } else {
                    Err(SearchError::unknown_field(&self.name, column.clone()))
                }
            }
            FieldPath::Related { relation, column } => {
                let schema = self
                    .relations
                    .get(relation)
                    .ok_or_else(|| SearchError::unknown_field(&self.name, path.to_string()))?;
                if !schema.has_column(column) {
                    return Err(SearchError::unknown_field(&self.name, path.to_string()));
                }
                Ok(ResolvedField::Related {
                    relation: relation.clone(),
                    schema: schema.clone(),
                    column: column.clone(),
                })
            }
        }
    }
}

impl RelationSchema {
    pub fn new(
        table: impl Into<String>,
        foreign_key: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            foreign_key: foreign_key.into(),
            local_key: local_key.into(),
            columns: Vec::new(),
        }
    }

    /// The owner holds `local_key` pointing at the related table's `id`.
    pub fn belongs_to(table: impl Into<String>, local_key: impl Into<String>) -> Self {
        Self::new(table, "id", local_key)
    }

    /// The related table holds `foreign_key` pointing at the owner's `id`.
    pub fn has_many(table: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self::new(table, foreign_key, "id")
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// All searchable entities, keyed by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    entities: BTreeMap<String, EntitySchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity: EntitySchema) {
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn with(mut self, entity: EntitySchema) -> Self {
        self.register(entity);
        self
    }

    pub fn entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntitySchema> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
