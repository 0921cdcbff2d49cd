//! Schema configuration: loads the entity capability map from JSON.

use crate::schema::{EntitySchema, RelationSchema, SchemaRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("schema file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read schema file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid schema: {0}")]
    Invalid(String),
}

/// Top-level layout of a schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    pub entities: BTreeMap<String, EntityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityConfig {
    /// Defaults to the entity name.
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub relations: BTreeMap<String, RelationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelationConfig {
    pub table: String,
    pub foreign_key: String,
    pub local_key: String,
    pub columns: Vec<String>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl SchemaRegistry {
    /// Load and validate a schema file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        let registry = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path_ref.display(),
            entities = registry.len(),
            "loaded search schema"
        );
        Ok(registry)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: SchemaConfig = serde_json::from_str(content)?;
        config.into_registry()
    }

    /// The marketing-site CMS schema used when no file is supplied.
    pub fn cms_default() -> Self {
        SchemaRegistry::new()
            .with(
                EntitySchema::new("users")
                    .columns(["name", "email"])
                    .relation("posts", RelationSchema::has_many("posts", "user_id").columns(["title"])),
            )
            .with(
                EntitySchema::new("posts")
                    .columns(["title", "slug", "excerpt", "body", "status"])
                    .relation(
                        "user",
                        RelationSchema::belongs_to("users", "user_id").columns(["name", "email"]),
                    )
                    .relation(
                        "category",
                        RelationSchema::belongs_to("categories", "category_id").columns(["name", "slug"]),
                    ),
            )
            .with(
                EntitySchema::new("careers")
                    .columns(["title", "department", "location", "employment_type", "description"]),
            )
            .with(
                EntitySchema::new("contact_messages")
                    .columns(["name", "email", "phone", "subject", "message"]),
            )
            .with(EntitySchema::new("services").columns(["title", "description"]))
            .with(EntitySchema::new("clients").columns(["name", "website"]))
            .with(
                EntitySchema::new("case_studies")
                    .columns(["title", "summary", "content"])
                    .relation(
                        "client",
                        RelationSchema::belongs_to("clients", "client_id").columns(["name"]),
                    ),
            )
    }
}

impl SchemaConfig {
    /// Validate and convert into a registry.
    pub fn into_registry(self) -> Result<SchemaRegistry, ConfigError> {
        let mut registry = SchemaRegistry::new();
        for (name, entity) in self.entities {
            check_columns(&name, &entity.columns)?;
            if entity.primary_key.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("entity '{}' has an empty primaryKey", name)));
            }

            let mut schema = EntitySchema::new(name.as_str())
                .primary_key(entity.primary_key)
                .columns(entity.columns);
            if let Some(table) = entity.table {
                schema = schema.table(table);
            }

            for (relation_name, relation) in entity.relations {
                let owner = format!("{}.{}", name, relation_name);
                if [&relation.table, &relation.foreign_key, &relation.local_key]
                    .iter()
                    .any(|s| s.trim().is_empty())
                {
                    return Err(ConfigError::Invalid(format!(
                        "relation '{}' needs a table, foreignKey and localKey",
                        owner
                    )));
                }
                check_columns(&owner, &relation.columns)?;
                schema = schema.relation(
                    relation_name,
                    RelationSchema::new(relation.table, relation.foreign_key, relation.local_key)
                        .columns(relation.columns),
                );
            }
            registry.register(schema);
        }
        Ok(registry)
    }
}

fn check_columns(owner: &str, columns: &[String]) -> Result<(), ConfigError> {
    if columns.is_empty() {
        return Err(ConfigError::Invalid(format!("'{}' declares no searchable columns", owner)));
    }
    if let Some(bad) = columns.iter().find(|c| c.trim().is_empty() || c.contains('.')) {
        return Err(ConfigError::Invalid(format!("'{}' has an invalid column name '{}'", owner, bad)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCHEMA: &str = r#"{
        "entities": {
            "posts": {
                "columns": ["title", "body"],
                "relations": {
                    "user": {
                        "table": "users",
                        "foreignKey": "id",
                        "localKey": "user_id",
                        "columns": ["name"]
                    }
                }
            },
            "careers": {
                "table": "job_openings",
                "primaryKey": "career_id",
                "columns": ["title"]
            }
        }
    }"#;

    #[test]
    fn test_load_valid_json_schema() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SCHEMA).unwrap();

        let registry = SchemaRegistry::from_json_file(file.path()).unwrap();
        assert_eq!(registry.len(), 2);

        let posts = registry.entity("posts").unwrap();
        assert_eq!(posts.table, "posts");
        assert_eq!(posts.primary_key, "id");
        assert_eq!(posts.relations["user"].local_key, "user_id");

        let careers = registry.entity("careers").unwrap();
        assert_eq!(careers.table, "job_openings");
        assert_eq!(careers.primary_key, "career_id");
    }

    #[test]
    fn test_invalid_json_schema() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = SchemaRegistry::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SchemaRegistry::from_json_file("non_existent_schema.json");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = SchemaRegistry::from_json_str(
            r#"{"entities": {"posts": {"columns": ["title"], "searchable": true}}}"#,
        );
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_entity_without_columns_is_invalid() {
        let result = SchemaRegistry::from_json_str(r#"{"entities": {"posts": {"columns": []}}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_relation_with_empty_key_is_invalid() {
        let result = SchemaRegistry::from_json_str(
            r#"{"entities": {"posts": {"columns": ["title"], "relations": {
                "user": {"table": "users", "foreignKey": "", "localKey": "user_id", "columns": ["name"]}
            }}}}"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_schema() {
        let registry = SchemaRegistry::cms_default();
        let posts = registry.entity("posts").unwrap();
        assert!(posts.has_column("title"));
        assert!(posts.relations.contains_key("user"));
        assert!(registry.entity("contact_messages").is_some());
        assert!(registry.entity("unknown").is_none());
    }
}
