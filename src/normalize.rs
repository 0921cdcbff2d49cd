//! Turns caller-supplied fields, terms and options into a [`SearchSpec`].
//!
//! Callers may pass a single string or a list for both fields and terms;
//! either way the result is an ordered, non-empty sequence. Options come in
//! as a typed [`SearchOptions`], as loose key/value pairs (request
//! parameters) or as a JSON object, and are rejected if any key or value is
//! not recognized.

use crate::ast::{BooleanMode, CompOp, FieldPath, MatchType, SearchOptions, SearchSpec};
use crate::error::{Result, SearchError};

/// One or many strings, normalized to an ordered list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchList(pub Vec<String>);

impl From<&str> for SearchList {
    fn from(value: &str) -> Self {
        SearchList(vec![value.to_string()])
    }
}

impl From<String> for SearchList {
    fn from(value: String) -> Self {
        SearchList(vec![value])
    }
}

impl From<Vec<String>> for SearchList {
    fn from(values: Vec<String>) -> Self {
        SearchList(values)
    }
}

impl From<Vec<&str>> for SearchList {
    fn from(values: Vec<&str>) -> Self {
        SearchList(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for SearchList {
    fn from(values: &[&str]) -> Self {
        SearchList(values.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for SearchList {
    fn from(values: &[String]) -> Self {
        SearchList(values.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for SearchList {
    fn from(values: [&str; N]) -> Self {
        SearchList(values.iter().map(|s| s.to_string()).collect())
    }
}

impl SearchSpec {
    /// Normalize and validate a search request.
    pub fn parse(
        fields: impl Into<SearchList>,
        terms: impl Into<SearchList>,
        options: SearchOptions,
    ) -> Result<SearchSpec> {
        let SearchList(fields) = fields.into();
        let SearchList(terms) = terms.into();

        if fields.is_empty() {
            return Err(SearchError::invalid("at least one field is required"));
        }
        if terms.is_empty() {
            return Err(SearchError::invalid("at least one search term is required"));
        }
        validate_options(&options)?;

        let fields = fields
            .iter()
            .map(|f| FieldPath::parse(f))
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchSpec { fields, terms, options })
    }
}

impl FieldPath {
    /// Parse `column` or `relation.column`; deeper nesting is rejected.
    pub fn parse(path: &str) -> Result<FieldPath> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(SearchError::invalid(format!("malformed field path '{}'", path)));
        }
        match parts.as_slice() {
            [column] => Ok(FieldPath::Local(column.to_string())),
            [relation, column] => Ok(FieldPath::Related {
                relation: relation.to_string(),
                column: column.to_string(),
            }),
            _ => Err(SearchError::invalid(format!(
                "field path '{}' nests more than one relation",
                path
            ))),
        }
    }
}

fn validate_options(options: &SearchOptions) -> Result<()> {
    if let (Some(match_type), Some(op)) = (options.match_type, options.operator) {
        return Err(SearchError::invalid(format!(
            "matchType '{}' and operator '{}' cannot be combined",
            match_type, op
        )));
    }
    Ok(())
}

impl SearchOptions {
    /// Build options from loose key/value pairs such as request parameters.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<SearchOptions>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = SearchOptions::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "caseSensitive" => options.case_sensitive = parse_flag(value)?,
                "matchType" => options.match_type = Some(value.parse::<MatchType>()?),
                "boolean" => options.boolean = value.parse::<BooleanMode>()?,
                "operator" => options.operator = Some(value.parse::<CompOp>()?),
                other => {
                    return Err(SearchError::invalid(format!("unrecognized option '{}'", other)))
                }
            }
        }
        validate_options(&options)?;
        Ok(options)
    }

    /// Build options from a JSON object with camelCase keys.
    pub fn from_json(json: &str) -> Result<SearchOptions> {
        let options: SearchOptions = serde_json::from_str(json)
            .map_err(|e| SearchError::invalid(format!("invalid options: {}", e)))?;
        validate_options(&options)?;
        Ok(options)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SearchError::invalid(format!("'{}' is not a boolean", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_scalar_inputs_become_single_element_lists() {
        let spec = SearchSpec::parse("title", "launch", SearchOptions::default()).unwrap();
        assert_eq!(spec.fields, vec![FieldPath::Local("title".to_string())]);
        assert_eq!(spec.terms, vec!["launch".to_string()]);
    }

    #[test]
    fn test_list_order_is_preserved() {
        let spec = SearchSpec::parse(
            vec!["title", "user.name"],
            ["b", "a"],
            SearchOptions::default(),
        )
        .unwrap();
        assert_eq!(
            spec.fields[1],
            FieldPath::Related {
                relation: "user".to_string(),
                column: "name".to_string()
            }
        );
        assert_eq!(spec.terms, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_empty_fields_is_invalid() {
        let err = SearchSpec::parse(Vec::<String>::new(), "x", SearchOptions::default());
        assert!(matches!(err, Err(SearchError::InvalidSpec(_))));
    }

    #[test]
    fn test_empty_terms_is_invalid() {
        let err = SearchSpec::parse("title", Vec::<&str>::new(), SearchOptions::default());
        assert!(matches!(err, Err(SearchError::InvalidSpec(_))));
    }

    #[rstest]
    #[case("a.b.c")]
    #[case("")]
    #[case(".name")]
    #[case("user.")]
    fn test_malformed_field_paths(#[case] path: &str) {
        assert!(matches!(FieldPath::parse(path), Err(SearchError::InvalidSpec(_))));
    }

    #[test]
    fn test_match_type_and_operator_are_exclusive() {
        let options = SearchOptions::default()
            .with_match_type(MatchType::Exact)
            .with_operator(CompOp::Gt);
        let err = SearchSpec::parse("price", "100", options);
        assert!(matches!(err, Err(SearchError::InvalidSpec(_))));
    }

    #[rstest]
    #[case("contains", MatchType::Contains)]
    #[case("exact", MatchType::Exact)]
    #[case("startsWith", MatchType::StartsWith)]
    #[case("endsWith", MatchType::EndsWith)]
    fn test_match_type_from_pairs(#[case] raw: &str, #[case] expected: MatchType) {
        let options = SearchOptions::from_pairs([("matchType", raw)]).unwrap();
        assert_eq!(options.effective_match_type(), expected);
    }

    #[test]
    fn test_unknown_match_type_is_invalid() {
        let err = SearchOptions::from_pairs([("matchType", "fuzzy")]);
        assert!(matches!(err, Err(SearchError::InvalidSpec(_))));
    }

    #[test]
    fn test_unknown_option_key_is_invalid() {
        let err = SearchOptions::from_pairs([("limit", "10")]);
        assert!(matches!(err, Err(SearchError::InvalidSpec(_))));
    }

    #[test]
    fn test_pairs_parse_every_key() {
        let options = SearchOptions::from_pairs([
            ("caseSensitive", "true"),
            ("boolean", "AND"),
            ("operator", ">="),
        ])
        .unwrap();
        assert!(options.case_sensitive);
        assert_eq!(options.boolean, BooleanMode::And);
        assert_eq!(options.operator, Some(CompOp::Gte));
        assert_eq!(options.match_type, None);
    }

    #[test]
    fn test_unknown_operator_and_boolean_are_invalid() {
        assert!(SearchOptions::from_pairs([("operator", "~")]).is_err());
        assert!(SearchOptions::from_pairs([("boolean", "xor")]).is_err());
        assert!(SearchOptions::from_pairs([("caseSensitive", "maybe")]).is_err());
    }

    #[test]
    fn test_json_options() {
        let options =
            SearchOptions::from_json(r#"{"matchType": "endsWith", "boolean": "and"}"#).unwrap();
        assert_eq!(options.match_type, Some(MatchType::EndsWith));
        assert_eq!(options.boolean, BooleanMode::And);
        assert!(!options.case_sensitive);

        let options = SearchOptions::from_json(r#"{"operator": "<>"}"#).unwrap();
        assert_eq!(options.operator, Some(CompOp::NotEq));
    }

    #[test]
    fn test_json_options_reject_unknown_keys_and_values() {
        assert!(SearchOptions::from_json(r#"{"matchtype": "exact"}"#).is_err());
        assert!(SearchOptions::from_json(r#"{"matchType": "fuzzy"}"#).is_err());
        assert!(SearchOptions::from_json(r#"{"matchType": "exact", "operator": ">"}"#).is_err());
    }

    #[rstest]
    #[case("boolean", "AND", r#"{"boolean": "AND"}"#)]
    #[case("matchType", "STARTSWITH", r#"{"matchType": "STARTSWITH"}"#)]
    #[case("matchType", "endswith", r#"{"matchType": "endswith"}"#)]
    #[case("operator", "GTE", r#"{"operator": "GTE"}"#)]
    fn test_pairs_and_json_agree_on_case(#[case] key: &str, #[case] value: &str, #[case] json: &str) {
        let from_pairs = SearchOptions::from_pairs([(key, value)]).unwrap();
        let from_json = SearchOptions::from_json(json).unwrap();
        assert_eq!(from_pairs, from_json);
    }
}
