use std::sync::OnceLock;

use diesel::result::DatabaseErrorInformation;
use regex::Regex;

/// Extracts entity/field/value triples from PostgreSQL constraint violations.
///
/// PostgreSQL reports most of this through structured error fields
/// (`table_name`, `column_name`, `DETAIL`); the message text is only parsed
/// when those are absent.
pub struct ConstraintParser;

/// Borrowed view of the error fields the parser looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViolationContext<'a> {
    pub message: &'a str,
    pub details: Option<&'a str>,
    pub table: Option<&'a str>,
    pub column: Option<&'a str>,
    pub constraint: Option<&'a str>,
}

impl<'a> ViolationContext<'a> {
    pub fn from_info(info: &'a dyn DatabaseErrorInformation) -> Self {
        Self {
            message: info.message(),
            details: info.details(),
            table: info.table_name(),
            column: info.column_name(),
            constraint: info.constraint_name(),
        }
    }
}

/// What a constraint violation was about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub entity: String,
    pub field: String,
    pub value: Option<String>,
}

struct Patterns {
    key_value: Regex,
    column: Regex,
    relation: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

const CONSTRAINT_SUFFIXES: &[&str] = &["_fkey", "_pkey", "_key", "_check", "_idx", "_not_null"];

impl ConstraintParser {
    fn patterns() -> &'static Patterns {
        PATTERNS.get_or_init(|| Patterns {
            // Key (item_id)=(42)
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("static pattern"),
            column: Regex::new(r#"column "([^"]+)""#).expect("static pattern"),
            relation: Regex::new(r#"(?:relation|table) "([^"]+)""#).expect("static pattern"),
        })
    }

    /// Resolve the violated entity and field, or `None` when no field can
    /// be identified.
    pub fn parse(ctx: &ViolationContext<'_>) -> Option<Violation> {
        let key_value = ctx
            .details
            .and_then(Self::extract_key_value)
            .or_else(|| Self::extract_key_value(ctx.message));

        let from_constraint = ctx
            .constraint
            .and_then(|c| Self::split_constraint_name(c, ctx.table));

        let entity = ctx
            .table
            .map(str::to_string)
            .or_else(|| Self::extract_relation(ctx.message))
            .or_else(|| from_constraint.as_ref().map(|(e, _)| e.clone()))
            .unwrap_or_else(|| "resource".to_string());

        let field = ctx
            .column
            .map(str::to_string)
            .or_else(|| key_value.as_ref().map(|(f, _)| f.clone()))
            .or_else(|| Self::extract_column(ctx.message))
            .or_else(|| from_constraint.map(|(_, f)| f))?;

        Some(Violation {
            entity,
            field,
            value: key_value.map(|(_, v)| v),
        })
    }

    /// Split a conventional constraint name into `(table, column)`.
    ///
    /// `subitems_item_id_fkey` with a known table `subitems` yields
    /// `("subitems", "item_id")`; without the table the first segment is
    /// taken as the table name.
    pub fn split_constraint_name(constraint: &str, table: Option<&str>) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint.strip_suffix(suffix))?;

        let (entity, field) = match table {
            Some(table) => (table, stem.strip_prefix(table)?.strip_prefix('_')?),
            None => stem.split_once('_')?,
        };

        if entity.is_empty() || field.is_empty() {
            return None;
        }
        Some((entity.to_string(), field.to_string()))
    }

    pub fn extract_key_value(text: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(text).and_then(|caps| {
            Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
        })
    }

    pub fn extract_column(text: &str) -> Option<String> {
        Self::patterns()
            .column
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_relation(text: &str) -> Option<String> {
        Self::patterns()
            .relation
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefers_structured_fields() {
        let ctx = ViolationContext {
            message: "insert or update on table \"subitems\" violates foreign key constraint \"subitems_item_id_fkey\"",
            details: Some("Key (item_id)=(999) is not present in table \"items\"."),
            table: Some("subitems"),
            column: None,
            constraint: Some("subitems_item_id_fkey"),
        };

        let violation = ConstraintParser::parse(&ctx).unwrap();
        assert_eq!(violation.entity, "subitems");
        assert_eq!(violation.field, "item_id");
        assert_eq!(violation.value.as_deref(), Some("999"));
    }

    #[test]
    fn test_parse_not_null_from_message_only() {
        let ctx = ViolationContext {
            message: "null value in column \"title\" of relation \"items\" violates not-null constraint",
            ..Default::default()
        };

        let violation = ConstraintParser::parse(&ctx).unwrap();
        assert_eq!(violation.entity, "items");
        assert_eq!(violation.field, "title");
        assert_eq!(violation.value, None);
    }

    #[test]
    fn test_parse_check_from_constraint_name() {
        let ctx = ViolationContext {
            message: "new row violates check constraint \"items_title_check\"",
            constraint: Some("items_title_check"),
            ..Default::default()
        };

        let violation = ConstraintParser::parse(&ctx).unwrap();
        assert_eq!(violation.entity, "items");
        assert_eq!(violation.field, "title");
    }

    #[test]
    fn test_parse_without_any_field_information() {
        let ctx = ViolationContext {
            message: "something went wrong",
            ..Default::default()
        };
        assert_eq!(ConstraintParser::parse(&ctx), None);
    }

    #[test]
    fn test_split_constraint_name() {
        assert_eq!(
            ConstraintParser::split_constraint_name("subitems_item_id_fkey", Some("subitems")),
            Some(("subitems".to_string(), "item_id".to_string()))
        );
        assert_eq!(
            ConstraintParser::split_constraint_name("items_title_key", None),
            Some(("items".to_string(), "title".to_string()))
        );
        assert_eq!(
            ConstraintParser::split_constraint_name("sub_items_name_key", Some("sub_items")),
            Some(("sub_items".to_string(), "name".to_string()))
        );
        assert_eq!(ConstraintParser::split_constraint_name("items_pkey", None), None);
        assert_eq!(ConstraintParser::split_constraint_name("invalid", None), None);
    }

    #[test]
    fn test_extract_helpers() {
        assert_eq!(
            ConstraintParser::extract_key_value("Key (title)=(Apple) already exists."),
            Some(("title".to_string(), "Apple".to_string()))
        );
        assert_eq!(
            ConstraintParser::extract_column("null value in column \"name\""),
            Some("name".to_string())
        );
        assert_eq!(
            ConstraintParser::extract_relation("insert or update on table \"subitems\""),
            Some("subitems".to_string())
        );
        assert_eq!(ConstraintParser::extract_column("no column here"), None);
    }
}
