//! Quoting helpers for the SQL the engine generates itself.
//!
//! Migration scripts are executed verbatim. Only tracking-table statements
//! are assembled from configured names and versions, and those pass
//! through here.

/// Quote a single SQL identifier, doubling embedded double quotes.
///
/// # Examples
/// ```
/// use st_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("schema_version"), r#""schema_version""#);
/// assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a table name that may be schema-qualified, part by part.
///
/// # Examples
/// ```
/// use st_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("schema_version"), r#""schema_version""#);
/// assert_eq!(quote_qualified("meta.schema_version"), r#""meta"."schema_version""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Parts of a possibly qualified table name: `[catalog.][schema.]table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    pub catalog: Option<&'a str>,
    pub schema: Option<&'a str>,
    pub table: &'a str,
}

/// Split a table name into catalog, schema and table.
///
/// Unqualified names report `None` for the schema so callers can fall back
/// to the connection's current schema. Returns `None` for more than three
/// parts or an empty part.
///
/// # Examples
/// ```
/// use st_core::sql_utils::split_qualified_name;
/// let name = split_qualified_name("schema_version").unwrap();
/// assert_eq!((name.catalog, name.schema, name.table), (None, None, "schema_version"));
/// let name = split_qualified_name("meta.schema_version").unwrap();
/// assert_eq!((name.catalog, name.schema, name.table), (None, Some("meta"), "schema_version"));
/// assert!(split_qualified_name("a.b.c.d").is_none());
/// ```
pub fn split_qualified_name(name: &str) -> Option<QualifiedName<'_>> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    match parts[..] {
        [table] => Some(QualifiedName {
            catalog: None,
            schema: None,
            table,
        }),
        [schema, table] => Some(QualifiedName {
            catalog: None,
            schema: Some(schema),
            table,
        }),
        [catalog, schema, table] => Some(QualifiedName {
            catalog: Some(catalog),
            schema: Some(schema),
            table,
        }),
        _ => None,
    }
}

/// Render a value as a single-quoted SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
        assert_eq!(quote_ident(""), r#""""#);
    }

    #[test]
    fn test_quote_qualified_three_parts() {
        assert_eq!(
            quote_qualified("catalog.meta.schema_version"),
            r#""catalog"."meta"."schema_version""#
        );
    }

    #[test]
    fn test_split_qualified_name_three_parts() {
        assert_eq!(
            split_qualified_name("catalog.meta.schema_version"),
            Some(QualifiedName {
                catalog: Some("catalog"),
                schema: Some("meta"),
                table: "schema_version",
            })
        );
    }

    #[test]
    fn test_split_qualified_name_rejects_malformed() {
        assert!(split_qualified_name("a.b.c.d").is_none());
        assert!(split_qualified_name("meta.").is_none());
        assert!(split_qualified_name("").is_none());
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("20240101"), "'20240101'");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }
}
