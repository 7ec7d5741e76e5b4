use serde_json::Value;
use sqlx::{self, postgres::PgArguments};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::validation::Record;

/// SQL text plus positional parameters, bound in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Builds the per-verb statements for one catalog table.
///
/// Reads wrap rows in `row_to_json` so every table comes back as a flat
/// JSON object regardless of its columns.
pub struct QueryBuilder {
    table: String,
}

impl QueryBuilder {
    pub fn new(table_name: &str) -> Result<Self, DatabaseError> {
        Ok(Self {
            table: DatabaseManager::quote_identifier(table_name)?,
        })
    }

    pub fn count(&self) -> String {
        format!("SELECT COUNT(*) AS count FROM {}", self.table)
    }

    /// `$1` = limit, `$2` = offset.
    pub fn select_page(&self) -> String {
        format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} ORDER BY id LIMIT $1 OFFSET $2) t",
            self.table
        )
    }

    /// `$1` = id.
    pub fn select_by_id(&self) -> String {
        format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} WHERE id = $1) t",
            self.table
        )
    }

    /// `$1` = value.
    pub fn select_where(&self, column: &str) -> Result<String, DatabaseError> {
        Ok(format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} WHERE {} = $1 ORDER BY id) t",
            self.table,
            DatabaseManager::quote_identifier(column)?
        ))
    }

    pub fn insert(&self, fields: &Record) -> Result<SqlResult, DatabaseError> {
        if fields.is_empty() {
            return Ok(SqlResult {
                query: format!("INSERT INTO {} DEFAULT VALUES RETURNING id", self.table),
                params: vec![],
            });
        }

        let mut columns = Vec::with_capacity(fields.len());
        let mut placeholders = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len());
        for (column, value) in fields {
            columns.push(DatabaseManager::quote_identifier(column)?);
            placeholders.push(placeholder(value, &mut params));
        }

        Ok(SqlResult {
            query: format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
                self.table,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params,
        })
    }

    /// Id is always the last parameter. An empty field set still touches the
    /// row so the affected-row count reports whether it exists.
    pub fn update(&self, id: i64, fields: &Record) -> Result<SqlResult, DatabaseError> {
        let mut assignments = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len() + 1);
        for (column, value) in fields {
            assignments.push(format!(
                "{} = {}",
                DatabaseManager::quote_identifier(column)?,
                placeholder(value, &mut params)
            ));
        }
        if assignments.is_empty() {
            assignments.push("id = id".to_string());
        }
        params.push(Value::from(id));

        Ok(SqlResult {
            query: format!(
                "UPDATE {} SET {} WHERE id = ${}",
                self.table,
                assignments.join(", "),
                params.len()
            ),
            params,
        })
    }

    /// `$1` = id.
    pub fn delete(&self) -> String {
        format!("DELETE FROM {} WHERE id = $1", self.table)
    }
}

/// `NULL` is written inline: a bound null carries a parameter type, and
/// Postgres refuses a text-typed null for a numeric column.
fn placeholder(value: &Value, params: &mut Vec<Value>) -> String {
    if value.is_null() {
        return "NULL".to_string();
    }
    params.push(value.clone());
    format!("${}", params.len())
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // JSONB
        Value::Array(_) | Value::Object(_) => q.bind(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn rejects_unsafe_table_names() {
        assert!(QueryBuilder::new("albums").is_ok());
        assert!(QueryBuilder::new("albums\"; --").is_err());
    }

    #[test]
    fn insert_binds_every_field() {
        let fields = record(json!({ "title": "Blue", "year": 1971 }));
        let sql = QueryBuilder::new("albums").unwrap().insert(&fields).unwrap();
        assert_eq!(
            sql.query,
            "INSERT INTO \"albums\" (\"title\", \"year\") VALUES ($1, $2) RETURNING id"
        );
        assert_eq!(sql.params, vec![json!("Blue"), json!(1971)]);
    }

    #[test]
    fn empty_insert_uses_defaults() {
        let sql = QueryBuilder::new("genres").unwrap().insert(&Record::new()).unwrap();
        assert_eq!(sql.query, "INSERT INTO \"genres\" DEFAULT VALUES RETURNING id");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn update_puts_id_last() {
        let fields = record(json!({ "genre": "Jazz" }));
        let sql = QueryBuilder::new("genres").unwrap().update(9, &fields).unwrap();
        assert_eq!(sql.query, "UPDATE \"genres\" SET \"genre\" = $1 WHERE id = $2");
        assert_eq!(sql.params, vec![json!("Jazz"), json!(9)]);
    }

    #[test]
    fn nulls_are_inlined_not_bound() {
        let fields = record(json!({ "genre": null, "name": "" }));
        let qb = QueryBuilder::new("artists").unwrap();

        let sql = qb.insert(&fields).unwrap();
        assert_eq!(
            sql.query,
            "INSERT INTO \"artists\" (\"genre\", \"name\") VALUES (NULL, $1) RETURNING id"
        );
        assert_eq!(sql.params, vec![json!("")]);

        let sql = qb.update(4, &fields).unwrap();
        assert_eq!(
            sql.query,
            "UPDATE \"artists\" SET \"genre\" = NULL, \"name\" = $1 WHERE id = $2"
        );
        assert_eq!(sql.params, vec![json!(""), json!(4)]);
    }

    #[test]
    fn empty_update_still_matches_row() {
        let sql = QueryBuilder::new("genres").unwrap().update(3, &Record::new()).unwrap();
        assert_eq!(sql.query, "UPDATE \"genres\" SET id = id WHERE id = $1");
        assert_eq!(sql.params, vec![json!(3)]);
    }

    #[test]
    fn unsafe_column_names_are_refused() {
        let fields = record(json!({ "title = 1; --": "x" }));
        assert!(QueryBuilder::new("albums").unwrap().insert(&fields).is_err());
        assert!(QueryBuilder::new("albums").unwrap().select_where("a b").is_err());
    }

    #[test]
    fn reads_wrap_rows_as_json() {
        let qb = QueryBuilder::new("songs").unwrap();
        assert_eq!(qb.count(), "SELECT COUNT(*) AS count FROM \"songs\"");
        assert!(qb.select_page().starts_with("SELECT row_to_json(t) AS row FROM"));
        assert!(qb.select_page().contains("ORDER BY id LIMIT $1 OFFSET $2"));
        assert_eq!(qb.delete(), "DELETE FROM \"songs\" WHERE id = $1");
    }
}
