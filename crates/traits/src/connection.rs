//! Live data connections.
//!
//! A connection is handed to the engine unchanged; the engine issues the
//! template's own query against it and iterates the returned cursor.

use crate::cursor::{DataError, RowCursor, VecCursor};
use folio_types::Row;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// An open connection able to run a query and return a cursor over the result.
pub trait Connection: Send {
    /// Runs `query`, binding `$P{name}` placeholders from `params`.
    fn query<'c>(
        &'c mut self,
        query: &str,
        params: &Map<String, Value>,
    ) -> Result<Box<dyn RowCursor + 'c>, DataError>;
}

/// Replaces every `$P{name}` placeholder with a SQL literal for the named parameter.
///
/// Strings are single-quoted with embedded quotes doubled; `null` becomes `NULL`.
/// An unbound placeholder is an error.
pub fn bind_query_parameters(query: &str, params: &Map<String, Value>) -> Result<String, DataError> {
    let mut out = String::with_capacity(query.len());
    let mut rest = query;
    while let Some(start) = rest.find("$P{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        let end = after.find('}').ok_or_else(|| DataError::Query {
            query: query.to_string(),
            message: "unterminated $P{ placeholder".to_string(),
        })?;
        let name = after[..end].trim();
        let value = params.get(name).ok_or_else(|| DataError::Query {
            query: query.to_string(),
            message: format!("parameter '{}' is not bound", name),
        })?;
        out.push_str(&sql_literal(value));
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

/// A connection that answers queries from a fixed table of result sets.
///
/// Queries are matched after placeholder binding and whitespace trimming.
#[derive(Debug, Default)]
pub struct InMemoryConnection {
    results: HashMap<String, Vec<Row>>,
    executed: Vec<String>,
}

impl InMemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rows returned for `query`.
    pub fn with_result(mut self, query: impl Into<String>, rows: Vec<Row>) -> Self {
        self.results.insert(query.into().trim().to_string(), rows);
        self
    }

    /// Queries executed so far, after binding.
    pub fn executed_queries(&self) -> &[String] {
        &self.executed
    }
}

impl Connection for InMemoryConnection {
    fn query<'c>(
        &'c mut self,
        query: &str,
        params: &Map<String, Value>,
    ) -> Result<Box<dyn RowCursor + 'c>, DataError> {
        let bound = bind_query_parameters(query, params)?;
        let key = bound.trim().to_string();
        let rows = self.results.get(&key).cloned().ok_or_else(|| DataError::Query {
            query: key.clone(),
            message: "no such result set".to_string(),
        })?;
        self.executed.push(key);
        Ok(Box::new(VecCursor::new(rows)))
    }
}
