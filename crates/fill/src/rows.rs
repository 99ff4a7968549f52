//! Resolves the engine data source into the stream of rows a fill iterates.

use crate::error::{FillError, json_kind};
use folio_source::{EngineDataSource, RowSource};
use folio_template_core::{CompiledTemplate, FieldDesign, QueryLanguage};
use folio_traits::RowCursor;
use folio_types::{ParameterMap, Row, XML_DATA_DOCUMENT, XmlElement};
use serde_json::{Map, Value};
use std::collections::VecDeque;

pub(crate) enum RowStream<'a> {
    Source(RowSource<'a>),
    Query(Box<dyn RowCursor + 'a>),
    Xml(VecDeque<Row>),
    Empty,
}

impl<'a> RowStream<'a> {
    /// Chooses where rows come from. A connection runs the template's sql
    /// query; an empty source falls back to an XML document parameter when the
    /// template has an xpath query.
    pub(crate) fn open(
        template: &CompiledTemplate,
        source: EngineDataSource<'a>,
        params: &ParameterMap,
    ) -> Result<Self, FillError> {
        let query = template.query();
        match source {
            EngineDataSource::Rows(rows) => Ok(RowStream::Source(rows)),
            EngineDataSource::Connection(connection) => {
                let query = query
                    .filter(|q| q.language == QueryLanguage::Sql)
                    .ok_or_else(|| FillError::MissingQuery {
                        template: template.name().to_string(),
                        language: QueryLanguage::Sql.as_str(),
                        source_kind: "connection",
                    })?;
                log::debug!("Running template query against connection: {}", query.text);
                let cursor = connection.query(&query.text, &params.scalars())?;
                Ok(RowStream::Query(cursor))
            }
            EngineDataSource::Empty => match query {
                Some(q) if q.language == QueryLanguage::Xpath => {
                    let document = params
                        .document(XML_DATA_DOCUMENT)
                        .ok_or_else(|| FillError::MissingDocument(XML_DATA_DOCUMENT.to_string()))?;
                    let rows: VecDeque<Row> = document
                        .select(&q.text)
                        .into_iter()
                        .map(|node| xml_row(node, template.fields()))
                        .collect();
                    log::debug!("XPath '{}' selected {} rows", q.text, rows.len());
                    Ok(RowStream::Xml(rows))
                }
                _ if params.document(XML_DATA_DOCUMENT).is_some() => {
                    Err(FillError::MissingQuery {
                        template: template.name().to_string(),
                        language: QueryLanguage::Xpath.as_str(),
                        source_kind: "XML document",
                    })
                }
                _ => Ok(RowStream::Empty),
            },
        }
    }

    pub(crate) fn next_row(&mut self) -> Result<Option<Row>, FillError> {
        match self {
            RowStream::Source(rows) => Ok(rows.next_row()?),
            RowStream::Query(cursor) => Ok(cursor.next_row()?),
            RowStream::Xml(rows) => Ok(rows.pop_front()),
            RowStream::Empty => Ok(None),
        }
    }
}

/// A missing XML node reads as null rather than an error.
fn xml_row(node: &XmlElement, fields: &[FieldDesign]) -> Row {
    let record: Map<String, Value> = fields
        .iter()
        .map(|field| {
            let value = node
                .value_at(field.xml_path())
                .map_or(Value::Null, Value::String);
            (field.name.clone(), value)
        })
        .collect();
    Value::Object(record)
}

/// Extracts the declared fields from a row. `row` is the 1-based row number.
pub(crate) fn bind_fields(
    fields: &[FieldDesign],
    record: Row,
    row: usize,
) -> Result<Map<String, Value>, FillError> {
    let Value::Object(mut record) = record else {
        return Err(FillError::NotARecord {
            row,
            found: json_kind(&record),
        });
    };
    fields
        .iter()
        .map(|field| {
            record
                .remove(&field.name)
                .map(|value| (field.name.clone(), value))
                .ok_or_else(|| FillError::MissingField {
                    field: field.name.clone(),
                    row,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(names: &[&str]) -> Vec<FieldDesign> {
        names
            .iter()
            .map(|n| FieldDesign {
                name: n.to_string(),
                path: None,
            })
            .collect()
    }

    #[test]
    fn test_bind_fields_keeps_declared_only() {
        let bound = bind_fields(&fields(&["amount"]), json!({"amount": 10, "extra": true}), 1).unwrap();
        assert_eq!(Value::Object(bound), json!({"amount": 10}));
    }

    #[test]
    fn test_bind_fields_missing_field() {
        let err = bind_fields(&fields(&["amount"]), json!({"total": 10}), 3).unwrap_err();
        assert!(matches!(err, FillError::MissingField { ref field, row: 3 } if field == "amount"));
    }

    #[test]
    fn test_bind_fields_rejects_scalars() {
        let err = bind_fields(&fields(&[]), json!(42), 1).unwrap_err();
        assert!(matches!(err, FillError::NotARecord { found: "a number", .. }));
    }

    #[test]
    fn test_xml_row_reads_paths() {
        let node = XmlElement::new("line")
            .with_attribute("id", "7")
            .with_child(XmlElement::new("amount").with_text("10"));
        let mut fs = fields(&["amount", "missing"]);
        fs.push(FieldDesign {
            name: "id".to_string(),
            path: Some("@id".to_string()),
        });
        assert_eq!(
            xml_row(&node, &fs),
            json!({"amount": "10", "missing": null, "id": "7"})
        );
    }
}
