use serde_json::{Value, json};

/// The invoice template: a `title` parameter, one `amount` field, and a
/// running total in the summary.
pub fn invoice() -> Value {
    json!({
        "name": "invoice",
        "parameters": [{"name": "title", "required": true}],
        "fields": [{"name": "amount"}],
        "variables": [{"name": "total", "calculation": "sum", "field": "amount"}],
        "styles": [{"name": "heading", "font": "Helvetica", "size": 16, "bold": true}],
        "bands": {
            "title": {"height": 30, "elements": [
                {"type": "textField", "key": "title", "x": 0, "y": 0, "width": 300, "height": 20,
                 "style": "heading", "expression": "{{param.title}}"}
            ]},
            "columnHeader": {"height": 14, "elements": [
                {"type": "staticText", "x": 0, "y": 0, "width": 100, "height": 14, "text": "Amount"}
            ]},
            "detail": {"height": 14, "elements": [
                {"type": "textField", "key": "amount", "x": 0, "y": 0, "width": 100, "height": 14,
                 "align": "right", "expression": "{{field.amount}}"}
            ]},
            "summary": {"height": 14, "elements": [
                {"type": "textField", "key": "total", "x": 0, "y": 0, "width": 100, "height": 14,
                 "align": "right", "expression": "{{var.total}}"}
            ]}
        }
    })
}

/// Orders read from an XML document by an xpath query.
pub fn xml_orders() -> Value {
    json!({
        "name": "orders",
        "fields": [
            {"name": "id", "path": "@id"},
            {"name": "customer", "path": "customer/name"}
        ],
        "query": {"language": "xpath", "text": "/orders/order"},
        "bands": {
            "detail": {"height": 14, "elements": [
                {"type": "textField", "key": "order", "x": 0, "y": 0, "width": 300, "height": 14,
                 "expression": "{{field.id}}: {{field.customer}}"}
            ]}
        }
    })
}

pub const ORDERS_XML: &str = r#"<orders>
  <order id="A-1"><customer><name>Alice</name></customer></order>
  <order id="A-2"><customer><name>Bob</name></customer></order>
</orders>"#;

/// Amounts fetched with a SQL query over a live connection.
pub fn sql_amounts() -> Value {
    json!({
        "name": "sql-amounts",
        "fields": [{"name": "amount"}],
        "query": {"language": "sql", "text": "SELECT amount FROM orders"},
        "bands": {
            "detail": {"height": 14, "elements": [
                {"type": "textField", "key": "amount", "x": 0, "y": 0, "width": 100, "height": 14,
                 "expression": "{{field.amount}}"}
            ]}
        }
    })
}

/// A greeting driven only by parameters.
pub fn greeting() -> Value {
    json!({
        "name": "greeting",
        "parameters": [{"name": "name"}],
        "bands": {
            "title": {"height": 20, "elements": [
                {"type": "textField", "key": "greeting", "x": 0, "y": 0, "width": 300, "height": 20,
                 "expression": "Hello {{param.name}}"}
            ]}
        }
    })
}

/// Amounts set in a font the PDF exporter has no metrics for.
pub fn casual_amounts() -> Value {
    json!({
        "name": "casual-amounts",
        "fields": [{"name": "amount"}],
        "styles": [{"name": "casual", "font": "Comic Sans", "size": 11}],
        "bands": {
            "detail": {"height": 14, "elements": [
                {"type": "textField", "key": "amount", "x": 0, "y": 0, "width": 100, "height": 14,
                 "style": "casual", "expression": "{{field.amount}}"}
            ]}
        }
    })
}

pub fn amounts() -> Vec<Value> {
    vec![json!({"amount": 10}), json!({"amount": 20}), json!({"amount": 30})]
}
