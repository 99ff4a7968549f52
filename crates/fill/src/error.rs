use folio_traits::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FillError {
    #[error("Required parameter '{0}' was not supplied and has no default")]
    MissingParameter(String),

    #[error("Row {row} has no value for field '{field}'")]
    MissingField { field: String, row: usize },

    #[error("Row {row} is not a record (expected an object, found {found})")]
    NotARecord { row: usize, found: &'static str },

    #[error("Variable '{variable}' cannot aggregate non-numeric value {value}")]
    NonNumeric { variable: String, value: String },

    #[error("Failed to evaluate expression {location}: {source}")]
    Expression {
        location: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("Data source error: {0}")]
    Data(#[from] DataError),

    #[error("Template '{template}' has no {language} query to run against a {source_kind} data source")]
    MissingQuery {
        template: String,
        language: &'static str,
        source_kind: &'static str,
    },

    #[error("An xpath query needs an XML document in the '{0}' parameter")]
    MissingDocument(String),
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
