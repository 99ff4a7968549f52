use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid data source: {0}")]
    InvalidDataSource(String),

    #[error("Failed to convert entity to a row: {0}")]
    Entity(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] roxmltree::Error),
}
