use folio_traits::ResourceError;
use thiserror::Error;

/// Errors raised while resolving a template identifier into a compiled template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Unsupported template format '{0}': expected a .compiled or .source file")]
    UnsupportedFormat(String),

    #[error("Failed to load template '{identifier}': {source}")]
    Load {
        identifier: String,
        #[source]
        source: LoadError,
    },

    #[error("Failed to compile template '{identifier}': {source}")]
    Compile {
        identifier: String,
        #[source]
        source: CompileError,
    },
}

impl TemplateError {
    pub(crate) fn load(identifier: &str, source: impl Into<LoadError>) -> Self {
        TemplateError::Load {
            identifier: identifier.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn compile(identifier: &str, source: CompileError) -> Self {
        TemplateError::Compile {
            identifier: identifier.to_string(),
            source,
        }
    }
}

/// Why a template could not be compiled from its source form.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Template source is not valid UTF-8")]
    Encoding,

    #[error("Malformed template source: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Invalid template: {0}")]
    Invalid(String),

    #[error("Invalid expression in {location}: {source}")]
    Expression {
        location: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}

/// Why a template artifact could not be read.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("Corrupt compiled artifact: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Not a compiled template artifact (found tag '{0}')")]
    WrongArtifact(String),

    #[error("Incompatible artifact version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },

    #[error("Compiled artifact failed validation: {0}")]
    Invalid(#[from] CompileError),
}
