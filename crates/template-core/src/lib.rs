//! Template resolution for folio.
//!
//! A template is either a `.source` file (a JSON design, see [`ReportDesign`])
//! or a `.compiled` artifact produced from one. [`TemplateResolver`] picks the
//! path from the extension and returns a shareable [`CompiledTemplate`].

pub mod artifact;
pub mod compiled;
pub mod compiler;
pub mod design;
pub mod error;
pub mod identifier;
pub mod resolver;

pub use artifact::{ARTIFACT_TAG, ARTIFACT_VERSION};
pub use compiled::{CompiledTemplate, expression_id};
pub use compiler::{compile, compile_design};
pub use design::{
    ALL_BANDS, BandDesign, Bands, Calculation, ElementDesign, ElementType, FieldDesign, PageSetup,
    ParameterDesign, QueryDesign, QueryLanguage, ReportDesign, ResetScope, StyleDesign,
    VariableDesign, WhenNoData,
};
pub use error::{CompileError, LoadError, TemplateError};
pub use identifier::{COMPILED_EXTENSION, SOURCE_EXTENSION, TemplateForm, TemplateIdentifier};
pub use resolver::{CachingResolver, ResolveTemplate, TemplateResolver};
