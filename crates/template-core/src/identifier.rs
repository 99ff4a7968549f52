use std::path::Path;

pub const COMPILED_EXTENSION: &str = "compiled";
pub const SOURCE_EXTENSION: &str = "source";

/// The two template forms a resolver accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateForm {
    /// A pre-compiled artifact, loaded as-is.
    Compiled,
    /// Template source, compiled on resolve.
    Source,
}

impl TemplateForm {
    pub fn extension(&self) -> &'static str {
        match self {
            TemplateForm::Compiled => COMPILED_EXTENSION,
            TemplateForm::Source => SOURCE_EXTENSION,
        }
    }
}

/// A template path whose form has been decided from its extension alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateIdentifier {
    path: String,
    form: TemplateForm,
}

impl TemplateIdentifier {
    /// Classifies `path` by its extension. Returns `None` for anything that is
    /// neither `.compiled` nor `.source` (matched case-sensitively).
    pub fn parse(path: &str) -> Option<Self> {
        let form = match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(COMPILED_EXTENSION) => TemplateForm::Compiled,
            Some(SOURCE_EXTENSION) => TemplateForm::Source,
            _ => return None,
        };
        Some(Self {
            path: path.to_string(),
            form,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn form(&self) -> TemplateForm {
        self.form
    }

    /// The sibling path of this template in another form,
    /// e.g. `reports/a.source` -> `reports/a.compiled`.
    pub fn with_form(&self, form: TemplateForm) -> TemplateIdentifier {
        let path = Path::new(&self.path).with_extension(form.extension());
        TemplateIdentifier {
            path: path.to_string_lossy().into_owned(),
            form,
        }
    }
}
