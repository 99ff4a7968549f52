//! The `.compiled` artifact format.
//!
//! An artifact is a small JSON envelope around the validated design. Loading
//! re-validates the design so a hand-edited artifact cannot bypass compilation.

use crate::compiled::CompiledTemplate;
use crate::compiler::compile_design;
use crate::design::ReportDesign;
use crate::error::LoadError;
use serde::{Deserialize, Serialize};

pub const ARTIFACT_TAG: &str = "folio-compiled-template";
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArtifactRef<'a> {
    artifact: &'a str,
    version: u32,
    design: &'a ReportDesign,
}

#[derive(Deserialize)]
struct ArtifactHeader {
    artifact: String,
    version: u32,
    design: serde_json::Value,
}

impl CompiledTemplate {
    /// Serializes this template as a `.compiled` artifact.
    pub fn to_artifact(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(&ArtifactRef {
            artifact: ARTIFACT_TAG,
            version: ARTIFACT_VERSION,
            design: self.design(),
        })
    }

    /// Reads a `.compiled` artifact.
    pub fn from_artifact(bytes: &[u8]) -> Result<Self, LoadError> {
        let header: ArtifactHeader = serde_json::from_slice(bytes)?;
        if header.artifact != ARTIFACT_TAG {
            return Err(LoadError::WrongArtifact(header.artifact));
        }
        if header.version != ARTIFACT_VERSION {
            return Err(LoadError::Version {
                found: header.version,
                expected: ARTIFACT_VERSION,
            });
        }
        let design: ReportDesign = serde_json::from_value(header.design)?;
        Ok(compile_design(design)?)
    }
}
