//! Citation input files
//!
//! Citations arrive already extracted, Tier-1 results included. Two shapes
//! are accepted: a bare JSON array of citations, or a document object with
//! `citations` plus optional `checkId`/`documentName`.

use citeguard_domain::{CheckId, Citation, DocumentCheck};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a citation file: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CitationFile {
    Document {
        #[serde(default, alias = "checkId")]
        check_id: Option<String>,
        #[serde(default, alias = "documentName")]
        document_name: Option<String>,
        citations: Vec<Citation>,
    },
    Bare(Vec<Citation>),
}

/// Parsed contents of a citation file
#[derive(Debug, Clone)]
pub struct CitationInput {
    pub check_id: Option<CheckId>,
    pub document_name: Option<String>,
    pub citations: Vec<Citation>,
}

impl CitationInput {
    pub fn read(path: &Path) -> Result<Self, InputError> {
        let content = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CitationFile =
            serde_json::from_str(&content).map_err(|source| InputError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(match file {
            CitationFile::Document {
                check_id,
                document_name,
                citations,
            } => Self {
                check_id: check_id.map(CheckId::new),
                document_name,
                citations,
            },
            CitationFile::Bare(citations) => Self {
                check_id: None,
                document_name: None,
                citations,
            },
        })
    }

    /// Build the check, preferring `override_id`, then the file's own id,
    /// then `fallback_id`.
    pub fn into_check(self, override_id: Option<CheckId>, fallback_id: CheckId) -> DocumentCheck {
        let id = override_id.or(self.check_id).unwrap_or(fallback_id);
        let mut check = DocumentCheck::new(id, self.citations);
        if let Some(name) = self.document_name {
            check = check.with_document_name(name);
        }
        check
    }
}
