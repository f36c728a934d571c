//! Document check: the unit a validation job runs against.

use super::entities::Citation;
use crate::core::ids::{CheckId, CitationId};
use crate::core::time::now_millis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Citations extracted, pipeline not finished
    Processing,
    /// Every citation resolved
    Completed,
    /// The validation job gave up
    Failed,
}

/// One check of one document: its citations and their results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCheck {
    pub id: CheckId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    pub status: CheckStatus,
    pub citations: Vec<Citation>,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
}

impl DocumentCheck {
    pub fn new(id: CheckId, citations: Vec<Citation>) -> Self {
        Self {
            id,
            document_name: None,
            status: CheckStatus::Processing,
            citations,
            created_at: now_millis(),
            completed_at: None,
        }
    }

    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = Some(name.into());
        self
    }

    pub fn citation(&self, id: &CitationId) -> Option<&Citation> {
        self.citations.iter().find(|c| &c.id == id)
    }

    pub fn citation_mut(&mut self, id: &CitationId) -> Option<&mut Citation> {
        self.citations.iter_mut().find(|c| &c.id == id)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &Citation> {
        self.citations.iter().filter(|c| !c.is_resolved())
    }

    pub fn finish(&mut self, status: CheckStatus) {
        self.status = status;
        self.completed_at = Some(now_millis());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_unresolved() {
        let mut check = DocumentCheck::new(
            CheckId::new("chk"),
            vec![Citation::new("a", "A"), Citation::new("b", "B")],
        );
        assert_eq!(check.unresolved().count(), 2);
        assert!(check.citation(&CitationId::new("b")).is_some());
        assert!(check.citation_mut(&CitationId::new("zz")).is_none());

        check.finish(CheckStatus::Completed);
        assert_eq!(check.status, CheckStatus::Completed);
        assert!(check.completed_at.is_some());
    }
}
