//! Citations and the document checks that own them.

mod check;
mod entities;

pub use check::{CheckStatus, DocumentCheck};
pub use entities::{Citation, CitationComponents, CitationKind, FormatCheck, normalize_text};
