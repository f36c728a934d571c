//! Prompt domain
//!
//! Templates for the Stage-2 panel and the Stage-3 investigators.

mod template;

pub use template::PromptTemplate;
