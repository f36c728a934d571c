//! Individual agent judgments.
//!
//! An [`AgentVerdict`] is one agent's opinion of one citation at one tier.
//! Panels have historically answered in two shapes (a 1-10 score, or a
//! VALID/INVALID/UNCERTAIN label); both are carried by [`Judgment`] and
//! normalized through [`Judgment::direction`].

mod judgment;
mod reason;

pub use judgment::{AgentVerdict, Direction, Judgment, ScoreBand, Verdict};
pub use reason::ReasonCode;
