//! Stage-2 consensus.
//!
//! ```text
//!  N AgentVerdicts ──► bucket (score band / label) ──► dominant count
//!                                                         │
//!        agreement_level ◄── unanimous | strong (N-1) | split
//!        escalation_trigger ◄── split, or a negative vote amid disagreement
//!        recommendation ◄── agreement_level × dominant direction
//! ```
//!
//! Everything in here is a pure function of the verdict multiset.

mod agreement;
mod calculator;
mod result;

pub use agreement::{AgreementLevel, classify_agreement};
pub use calculator::{ConsensusCalculator, ConsensusError};
pub use result::{ConsensusResult, PanelFormat, Recommendation};
