//! Application-level configuration.
//!
//! - [`PipelineParams`]: panels, batch sizing and retry budgets
//! - [`RetryPolicy`]: backoff for transient gateway failures

pub mod pipeline_params;
pub mod retry_policy;

pub use pipeline_params::PipelineParams;
pub use retry_policy::RetryPolicy;
