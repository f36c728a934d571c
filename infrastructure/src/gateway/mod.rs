//! HTTP adapter for the [`AgentGateway`](citeguard_application::AgentGateway) port.

mod http;
mod protocol;

pub use http::{GatewaySettings, HttpAgentGateway};
