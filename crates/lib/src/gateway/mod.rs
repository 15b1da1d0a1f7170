//! Gateway: HTTP endpoints Facebook calls, plus the task that answers deliveries.
//!
//! The webhook handler only decodes and classifies; replies are produced by a
//! [`Responder`] on a separate processor task so the webhook answers quickly.

mod responder;
mod server;

pub use responder::{EchoResponder, Responder};
pub use server::{run_gateway, run_gateway_with, GatewayState, WEBHOOK_PATH};
