//! wb-bootstrap: one-shot proxy registration for Workbench VMs
//!
//! Registers the VM on its regional inverting proxy, replaces the local
//! forwarding agent container with one carrying the fresh backend id and
//! publishes the routing hostname on the instance metadata so the console
//! can reach the VM without any inbound connectivity.

pub mod adapters;
pub mod identity;
pub mod lifecycle;
pub mod locator;
pub mod orchestrator;
pub mod publisher;
pub mod registration;

#[cfg(test)]
mod testing;

pub use identity::IdentityResolver;
pub use lifecycle::AgentManager;
pub use locator::ProxyLocator;
pub use orchestrator::{Bootstrap, Collaborators, RunOutcome};
pub use publisher::MetadataPublisher;
pub use registration::{Registrar, RequestShape};
