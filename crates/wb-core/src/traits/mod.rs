//! Core trait definitions

mod collaborators;
mod reporter;

pub use collaborators::{MetadataSource, MetadataWriter, Supervisor, TokenIssuer};
pub use reporter::{ProxySource, Reporter, RunEvent, TracingReporter};
