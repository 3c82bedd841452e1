// Robot Marketplace Sourcing - Core
//
// This crate matches buyer requirements against supplier robot listings and
// produces personalized product recommendations.
// Architecture follows domain-driven design: pure engines in domains/*,
// collaborators injected through kernel::ServerDeps.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
