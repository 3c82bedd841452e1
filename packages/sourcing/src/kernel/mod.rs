//! Kernel module - collaborator traits and the dependency container.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{PgStore, ServerDeps};
pub use test_dependencies::{
    MockCandidateSource, MockMatchStore, MockSignalSource, TestDependencies,
};
pub use traits::*;
