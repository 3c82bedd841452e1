pub mod queries;
pub mod submit;

pub use queries::{get_matches, get_requirement};
pub use submit::{run_matching, submit_requirement, IntakeOutcome};
