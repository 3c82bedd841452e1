//! Intake domain - buyer requirement submission, normalization and the matching run

pub mod activities;
pub mod data;
pub mod models;
pub mod normalize;

pub use data::RequirementInput;
pub use models::{IntakeStatus, NewRequirement, Requirement, RequirementCriteria};
pub use normalize::normalize_requirement;
