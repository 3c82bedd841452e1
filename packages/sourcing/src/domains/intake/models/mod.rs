pub mod requirement;

pub use requirement::{IntakeStatus, NewRequirement, Requirement, RequirementCriteria};
