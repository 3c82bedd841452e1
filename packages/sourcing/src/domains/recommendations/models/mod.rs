pub mod interaction;
pub mod recommendation;
pub mod snapshot;

pub use interaction::{find_organization_industries, Interaction, InteractionKind};
pub use recommendation::{clamp_limit, Recommendation, RecommendationQuery, MAX_LIMIT, MIN_LIMIT};
pub use snapshot::SignalSnapshot;
