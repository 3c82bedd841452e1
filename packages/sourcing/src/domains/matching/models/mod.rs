pub mod match_result;
pub mod product_match;

pub use match_result::{
    Assessment, AttributeScore, CommercialTerms, DeliveryTerms, MatchAttribute, MatchResult,
    ServiceTerms,
};
pub use product_match::ProductMatch;
