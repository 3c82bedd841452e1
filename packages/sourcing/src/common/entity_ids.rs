//! Typed ID definitions for the sourcing entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for buyer requirements (intake submissions).
pub struct Requirement;

/// Marker type for supplier catalog products.
pub struct Product;

/// Marker type for supplier organizations.
pub struct Supplier;

/// Marker type for buyer organizations.
pub struct Organization;

/// Marker type for marketplace users.
pub struct User;

/// Marker type for persisted requirement/product matches.
pub struct ProductMatch;

// ============================================================================
// Type aliases
// ============================================================================

pub type RequirementId = Id<Requirement>;
pub type ProductId = Id<Product>;
pub type SupplierId = Id<Supplier>;
pub type OrganizationId = Id<Organization>;
pub type UserId = Id<User>;
pub type MatchId = Id<ProductMatch>;
