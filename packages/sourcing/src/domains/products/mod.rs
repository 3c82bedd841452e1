//! Products domain - supplier catalog listings consumed by matching and recommendations

pub mod models;

pub use models::{PriceRange, Product, ProductStatus, RobotCategory};
