pub mod product;

pub use product::{PriceRange, Product, ProductRow, ProductStatus, RobotCategory};
