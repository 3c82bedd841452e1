// Business domains
pub mod intake;
pub mod matching;
pub mod products;
pub mod recommendations;
