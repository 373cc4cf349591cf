pub mod cache;
pub mod exchange;
pub mod price;
