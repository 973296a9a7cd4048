pub mod errors;
pub mod repository;
pub mod unit;

pub use errors::SourceError;
pub use repository::Repository;
pub use unit::{SourceUnit, WriteMode};
