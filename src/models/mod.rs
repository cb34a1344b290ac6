pub mod metadata;
pub mod types;

pub use metadata::*;
pub use types::*;
