pub mod error;
pub mod types;

pub use error::{FailureKind, LoadError, ParseError};
pub use types::*;
