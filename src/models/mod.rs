pub mod document;
pub mod enums;
pub mod scope;

pub use document::*;
pub use enums::*;
pub use scope::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid user scope {value:?}: {reason}")]
    InvalidScope { value: String, reason: &'static str },
}
