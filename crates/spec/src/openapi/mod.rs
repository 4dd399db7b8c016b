//! OpenAPI 3.x document loading and validation

mod loader;
mod types;
mod validator;

pub use loader::{load_spec, parse_spec};
pub use types::*;
pub use validator::validate;
