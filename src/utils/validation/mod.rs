//! Validated input types. Handlers turn raw request fields into these
//! before anything reaches the services.

mod constants;
mod types;

pub use constants::*;
pub use types::{EmailInput, FileInput, FileKind, PasswordInput, TextInput};
