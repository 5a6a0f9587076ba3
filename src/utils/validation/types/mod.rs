mod email_input;
mod file_input;
mod password_input;
mod text_input;

pub use email_input::EmailInput;
pub use file_input::{FileInput, FileKind};
pub use password_input::PasswordInput;
pub use text_input::TextInput;
