//! Limits shared by the validation types

/// Maximum length for free text (notes, descriptions, bios)
pub const MAX_CONTENT_LENGTH: usize = 2_000;
/// Maximum length for short text (names, titles, dosages)
pub const MAX_SHORT_CONTENT_LENGTH: usize = 250;
/// Maximum length of an email address (RFC 5321)
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 64;
/// Largest medical record attachment accepted (5 MiB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
