pub mod error_messages;
pub mod jwt;
pub mod password_utils;
pub mod validation;
