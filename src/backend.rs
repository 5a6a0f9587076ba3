//! HTTP layer of the API: router, authentication middleware, handlers
//! and request bodies.
pub mod handlers_auth;
pub mod handlers_unauth;
mod middlewares;
mod models;
pub mod router;

#[cfg(test)]
mod tests;
