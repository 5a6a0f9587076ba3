//! Authentication of protected routes from the token cookie.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use log::debug;

use crate::consts::TOKEN_COOKIE;
use crate::services::{Service, ServiceError};
use crate::utils::error_messages::TOKEN_MISSING;

/// Attaches the caller decoded from the cookie to the request, or
/// answers 401 without reaching the handler
pub async fn authenticate(
    State(service): State<Service>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|token| !token.is_empty())
        .ok_or(ServiceError::Unauthenticated(TOKEN_MISSING))?;

    let caller = service.authenticate(token)?;
    debug!("Request from user {} ({})", caller.id, caller.role);

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
