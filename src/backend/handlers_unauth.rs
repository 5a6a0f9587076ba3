//! Routes reachable without a token: health, registration, login, logout
//! and the public doctors directory.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};

use crate::backend::models::{JsonBody, LoginRequest, RegisterRequest};
use crate::consts::TOKEN_COOKIE;
use crate::models::{DoctorListing, Role};
use crate::services::{Service, ServiceError};
use crate::utils::error_messages::ALL_FIELDS_REQUIRED;
use crate::utils::validation::{EmailInput, PasswordInput, TextInput};

/// httpOnly cookie carrying the token, living as long as the token
fn token_cookie(service: &Service, token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .secure(service.secure_cookies())
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(service.token_ttl().num_seconds()))
        .build()
}

pub async fn index() -> Json<Value> {
    Json(json!({ "message": "API is running" }))
}

pub async fn register(
    State(service): State<Service>,
    jar: CookieJar,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<Value>), ServiceError> {
    let present = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
    let (Some(raw_email), Some(password), Some(raw_name), Some(raw_role)) = (
        present(body.email),
        present(body.password),
        present(body.name),
        present(body.role),
    ) else {
        return Err(ServiceError::invalid(ALL_FIELDS_REQUIRED));
    };

    let email = EmailInput::new(&raw_email).map_err(ServiceError::invalid)?;
    let name = TextInput::new_short_form(&raw_name).map_err(ServiceError::invalid)?;
    let role = match raw_role.trim().parse::<Role>() {
        Ok(role @ (Role::Patient | Role::Doctor)) => role,
        _ => return Err(ServiceError::invalid("Role must be PATIENT or DOCTOR")),
    };
    let password = PasswordInput::new(
        &password,
        &[email.as_str(), email.local_part(), name.as_str()],
    )
    .map_err(ServiceError::invalid)?;

    let (user, token) = service.register(email, password, name, role).await?;
    let jar = jar.add(token_cookie(&service, token.clone()));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": user,
        })),
    ))
}

pub async fn login(
    State(service): State<Service>,
    jar: CookieJar,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ServiceError> {
    let (Some(raw_email), Some(password)) = (body.email, body.password) else {
        return Err(ServiceError::invalid("Email and password are required"));
    };

    // A malformed address cannot belong to an account
    let email = EmailInput::new(&raw_email).map_err(|_| ServiceError::InvalidCredentials)?;

    let (user, token) = service.login(email.as_str(), &password).await?;
    let jar = jar.add(token_cookie(&service, token.clone()));

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "token": token,
            "user": user,
        })),
    ))
}

/// Always overwrites the cookie, whether or not the request carried one
pub async fn logout(
    State(service): State<Service>,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let mut cleared = token_cookie(&service, String::new());
    cleared.set_max_age(time::Duration::ZERO);

    (
        jar.add(cleared),
        Json(json!({ "message": "Logged out successfully" })),
    )
}

pub async fn doctors(
    State(service): State<Service>,
) -> Result<Json<Vec<DoctorListing>>, ServiceError> {
    Ok(Json(service.doctors().await?))
}
