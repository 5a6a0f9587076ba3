//! Route table. Public routes are merged with the protected ones, which
//! all sit behind the cookie authentication middleware.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::backend::handlers_auth::{
    add_record, appointments, book_appointment, create_prescription, create_schedule,
    deactivate_schedule, dose_logs, log_dose, mark_notification_read, notifications,
    prescriptions, profile, record_file, records, schedules, update_appointment_status,
    update_profile,
};
use crate::backend::handlers_unauth::{doctors, index, login, logout, register};
use crate::backend::middlewares::authenticate;
use crate::consts::FILES_ROUTE;
use crate::services::Service;
use crate::utils::validation::MAX_FILE_SIZE;

/// Room for the text fields and multipart framing around the file
const RECORD_BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

/// Main router, with the credentialed CORS policy of the web client
pub fn get_router(service: Service, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(unauth_routes())
        .merge(auth_routes(service.clone()))
        .layer(cors)
        .with_state(service)
}

/// Routes accessible without a token
fn unauth_routes() -> Router<Service> {
    Router::new()
        .route("/", get(index))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/users/doctors", get(doctors))
}

/// Routes requiring a valid token cookie
fn auth_routes(service: Service) -> Router<Service> {
    Router::new()
        .route("/api/users/profile", get(profile).put(update_profile))
        .route("/api/appointments", post(book_appointment).get(appointments))
        .route("/api/appointments/:id/status", put(update_appointment_status))
        .route(
            "/api/prescriptions",
            post(create_prescription).get(prescriptions),
        )
        .route("/api/medicine/schedule", post(create_schedule).get(schedules))
        .route("/api/medicine/schedule/:id", delete(deactivate_schedule))
        .route("/api/medicine/log", post(log_dose).get(dose_logs))
        .route(
            "/api/medical-records",
            post(add_record)
                .get(records)
                .layer(DefaultBodyLimit::max(RECORD_BODY_LIMIT)),
        )
        .route(&format!("{FILES_ROUTE}/:key"), get(record_file))
        .route("/api/notifications", get(notifications))
        .route("/api/notifications/:id/read", put(mark_notification_read))
        .route_layer(middleware::from_fn_with_state(service, authenticate))
}
