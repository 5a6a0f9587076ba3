//! HTTP contract of the API, driven through the full router against an
//! in-memory database and a temporary uploads directory.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::backend::router::get_router;
use crate::models::Role;
use crate::services::Service;
use crate::utils::error_messages::{TOKEN_INVALID, TOKEN_MISSING};

const PASSWORD: &str = "plumb-Quasar-71-thimble";
const BOUNDARY: &str = "telecare-test-boundary";

struct TestApp {
    router: Router,
    service: Service,
    _uploads: TempDir,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    bytes: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

/// A registered user: its token and user id
struct Account {
    token: String,
    id: i64,
}

async fn app() -> TestApp {
    let uploads = TempDir::new().expect("temporary uploads directory");
    let service = Service::for_tests(uploads.path()).await;
    let router = get_router(
        service.clone(),
        HeaderValue::from_static("http://localhost:5173"),
    );

    TestApp {
        router,
        service,
        _uploads: uploads,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        Reply {
            status,
            headers,
            bytes,
        }
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::COOKIE, format!("token={token}"));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        self.send(request).await
    }

    async fn register(&self, email: &str, name: &str, role: &str) -> Account {
        let reply = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": PASSWORD, "name": name, "role": role })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.json());

        let body = reply.json();
        Account {
            token: body["token"].as_str().unwrap().to_string(),
            id: body["user"]["id"].as_i64().unwrap(),
        }
    }

    async fn admin(&self) -> Account {
        self.service
            .bootstrap_admin("admin@telecare.test", PASSWORD)
            .await
            .unwrap();

        let reply = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "admin@telecare.test", "password": PASSWORD })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);

        let body = reply.json();
        Account {
            token: body["token"].as_str().unwrap().to_string(),
            id: body["user"]["id"].as_i64().unwrap(),
        }
    }

    async fn count_users(&self, email: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.service.pool())
            .await
            .unwrap()
    }

    async fn book(&self, patient: &Account, doctor: &Account) -> i64 {
        let reply = self
            .call(
                "POST",
                "/api/appointments",
                Some(&patient.token),
                Some(json!({ "doctorId": doctor.id, "dateTime": "2030-05-01T09:30:00Z" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.json());
        reply.json()["appointment"]["id"].as_i64().unwrap()
    }

    async fn set_status(&self, account: &Account, appointment: i64, status: &str) -> Reply {
        self.call(
            "PUT",
            &format!("/api/appointments/{appointment}/status"),
            Some(&account.token),
            Some(json!({ "status": status })),
        )
        .await
    }

    async fn upload(&self, account: &Account, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Reply {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/api/medical-records")
            .header(header::COOKIE, format!("token={}", account.token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }
}

#[tokio::test]
async fn test_index_reports_running() {
    let app = app().await;

    let reply = app.call("GET", "/", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "message": "API is running" }));
}

#[tokio::test]
async fn test_register_sets_cookie_matching_stored_user() {
    let app = app().await;

    let reply = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "email": "Alice@Example.com",
                "password": PASSWORD,
                "name": "Alice",
                "role": "PATIENT",
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let body = reply.json();
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "PATIENT");
    assert!(body["user"].get("password").is_none());

    let cookie = reply
        .headers
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let token = cookie
        .trim_start_matches("token=")
        .split(';')
        .next()
        .unwrap();
    assert_eq!(token, body["token"].as_str().unwrap());

    let caller = app.service.authenticate(token).unwrap();
    assert_eq!(caller.id.0, body["user"]["id"].as_i64().unwrap());
    assert_eq!(caller.role, Role::Patient);
}

#[tokio::test]
async fn test_register_duplicate_email_creates_no_row() {
    let app = app().await;
    app.register("bob@example.com", "Bob", "DOCTOR").await;

    let reply = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "email": "BOB@example.com",
                "password": PASSWORD,
                "name": "Another Bob",
                "role": "PATIENT",
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["message"], "Email already exists");
    assert_eq!(app.count_users("bob@example.com").await, 1);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = app().await;
    let register = |body: Value| app.call("POST", "/api/auth/register", None, Some(body));

    let reply = register(json!({ "email": "carol@example.com", "password": PASSWORD })).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["message"], "All fields are required");

    let reply = register(json!({
        "email": "carol@example.com",
        "password": PASSWORD,
        "name": "Carol",
        "role": "ADMIN",
    }))
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = register(json!({
        "email": "carol@example.com",
        "password": "password",
        "name": "Carol",
        "role": "PATIENT",
    }))
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = register(json!({
        "email": "not-an-email",
        "password": PASSWORD,
        "name": "Carol",
        "role": "PATIENT",
    }))
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.count_users("carol@example.com").await, 0);
}

#[tokio::test]
async fn test_login() {
    let app = app().await;
    let account = app.register("dave@example.com", "Dave", "DOCTOR").await;
    let login = |email: &str, password: &str| {
        app.call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
    };

    let reply = login("dave@example.com", "wrong-password").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["message"], "Invalid credentials");

    let reply = login("nobody@example.com", PASSWORD).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["message"], "Invalid credentials");

    let reply = login("Dave@Example.com", PASSWORD).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.headers.get(header::SET_COOKIE).is_some());

    let body = reply.json();
    assert_eq!(body["user"]["id"].as_i64(), Some(account.id));
    let caller = app
        .service
        .authenticate(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(caller.id.0, account.id);
    assert_eq!(caller.role, Role::Doctor);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app().await;

    let reply = app.call("GET", "/api/users/profile", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        reply.json(),
        json!({ "error": "unauthorized", "message": TOKEN_MISSING })
    );

    let reply = app
        .call("GET", "/api/notifications", Some("not.a.token"), None)
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["message"], TOKEN_INVALID);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = app().await;
    let account = app.register("erin@example.com", "Erin", "PATIENT").await;

    for token in [Some(account.token.as_str()), None] {
        let reply = app.call("POST", "/api/auth/logout", token, None).await;
        assert_eq!(reply.status, StatusCode::OK);

        let cookie = reply
            .headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_else(|| panic!("no clearing cookie when sending {token:?}"));
        assert!(cookie.starts_with("token=;"), "{cookie}");
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
    }
}

#[tokio::test]
async fn test_doctors_listing_hides_passwords() {
    let app = app().await;
    app.register("house@example.com", "Gregory House", "DOCTOR").await;
    app.register("patient@example.com", "Pat", "PATIENT").await;

    let reply = app.call("GET", "/api/users/doctors", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let text = String::from_utf8(reply.bytes.clone()).unwrap();
    assert!(!text.to_lowercase().contains("password"));
    assert!(!text.contains("$argon2"));

    let doctors = reply.json();
    let doctors = doctors.as_array().unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0]["name"], "Gregory House");
    assert_eq!(doctors[0]["doctorProfile"]["isAvailable"], true);
}

#[tokio::test]
async fn test_profile_read_and_update() {
    let app = app().await;
    let doctor = app.register("grey@example.com", "Meredith", "DOCTOR").await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;

    let reply = app
        .call("GET", "/api/users/profile", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["email"], "grey@example.com");
    assert!(body["doctorProfile"].is_object());
    assert!(body["patientProfile"].is_null());

    let reply = app
        .call(
            "PUT",
            "/api/users/profile",
            Some(&doctor.token),
            Some(json!({
                "name": "Meredith Grey",
                "specialization": "Surgery",
                "experience": "12",
                "consultationFee": 80.5,
                "isAvailable": false,
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let profile = &reply.json()["profile"];
    assert_eq!(profile["specialization"], "Surgery");
    assert_eq!(profile["experience"], 12);
    assert_eq!(profile["consultationFee"], 80.5);
    assert_eq!(profile["isAvailable"], false);

    let reply = app
        .call("GET", "/api/users/profile", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.json()["name"], "Meredith Grey");

    let reply = app
        .call(
            "PUT",
            "/api/users/profile",
            Some(&patient.token),
            Some(json!({ "age": "34", "gender": "F" })),
        )
        .await;
    assert_eq!(reply.json()["profile"]["age"], 34);

    // Unparsable numbers leave the stored value untouched
    let reply = app
        .call(
            "PUT",
            "/api/users/profile",
            Some(&patient.token),
            Some(json!({ "age": "thirty", "address": "1 Main Street" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let profile = &reply.json()["profile"];
    assert_eq!(profile["age"], 34);
    assert_eq!(profile["gender"], "F");
    assert_eq!(profile["address"], "1 Main Street");
}

#[tokio::test]
async fn test_book_and_list_appointments() {
    let app = app().await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;

    let appointment = app.book(&patient, &doctor).await;

    let reply = app
        .call("GET", "/api/appointments", Some(&patient.token), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let list = reply.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"].as_i64(), Some(appointment));
    assert_eq!(list[0]["status"], "PENDING");
    assert_eq!(list[0]["doctor"]["name"], "Doc");
    assert_eq!(list[0]["patient"]["userId"].as_i64(), Some(patient.id));

    let reply = app
        .call("GET", "/api/appointments", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.json().as_array().unwrap().len(), 1);

    let reply = app
        .call("GET", "/api/notifications", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_booking_errors() {
    let app = app().await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;

    let reply = app
        .call(
            "POST",
            "/api/appointments",
            Some(&doctor.token),
            Some(json!({ "doctorId": doctor.id, "dateTime": "2030-05-01T09:30:00Z" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .call(
            "POST",
            "/api/appointments",
            Some(&patient.token),
            Some(json!({ "doctorId": patient.id, "dateTime": "2030-05-01T09:30:00Z" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["message"], "Doctor not found");

    let reply = app
        .call(
            "POST",
            "/api/appointments",
            Some(&patient.token),
            Some(json!({ "doctorId": doctor.id })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .call(
            "POST",
            "/api/appointments",
            Some(&patient.token),
            Some(json!({ "doctorId": doctor.id, "dateTime": "next tuesday" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patient_can_only_cancel() {
    let app = app().await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;
    let appointment = app.book(&patient, &doctor).await;

    for status in ["CONFIRMED", "COMPLETED", "PENDING"] {
        let reply = app.set_status(&patient, appointment, status).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "patient setting {status}");
    }

    let reply = app.set_status(&patient, appointment, "CANCELLED").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["appointment"]["status"], "CANCELLED");

    // The doctor hears about the cancellation
    let reply = app
        .call("GET", "/api/notifications", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_doctor_updates_own_appointments_only() {
    let app = app().await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let other = app.register("other@example.com", "Other", "DOCTOR").await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;
    let appointment = app.book(&patient, &doctor).await;

    let reply = app.set_status(&other, appointment, "CONFIRMED").await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app.set_status(&doctor, appointment, "CONFIRMED").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["appointment"]["status"], "CONFIRMED");

    let reply = app.set_status(&doctor, appointment, "SOMEDAY").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app.set_status(&doctor, 9999, "CONFIRMED").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .call("GET", "/api/notifications", Some(&patient.token), None)
        .await;
    let notifications = reply.json();
    assert_eq!(notifications.as_array().unwrap().len(), 1);
    assert_eq!(notifications[0]["isRead"], false);
}

#[tokio::test]
async fn test_admin_sees_all_appointments() {
    let app = app().await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let first = app.register("first@example.com", "First", "PATIENT").await;
    let second = app.register("second@example.com", "Second", "PATIENT").await;
    app.book(&first, &doctor).await;
    app.book(&second, &doctor).await;
    let admin = app.admin().await;

    let reply = app
        .call("GET", "/api/appointments", Some(&admin.token), None)
        .await;
    assert_eq!(reply.json().as_array().unwrap().len(), 2);

    let reply = app
        .call("GET", "/api/appointments", Some(&first.token), None)
        .await;
    assert_eq!(reply.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_prescription_keeps_every_medicine() {
    let app = app().await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;

    let medicines = json!([
        { "medicineName": "Amoxicillin", "dosage": "500mg", "frequency": "3x/day", "durationDays": 7 },
        { "medicineName": "Ibuprofen", "dosage": "400mg", "frequency": "as needed" },
        { "medicineName": "Vitamin D", "dosage": "1000IU", "frequency": "daily", "durationDays": "30" },
    ]);
    let reply = app
        .call(
            "POST",
            "/api/prescriptions",
            Some(&doctor.token),
            Some(json!({
                "patientId": patient.id,
                "diagnosis": "Sinusitis",
                "medicines": medicines,
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.json());
    let prescription = &reply.json()["prescription"];
    assert_eq!(prescription["medicines"].as_array().unwrap().len(), 3);
    assert_eq!(prescription["doctorName"], "Doc");
    assert_eq!(prescription["medicines"][2]["durationDays"], 30);

    let reply = app
        .call("GET", "/api/prescriptions", Some(&patient.token), None)
        .await;
    let list = reply.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["patientName"], "Pat");
    assert_eq!(list[0]["medicines"].as_array().unwrap().len(), 3);

    let reply = app
        .call("GET", "/api/notifications", Some(&patient.token), None)
        .await;
    assert_eq!(reply.json()[0]["title"], "New prescription");
}

#[tokio::test]
async fn test_prescription_errors() {
    let app = app().await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;
    let medicines = json!([{ "medicineName": "Aspirin", "dosage": "100mg", "frequency": "daily" }]);

    let reply = app
        .call(
            "POST",
            "/api/prescriptions",
            Some(&patient.token),
            Some(json!({ "patientId": patient.id, "medicines": medicines })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .call(
            "POST",
            "/api/prescriptions",
            Some(&doctor.token),
            Some(json!({ "patientId": patient.id, "medicines": [] })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .call(
            "POST",
            "/api/prescriptions",
            Some(&doctor.token),
            Some(json!({ "patientId": doctor.id, "medicines": medicines })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .call("GET", "/api/prescriptions", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.json(), json!([]));
}

#[tokio::test]
async fn test_medicine_schedule_and_logs() {
    let app = app().await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;
    let other = app.register("other@example.com", "Other", "PATIENT").await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;

    let reply = app
        .call(
            "POST",
            "/api/medicine/schedule",
            Some(&patient.token),
            Some(json!({ "medicineName": "Metformin", "dosage": "500mg" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let schedule = reply.json()["schedule"].clone();
    assert_eq!(schedule["type"], "PILL");
    assert_eq!(schedule["isMorning"], true);
    assert_eq!(schedule["isAfternoon"], false);
    assert_eq!(schedule["isEvening"], true);
    assert_eq!(schedule["isNight"], false);
    assert_eq!(schedule["isAfterFood"], true);
    let schedule_id = schedule["id"].as_i64().unwrap();

    let reply = app
        .call(
            "POST",
            "/api/medicine/schedule",
            Some(&doctor.token),
            Some(json!({ "medicineName": "Metformin" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .call(
            "POST",
            "/api/medicine/log",
            Some(&patient.token),
            Some(json!({ "scheduleId": schedule_id, "status": "TAKEN" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert!(reply.json()["log"]["takenAt"].is_string());

    let reply = app
        .call(
            "POST",
            "/api/medicine/log",
            Some(&patient.token),
            Some(json!({
                "scheduleId": schedule_id.to_string(),
                "status": "MISSED",
                "scheduledFor": "2030-01-01T08:00:00Z",
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert!(reply.json()["log"]["takenAt"].is_null());

    let reply = app
        .call(
            "POST",
            "/api/medicine/log",
            Some(&other.token),
            Some(json!({ "scheduleId": schedule_id, "status": "TAKEN" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .call(
            "POST",
            "/api/medicine/log",
            Some(&patient.token),
            Some(json!({ "scheduleId": 4242, "status": "TAKEN" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .call(
            "POST",
            "/api/medicine/log",
            Some(&patient.token),
            Some(json!({ "scheduleId": schedule_id, "status": "FORGOTTEN" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .call(
            "GET",
            &format!("/api/medicine/log?scheduleId={schedule_id}"),
            Some(&patient.token),
            None,
        )
        .await;
    assert_eq!(reply.json().as_array().unwrap().len(), 2);

    let reply = app
        .call(
            "DELETE",
            &format!("/api/medicine/schedule/{schedule_id}"),
            Some(&other.token),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .call(
            "DELETE",
            &format!("/api/medicine/schedule/{schedule_id}"),
            Some(&patient.token),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["schedule"]["isActive"], false);

    let reply = app
        .call("GET", "/api/medicine/schedule", Some(&patient.token), None)
        .await;
    assert_eq!(reply.json(), json!([]));

    let reply = app
        .call("GET", "/api/medicine/schedule", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_medical_records_access() {
    let app = app().await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let admin = app.admin().await;

    let reply = app
        .call(
            "POST",
            "/api/medical-records",
            Some(&patient.token),
            Some(json!({ "title": "Old x-ray", "date": "2020-02-02" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = app
        .call(
            "POST",
            "/api/medical-records",
            Some(&doctor.token),
            Some(json!({ "title": "Check-up" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .call(
            "POST",
            "/api/medical-records",
            Some(&doctor.token),
            Some(json!({ "title": "Check-up", "patientId": patient.id, "description": "All good" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = app
        .call(
            "POST",
            "/api/medical-records",
            Some(&patient.token),
            Some(json!({ "description": "No title" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .call("GET", "/api/medical-records", Some(&patient.token), None)
        .await;
    let records = reply.json();
    assert_eq!(records.as_array().unwrap().len(), 2);
    assert_eq!(records[0]["title"], "Check-up");
    assert_eq!(records[1]["title"], "Old x-ray");

    let reply = app
        .call("GET", "/api/medical-records", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.json(), json!([]));

    let reply = app
        .call(
            "GET",
            &format!("/api/medical-records?patientId={}", patient.id),
            Some(&doctor.token),
            None,
        )
        .await;
    assert_eq!(reply.json().as_array().unwrap().len(), 2);

    let reply = app
        .call(
            "GET",
            &format!("/api/medical-records?patientId={}", patient.id),
            Some(&admin.token),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .call(
            "POST",
            "/api/medical-records",
            Some(&admin.token),
            Some(json!({ "title": "Sneaky", "patientId": patient.id })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_medical_record_file_upload() {
    let app = app().await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;
    let stranger = app.register("stranger@example.com", "Stranger", "PATIENT").await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let pdf: &[u8] = b"%PDF-1.4\n1 0 obj <<>> endobj\n%%EOF\n";

    let reply = app
        .upload(
            &patient,
            &[("title", "Blood test"), ("date", "2024-06-01")],
            Some(("results.pdf", pdf)),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.json());
    let url = reply.json()["record"]["fileUrl"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(url.starts_with("/api/medical-records/files/"));
    assert!(url.ends_with(".pdf"));

    let reply = app.call("GET", &url, Some(&patient.token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(reply.bytes, pdf);

    let reply = app.call("GET", &url, Some(&doctor.token), None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = app.call("GET", &url, Some(&stranger.token), None).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .call(
            "GET",
            "/api/medical-records/files/unknown.pdf",
            Some(&patient.token),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .upload(
            &patient,
            &[("title", "Not a pdf")],
            Some(("results.pdf", b"MZ\x90\x00 definitely not a pdf")),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_path_id_gets_json_error() {
    let app = app().await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;

    let reply = app
        .call("PUT", "/api/notifications/abc/read", Some(&patient.token), None)
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["message"].is_string(), "{:?}", reply.bytes);

    let reply = app
        .call("DELETE", "/api/medicine/schedule/first", Some(&patient.token), None)
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["message"].is_string());
}

#[tokio::test]
async fn test_mark_notification_read_is_idempotent() {
    let app = app().await;
    let doctor = app.register("doc@example.com", "Doc", "DOCTOR").await;
    let patient = app.register("pat@example.com", "Pat", "PATIENT").await;
    app.book(&patient, &doctor).await;

    let reply = app
        .call("GET", "/api/notifications", Some(&doctor.token), None)
        .await;
    let id = reply.json()[0]["id"].as_i64().unwrap();
    let uri = format!("/api/notifications/{id}/read");

    let first = app.call("PUT", &uri, Some(&doctor.token), None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.json()["notification"]["isRead"], true);

    let second = app.call("PUT", &uri, Some(&doctor.token), None).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.json()["notification"], first.json()["notification"]);

    let reply = app.call("PUT", &uri, Some(&patient.token), None).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .call("PUT", "/api/notifications/9999/read", Some(&doctor.token), None)
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}
