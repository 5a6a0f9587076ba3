//! Routes behind the authentication middleware. Each handler turns its
//! request into validated inputs and hands them to the service together
//! with the caller.

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::backend::models::{
    BookAppointmentRequest, DoseLogQuery, DoseLogRequest, JsonBody, PathParam,
    PrescriptionRequest, RecordRequest, RecordsQuery, ScheduleRequest, UpdateProfileRequest,
    UpdateStatusRequest,
};
use crate::models::{
    AppointmentDetails, AppointmentID, AppointmentStatus, Caller, MedicalRecord, MedicineLog,
    MedicineSchedule, Notification, NotificationID, PrescriptionDetails, ScheduleID, UserID,
    UserWithProfile,
};
use crate::services::{Service, ServiceError};
use crate::utils::validation::FileInput;

type Created = (StatusCode, Json<Value>);

pub async fn profile(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<UserWithProfile>, ServiceError> {
    Ok(Json(service.profile(&caller).await?))
}

pub async fn update_profile(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> Result<Json<Value>, ServiceError> {
    let profile = service.update_profile(&caller, body.try_into()?).await?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "profile": profile,
    })))
}

pub async fn book_appointment(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<BookAppointmentRequest>,
) -> Result<Created, ServiceError> {
    let appointment = service.book_appointment(&caller, body.try_into()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Appointment booked successfully",
            "appointment": appointment,
        })),
    ))
}

pub async fn appointments(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<AppointmentDetails>>, ServiceError> {
    Ok(Json(service.appointments(&caller).await?))
}

pub async fn update_appointment_status(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<UpdateStatusRequest>,
) -> Result<Json<Value>, ServiceError> {
    let status = AppointmentStatus::try_from(body)?;
    let appointment = service
        .update_appointment_status(&caller, AppointmentID(id), status)
        .await?;

    Ok(Json(json!({
        "message": "Appointment status updated",
        "appointment": appointment,
    })))
}

pub async fn create_prescription(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<PrescriptionRequest>,
) -> Result<Created, ServiceError> {
    let prescription = service
        .create_prescription(&caller, body.try_into()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Prescription created successfully",
            "prescription": prescription,
        })),
    ))
}

pub async fn prescriptions(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<PrescriptionDetails>>, ServiceError> {
    Ok(Json(service.prescriptions(&caller).await?))
}

pub async fn create_schedule(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<ScheduleRequest>,
) -> Result<Created, ServiceError> {
    let schedule = service.create_schedule(&caller, body.try_into()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Medicine schedule created",
            "schedule": schedule,
        })),
    ))
}

pub async fn schedules(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<MedicineSchedule>>, ServiceError> {
    Ok(Json(service.schedules(&caller).await?))
}

pub async fn deactivate_schedule(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, ServiceError> {
    let schedule = service
        .deactivate_schedule(&caller, ScheduleID(id))
        .await?;

    Ok(Json(json!({
        "message": "Medicine schedule deactivated",
        "schedule": schedule,
    })))
}

pub async fn log_dose(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    JsonBody(body): JsonBody<DoseLogRequest>,
) -> Result<Created, ServiceError> {
    let log = service.log_dose(&caller, body.try_into()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Medicine logged",
            "log": log,
        })),
    ))
}

pub async fn dose_logs(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<DoseLogQuery>,
) -> Result<Json<Vec<MedicineLog>>, ServiceError> {
    let schedule = query
        .schedule_id
        .ok_or_else(|| ServiceError::invalid("Schedule ID is required"))?;

    Ok(Json(service.dose_logs(&caller, ScheduleID(schedule)).await?))
}

/// Accepts either a JSON body or a multipart form carrying a file
pub async fn add_record(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    request: Request,
) -> Result<Created, ServiceError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let record = if is_multipart {
        let multipart = Multipart::from_request(request, &service)
            .await
            .map_err(|rejection| ServiceError::invalid(rejection.body_text()))?;
        let (fields, file) = read_record_form(multipart).await?;
        fields.into_record(file)?
    } else {
        let JsonBody(fields) = JsonBody::<RecordRequest>::from_request(request, &service).await?;
        fields.into_record(None)?
    };

    let record: MedicalRecord = service.add_record(&caller, record).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Medical record created",
            "record": record,
        })),
    ))
}

/// Collects the text fields and the optional validated file of a record form
async fn read_record_form(
    mut multipart: Multipart,
) -> Result<(RecordRequest, Option<FileInput>), ServiceError> {
    let mut fields = RecordRequest::default();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::invalid(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_owned();
            let content = field
                .bytes()
                .await
                .map_err(|e| ServiceError::invalid(e.body_text()))?;
            if content.is_empty() && filename.is_empty() {
                continue;
            }
            file = Some(FileInput::new(&content, &filename).map_err(ServiceError::invalid)?);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ServiceError::invalid(e.body_text()))?;

        match name.as_str() {
            "title" => fields.title = Some(value),
            "description" => fields.description = Some(value),
            "date" => fields.date = Some(value),
            "patientId" => fields.patient_id = value.trim().parse().ok(),
            _ => {}
        }
    }

    Ok((fields, file))
}

pub async fn records(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<Vec<MedicalRecord>>, ServiceError> {
    let patient = query.patient_id.map(UserID);
    Ok(Json(service.records(&caller, patient).await?))
}

pub async fn record_file(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    PathParam(key): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let file = service.record_file(&caller, &key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, file.kind.content_type()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (header::CACHE_CONTROL, "private, no-store"),
        ],
        file.content,
    ))
}

pub async fn notifications(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Notification>>, ServiceError> {
    Ok(Json(service.notifications(&caller).await?))
}

pub async fn mark_notification_read(
    State(service): State<Service>,
    Extension(caller): Extension<Caller>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, ServiceError> {
    let notification = service
        .mark_notification_read(&caller, NotificationID(id))
        .await?;

    Ok(Json(json!({
        "message": "Notification marked as read",
        "notification": notification,
    })))
}
