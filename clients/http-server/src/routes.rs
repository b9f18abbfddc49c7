use actix_web::{web, HttpResponse};
use database::store::ParticipantStore;
use serde_json::Value;

use crate::{
    dto::{CountResponse, CreateParticipantRequest, Envelope},
    errors::ApiError,
    service::RegistrationService,
};

/// Mounts the participant routes, expects a `RegistrationService<S>` in app data
pub fn configure<S: ParticipantStore + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource("/participants")
                .route(web::post().to(register::<S>))
                .route(web::get().to(list_participants::<S>)),
        )
        .service(web::resource("/participants/count").route(web::get().to(count_participants::<S>)));
}

/// Malformed JSON is reported like any other validation failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Validation(vec![err.to_string()]).into())
}

async fn register<S: ParticipantStore + 'static>(
    service: web::Data<RegistrationService<S>>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    log::info!("POST /participants - registering participant");

    let request = CreateParticipantRequest::from_json(&body).map_err(ApiError::Validation)?;

    let participant = web::block(move || service.register(request)).await??;

    Ok(HttpResponse::Created().json(Envelope::success(
        "Participant successfully registered in the raffle",
        participant,
    )))
}

async fn list_participants<S: ParticipantStore + 'static>(
    service: web::Data<RegistrationService<S>>,
) -> Result<HttpResponse, ApiError> {
    log::info!("GET /participants - listing participants");

    let participants = web::block(move || service.list_all()).await??;

    Ok(HttpResponse::Ok().json(Envelope::success(
        "Participant list retrieved successfully",
        participants,
    )))
}

async fn count_participants<S: ParticipantStore + 'static>(
    service: web::Data<RegistrationService<S>>,
) -> Result<HttpResponse, ApiError> {
    log::info!("GET /participants/count - counting participants");

    let total = web::block(move || service.get_count()).await??;

    Ok(HttpResponse::Ok().json(Envelope::success(
        "Participant count retrieved successfully",
        CountResponse { total },
    )))
}
