use actix_web::{delete, get, patch, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{
        AttemptListQuery, CreateAttemptRequest, CreateQuestionLogRequest,
        CreateStageAttemptRequest, UpdateAttemptRequest,
    },
    models::dto::response::SuccessResponse,
};

#[get("/api/attempts")]
pub async fn list_attempts(
    state: web::Data<AppState>,
    query: web::Query<AttemptListQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let result = state
        .attempt_service
        .list_attempts(&auth.0.sub, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/api/attempts/{id}")]
pub async fn get_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state.attempt_service.get_attempt(&auth.0.sub, &id).await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[post("/api/attempts")]
pub async fn create_attempt(
    state: web::Data<AppState>,
    request: web::Json<CreateAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let attempt = state
        .attempt_service
        .create_or_resume(&auth.0.sub, &request.story_id)
        .await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[patch("/api/attempts/{id}")]
pub async fn update_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let attempt = state
        .attempt_service
        .update_attempt(&auth.0.sub, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[delete("/api/attempts/{id}")]
pub async fn delete_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.attempt_service.delete_attempt(&auth.0.sub, &id).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::new("Attempt deleted successfully")))
}

#[post("/api/attempts/{id}/stages")]
pub async fn add_stage_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<CreateStageAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let stage = state
        .attempt_service
        .add_stage_attempt(&auth.0.sub, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(stage))
}

#[post("/api/attempts/{id}/logs")]
pub async fn add_question_log(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<CreateQuestionLogRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let log = state
        .attempt_service
        .add_question_log(&auth.0.sub, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(log))
}
