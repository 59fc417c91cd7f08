use actix_web::{get, patch, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{ProgressListQuery, UpdateProgressRequest, UpsertProgressRequest},
};

#[get("/api/progress")]
pub async fn get_user_progress(
    state: web::Data<AppState>,
    query: web::Query<ProgressListQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let result = state
        .progress_service
        .get_user_progress(&auth.0.sub, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/api/progress/island/{island_id}")]
pub async fn get_progress_by_island(
    state: web::Data<AppState>,
    island_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state
        .progress_service
        .get_progress_by_island(&auth.0.sub, &island_id)
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[post("/api/progress")]
pub async fn upsert_progress(
    state: web::Data<AppState>,
    request: web::Json<UpsertProgressRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let progress = state
        .progress_service
        .upsert_progress(&auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[patch("/api/progress/{id}")]
pub async fn update_progress(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateProgressRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let progress = state
        .progress_service
        .update_progress(&auth.0.sub, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}
