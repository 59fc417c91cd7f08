use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, auth::AuthenticatedUser, errors::AppError};

#[get("/api/statistics")]
pub async fn get_statistics(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let statistics = state
        .statistics_service
        .get_statistics(&auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(statistics))
}
