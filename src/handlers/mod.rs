pub mod attempt_handler;
pub mod progress_handler;
pub mod statistics_handler;

use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, errors::AppError};

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.db.health_check().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}

pub use attempt_handler::{
    add_question_log, add_stage_attempt, create_attempt, delete_attempt, get_attempt,
    list_attempts, update_attempt,
};
pub use progress_handler::{
    get_progress_by_island, get_user_progress, update_progress, upsert_progress,
};
pub use statistics_handler::get_statistics;
