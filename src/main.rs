use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use storyisle_server::{
    app_state::AppState,
    auth::{AuthMiddleware, JwtService},
    config::Config,
    handlers,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .expect("failed to initialize application state");

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .service(handlers::health_check)
            .service(
                web::scope("")
                    .wrap(AuthMiddleware)
                    .service(handlers::list_attempts)
                    .service(handlers::get_attempt)
                    .service(handlers::create_attempt)
                    .service(handlers::update_attempt)
                    .service(handlers::delete_attempt)
                    .service(handlers::add_stage_attempt)
                    .service(handlers::add_question_log)
                    .service(handlers::get_user_progress)
                    .service(handlers::get_progress_by_island)
                    .service(handlers::upsert_progress)
                    .service(handlers::update_progress)
                    .service(handlers::get_statistics),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
