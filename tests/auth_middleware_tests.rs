use actix_web::{get, http::StatusCode, test, web, App, HttpResponse};
use secrecy::SecretString;

use storyisle_server::{
    auth::{AuthMiddleware, AuthenticatedUser, JwtService},
    errors::AppError,
};

#[get("/whoami")]
async fn whoami(auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user_id": auth.0.sub })))
}

fn jwt_service() -> JwtService {
    JwtService::new(&SecretString::from("test_jwt_secret_key".to_string()), 1)
}

#[actix_web::test]
async fn request_without_token_is_unauthorized() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(jwt_service()))
            .service(web::scope("").wrap(AuthMiddleware).service(whoami)),
    )
    .await;

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn request_with_valid_token_reaches_the_handler() {
    let jwt = jwt_service();
    let token = jwt
        .create_token("user-1", "Maya Reader", "maya@example.com")
        .expect("token creation should succeed");

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(jwt))
            .service(web::scope("").wrap(AuthMiddleware).service(whoami)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], "user-1");
}

#[actix_web::test]
async fn request_with_malformed_header_is_unauthorized() {
    let jwt = jwt_service();
    let token = jwt
        .create_token("user-1", "Maya Reader", "maya@example.com")
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(jwt))
            .service(web::scope("").wrap(AuthMiddleware).service(whoami)),
    )
    .await;

    // Token without the Bearer prefix is rejected.
    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn request_with_forged_token_is_unauthorized() {
    let forged = JwtService::new(&SecretString::from("other_secret".to_string()), 1)
        .create_token("user-1", "Maya Reader", "maya@example.com")
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(jwt_service()))
            .service(web::scope("").wrap(AuthMiddleware).service(whoami)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {}", forged)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
