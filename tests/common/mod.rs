#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::StatusCode, test, web};
use serde_json::{json, Value};
use uuid::Uuid;

use taskhub::config::AuthSettings;
use taskhub::mail::MemoryMailer;
use taskhub::models::Role;
use taskhub::store::MemoryStore;
use taskhub::AppState;

/// Builds the same app the server runs, minus CORS.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::App::new()
            .app_data($state.clone())
            .wrap(actix_web::middleware::Logger::default())
            .service(taskhub::routes::health::health)
            .service(actix_web::web::scope("/api/v1").configure(taskhub::routes::config))
    };
}

pub fn test_state() -> (web::Data<AppState>, Arc<MemoryMailer>) {
    let mailer = Arc::new(MemoryMailer::new());
    let settings = AuthSettings {
        bcrypt_cost: 4,
        ..AuthSettings::default()
    };
    let state = AppState::new(Arc::new(MemoryStore::new()), mailer.clone(), settings);
    (web::Data::new(state), mailer)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Calls the service and returns the status with the JSON body.
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    full_name: &str,
    email: &str,
    password: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/v1/user/register")
        .set_json(json!({
            "full_name": full_name,
            "email": email,
            "password": password
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Failed to register {}. Body: {}",
        email,
        body
    );
    body["token"]
        .as_str()
        .expect("registration response carries a token")
        .to_string()
}

pub async fn user_id(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
) -> Uuid {
    let req = test::TestRequest::get()
        .uri("/api/v1/user/profile")
        .insert_header(bearer(token))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "profile failed: {}", body);
    serde_json::from_value(body["data"]["id"].clone()).unwrap()
}

/// Promotes an account directly in the store, the way an operator would seed the
/// first admin.
pub async fn make_admin(state: &web::Data<AppState>, email: &str) {
    let user = state
        .store
        .find_user_by_email(email)
        .await
        .unwrap()
        .expect("user exists");
    assert!(state.store.update_role(user.id, Role::Admin).await.unwrap());
}

pub async fn create_task(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    payload: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/v1/task/create")
        .insert_header(bearer(token))
        .set_json(&payload)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["task"].clone()
}
