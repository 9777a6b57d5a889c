pub mod comments;
pub mod health;
pub mod notifications;
pub mod tasks;
pub mod users;

use actix_web::{error, web, HttpRequest};

use crate::auth::Authenticate;
use crate::error::AppError;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::ValidationError(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: error::PathError, _req: &HttpRequest| {
        AppError::ValidationError(err.to_string()).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        AppError::ValidationError(err.to_string()).into()
    })
}

/// Registers every versioned route. Mounted under `/api/v1` by the server.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(
            web::scope("/user")
                .service(users::register)
                .service(users::login)
                .service(users::forgot_password)
                .service(users::verify_otp)
                .service(users::reset_password)
                .service(users::profile)
                .service(users::logout)
                .service(users::update_role),
        )
        .service(
            web::scope("/task")
                .wrap(Authenticate)
                .service(tasks::get_tasks)
                .service(tasks::get_task)
                .service(tasks::create_task)
                .service(tasks::update_task)
                .service(tasks::delete_task)
                .service(tasks::update_status)
                .service(tasks::update_multiple)
                .service(comments::create_comment)
                .service(comments::get_comments)
                .service(comments::update_comment)
                .service(comments::delete_comment),
        )
        .service(
            web::scope("/notifications")
                .wrap(Authenticate)
                .service(notifications::get_notifications)
                .service(notifications::mark_all_read)
                .service(notifications::mark_read),
        );
}
