// src/web/handlers/system_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, routes, Route, State};
use tracing::error;

use crate::core::Database;
use crate::web::types::{api_error, ApiResult, TextResponse};

#[get("/health")]
pub async fn health(db: &State<Database>) -> ApiResult<TextResponse> {
    match db.health_check().await {
        Ok(()) => Ok(Json(TextResponse::success("OK".to_string(), None))),
        Err(e) => {
            error!("Health check failed: {:#}", e);
            Err(api_error(
                Status::ServiceUnavailable,
                "Database unavailable",
                "DATABASE_ERROR",
                vec!["Try again in a few moments".to_string()],
                None,
            ))
        }
    }
}

/// Generic CORS handler that returns Status::Ok for any OPTIONS request
#[rocket::options("/<_..>")]
pub async fn universal_options_handler() -> Status {
    Status::Ok
}

pub fn routes() -> Vec<Route> {
    routes![health, universal_options_handler]
}
