// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::auth::{auth_failure, AuthConfig};
use crate::core::{ConfigManager, Database};
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::Header;
use rocket::serde::json::Json;
use rocket::{catchers, Build, Request, Response, Rocket};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(401)]
pub fn unauthorized(request: &Request<'_>) -> Json<StandardErrorResponse> {
    let error = auth_failure(request)
        .map(|e| e.message())
        .unwrap_or("Authentication required");
    Json(StandardErrorResponse::new(
        error.to_string(),
        "UNAUTHORIZED".to_string(),
        vec!["Send a valid bearer token in the Authorization header".to_string()],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found_catcher(request: &Request<'_>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {}", request.uri().path()),
        "NOT_FOUND".to_string(),
        vec!["Check the endpoint path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request parameters could not be parsed".to_string(),
        "INVALID_PARAMETERS".to_string(),
        vec![
            "Check status and sort_order values".to_string(),
            "page and limit must be non-negative integers".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Assemble the application; `start_web_server` and the API tests share it
pub fn build_rocket(figment: Figment, db: Database, auth_config: AuthConfig) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .manage(db)
        .manage(auth_config)
        .register(
            "/api",
            catchers![
                bad_request,
                unauthorized,
                not_found_catcher,
                unprocessable,
                internal_error
            ],
        )
        .mount("/api", handlers::api_routes())
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let environment = &config.environment;
    let auth_config = AuthConfig::new(config.jwt_secret()?, environment.jwt_audience.clone());
    let db = Database::new(&environment.database_path).await?;

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", environment.port));

    info!("Starting network service API server");
    info!("Environment: {}", config.environment_name);
    info!("Database: {}", environment.database_path.display());
    info!("Server: http://0.0.0.0:{}", environment.port);

    let _rocket = build_rocket(figment, db, auth_config)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {}", e))?;

    Ok(())
}
