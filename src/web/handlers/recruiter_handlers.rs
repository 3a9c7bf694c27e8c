// src/web/handlers/recruiter_handlers.rs
use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, routes, Route, State};
use tracing::info;

use crate::auth::CallerIdentity;
use crate::core::Database;
use crate::repository::recruiters::{NewRecruiter, Recruiter, RecruiterFilter, UpdateRecruiter};
use crate::repository::{Page, RecruiterRepository};
use crate::web::types::{
    not_found, repository_error, ActionResponse, ApiResult, DataResponse, StandardRequest,
    WithConversationId,
};

#[get("/recruiters?<filter..>")]
pub async fn list_recruiters(
    filter: RecruiterFilter,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Page<Recruiter>>> {
    let page = RecruiterRepository::new(db.pool())
        .list(&caller.user_id, &filter)
        .await
        .map_err(|e| repository_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("{} recruiters found", page.total),
        page,
        None,
    )))
}

#[get("/recruiters/<id>")]
pub async fn get_recruiter(
    id: &str,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Recruiter>> {
    let recruiter = RecruiterRepository::new(db.pool())
        .find_by_id(id)
        .await
        .map_err(|e| repository_error(e, None))?
        .ok_or_else(|| not_found("Recruiter", id, None))?;

    Ok(Json(DataResponse::success(
        "Recruiter found".to_string(),
        recruiter,
        None,
    )))
}

#[post("/recruiters", data = "<request>")]
pub async fn create_recruiter(
    request: Json<StandardRequest<NewRecruiter>>,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Recruiter>> {
    let conversation_id = request.conversation_id();
    let recruiter = RecruiterRepository::new(db.pool())
        .create(&request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?;

    info!("Recruiter {} created by {}", recruiter.id, caller.user_id);
    Ok(Json(DataResponse::success(
        format!("Recruiter '{}' created", recruiter.full_name),
        recruiter,
        conversation_id,
    )))
}

#[patch("/recruiters/<id>", data = "<request>")]
pub async fn update_recruiter(
    id: &str,
    request: Json<StandardRequest<UpdateRecruiter>>,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Recruiter>> {
    let conversation_id = request.conversation_id();
    let recruiter = RecruiterRepository::new(db.pool())
        .update(id, &request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?
        .ok_or_else(|| not_found("Recruiter", id, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        "Recruiter updated".to_string(),
        recruiter,
        conversation_id,
    )))
}

#[delete("/recruiters/<id>")]
pub async fn delete_recruiter(
    id: &str,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    RecruiterRepository::new(db.pool())
        .soft_delete(id)
        .await
        .map_err(|e| repository_error(e, None))?;

    info!("Recruiter {} deactivated by {}", id, caller.user_id);
    Ok(Json(ActionResponse::success(
        format!("Recruiter '{}' deactivated", id),
        "deleted".to_string(),
        None,
    )))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_recruiters,
        get_recruiter,
        create_recruiter,
        update_recruiter,
        delete_recruiter
    ]
}
