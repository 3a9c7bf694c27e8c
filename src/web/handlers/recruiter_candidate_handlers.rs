// src/web/handlers/recruiter_candidate_handlers.rs
use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, routes, Route, State};
use tracing::info;

use crate::auth::CallerIdentity;
use crate::core::Database;
use crate::repository::recruiter_candidates::{
    NewRecruiterCandidate, RecruiterCandidate, RecruiterCandidateFilter, UpdateRecruiterCandidate,
};
use crate::repository::{Page, RecruiterCandidateRepository};
use crate::web::types::{
    not_found, repository_error, ActionResponse, ApiResult, DataResponse, StandardRequest,
    WithConversationId,
};

#[get("/recruiter-candidates?<filter..>")]
pub async fn list_recruiter_candidates(
    filter: RecruiterCandidateFilter,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Page<RecruiterCandidate>>> {
    let page = RecruiterCandidateRepository::new(db.pool())
        .list(&caller.user_id, &filter)
        .await
        .map_err(|e| repository_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("{} recruiter candidates found", page.total),
        page,
        None,
    )))
}

#[get("/recruiter-candidates/<id>")]
pub async fn get_recruiter_candidate(
    id: &str,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<RecruiterCandidate>> {
    let recruiter_candidate = RecruiterCandidateRepository::new(db.pool())
        .find_by_id(id)
        .await
        .map_err(|e| repository_error(e, None))?
        .ok_or_else(|| not_found("Recruiter candidate", id, None))?;

    Ok(Json(DataResponse::success(
        "Recruiter candidate found".to_string(),
        recruiter_candidate,
        None,
    )))
}

#[post("/recruiter-candidates", data = "<request>")]
pub async fn create_recruiter_candidate(
    request: Json<StandardRequest<NewRecruiterCandidate>>,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<RecruiterCandidate>> {
    let conversation_id = request.conversation_id();
    let recruiter_candidate = RecruiterCandidateRepository::new(db.pool())
        .create(&request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?;

    info!(
        "Recruiter candidate {} created by {}",
        recruiter_candidate.id, caller.user_id
    );
    Ok(Json(DataResponse::success(
        format!("Candidate '{}' linked", recruiter_candidate.candidate_name),
        recruiter_candidate,
        conversation_id,
    )))
}

#[patch("/recruiter-candidates/<id>", data = "<request>")]
pub async fn update_recruiter_candidate(
    id: &str,
    request: Json<StandardRequest<UpdateRecruiterCandidate>>,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<RecruiterCandidate>> {
    let conversation_id = request.conversation_id();
    let recruiter_candidate = RecruiterCandidateRepository::new(db.pool())
        .update(id, &request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?
        .ok_or_else(|| not_found("Recruiter candidate", id, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        "Recruiter candidate updated".to_string(),
        recruiter_candidate,
        conversation_id,
    )))
}

#[delete("/recruiter-candidates/<id>")]
pub async fn delete_recruiter_candidate(
    id: &str,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    RecruiterCandidateRepository::new(db.pool())
        .soft_delete(id)
        .await
        .map_err(|e| repository_error(e, None))?;

    info!("Recruiter candidate {} deactivated by {}", id, caller.user_id);
    Ok(Json(ActionResponse::success(
        format!("Recruiter candidate '{}' deactivated", id),
        "deleted".to_string(),
        None,
    )))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_recruiter_candidates,
        get_recruiter_candidate,
        create_recruiter_candidate,
        update_recruiter_candidate,
        delete_recruiter_candidate
    ]
}
