// src/web/handlers/assignment_handlers.rs
use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, routes, Route, State};
use tracing::info;

use crate::auth::CallerIdentity;
use crate::core::Database;
use crate::repository::assignments::{NewAssignment, Assignment, AssignmentFilter, UpdateAssignment};
use crate::repository::{Page, AssignmentRepository};
use crate::web::types::{
    not_found, repository_error, ActionResponse, ApiResult, DataResponse, StandardRequest,
    WithConversationId,
};

#[get("/assignments?<filter..>")]
pub async fn list_assignments(
    filter: AssignmentFilter,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Page<Assignment>>> {
    let page = AssignmentRepository::new(db.pool())
        .list(&caller.user_id, &filter)
        .await
        .map_err(|e| repository_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("{} assignments found", page.total),
        page,
        None,
    )))
}

#[get("/assignments/<id>")]
pub async fn get_assignment(
    id: &str,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Assignment>> {
    let assignment = AssignmentRepository::new(db.pool())
        .find_by_id(id)
        .await
        .map_err(|e| repository_error(e, None))?
        .ok_or_else(|| not_found("Assignment", id, None))?;

    Ok(Json(DataResponse::success(
        "Assignment found".to_string(),
        assignment,
        None,
    )))
}

#[post("/assignments", data = "<request>")]
pub async fn create_assignment(
    request: Json<StandardRequest<NewAssignment>>,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Assignment>> {
    let conversation_id = request.conversation_id();
    let assignment = AssignmentRepository::new(db.pool())
        .create(&request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?;

    info!("Assignment {} created by {}", assignment.id, caller.user_id);
    Ok(Json(DataResponse::success(
        format!("Recruiter assigned to '{}'", assignment.job_title),
        assignment,
        conversation_id,
    )))
}

#[patch("/assignments/<id>", data = "<request>")]
pub async fn update_assignment(
    id: &str,
    request: Json<StandardRequest<UpdateAssignment>>,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Assignment>> {
    let conversation_id = request.conversation_id();
    let assignment = AssignmentRepository::new(db.pool())
        .update(id, &request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?
        .ok_or_else(|| not_found("Assignment", id, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        "Assignment updated".to_string(),
        assignment,
        conversation_id,
    )))
}

#[delete("/assignments/<id>")]
pub async fn delete_assignment(
    id: &str,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    AssignmentRepository::new(db.pool())
        .soft_delete(id)
        .await
        .map_err(|e| repository_error(e, None))?;

    info!("Assignment {} cancelled by {}", id, caller.user_id);
    Ok(Json(ActionResponse::success(
        format!("Assignment '{}' cancelled", id),
        "deleted".to_string(),
        None,
    )))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_assignments,
        get_assignment,
        create_assignment,
        update_assignment,
        delete_assignment
    ]
}
