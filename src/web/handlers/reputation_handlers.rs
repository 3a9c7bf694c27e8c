// src/web/handlers/reputation_handlers.rs
use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, routes, Route, State};
use tracing::info;

use crate::auth::CallerIdentity;
use crate::core::Database;
use crate::repository::reputations::{NewReputation, Reputation, ReputationFilter, UpdateReputation};
use crate::repository::{Page, ReputationRepository};
use crate::web::types::{
    not_found, repository_error, ActionResponse, ApiResult, DataResponse, StandardRequest,
    WithConversationId,
};

#[get("/reputations?<filter..>")]
pub async fn list_reputations(
    filter: ReputationFilter,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Page<Reputation>>> {
    let page = ReputationRepository::new(db.pool())
        .list(&caller.user_id, &filter)
        .await
        .map_err(|e| repository_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("{} reputations found", page.total),
        page,
        None,
    )))
}

#[get("/reputations/<id>")]
pub async fn get_reputation(
    id: &str,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Reputation>> {
    let reputation = ReputationRepository::new(db.pool())
        .find_by_id(id)
        .await
        .map_err(|e| repository_error(e, None))?
        .ok_or_else(|| not_found("Reputation", id, None))?;

    Ok(Json(DataResponse::success(
        "Reputation found".to_string(),
        reputation,
        None,
    )))
}

#[post("/reputations", data = "<request>")]
pub async fn create_reputation(
    request: Json<StandardRequest<NewReputation>>,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Reputation>> {
    let conversation_id = request.conversation_id();
    let reputation = ReputationRepository::new(db.pool())
        .create(&request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?;

    info!("Reputation {} created by {}", reputation.id, caller.user_id);
    Ok(Json(DataResponse::success(
        format!("Reputation recorded for '{}'", reputation.recruiter_name),
        reputation,
        conversation_id,
    )))
}

#[patch("/reputations/<id>", data = "<request>")]
pub async fn update_reputation(
    id: &str,
    request: Json<StandardRequest<UpdateReputation>>,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Reputation>> {
    let conversation_id = request.conversation_id();
    let reputation = ReputationRepository::new(db.pool())
        .update(id, &request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?
        .ok_or_else(|| not_found("Reputation", id, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        "Reputation updated".to_string(),
        reputation,
        conversation_id,
    )))
}

#[delete("/reputations/<id>")]
pub async fn delete_reputation(
    id: &str,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    ReputationRepository::new(db.pool())
        .soft_delete(id)
        .await
        .map_err(|e| repository_error(e, None))?;

    info!("Reputation {} deactivated by {}", id, caller.user_id);
    Ok(Json(ActionResponse::success(
        format!("Reputation '{}' deactivated", id),
        "deleted".to_string(),
        None,
    )))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_reputations,
        get_reputation,
        create_reputation,
        update_reputation,
        delete_reputation
    ]
}
