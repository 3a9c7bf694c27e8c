// src/web/handlers/proposal_handlers.rs
use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, routes, Route, State};
use tracing::info;

use crate::auth::CallerIdentity;
use crate::core::Database;
use crate::repository::proposals::{NewProposal, Proposal, ProposalFilter, UpdateProposal};
use crate::repository::{Page, ProposalRepository};
use crate::web::types::{
    not_found, repository_error, ActionResponse, ApiResult, DataResponse, StandardRequest,
    WithConversationId,
};

#[get("/proposals?<filter..>")]
pub async fn list_proposals(
    filter: ProposalFilter,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Page<Proposal>>> {
    let page = ProposalRepository::new(db.pool())
        .list(&caller.user_id, &filter)
        .await
        .map_err(|e| repository_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("{} proposals found", page.total),
        page,
        None,
    )))
}

#[get("/proposals/<id>")]
pub async fn get_proposal(
    id: &str,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Proposal>> {
    let proposal = ProposalRepository::new(db.pool())
        .find_by_id(id)
        .await
        .map_err(|e| repository_error(e, None))?
        .ok_or_else(|| not_found("Proposal", id, None))?;

    Ok(Json(DataResponse::success(
        "Proposal found".to_string(),
        proposal,
        None,
    )))
}

#[post("/proposals", data = "<request>")]
pub async fn create_proposal(
    request: Json<StandardRequest<NewProposal>>,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Proposal>> {
    let conversation_id = request.conversation_id();
    let proposal = ProposalRepository::new(db.pool())
        .create(&request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?;

    info!("Proposal {} created by {}", proposal.id, caller.user_id);
    Ok(Json(DataResponse::success(
        format!("Proposal sent to '{}'", proposal.company_name),
        proposal,
        conversation_id,
    )))
}

#[patch("/proposals/<id>", data = "<request>")]
pub async fn update_proposal(
    id: &str,
    request: Json<StandardRequest<UpdateProposal>>,
    _caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<Proposal>> {
    let conversation_id = request.conversation_id();
    let proposal = ProposalRepository::new(db.pool())
        .update(id, &request.data)
        .await
        .map_err(|e| repository_error(e, conversation_id.clone()))?
        .ok_or_else(|| not_found("Proposal", id, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        "Proposal updated".to_string(),
        proposal,
        conversation_id,
    )))
}

#[delete("/proposals/<id>")]
pub async fn delete_proposal(
    id: &str,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    ProposalRepository::new(db.pool())
        .soft_delete(id)
        .await
        .map_err(|e| repository_error(e, None))?;

    info!("Proposal {} cancelled by {}", id, caller.user_id);
    Ok(Json(ActionResponse::success(
        format!("Proposal '{}' cancelled", id),
        "deleted".to_string(),
        None,
    )))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_proposals,
        get_proposal,
        create_proposal,
        update_proposal,
        delete_proposal
    ]
}
