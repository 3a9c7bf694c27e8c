// src/web/handlers/invitation_handlers.rs
use rocket::serde::json::Json;
use rocket::{get, post, routes, Route, State};
use tracing::info;

use crate::auth::CallerIdentity;
use crate::core::Database;
use crate::invitations::{AcceptedInvitation, InvitationService, InvitationView};
use crate::web::types::{invitation_error, ApiResult, DataResponse};

/// Public: the invitee may not have an account yet
#[get("/invitations/<token>")]
pub async fn get_invitation(
    token: &str,
    db: &State<Database>,
) -> ApiResult<DataResponse<InvitationView>> {
    let invitation = InvitationService::new(db.inner())
        .lookup(token)
        .await
        .map_err(|e| invitation_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("Invitation to join '{}'", invitation.organization_name),
        invitation,
        None,
    )))
}

#[post("/invitations/<token>/accept")]
pub async fn accept_invitation(
    token: &str,
    caller: CallerIdentity,
    db: &State<Database>,
) -> ApiResult<DataResponse<AcceptedInvitation>> {
    let caller_email = caller.email.as_deref().unwrap_or_default();
    let accepted = InvitationService::new(db.inner())
        .accept(token, &caller.user_id, caller_email)
        .await
        .map_err(|e| invitation_error(e, None))?;

    info!(
        "{} accepted invitation to {}",
        caller.user_id, accepted.organization_id
    );
    Ok(Json(DataResponse::success(
        format!("Joined '{}' as {}", accepted.organization_name, accepted.role),
        accepted,
        None,
    )))
}

pub fn routes() -> Vec<Route> {
    routes![get_invitation, accept_invitation]
}
