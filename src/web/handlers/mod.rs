pub mod assignment_handlers;
pub mod invitation_handlers;
pub mod proposal_handlers;
pub mod recruiter_candidate_handlers;
pub mod recruiter_handlers;
pub mod reputation_handlers;
pub mod system_handlers;

use rocket::Route;

/// Every route served under `/api`
pub fn api_routes() -> Vec<Route> {
    [
        recruiter_handlers::routes(),
        assignment_handlers::routes(),
        recruiter_candidate_handlers::routes(),
        reputation_handlers::routes(),
        proposal_handlers::routes(),
        invitation_handlers::routes(),
        system_handlers::routes(),
    ]
    .into_iter()
    .flatten()
    .collect()
}
