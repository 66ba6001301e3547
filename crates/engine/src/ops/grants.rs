use super::envelope::{OpError, OpRequest, OpResponse, require_i64, require_str};
use super::{projects, store_failure};
use crate::server::Server;
use sb_storage::{GrantOutcome, RevokeOutcome};
use serde_json::json;

/// Guests are invited by email; an existing grant is an informational
/// outcome, not a failure.
pub(super) fn add(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let (user, project) = match projects::mutable_project(server, request) {
        Ok(pair) => pair,
        Err(response) => return *response,
    };
    let email = match require_str(&request.args, "email") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    let guest = match server.store.find_user_by_email(email) {
        Ok(Some(guest)) => guest,
        Ok(None) => {
            return OpResponse::failure(
                op,
                OpError::new("NOT_FOUND", "no account with that email"),
            );
        }
        Err(err) => return store_failure(op, err),
    };

    match server.store.grant_access(project.id, guest.id, user.id) {
        Ok(GrantOutcome::Granted) => OpResponse::success(
            op,
            json!({ "granted": true, "user_id": guest.id }),
        ),
        Ok(GrantOutcome::AlreadyGranted) => OpResponse::success(
            op,
            json!({
                "granted": false,
                "already_granted": true,
                "user_id": guest.id,
                "message": "guest already has access",
            }),
        ),
        Err(err) => store_failure(op, err),
    }
}

pub(super) fn revoke(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let (user, project) = match projects::mutable_project(server, request) {
        Ok(pair) => pair,
        Err(response) => return *response,
    };
    let target_user_id = match require_i64(&request.args, "target_user_id") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    match server.store.revoke_access(project.id, target_user_id, user.id) {
        Ok(RevokeOutcome::Revoked) => OpResponse::success(op, json!({ "revoked": true })),
        Ok(RevokeOutcome::NothingToRevoke) => OpResponse::success(
            op,
            json!({ "revoked": false, "message": "nothing to revoke" }),
        ),
        Err(err) => store_failure(op, err),
    }
}
