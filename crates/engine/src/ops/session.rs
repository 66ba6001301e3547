use super::envelope::{OpError, OpRequest, OpResponse, require_str};
use super::{gate_failure, render, store_failure};
use crate::gate;
use crate::identity;
use crate::server::Server;
use serde_json::json;

pub(super) fn login(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let email = match require_str(&request.args, "email") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };
    let password = match require_str(&request.args, "password") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    match identity::authenticate(&server.store, email, password) {
        Ok(Some(user)) => OpResponse::success(op, json!({ "user": render::user_json(&user) })),
        Ok(None) => OpResponse::failure(
            op,
            OpError::new("INVALID_CREDENTIALS", "invalid user or password"),
        ),
        Err(err) => store_failure(op, err),
    }
}

/// Sessions live in the authentication collaborator; the engine only records
/// that the caller is gone.
pub(super) fn logout(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    match gate::resolve_user(&server.store, request.user_id) {
        Ok(_) => OpResponse::success(op, json!({})),
        Err(err) => gate_failure(op, err),
    }
}

pub(super) fn home(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let user = match gate::resolve_user(&server.store, request.user_id) {
        Ok(user) => user,
        Err(err) => return gate_failure(op, err),
    };

    match gate::visible_projects(&server.store, user.id) {
        Ok(visible) => OpResponse::success(
            op,
            json!({
                "owned": visible.owned.iter().map(render::project_json).collect::<Vec<_>>(),
                "granted": visible.granted.iter().map(render::project_json).collect::<Vec<_>>(),
            }),
        ),
        Err(err) => store_failure(op, err),
    }
}
