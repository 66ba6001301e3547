use super::envelope::{OpError, OpRequest, OpResponse, require_i64, require_str};
use super::{gate_failure, render, store_failure};
use crate::gate;
use crate::identity::{self, ChangePasswordOutcome, IdentityError};
use crate::server::Server;
use sb_core::model::Role;
use serde_json::{Value, json};

pub(super) fn list(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    if let Err(err) = gate::authorize_admin(&server.store, request.user_id) {
        return gate_failure(op, err);
    }

    match server.store.list_users() {
        Ok(users) => OpResponse::success(
            op,
            json!({ "users": users.iter().map(render::user_json).collect::<Vec<_>>() }),
        ),
        Err(err) => store_failure(op, err),
    }
}

/// Self-registration and the admin "new user" form share this operation; new
/// accounts always start as Guest.
pub(super) fn create(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let first_name = match require_str(&request.args, "first_name") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };
    let last_name = match require_str(&request.args, "last_name") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };
    let email = match require_str(&request.args, "email") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };
    let password = match require_str(&request.args, "password") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    match identity::register_user(
        &mut server.store,
        first_name,
        last_name,
        email,
        password,
        request.user_id,
    ) {
        Ok(user) => OpResponse::success(op, json!({ "user": render::user_json(&user) })),
        Err(IdentityError::Email(err)) => {
            OpResponse::failure(op, OpError::new("INVALID_INPUT", err.to_string()))
        }
        Err(IdentityError::Store(err)) => store_failure(op, err),
    }
}

pub(super) fn reset_password(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let email = match require_str(&request.args, "email") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    match identity::reset_password(&mut server.store, email) {
        Ok(Some((user, new_password))) => OpResponse::success(
            op,
            json!({ "user_id": user.id, "new_password": new_password }),
        ),
        Ok(None) => OpResponse::failure(op, OpError::new("NOT_FOUND", "user not found")),
        Err(err) => store_failure(op, err),
    }
}

pub(super) fn change_password(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let email = match require_str(&request.args, "email") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };
    let old_password = match require_str(&request.args, "old_password") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };
    let new_password = match require_str(&request.args, "new_password") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };
    let confirm_password = match require_str(&request.args, "confirm_password") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    if new_password != confirm_password {
        return OpResponse::failure(op, OpError::new("INVALID_INPUT", "passwords do not match"));
    }

    match identity::change_password(&mut server.store, email, old_password, new_password) {
        Ok(ChangePasswordOutcome::Changed) => OpResponse::success(op, json!({})),
        Ok(ChangePasswordOutcome::UnknownEmail) => {
            OpResponse::failure(op, OpError::new("NOT_FOUND", "user not found"))
        }
        Ok(ChangePasswordOutcome::AccessDenied) => OpResponse::failure(
            op,
            OpError::new("INVALID_CREDENTIALS", "invalid user or password"),
        ),
        Err(err) => store_failure(op, err),
    }
}

pub(super) fn change_role(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let admin = match gate::authorize_admin(&server.store, request.user_id) {
        Ok(user) => user,
        Err(err) => return gate_failure(op, err),
    };
    let user_id = match require_i64(&request.args, "target_user_id") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };
    let Some(role) = parse_role(request.args.get("role")) else {
        return OpResponse::failure(op, OpError::new("INVALID_INPUT", "unknown role"));
    };

    match server.store.set_user_role(user_id, role, admin.id) {
        Ok(user) => OpResponse::success(op, json!({ "user": render::user_json(&user) })),
        Err(err) => store_failure(op, err),
    }
}

pub(super) fn remove(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let admin = match gate::authorize_admin(&server.store, request.user_id) {
        Ok(user) => user,
        Err(err) => return gate_failure(op, err),
    };
    let user_id = match require_i64(&request.args, "target_user_id") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    match server.store.remove_user(user_id, admin.id) {
        Ok(()) => OpResponse::success(op, json!({})),
        Err(err) => store_failure(op, err),
    }
}

/// Accepts the role name or its numeric id (admin forms post the id).
fn parse_role(value: Option<&Value>) -> Option<Role> {
    match value {
        Some(Value::String(name)) => Role::parse(name),
        Some(Value::Number(number)) => number.as_i64().and_then(Role::from_id),
        _ => None,
    }
}
