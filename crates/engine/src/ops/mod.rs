#![forbid(unsafe_code)]

mod categories;
mod dashboard;
mod envelope;
mod features;
mod grants;
mod projects;
mod render;
mod session;
mod users;

pub use envelope::{OpError, OpRequest, OpResponse};

use crate::gate::GateError;
use crate::server::Server;
use sb_storage::StoreError;

pub fn dispatch(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    match op {
        "session.login" => session::login(server, request),
        "session.logout" => session::logout(server, request),
        "home.list" => session::home(server, request),
        "admin.users" => users::list(server, request),
        "user.create" => users::create(server, request),
        "user.reset_password" => users::reset_password(server, request),
        "user.change_password" => users::change_password(server, request),
        "user.change_role" => users::change_role(server, request),
        "user.remove" => users::remove(server, request),
        "project.list" => projects::list(server, request),
        "project.create" => projects::create(server, request),
        "project.update" => projects::update(server, request),
        "project.delete" => projects::delete(server, request),
        "project.detail" => projects::detail(server, request),
        "category.apply" => categories::apply(server, request),
        "feature.apply" => features::apply(server, request),
        "grant.add" => grants::add(server, request),
        "grant.revoke" => grants::revoke(server, request),
        "dashboard.view" => dashboard::view(server, request),
        _ => OpResponse::failure(
            op,
            OpError::new("UNKNOWN_OP", format!("unknown operation: {op}")),
        ),
    }
}

/// Authorization failures are reported uniformly: the caller learns it is not
/// permitted, never whether the target exists.
pub(crate) fn gate_failure(op: &str, err: GateError) -> OpResponse {
    match err {
        GateError::InvalidSession | GateError::InsufficientRole => {
            OpResponse::failure(op, OpError::new("NOT_PERMITTED", "not permitted"))
        }
        GateError::Store(err) => store_failure(op, err),
    }
}

pub(crate) fn store_failure(op: &str, err: StoreError) -> OpResponse {
    if err.is_busy() {
        return OpResponse::failure(
            op,
            OpError::new("STORE_UNAVAILABLE", "store unavailable, try again"),
        );
    }
    let error = match err {
        StoreError::UnknownUser => OpError::new("NOT_FOUND", "user not found"),
        StoreError::UnknownProject => OpError::new("NOT_FOUND", "project not found"),
        StoreError::UnknownCategory => OpError::new("NOT_FOUND", "category not found"),
        StoreError::UnknownFeature => OpError::new("NOT_FOUND", "feature not found"),
        StoreError::DuplicateShortName => {
            OpError::new("DUPLICATE_SHORT_NAME", "short name already in use")
        }
        StoreError::DuplicateName => OpError::new("DUPLICATE_NAME", "name already in use"),
        StoreError::DuplicateEmail => OpError::new("DUPLICATE_EMAIL", "email already registered"),
        StoreError::OwnerNotEligible => OpError::new("NOT_PERMITTED", "not permitted"),
        StoreError::OwnerCannotBeGranted => OpError::new(
            "OWNER_CANNOT_BE_GRANTED",
            "the project owner already has full access",
        ),
        StoreError::UserOwnsProjects => OpError::new(
            "USER_OWNS_PROJECTS",
            "reassign or remove the user's projects first",
        ),
        StoreError::InvalidInput(message) => OpError::new("INVALID_INPUT", message),
        StoreError::Io(_) | StoreError::Sql(_) => {
            OpError::new("INTERNAL_ERROR", "contact the administrator")
        }
    };
    OpResponse::failure(op, error)
}
