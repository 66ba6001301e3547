use super::envelope::{OpError, OpRequest, OpResponse, require_i64, require_str};
use super::{projects, render, store_failure};
use crate::server::Server;
use sb_storage::{CreateCategoryRequest, StoreError, UpdateCategoryRequest};
use serde_json::json;

/// One endpoint multiplexed by an `op` field (`add`/`edit`/`del`), the same
/// shape the category form posts.
pub(super) fn apply(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let (user, project) = match projects::mutable_project(server, request) {
        Ok(pair) => pair,
        Err(response) => return *response,
    };
    let kind = match require_str(&request.args, "op") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    match kind {
        "add" => {
            let name = match require_str(&request.args, "name") {
                Ok(value) => value.to_string(),
                Err(err) => return OpResponse::failure(op, err),
            };
            let result = server.store.create_category(CreateCategoryRequest {
                project_id: project.id,
                name,
                actor_id: user.id,
            });
            match result {
                Ok(category) => {
                    OpResponse::success(op, json!({ "category": render::category_json(&category) }))
                }
                Err(err) => store_failure(op, err),
            }
        }
        "edit" => {
            let category = match owned_category(server, request, project.id) {
                Ok(category) => category,
                Err(response) => return *response,
            };
            let name = match require_str(&request.args, "name") {
                Ok(value) => value.to_string(),
                Err(err) => return OpResponse::failure(op, err),
            };
            let result = server.store.update_category(UpdateCategoryRequest {
                id: category.id,
                name,
                actor_id: user.id,
            });
            match result {
                Ok(category) => {
                    OpResponse::success(op, json!({ "category": render::category_json(&category) }))
                }
                Err(err) => store_failure(op, err),
            }
        }
        "del" => {
            let category = match owned_category(server, request, project.id) {
                Ok(category) => category,
                Err(response) => return *response,
            };
            match server.store.delete_category(category.id, user.id) {
                Ok(()) => OpResponse::success(op, json!({})),
                Err(err) => store_failure(op, err),
            }
        }
        _ => OpResponse::failure(
            op,
            OpError::new("INVALID_INPUT", "op must be one of add|edit|del"),
        ),
    }
}

/// Categories are only reachable through their owning project; an id from a
/// different project reads as absent.
pub(super) fn owned_category(
    server: &Server,
    request: &OpRequest,
    project_id: i64,
) -> Result<sb_core::model::Category, Box<OpResponse>> {
    let op = request.op.as_str();
    let category_id = match require_i64(&request.args, "category_id") {
        Ok(value) => value,
        Err(err) => return Err(Box::new(OpResponse::failure(op, err))),
    };
    match server.store.get_category(category_id) {
        Ok(Some(category)) if category.project_id == project_id => Ok(category),
        Ok(_) => Err(Box::new(store_failure(op, StoreError::UnknownCategory))),
        Err(err) => Err(Box::new(store_failure(op, err))),
    }
}
