use super::envelope::{OpError, OpRequest, OpResponse, require_i64};
use super::{gate_failure, render, store_failure};
use crate::dashboard::project_progress;
use crate::gate;
use crate::server::Server;
use crate::support::today_utc;
use serde_json::json;

/// Read-only rollup of the current tree; recomputed on every call, nothing
/// cached between requests.
pub(super) fn view(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let user = match gate::resolve_user(&server.store, request.user_id) {
        Ok(user) => user,
        Err(err) => return gate_failure(op, err),
    };
    let project_id = match require_i64(&request.args, "project_id") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    let project = match server.store.get_project(project_id) {
        Ok(Some(project)) => project,
        Ok(None) => return OpResponse::failure(op, OpError::new("NOT_FOUND", "project not found")),
        Err(err) => return store_failure(op, err),
    };
    match gate::can_view(&server.store, &user, &project) {
        Ok(true) => {}
        Ok(false) => {
            return OpResponse::failure(op, OpError::new("NOT_PERMITTED", "not permitted"));
        }
        Err(err) => return store_failure(op, err),
    }

    let categories = match server.store.list_categories(project.id) {
        Ok(categories) => categories,
        Err(err) => return store_failure(op, err),
    };
    let mut tree = Vec::with_capacity(categories.len());
    for category in categories {
        let features = match server.store.list_features(category.id) {
            Ok(features) => features,
            Err(err) => return store_failure(op, err),
        };
        tree.push((category, features));
    }

    let progress = project_progress(&project, &tree, today_utc());
    OpResponse::success(
        op,
        json!({
            "project": render::project_json(&project),
            "progress": render::project_progress_json(&progress),
        }),
    )
}
