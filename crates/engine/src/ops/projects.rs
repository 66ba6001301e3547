use super::envelope::{OpError, OpRequest, OpResponse, optional_str, require_i64, require_str};
use super::{gate_failure, render, store_failure};
use crate::gate;
use crate::server::Server;
use sb_core::model::{Project, ProjectStatus, User};
use sb_core::names::ShortName;
use sb_storage::{CreateProjectRequest, StoreError, UpdateProjectRequest};
use serde_json::json;

pub(super) fn list(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let user = match gate::authorize_project_owner(&server.store, request.user_id) {
        Ok(user) => user,
        Err(err) => return gate_failure(op, err),
    };

    match server.store.list_projects_owned_by(user.id) {
        Ok(projects) => OpResponse::success(
            op,
            json!({ "projects": projects.iter().map(render::project_json).collect::<Vec<_>>() }),
        ),
        Err(err) => store_failure(op, err),
    }
}

pub(super) fn create(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let user = match gate::authorize_project_owner(&server.store, request.user_id) {
        Ok(user) => user,
        Err(err) => return gate_failure(op, err),
    };
    let fields = match project_fields(request) {
        Ok(fields) => fields,
        Err(err) => return OpResponse::failure(op, err),
    };

    let result = server.store.create_project(CreateProjectRequest {
        short_name: fields.short_name,
        name: fields.name,
        description: fields.description,
        status: fields.status,
        owner_id: user.id,
        actor_id: user.id,
    });
    match result {
        Ok(project) => OpResponse::success(op, json!({ "project": render::project_json(&project) })),
        Err(err) => store_failure(op, err),
    }
}

pub(super) fn update(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let (user, project) = match mutable_project(server, request) {
        Ok(pair) => pair,
        Err(response) => return *response,
    };
    let fields = match project_fields(request) {
        Ok(fields) => fields,
        Err(err) => return OpResponse::failure(op, err),
    };

    let result = server.store.update_project(UpdateProjectRequest {
        id: project.id,
        short_name: fields.short_name,
        name: fields.name,
        description: fields.description,
        status: fields.status,
        actor_id: user.id,
    });
    match result {
        Ok(project) => OpResponse::success(op, json!({ "project": render::project_json(&project) })),
        Err(err) => store_failure(op, err),
    }
}

pub(super) fn delete(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let (user, project) = match mutable_project(server, request) {
        Ok(pair) => pair,
        Err(response) => return *response,
    };

    match server.store.delete_project(project.id, user.id) {
        Ok(()) => OpResponse::success(op, json!({})),
        Err(err) => store_failure(op, err),
    }
}

pub(super) fn detail(server: &mut Server, request: &OpRequest) -> OpResponse {
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
    let mut category_views = Vec::with_capacity(categories.len());
    for category in &categories {
        let features = match server.store.list_features(category.id) {
            Ok(features) => features,
            Err(err) => return store_failure(op, err),
        };
        let mut view = render::category_json(category);
        if let Some(object) = view.as_object_mut() {
            object.insert(
                "features".to_string(),
                json!(features.iter().map(render::feature_json).collect::<Vec<_>>()),
            );
        }
        category_views.push(view);
    }

    let grants = match server.store.list_grants_for_project(project.id) {
        Ok(grants) => grants,
        Err(err) => return store_failure(op, err),
    };

    OpResponse::success(
        op,
        json!({
            "project": render::project_json(&project),
            "categories": category_views,
            "grants": grants.iter().map(render::grant_json).collect::<Vec<_>>(),
        }),
    )
}

struct ProjectFields {
    short_name: ShortName,
    name: String,
    description: String,
    status: ProjectStatus,
}

fn project_fields(request: &OpRequest) -> Result<ProjectFields, OpError> {
    let short_name = require_str(&request.args, "short_name")?;
    let short_name = ShortName::try_new(short_name)
        .map_err(|err| OpError::new("INVALID_INPUT", err.to_string()))?;
    let name = require_str(&request.args, "name")?.to_string();
    let description = optional_str(&request.args, "description").to_string();
    let status = ProjectStatus::parse(require_str(&request.args, "status")?)
        .ok_or_else(|| OpError::new("INVALID_INPUT", "unknown project status"))?;
    Ok(ProjectFields {
        short_name,
        name,
        description,
        status,
    })
}

/// Shared gate for the project mutators: caller must hold an owner-capable
/// role, the project must exist, and the caller must be its owner or an
/// admin.
pub(super) fn mutable_project(
    server: &Server,
    request: &OpRequest,
) -> Result<(User, Project), Box<OpResponse>> {
    let op = request.op.as_str();
    let user = match gate::authorize_project_owner(&server.store, request.user_id) {
        Ok(user) => user,
        Err(err) => return Err(Box::new(gate_failure(op, err))),
    };
    let project_id = match require_i64(&request.args, "project_id") {
        Ok(value) => value,
        Err(err) => return Err(Box::new(OpResponse::failure(op, err))),
    };
    let project = match server.store.get_project(project_id) {
        Ok(Some(project)) => project,
        Ok(None) => return Err(Box::new(store_failure(op, StoreError::UnknownProject))),
        Err(err) => return Err(Box::new(store_failure(op, err))),
    };
    if !gate::can_mutate(&user, &project) {
        return Err(Box::new(OpResponse::failure(
            op,
            OpError::new("NOT_PERMITTED", "not permitted"),
        )));
    }
    Ok((user, project))
}
