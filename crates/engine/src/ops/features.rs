use super::categories::owned_category;
use super::envelope::{OpError, OpRequest, OpResponse, optional_str, require_i64, require_str};
use super::{projects, render, store_failure};
use crate::server::Server;
use crate::support::normalize_date_input;
use sb_core::model::{FeatureStatus, PercentDone};
use sb_core::names::ShortName;
use sb_storage::{CreateFeatureRequest, StoreError, UpdateFeatureRequest};
use serde_json::json;

/// Feature form endpoint, multiplexed by `op` like the category one.
pub(super) fn apply(server: &mut Server, request: &OpRequest) -> OpResponse {
    let op = request.op.as_str();
    let (user, project) = match projects::mutable_project(server, request) {
        Ok(pair) => pair,
        Err(response) => return *response,
    };
    let category = match owned_category(server, request, project.id) {
        Ok(category) => category,
        Err(response) => return *response,
    };
    let kind = match require_str(&request.args, "op") {
        Ok(value) => value,
        Err(err) => return OpResponse::failure(op, err),
    };

    match kind {
        "add" => {
            let fields = match feature_fields(request) {
                Ok(fields) => fields,
                Err(err) => return OpResponse::failure(op, err),
            };
            let result = server.store.create_feature(CreateFeatureRequest {
                category_id: category.id,
                short_name: fields.short_name,
                name: fields.name,
                percent_done: fields.percent_done,
                status: fields.status,
                estimated_end_date: fields.estimated_end_date,
                actor_id: user.id,
            });
            match result {
                Ok(feature) => {
                    OpResponse::success(op, json!({ "feature": render::feature_json(&feature) }))
                }
                Err(err) => store_failure(op, err),
            }
        }
        "edit" => {
            let feature = match owned_feature(server, request, category.id) {
                Ok(feature) => feature,
                Err(response) => return *response,
            };
            let fields = match feature_fields(request) {
                Ok(fields) => fields,
                Err(err) => return OpResponse::failure(op, err),
            };
            let result = server.store.update_feature(UpdateFeatureRequest {
                id: feature.id,
                short_name: fields.short_name,
                name: fields.name,
                percent_done: fields.percent_done,
                status: fields.status,
                estimated_end_date: fields.estimated_end_date,
                actor_id: user.id,
            });
            match result {
                Ok(feature) => {
                    OpResponse::success(op, json!({ "feature": render::feature_json(&feature) }))
                }
                Err(err) => store_failure(op, err),
            }
        }
        "del" => {
            let feature = match owned_feature(server, request, category.id) {
                Ok(feature) => feature,
                Err(response) => return *response,
            };
            match server.store.delete_feature(feature.id, user.id) {
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

struct FeatureFields {
    short_name: ShortName,
    name: String,
    percent_done: PercentDone,
    status: FeatureStatus,
    estimated_end_date: Option<String>,
}

fn feature_fields(request: &OpRequest) -> Result<FeatureFields, OpError> {
    let short_name = require_str(&request.args, "short_name")?;
    let short_name = ShortName::try_new(short_name)
        .map_err(|err| OpError::new("INVALID_INPUT", err.to_string()))?;
    let name = require_str(&request.args, "name")?.to_string();
    let percent = require_i64(&request.args, "percent_done")?;
    let percent_done =
        PercentDone::try_new(percent).map_err(|err| OpError::new("INVALID_RANGE", err.to_string()))?;
    let status = FeatureStatus::parse(require_str(&request.args, "status")?)
        .ok_or_else(|| OpError::new("INVALID_INPUT", "unknown feature status"))?;
    let estimated_end_date = normalize_date_input(optional_str(&request.args, "estimated_end_date"))
        .map_err(|err| OpError::new("INVALID_DATE", err.to_string()))?;
    Ok(FeatureFields {
        short_name,
        name,
        percent_done,
        status,
        estimated_end_date,
    })
}

fn owned_feature(
    server: &Server,
    request: &OpRequest,
    category_id: i64,
) -> Result<sb_core::model::Feature, Box<OpResponse>> {
    let op = request.op.as_str();
    let feature_id = match require_i64(&request.args, "feature_id") {
        Ok(value) => value,
        Err(err) => return Err(Box::new(OpResponse::failure(op, err))),
    };
    match server.store.get_feature(feature_id) {
        Ok(Some(feature)) if feature.category_id == category_id => Ok(feature),
        Ok(_) => Err(Box::new(store_failure(op, StoreError::UnknownFeature))),
        Err(err) => Err(Box::new(store_failure(op, err))),
    }
}
