use crate::dashboard::{CategoryProgress, ProjectProgress, StatusCounts};
use sb_core::model::{Category, Feature, Project, User};
use sb_storage::GrantRow;
use serde_json::{Value, json};

pub(crate) fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "email": user.email,
        "role": user.role.as_str(),
    })
}

pub(crate) fn project_json(project: &Project) -> Value {
    json!({
        "id": project.id,
        "short_name": project.short_name,
        "name": project.name,
        "description": project.description,
        "status": project.status.as_str(),
        "owner_id": project.owner_id,
    })
}

pub(crate) fn category_json(category: &Category) -> Value {
    json!({
        "id": category.id,
        "project_id": category.project_id,
        "name": category.name,
    })
}

pub(crate) fn feature_json(feature: &Feature) -> Value {
    json!({
        "id": feature.id,
        "category_id": feature.category_id,
        "short_name": feature.short_name,
        "name": feature.name,
        "percent_done": feature.percent_done.value(),
        "status": feature.status.as_str(),
        "estimated_end_date": feature.estimated_end_date,
    })
}

pub(crate) fn grant_json(grant: &GrantRow) -> Value {
    json!({
        "user_id": grant.user_id,
        "first_name": grant.first_name,
        "last_name": grant.last_name,
        "email": grant.email,
    })
}

fn status_counts_json(counts: &StatusCounts) -> Value {
    json!({
        "not_started": counts.not_started,
        "in_progress": counts.in_progress,
        "blocked": counts.blocked,
        "done": counts.done,
    })
}

pub(crate) fn category_progress_json(progress: &CategoryProgress) -> Value {
    json!({
        "category_id": progress.category_id,
        "name": progress.name,
        "completion": progress.completion,
        "empty": progress.empty,
        "status_counts": status_counts_json(&progress.status_counts),
        "overdue": progress.overdue,
        "inconsistent": progress.inconsistent,
    })
}

pub(crate) fn project_progress_json(progress: &ProjectProgress) -> Value {
    json!({
        "project_id": progress.project_id,
        "completion": progress.completion,
        "empty": progress.empty,
        "status_counts": status_counts_json(&progress.status_counts),
        "overdue": progress.overdue,
        "inconsistent": progress.inconsistent,
        "categories": progress.categories.iter().map(category_progress_json).collect::<Vec<_>>(),
    })
}
