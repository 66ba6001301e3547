use sb_core::model::{FeatureStatus, PercentDone, ProjectStatus, Role};
use sb_core::names::{EmailAddress, ShortName};

#[derive(Clone, Debug)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
    pub password_digest: String,
    pub password_salt: String,
    pub role: Role,
    pub actor_id: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct CreateProjectRequest {
    pub short_name: ShortName,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub owner_id: i64,
    pub actor_id: i64,
}

#[derive(Clone, Debug)]
pub struct UpdateProjectRequest {
    pub id: i64,
    pub short_name: ShortName,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub actor_id: i64,
}

#[derive(Clone, Debug)]
pub struct CreateCategoryRequest {
    pub project_id: i64,
    pub name: String,
    pub actor_id: i64,
}

#[derive(Clone, Debug)]
pub struct UpdateCategoryRequest {
    pub id: i64,
    pub name: String,
    pub actor_id: i64,
}

#[derive(Clone, Debug)]
pub struct CreateFeatureRequest {
    pub category_id: i64,
    pub short_name: ShortName,
    pub name: String,
    pub percent_done: PercentDone,
    pub status: FeatureStatus,
    /// ISO-8601 (`YYYY-MM-DD`); format validation happens before the store.
    pub estimated_end_date: Option<String>,
    pub actor_id: i64,
}

#[derive(Clone, Debug)]
pub struct UpdateFeatureRequest {
    pub id: i64,
    pub short_name: ShortName,
    pub name: String,
    pub percent_done: PercentDone,
    pub status: FeatureStatus,
    pub estimated_end_date: Option<String>,
    pub actor_id: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted,
    AlreadyGranted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    NothingToRevoke,
}
