use sb_core::model::{Project, User};
use sb_storage::{SqliteStore, StoreError};

#[derive(Debug)]
pub enum GateError {
    /// Caller identity does not resolve to a known user.
    InvalidSession,
    /// Caller resolved but lacks the role for the operation.
    InsufficientRole,
    Store(StoreError),
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSession => write!(f, "invalid session"),
            Self::InsufficientRole => write!(f, "insufficient role"),
            Self::Store(err) => write!(f, "store: {err}"),
        }
    }
}

impl std::error::Error for GateError {}

impl From<StoreError> for GateError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

#[derive(Clone, Debug)]
pub struct VisibleProjects {
    pub owned: Vec<Project>,
    pub granted: Vec<Project>,
}

pub fn resolve_user(store: &SqliteStore, user_id: Option<i64>) -> Result<User, GateError> {
    let Some(user_id) = user_id else {
        return Err(GateError::InvalidSession);
    };
    match store.get_user(user_id)? {
        Some(user) => Ok(user),
        None => Err(GateError::InvalidSession),
    }
}

pub fn authorize_project_owner(
    store: &SqliteStore,
    user_id: Option<i64>,
) -> Result<User, GateError> {
    let user = resolve_user(store, user_id)?;
    if !user.role.can_own_projects() {
        return Err(GateError::InsufficientRole);
    }
    Ok(user)
}

pub fn authorize_admin(store: &SqliteStore, user_id: Option<i64>) -> Result<User, GateError> {
    let user = resolve_user(store, user_id)?;
    if !user.role.is_admin() {
        return Err(GateError::InsufficientRole);
    }
    Ok(user)
}

pub fn can_mutate(user: &User, project: &Project) -> bool {
    project.owner_id == user.id || user.role.is_admin()
}

/// Owner, admin, or grant holder. Read-only counterpart of `can_mutate`.
pub fn can_view(store: &SqliteStore, user: &User, project: &Project) -> Result<bool, StoreError> {
    if can_mutate(user, project) {
        return Ok(true);
    }
    store.has_grant(project.id, user.id)
}

/// Owned and granted are disjoint: the owner is never in the grant set (the
/// registry rejects such grants), so no project appears twice.
pub fn visible_projects(store: &SqliteStore, user_id: i64) -> Result<VisibleProjects, StoreError> {
    Ok(VisibleProjects {
        owned: store.list_projects_owned_by(user_id)?,
        granted: store.list_projects_granted_to(user_id)?,
    })
}
