use crate::credentials;
use sb_core::model::{Role, User};
use sb_core::names::{EmailAddress, EmailError};
use sb_storage::{CreateUserRequest, SqliteStore, StoreError};

#[derive(Debug)]
pub enum IdentityError {
    Email(EmailError),
    Store(StoreError),
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email(err) => write!(f, "email: {err}"),
            Self::Store(err) => write!(f, "store: {err}"),
        }
    }
}

impl std::error::Error for IdentityError {}

impl From<EmailError> for IdentityError {
    fn from(value: EmailError) -> Self {
        Self::Email(value)
    }
}

impl From<StoreError> for IdentityError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangePasswordOutcome {
    Changed,
    UnknownEmail,
    AccessDenied,
}

/// Credential checking is opaque to the rest of the engine: a caller gets a
/// resolved `User` or nothing, never the reason.
pub fn authenticate(
    store: &SqliteStore,
    email: &str,
    password: &str,
) -> Result<Option<User>, StoreError> {
    match store.credential_for_email(email)? {
        Some((user, credential)) if credentials::verify(&credential, password) => Ok(Some(user)),
        _ => Ok(None),
    }
}

/// Self-registration and the admin form both land here; new accounts start as
/// Guest and only an admin promotes them afterwards.
pub fn register_user(
    store: &mut SqliteStore,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
    actor_id: Option<i64>,
) -> Result<User, IdentityError> {
    let email = EmailAddress::try_new(email)?;
    let credential = credentials::new_credential(password);
    let user = store.create_user(CreateUserRequest {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email,
        password_digest: credential.digest,
        password_salt: credential.salt,
        role: Role::Guest,
        actor_id,
    })?;
    Ok(user)
}

/// Generates a fresh one-time password and stores its digest. Delivering it
/// is the mail collaborator's job; the caller gets the cleartext exactly once.
pub fn reset_password(
    store: &mut SqliteStore,
    email: &str,
) -> Result<Option<(User, String)>, StoreError> {
    let Some(user) = store.find_user_by_email(email)? else {
        return Ok(None);
    };
    let password = credentials::generate_password();
    let credential = credentials::new_credential(&password);
    store.set_user_password(user.id, credential, None)?;
    Ok(Some((user, password)))
}

pub fn change_password(
    store: &mut SqliteStore,
    email: &str,
    old_password: &str,
    new_password: &str,
) -> Result<ChangePasswordOutcome, StoreError> {
    if store.find_user_by_email(email)?.is_none() {
        return Ok(ChangePasswordOutcome::UnknownEmail);
    }
    let Some(user) = authenticate(store, email, old_password)? else {
        return Ok(ChangePasswordOutcome::AccessDenied);
    };
    let credential = credentials::new_credential(new_password);
    store.set_user_password(user.id, credential, Some(user.id))?;
    Ok(ChangePasswordOutcome::Changed)
}

/// First-run convenience: without at least one admin every mutating operation
/// is unreachable. Only fires on an empty users table.
pub fn bootstrap_admin(
    store: &mut SqliteStore,
    email: &str,
    password: &str,
) -> Result<Option<User>, IdentityError> {
    if !store.list_users()?.is_empty() {
        return Ok(None);
    }
    let email = EmailAddress::try_new(email)?;
    let credential = credentials::new_credential(password);
    let user = store.create_user(CreateUserRequest {
        first_name: "Admin".to_string(),
        last_name: "Admin".to_string(),
        email,
        password_digest: credential.digest,
        password_salt: credential.salt,
        role: Role::Admin,
        actor_id: None,
    })?;
    Ok(Some(user))
}
