#![forbid(unsafe_code)]

use sb_core::model::{ProjectStatus, Role};
use sb_core::names::{EmailAddress, ShortName};
use sb_storage::{
    CreateProjectRequest, CreateUserRequest, GrantOutcome, RevokeOutcome, SqliteStore, StoreError,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("sb_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn add_user(store: &mut SqliteStore, email: &str, role: Role) -> i64 {
    store
        .create_user(CreateUserRequest {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: EmailAddress::try_new(email).expect("email"),
            password_digest: "digest".to_string(),
            password_salt: "salt".to_string(),
            role,
            actor_id: None,
        })
        .expect("create user")
        .id
}

fn setup(test_name: &str) -> (SqliteStore, i64, i64, i64) {
    let storage_dir = temp_dir(test_name);
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let owner = add_user(&mut store, "owner@example.com", Role::ProductOwner);
    let guest = add_user(&mut store, "guest@example.com", Role::Guest);
    let project = store
        .create_project(CreateProjectRequest {
            short_name: ShortName::try_new("acme").expect("short name"),
            name: "ACME".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            owner_id: owner,
            actor_id: owner,
        })
        .expect("create project")
        .id;
    (store, owner, guest, project)
}

#[test]
fn the_owner_can_never_be_granted() {
    let (mut store, owner, _, project) = setup("owner_grant");
    let result = store.grant_access(project, owner, owner);
    assert!(matches!(result, Err(StoreError::OwnerCannotBeGranted)));
    assert!(
        store
            .list_grants_for_project(project)
            .expect("list grants")
            .is_empty()
    );
}

#[test]
fn granting_twice_reports_already_granted_without_a_second_row() {
    let (mut store, owner, guest, project) = setup("double_grant");

    let first = store.grant_access(project, guest, owner).expect("grant");
    assert_eq!(first, GrantOutcome::Granted);

    let second = store.grant_access(project, guest, owner).expect("re-grant");
    assert_eq!(second, GrantOutcome::AlreadyGranted);

    assert_eq!(
        store
            .list_grants_for_project(project)
            .expect("list grants")
            .len(),
        1,
        "re-granting must not create a second row"
    );
}

#[test]
fn revoke_is_idempotent() {
    let (mut store, owner, guest, project) = setup("double_revoke");

    store.grant_access(project, guest, owner).expect("grant");
    let first = store.revoke_access(project, guest, owner).expect("revoke");
    assert_eq!(first, RevokeOutcome::Revoked);

    let second = store
        .revoke_access(project, guest, owner)
        .expect("re-revoke");
    assert_eq!(second, RevokeOutcome::NothingToRevoke);

    // And once more against a grant that never existed.
    let never = store
        .revoke_access(project, owner, owner)
        .expect("revoke absent");
    assert_eq!(never, RevokeOutcome::NothingToRevoke);
}

#[test]
fn grants_require_existing_user_and_project() {
    let (mut store, owner, guest, project) = setup("grant_missing");

    let missing_project = store.grant_access(999, guest, owner);
    assert!(matches!(missing_project, Err(StoreError::UnknownProject)));

    let missing_user = store.grant_access(project, 999, owner);
    assert!(matches!(missing_user, Err(StoreError::UnknownUser)));
}

#[test]
fn granted_projects_show_up_for_the_guest() {
    let (mut store, owner, guest, project) = setup("grant_visibility");

    store.grant_access(project, guest, owner).expect("grant");

    let granted = store.list_projects_granted_to(guest).expect("granted");
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].id, project);
    assert!(
        store
            .list_projects_owned_by(guest)
            .expect("owned")
            .is_empty()
    );
    assert!(store.has_grant(project, guest).expect("has grant"));
}
