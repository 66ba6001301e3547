#![forbid(unsafe_code)]

use sb_core::model::{ProjectStatus, Role};
use sb_core::names::{EmailAddress, ShortName};
use sb_storage::{CreateProjectRequest, CreateUserRequest, SqliteStore, StoreError};
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

fn user_request(email: &str, role: Role) -> CreateUserRequest {
    CreateUserRequest {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: EmailAddress::try_new(email).expect("email"),
        password_digest: "digest".to_string(),
        password_salt: "salt".to_string(),
        role,
        actor_id: None,
    }
}

#[test]
fn emails_are_unique_case_insensitively() {
    let storage_dir = temp_dir("email_unique");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    store
        .create_user(user_request("someone@example.com", Role::Guest))
        .expect("create user");
    let duplicate = store.create_user(user_request("Someone@Example.COM", Role::Guest));
    assert!(matches!(duplicate, Err(StoreError::DuplicateEmail)));
}

#[test]
fn lookup_by_email_ignores_case() {
    let storage_dir = temp_dir("email_lookup");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let created = store
        .create_user(user_request("someone@example.com", Role::Guest))
        .expect("create user");

    let found = store
        .find_user_by_email("  SOMEONE@example.COM ")
        .expect("lookup")
        .expect("user found");
    assert_eq!(found.id, created.id);
    assert_eq!(found.email, "someone@example.com");

    assert!(
        store
            .find_user_by_email("nobody@example.com")
            .expect("lookup")
            .is_none()
    );
}

#[test]
fn role_changes_persist() {
    let storage_dir = temp_dir("role_change");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let admin = store
        .create_user(user_request("admin@example.com", Role::Admin))
        .expect("create admin");
    let guest = store
        .create_user(user_request("guest@example.com", Role::Guest))
        .expect("create guest");

    let promoted = store
        .set_user_role(guest.id, Role::ProductOwner, admin.id)
        .expect("promote");
    assert_eq!(promoted.role, Role::ProductOwner);

    let reloaded = store
        .get_user(guest.id)
        .expect("get user")
        .expect("user exists");
    assert_eq!(reloaded.role, Role::ProductOwner);

    let missing = store.set_user_role(999, Role::Guest, admin.id);
    assert!(matches!(missing, Err(StoreError::UnknownUser)));
}

#[test]
fn removing_a_project_owner_is_refused() {
    let storage_dir = temp_dir("remove_owner");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let admin = store
        .create_user(user_request("admin@example.com", Role::Admin))
        .expect("create admin");
    let owner = store
        .create_user(user_request("owner@example.com", Role::ProductOwner))
        .expect("create owner");
    let project = store
        .create_project(CreateProjectRequest {
            short_name: ShortName::try_new("acme").expect("short name"),
            name: "ACME".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            owner_id: owner.id,
            actor_id: admin.id,
        })
        .expect("create project");

    let refused = store.remove_user(owner.id, admin.id);
    assert!(matches!(refused, Err(StoreError::UserOwnsProjects)));
    assert!(store.get_user(owner.id).expect("get user").is_some());

    // Once the project is gone the removal goes through.
    store
        .delete_project(project.id, admin.id)
        .expect("delete project");
    store.remove_user(owner.id, admin.id).expect("remove owner");
    assert!(store.get_user(owner.id).expect("get user").is_none());
}

#[test]
fn removing_a_user_revokes_their_grants() {
    let storage_dir = temp_dir("remove_grants");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let admin = store
        .create_user(user_request("admin@example.com", Role::Admin))
        .expect("create admin");
    let owner = store
        .create_user(user_request("owner@example.com", Role::ProductOwner))
        .expect("create owner");
    let guest = store
        .create_user(user_request("guest@example.com", Role::Guest))
        .expect("create guest");

    let project = store
        .create_project(CreateProjectRequest {
            short_name: ShortName::try_new("acme").expect("short name"),
            name: "ACME".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            owner_id: owner.id,
            actor_id: owner.id,
        })
        .expect("create project");
    store
        .grant_access(project.id, guest.id, owner.id)
        .expect("grant");

    store.remove_user(guest.id, admin.id).expect("remove guest");

    assert!(
        store
            .list_grants_for_project(project.id)
            .expect("list grants")
            .is_empty(),
        "grants must be revoked with the user"
    );
}

#[test]
fn mutations_leave_an_audit_trail() {
    let storage_dir = temp_dir("audit_trail");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let owner = store
        .create_user(user_request("owner@example.com", Role::ProductOwner))
        .expect("create owner");
    store
        .create_project(CreateProjectRequest {
            short_name: ShortName::try_new("acme").expect("short name"),
            name: "ACME".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            owner_id: owner.id,
            actor_id: owner.id,
        })
        .expect("create project");

    let events = store.list_events(10).expect("list events");
    let types: Vec<&str> = events
        .iter()
        .map(|event| event.event_type.as_str())
        .collect();
    assert!(types.contains(&"project_created"));
    assert!(types.contains(&"user_created"));
}
