#![forbid(unsafe_code)]

use sb_core::model::{FeatureStatus, PercentDone, ProjectStatus, Role};
use sb_core::names::{EmailAddress, ShortName};
use sb_storage::{
    CreateCategoryRequest, CreateFeatureRequest, CreateProjectRequest, CreateUserRequest,
    SqliteStore,
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

#[test]
fn deleting_a_project_removes_the_whole_subtree_and_grants() {
    let storage_dir = temp_dir("cascade_subtree");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let owner = add_user(&mut store, "owner@example.com", Role::ProductOwner);
    let guest_a = add_user(&mut store, "guest.a@example.com", Role::Guest);
    let guest_b = add_user(&mut store, "guest.b@example.com", Role::Guest);

    let project = store
        .create_project(CreateProjectRequest {
            short_name: ShortName::try_new("acme").expect("short name"),
            name: "ACME".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            owner_id: owner,
            actor_id: owner,
        })
        .expect("create project");

    let backend = store
        .create_category(CreateCategoryRequest {
            project_id: project.id,
            name: "Backend".to_string(),
            actor_id: owner,
        })
        .expect("create backend");
    let frontend = store
        .create_category(CreateCategoryRequest {
            project_id: project.id,
            name: "Frontend".to_string(),
            actor_id: owner,
        })
        .expect("create frontend");

    let mut feature_ids = Vec::new();
    for (category_id, short_name) in [
        (backend.id, "api"),
        (backend.id, "db"),
        (frontend.id, "ui"),
    ] {
        let feature = store
            .create_feature(CreateFeatureRequest {
                category_id,
                short_name: ShortName::try_new(short_name).expect("short name"),
                name: short_name.to_uppercase(),
                percent_done: PercentDone::try_new(40).expect("percent"),
                status: FeatureStatus::InProgress,
                estimated_end_date: None,
                actor_id: owner,
            })
            .expect("create feature");
        feature_ids.push(feature.id);
    }

    store
        .grant_access(project.id, guest_a, owner)
        .expect("grant a");
    store
        .grant_access(project.id, guest_b, owner)
        .expect("grant b");
    assert_eq!(
        store
            .list_grants_for_project(project.id)
            .expect("list grants")
            .len(),
        2
    );

    store
        .delete_project(project.id, owner)
        .expect("delete project");

    assert!(
        store.get_project(project.id).expect("get project").is_none(),
        "project row must be gone"
    );
    for category_id in [backend.id, frontend.id] {
        assert!(
            store
                .get_category(category_id)
                .expect("get category")
                .is_none(),
            "category rows must be gone"
        );
    }
    for feature_id in feature_ids {
        assert!(
            store.get_feature(feature_id).expect("get feature").is_none(),
            "feature rows must be gone"
        );
    }
    assert!(
        store
            .list_grants_for_project(project.id)
            .expect("list grants")
            .is_empty(),
        "grant rows must be gone"
    );
    assert!(
        store
            .list_projects_granted_to(guest_a)
            .expect("granted list")
            .is_empty()
    );
}

#[test]
fn deleting_a_category_removes_its_features_only() {
    let storage_dir = temp_dir("cascade_category");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let owner = add_user(&mut store, "owner@example.com", Role::ProductOwner);
    let project = store
        .create_project(CreateProjectRequest {
            short_name: ShortName::try_new("acme").expect("short name"),
            name: "ACME".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            owner_id: owner,
            actor_id: owner,
        })
        .expect("create project");

    let doomed = store
        .create_category(CreateCategoryRequest {
            project_id: project.id,
            name: "Doomed".to_string(),
            actor_id: owner,
        })
        .expect("create category");
    let survivor = store
        .create_category(CreateCategoryRequest {
            project_id: project.id,
            name: "Survivor".to_string(),
            actor_id: owner,
        })
        .expect("create category");

    let doomed_feature = store
        .create_feature(CreateFeatureRequest {
            category_id: doomed.id,
            short_name: ShortName::try_new("gone").expect("short name"),
            name: "Gone".to_string(),
            percent_done: PercentDone::ZERO,
            status: FeatureStatus::NotStarted,
            estimated_end_date: None,
            actor_id: owner,
        })
        .expect("create feature");
    let kept_feature = store
        .create_feature(CreateFeatureRequest {
            category_id: survivor.id,
            short_name: ShortName::try_new("kept").expect("short name"),
            name: "Kept".to_string(),
            percent_done: PercentDone::ZERO,
            status: FeatureStatus::NotStarted,
            estimated_end_date: None,
            actor_id: owner,
        })
        .expect("create feature");

    store
        .delete_category(doomed.id, owner)
        .expect("delete category");

    assert!(
        store
            .get_feature(doomed_feature.id)
            .expect("get feature")
            .is_none()
    );
    assert!(
        store
            .get_feature(kept_feature.id)
            .expect("get feature")
            .is_some(),
        "sibling category must be untouched"
    );
    assert!(store.get_category(survivor.id).expect("get").is_some());
}

#[test]
fn children_list_in_creation_order() {
    let storage_dir = temp_dir("creation_order");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let owner = add_user(&mut store, "owner@example.com", Role::ProductOwner);
    let project = store
        .create_project(CreateProjectRequest {
            short_name: ShortName::try_new("acme").expect("short name"),
            name: "ACME".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            owner_id: owner,
            actor_id: owner,
        })
        .expect("create project");

    for name in ["Zulu", "Alpha", "Mike"] {
        store
            .create_category(CreateCategoryRequest {
                project_id: project.id,
                name: name.to_string(),
                actor_id: owner,
            })
            .expect("create category");
    }

    let names: Vec<String> = store
        .list_categories(project.id)
        .expect("list categories")
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(
        names,
        vec!["Zulu".to_string(), "Alpha".to_string(), "Mike".to_string()],
        "insertion order, not alphabetical"
    );
}
