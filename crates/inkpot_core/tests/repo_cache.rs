use inkpot_core::{
    BlogRepoError, BlogRepository, JsonFileStore, MemoryStore, NewBlog, StoreError, UserRepoError,
    UserRepository,
};
use std::fs;

fn new_blog(title: &str) -> NewBlog {
    NewBlog {
        title: title.to_string(),
        author: "ada".to_string(),
        content: "body".to_string(),
    }
}

#[test]
fn open_requires_an_existing_collection() {
    let dir = tempfile::tempdir().unwrap();

    let err = UserRepository::open(JsonFileStore::new(dir.path())).unwrap_err();

    assert!(matches!(
        err,
        UserRepoError::Store(StoreError::Missing { .. })
    ));
}

#[test]
fn open_or_init_bootstraps_an_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    let repo = UserRepository::open_or_init(store.clone()).unwrap();
    assert!(repo.list().is_empty());

    let text = fs::read_to_string(store.collection_path("users")).unwrap();
    assert_eq!(text, "[]\n");

    // the strict constructor now succeeds over the primed directory
    let reopened = UserRepository::open(store).unwrap();
    assert!(reopened.list().is_empty());
}

#[test]
fn load_rejects_duplicate_user_ids() {
    let store = MemoryStore::new();
    store.put_raw(
        "users",
        r#"[
  {"id": 1, "email": "a@example.com", "name": "a", "password": "pw", "roles": ["maker"], "created_at": 0, "updated_at": 0},
  {"id": 1, "email": "b@example.com", "name": "b", "password": "pw", "roles": ["maker"], "created_at": 0, "updated_at": 0}
]"#,
    );

    let err = UserRepository::open(store).unwrap_err();

    assert!(matches!(err, UserRepoError::InvalidData(_)));
}

#[test]
fn load_rejects_duplicate_emails_case_insensitively() {
    let store = MemoryStore::new();
    store.put_raw(
        "users",
        r#"[
  {"id": 1, "email": "Ada@Example.com", "name": "a", "password": "pw", "roles": ["maker"], "created_at": 0, "updated_at": 0},
  {"id": 2, "email": "ada@example.com", "name": "b", "password": "pw", "roles": ["maker"], "created_at": 0, "updated_at": 0}
]"#,
    );

    let err = UserRepository::open(store).unwrap_err();

    assert!(matches!(err, UserRepoError::InvalidData(_)));
}

#[test]
fn load_rejects_records_that_fail_validation() {
    let store = MemoryStore::new();
    store.put_raw(
        "users",
        r#"[
  {"id": 1, "email": "a@example.com", "name": "a", "password": "pw", "roles": [], "created_at": 0, "updated_at": 0}
]"#,
    );

    let err = UserRepository::open(store).unwrap_err();

    assert!(matches!(err, UserRepoError::InvalidData(_)));
}

#[test]
fn load_rejects_duplicate_blog_ids() {
    let store = MemoryStore::new();
    store.put_raw(
        "blogs",
        r#"[
  {"id": 3, "title": "one", "author": "ada", "content": "", "created_at": 0, "updated_at": 0},
  {"id": 3, "title": "two", "author": "ada", "content": "", "created_at": 0, "updated_at": 0}
]"#,
    );

    let err = BlogRepository::open(store).unwrap_err();

    assert!(matches!(err, BlogRepoError::InvalidData(_)));
}

#[test]
fn hand_authored_collection_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("users.json"),
        r#"[
  {
    "id": 1,
    "email": "ada@example.com",
    "name": "Ada",
    "password": "pw",
    "roles": ["maker"],
    "created_at": 1700000000000,
    "updated_at": 1700000000000
  }
]
"#,
    )
    .unwrap();

    let repo = UserRepository::open(JsonFileStore::new(dir.path())).unwrap();

    let user = repo.find_by_email("ADA@example.com ").expect("user should load");
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "Ada");
    assert_eq!(repo.list().len(), 1);
}

#[test]
fn id_assignment_resumes_from_the_highest_persisted_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    {
        let repo = BlogRepository::open_or_init(store.clone()).unwrap();
        assert_eq!(repo.create(new_blog("first")).unwrap().id, 1);
        assert_eq!(repo.create(new_blog("second")).unwrap().id, 2);
    }

    let repo = BlogRepository::open(store).unwrap();
    assert_eq!(repo.create(new_blog("third")).unwrap().id, 3);
}
