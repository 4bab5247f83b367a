use inkpot_core::{Profile, ProfilePatch, User, UserValidationError};
use std::collections::BTreeSet;

fn sample_user() -> User {
    User {
        id: 1,
        email: "ada@example.com".to_string(),
        name: "ada".to_string(),
        password: "s3cret".to_string(),
        profile: Profile::default(),
        roles: BTreeSet::from(["gamer".to_string(), "investor".to_string()]),
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}

#[test]
fn validate_accepts_complete_record() {
    assert!(sample_user().validate().is_ok());
}

#[test]
fn validate_rejects_blank_email() {
    let mut user = sample_user();
    user.email = "   ".to_string();

    assert_eq!(user.validate(), Err(UserValidationError::BlankEmail));
}

#[test]
fn validate_rejects_blank_password() {
    let mut user = sample_user();
    user.password = String::new();

    assert_eq!(user.validate(), Err(UserValidationError::BlankPassword));
}

#[test]
fn validate_rejects_empty_roles() {
    let mut user = sample_user();
    user.roles.clear();

    assert_eq!(user.validate(), Err(UserValidationError::EmptyRoles));
}

#[test]
fn touch_bumps_updated_at_only() {
    let mut user = sample_user();
    user.touch(1_700_000_005_000);

    assert_eq!(user.created_at, 1_700_000_000_000);
    assert_eq!(user.updated_at, 1_700_000_005_000);
}

#[test]
fn profile_patch_sets_only_provided_fields() {
    let mut profile = Profile {
        bio: Some("original bio".to_string()),
        avatar_url: None,
        location: Some("London".to_string()),
        website: None,
    };

    profile.apply(&ProfilePatch {
        avatar_url: Some("https://example.com/a.png".to_string()),
        ..ProfilePatch::default()
    });

    assert_eq!(profile.bio.as_deref(), Some("original bio"));
    assert_eq!(profile.avatar_url.as_deref(), Some("https://example.com/a.png"));
    assert_eq!(profile.location.as_deref(), Some("London"));
    assert_eq!(profile.website, None);
}

#[test]
fn profile_patch_is_last_write_wins_per_field() {
    let mut profile = Profile::default();

    profile.apply(&ProfilePatch {
        bio: Some("first".to_string()),
        ..ProfilePatch::default()
    });
    profile.apply(&ProfilePatch {
        bio: Some("second".to_string()),
        ..ProfilePatch::default()
    });

    assert_eq!(profile.bio.as_deref(), Some("second"));
}

#[test]
fn empty_patch_cannot_clear_fields() {
    let mut profile = Profile {
        bio: Some("kept".to_string()),
        ..Profile::default()
    };

    profile.apply(&ProfilePatch::default());

    assert_eq!(profile.bio.as_deref(), Some("kept"));
}

#[test]
fn wire_format_keeps_sorted_roles_and_named_fields() {
    let user = sample_user();
    let json = serde_json::to_value(&user).expect("user should serialize");

    assert_eq!(json["id"], 1);
    assert_eq!(json["email"], "ada@example.com");
    assert_eq!(json["roles"], serde_json::json!(["gamer", "investor"]));
    assert_eq!(json["profile"]["bio"], serde_json::Value::Null);
}

#[test]
fn missing_profile_field_deserializes_to_default() {
    let text = r#"{
        "id": 4,
        "email": "grace@example.com",
        "name": "grace",
        "password": "pw",
        "roles": ["maker"],
        "created_at": 0,
        "updated_at": 0
    }"#;

    let user: User = serde_json::from_str(text).expect("record without profile should parse");

    assert_eq!(user.profile, Profile::default());
    assert!(user.roles.contains("maker"));
}
