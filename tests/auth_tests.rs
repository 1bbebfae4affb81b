//! Registration, login and token-based authorization.

mod common;

use common::TestEnv;
use studytrack_api::error::ApiError;
use studytrack_api::models::{LoginRequest, RegisterRequest, Role};

fn register_request(username: &str, email: &str, role: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        username: Some(username.to_string()),
        email: Some(email.to_string()),
        password: Some("hunter2!".to_string()),
        role: role.map(str::to_string),
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    }
}

#[test]
fn register_then_login_round_trip() {
    let env = TestEnv::new();
    let auth = env.auth();

    let user = auth
        .register(&register_request("sam", "sam@example.com", None))
        .unwrap();
    assert_eq!(user.role, Role::Student);
    assert!(user.id.starts_with("usr_"));

    let login = auth.login(&login_request("sam@example.com", "hunter2!")).unwrap();
    assert_eq!(login.user.id, user.id);

    let bearer = format!("Bearer {}", login.token);
    let caller = auth.authenticate(Some(&bearer)).unwrap();
    assert_eq!(caller.id, user.id);
    assert_eq!(caller.role, Role::Student);
}

#[test]
fn wrong_password_and_unknown_email_look_identical() {
    let env = TestEnv::new();
    let auth = env.auth();
    auth.register(&register_request("sam", "sam@example.com", None))
        .unwrap();

    let wrong_password = auth
        .login(&login_request("sam@example.com", "nope"))
        .unwrap_err();
    let unknown_email = auth
        .login(&login_request("ghost@example.com", "hunter2!"))
        .unwrap_err();

    assert!(matches!(wrong_password, ApiError::Unauthorized(_)));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[test]
fn duplicate_email_conflicts_and_keeps_the_first_account() {
    let env = TestEnv::new();
    let auth = env.auth();
    auth.register(&register_request("sam", "sam@example.com", None))
        .unwrap();

    let err = auth
        .register(&register_request("sam2", "sam@example.com", None))
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // The original account still logs in with its original password.
    auth.login(&login_request("sam@example.com", "hunter2!"))
        .unwrap();
    assert_eq!(env.users().list().unwrap().len(), 1);
}

#[test]
fn register_validates_fields() {
    let env = TestEnv::new();
    let auth = env.auth();

    let err = auth
        .register(&RegisterRequest {
            username: Some("sam".to_string()),
            email: None,
            password: Some("hunter2!".to_string()),
            role: None,
        })
        .unwrap_err();
    assert!(err.to_string().contains("email"));

    let err = auth
        .register(&register_request("sam", "not-an-email", None))
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid email address");

    let err = auth
        .register(&register_request("sam", "sam@example.com", Some("root")))
        .unwrap_err();
    assert!(err.to_string().contains("Invalid role value"));
}

#[test]
fn missing_header_is_401_and_garbage_token_is_403() {
    let env = TestEnv::new();
    let auth = env.auth();

    let err = auth.authenticate(None).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    let err = auth.authenticate(Some("Bearer not.a.token")).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let err = auth.authenticate(Some("Basic abc123")).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[test]
fn token_for_deleted_user_is_rejected() {
    let env = TestEnv::new();
    let auth = env.auth();
    auth.register(&register_request("sam", "sam@example.com", None))
        .unwrap();
    let login = auth.login(&login_request("sam@example.com", "hunter2!")).unwrap();

    env.users().delete(&login.user.id).unwrap();

    let bearer = format!("Bearer {}", login.token);
    let err = auth.authenticate(Some(&bearer)).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[test]
fn admin_gates() {
    let env = TestEnv::new();
    let auth = env.auth();
    auth.register(&register_request("root", "root@example.com", Some("admin")))
        .unwrap();
    auth.register(&register_request("sam", "sam@example.com", None))
        .unwrap();

    let admin_login = auth
        .login(&login_request("root@example.com", "hunter2!"))
        .unwrap();
    let student_login = auth
        .login(&login_request("sam@example.com", "hunter2!"))
        .unwrap();

    let admin = auth
        .authenticate(Some(&format!("Bearer {}", admin_login.token)))
        .unwrap();
    let student = auth
        .authenticate(Some(&format!("Bearer {}", student_login.token)))
        .unwrap();

    auth.require_admin(&admin).unwrap();
    let err = auth.require_admin(&student).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    auth.require_self_or_admin(&student, &student.id).unwrap();
    auth.require_self_or_admin(&admin, &student.id).unwrap();
    let err = auth.require_self_or_admin(&student, &admin.id).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[test]
fn role_update_and_admin_listing() {
    let env = TestEnv::new();
    let auth = env.auth();
    let user = auth
        .register(&register_request("sam", "sam@example.com", None))
        .unwrap();

    let updated = env.users().update_role(&user.id, Some("admin")).unwrap();
    assert_eq!(updated.role, Role::Admin);

    let admins = env.users().list_admins().unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].id, user.id);

    let err = env.users().update_role(&user.id, Some("root")).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
