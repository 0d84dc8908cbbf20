use payloads::{ClientError, Role, UserStatus, requests};
use reqwest::StatusCode;

use test_helpers::{
    assert_forbidden, assert_status_code, assert_unauthorized, dana_details,
    spawn_app,
};

#[tokio::test]
async fn list_users_returns_fixtures() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let users = app.client.list_users().await?;
    let names: Vec<_> = users.iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "charlie"]);
    assert_eq!(users[0].highest_role(), Role::Admin);

    Ok(())
}

#[tokio::test]
async fn moderators_can_list_but_not_edit() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let moderator = app.moderator_client();

    assert_eq!(moderator.list_users().await?.len(), 3);

    let patch = requests::UpdateUser {
        status: Some(UserStatus::Inactive),
        ..Default::default()
    };
    let result = moderator.update_user(app.fixtures.member.id, &patch).await;
    assert_forbidden(result);

    let result = moderator.delete_user(app.fixtures.member.id).await;
    assert_forbidden(result);

    Ok(())
}

#[tokio::test]
async fn members_cannot_list_users() -> anyhow::Result<()> {
    let app = spawn_app().await;

    assert_forbidden(app.member_client().list_users().await);

    // but can read themselves
    let me = app.member_client().get_user(app.fixtures.member.id).await?;
    assert_eq!(me.email, "charlie@example.com");

    Ok(())
}

#[tokio::test]
async fn anonymous_requests_are_unauthorized() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = app.anonymous_client().list_users().await;
    assert_unauthorized(result);

    let result = app
        .anonymous_client()
        .with_token("not-a-session")
        .list_users()
        .await;
    assert_unauthorized(result);

    Ok(())
}

#[tokio::test]
async fn create_update_delete_user() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let user_id = app.create_dana_user().await?;
    let created = app.client.get_user(user_id).await?;
    assert_eq!(created.status, UserStatus::Pending);
    assert_eq!(created.roles, vec![Role::User]);
    assert_eq!(created.full_name(), "Dana Scully");

    let patch = requests::UpdateUser {
        last_name: Some("Katz".into()),
        roles: Some(vec![Role::Moderator]),
        status: Some(UserStatus::Active),
        ..Default::default()
    };
    let updated = app.client.update_user(user_id, &patch).await?;
    assert_eq!(updated.full_name(), "Dana Katz");
    assert_eq!(updated.highest_role(), Role::Moderator);
    assert_eq!(updated.email, created.email);

    app.client.delete_user(user_id).await?;
    let result = app.client.get_user(user_id).await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn duplicate_user_reports_server_detail() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.create_dana_user().await?;

    match app.client.create_user(&dana_details()).await {
        Err(ClientError::APIError(code, message)) => {
            assert_eq!(code, StatusCode::BAD_REQUEST);
            assert_eq!(message, "Username or email already exists");
        }
        other => panic!("Expected APIError, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn invalid_email_is_a_validation_error() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let mut details = dana_details();
    details.email = "not-an-email".into();
    match app.client.create_user(&details).await {
        Err(ClientError::Validation { message, details }) => {
            assert_eq!(message, "invalid email");
            assert_eq!(details["detail"][0]["loc"][1], "email");
        }
        other => panic!("Expected Validation, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn admins_cannot_delete_themselves() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = app.client.delete_user(app.fixtures.admin.id).await;
    assert_status_code(result, StatusCode::BAD_REQUEST);
    assert_eq!(app.client.list_users().await?.len(), 3);

    Ok(())
}

#[tokio::test]
async fn injected_failures_surface_their_message() -> anyhow::Result<()> {
    let app = spawn_app().await;

    app.fail_next(
        StatusCode::SERVICE_UNAVAILABLE,
        r#"{"message":"maintenance window"}"#,
    );
    match app.client.list_users().await {
        Err(ClientError::APIError(code, message)) => {
            assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(message, "maintenance window");
        }
        other => panic!("Expected APIError, got {other:?}"),
    }

    app.fail_next(StatusCode::BAD_GATEWAY, "<h1>502 Bad Gateway</h1>");
    match app.client.list_users().await {
        Err(e) => assert_eq!(e.to_string(), "Request failed"),
        Ok(_) => panic!("Expected failure"),
    }

    // one-shot
    assert_eq!(app.client.list_users().await?.len(), 3);

    Ok(())
}
