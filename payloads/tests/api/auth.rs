use payloads::requests;
use payloads::{ClientError, Role};
use reqwest::StatusCode;

use test_helpers::{FIXTURE_PASSWORD, assert_status_code, spawn_app};

#[tokio::test]
async fn current_user_reflects_session() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let me = app.client.current_user().await.expect("admin is signed in");
    assert_eq!(me.id, Some(app.fixtures.admin.id));
    assert_eq!(me.highest_role(), Role::Admin);
    assert_eq!(me.display_name(), "Alice Adminson");

    assert!(app.anonymous_client().current_user().await.is_none());

    Ok(())
}

#[tokio::test]
async fn logout_ends_session() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let member = app.member_client();

    let response = member.logout().await?;
    assert!(response.logout_url.is_some());
    assert!(member.current_user().await.is_none());
    assert!(matches!(
        member.get_user(app.fixtures.member.id).await,
        Err(ClientError::Unauthorized)
    ));

    Ok(())
}

#[tokio::test]
async fn generated_passwords_meet_requirements() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let options = requests::GeneratePassword::default();
    let generated = app.client.generate_password(&options).await?;
    assert_eq!(generated.generated_password.len(), 16);
    assert_eq!(
        requests::validate_password(&generated.generated_password),
        Ok(())
    );

    Ok(())
}

#[tokio::test]
async fn password_change_requires_relogin() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let member = app.member_client();
    let user_id = app.fixtures.member.id;

    let check = requests::CheckPasswordHistory {
        user_id,
        new_password: FIXTURE_PASSWORD.into(),
    };
    assert!(member.check_password_history(&check).await?.is_reused());

    let details = requests::UpdatePassword {
        new_password: "A-brand-new-secret-99!".into(),
        token: None,
        user_id: Some(user_id),
        current_password: Some(FIXTURE_PASSWORD.into()),
    };
    let result = member.update_password(&details).await?;
    assert!(result.require_relogin);

    // the old password is now in history
    let reuse = requests::UpdatePassword {
        new_password: FIXTURE_PASSWORD.into(),
        current_password: Some("A-brand-new-secret-99!".into()),
        ..details
    };
    match member.update_password(&reuse).await {
        Err(ClientError::APIError(code, message)) => {
            assert_eq!(code, StatusCode::BAD_REQUEST);
            assert_eq!(
                message,
                "You cannot reuse any of your last 5 passwords"
            );
        }
        other => panic!("Expected APIError, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn weak_passwords_are_rejected() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let details = requests::UpdatePassword {
        new_password: "short".into(),
        token: None,
        user_id: None,
        current_password: None,
    };
    let result = app.client.update_password(&details).await;
    assert_status_code(result, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn password_recovery_flow() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let anonymous = app.anonymous_client();

    let request = requests::PasswordRecovery {
        email: "charlie@example.com".into(),
    };
    anonymous.request_password_recovery(&request).await?;
    let first = app.reset_token_for(&request.email).expect("token issued");

    anonymous.resend_password_recovery(&request).await?;
    let token = app.reset_token_for(&request.email).expect("token reissued");
    assert_ne!(first, token);

    let details = requests::UpdatePassword {
        new_password: "Recovered-password-77!".into(),
        token: Some(token.clone()),
        user_id: None,
        current_password: None,
    };
    let result = anonymous.update_password(&details).await?;
    assert!(!result.require_relogin);

    // tokens are single use
    let result = anonymous.update_password(&details).await;
    assert_status_code(result, StatusCode::BAD_REQUEST);

    // unknown addresses look the same to the caller
    let unknown = requests::PasswordRecovery {
        email: "nobody@example.com".into(),
    };
    anonymous.request_password_recovery(&unknown).await?;
    assert!(app.reset_token_for(&unknown.email).is_none());

    Ok(())
}
