use payloads::requests;
use payloads::responses::{Address, Profile, SocialMedia};
use reqwest::StatusCode;

use test_helpers::{assert_forbidden, assert_status_code, spawn_app};

#[tokio::test]
async fn profile_updates_merge_fields() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let member = app.member_client();
    let user_id = app.fixtures.member.id;

    let empty = member.get_profile(user_id).await?;
    assert_eq!(empty.user_id, Some(user_id));
    assert_eq!(empty.bio, None);

    let patch = Profile {
        bio: Some("Gardener".into()),
        social_media: Some(SocialMedia {
            github: Some("charlie".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    member.update_profile(user_id, &patch).await?;

    let patch = Profile {
        phone: Some("555-0100".into()),
        ..Default::default()
    };
    let profile = member.update_profile(user_id, &patch).await?;
    assert_eq!(profile.bio.as_deref(), Some("Gardener"));
    assert_eq!(profile.phone.as_deref(), Some("555-0100"));
    assert_eq!(
        profile.social_media.and_then(|s| s.github).as_deref(),
        Some("charlie")
    );

    Ok(())
}

#[tokio::test]
async fn other_users_profiles_are_forbidden() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let result = app
        .member_client()
        .get_profile(app.fixtures.moderator.id)
        .await;
    assert_forbidden(result);

    // admins may read anyone's
    app.client.get_profile(app.fixtures.member.id).await?;

    Ok(())
}

fn home() -> Address {
    Address {
        street: Some("1 Main St".into()),
        city: Some("Springfield".into()),
        country: Some("US".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn address_lifecycle() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let member = app.member_client();
    let user_id = app.fixtures.member.id;

    let created = member.create_address(user_id, &home()).await?;
    let address_id = created.id.expect("created address has an id");
    assert_eq!(created.user_id, Some(user_id));

    let moved = Address {
        city: Some("Shelbyville".into()),
        ..home()
    };
    let updated = member.update_address(user_id, address_id, &moved).await?;
    assert_eq!(updated.city.as_deref(), Some("Shelbyville"));
    assert_eq!(member.list_addresses(user_id).await?, vec![updated]);

    member.delete_address(user_id, address_id).await?;
    assert!(member.list_addresses(user_id).await?.is_empty());

    let result = member.delete_address(user_id, address_id).await;
    assert_status_code(result, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn deleting_a_user_removes_their_addresses() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let dana = app.create_dana_user().await?;

    let first = app.client.create_address(dana, &home()).await?;
    let second = app.client.create_address(dana, &home()).await?;
    let listed: Vec<_> = app
        .client
        .list_addresses(dana)
        .await?
        .into_iter()
        .map(|address| address.id)
        .collect();
    assert_eq!(listed, vec![first.id, second.id]);

    app.client.delete_user(dana).await?;
    let store = app.state.store();
    assert!(
        !store
            .addresses
            .values()
            .any(|address| address.user_id == Some(dana))
    );

    Ok(())
}

#[tokio::test]
async fn incomplete_address_is_rejected() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let address = Address {
        street: Some("1 Main St".into()),
        ..Default::default()
    };
    let result = app
        .client
        .create_address(app.fixtures.admin.id, &address)
        .await;
    match result {
        Err(payloads::ClientError::Validation { message, .. }) => {
            assert_eq!(message, "field required, field required");
        }
        other => panic!("Expected Validation, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn preferences_default_then_patch() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let user_id = app.fixtures.admin.id;

    let preferences = app.client.get_preferences(user_id).await?;
    assert!(!preferences.dark_mode);

    let update = requests::UpdatePreferences {
        dark_mode: Some(true),
        ..Default::default()
    };
    let preferences = app.client.update_preferences(user_id, &update).await?;
    assert!(preferences.dark_mode);
    assert_eq!(preferences.theme_preferences, serde_json::json!({}));

    Ok(())
}
