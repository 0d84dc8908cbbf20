use jiff::{Span, Timestamp};
use payloads::{ClientError, requests};

use test_helpers::{assert_forbidden, mock::sample_metrics, spawn_app};

#[tokio::test]
async fn metrics_are_filtered_by_window() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let now = Timestamp::now();
    app.state.store().metrics = sample_metrics(now, 24);

    let all = app
        .client
        .get_metrics(&requests::MetricsWindow::default())
        .await?;
    assert_eq!(all.metrics.len(), 24);
    assert_eq!(all.summary.last_24h.unique_ips, 6);

    let window = requests::MetricsWindow {
        start_time: Some(now - Span::new().hours(6)),
        end_time: Some(now),
    };
    let recent = app.client.get_metrics(&window).await?;
    assert_eq!(recent.metrics.len(), 6);
    assert!(
        recent
            .metrics
            .iter()
            .all(|m| m.timestamp >= now - Span::new().hours(6))
    );

    Ok(())
}

#[tokio::test]
async fn metrics_are_admin_only() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let window = requests::MetricsWindow::default();
    assert_forbidden(app.moderator_client().get_metrics(&window).await);

    Ok(())
}

#[tokio::test]
async fn session_expiry_is_reported_as_unauthorized() -> anyhow::Result<()> {
    let app = spawn_app().await;

    app.fail_next(
        reqwest::StatusCode::UNAUTHORIZED,
        r#"{"detail":"Token expired"}"#,
    );
    let result = app
        .client
        .get_metrics(&requests::MetricsWindow::default())
        .await;
    match result {
        Err(e @ ClientError::Unauthorized) => {
            assert_eq!(e.to_string(), "Session expired. Please log in again.")
        }
        other => panic!("Expected Unauthorized, got {other:?}"),
    }

    Ok(())
}
