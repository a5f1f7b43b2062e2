mod common;

use axum::http::StatusCode;
use common::{empty_request, john, json_request, read_json, test_app};
use kernel::model::{id::SlotId, notification::NotificationKind};
use serde_json::json;
use std::time::Duration;
use tokio_stream::StreamExt;
use tower::ServiceExt;

#[tokio::test]
async fn health_endpoints_respond() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(empty_request("GET", "/api/v1/health/ledger"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reserve_slot_returns_password_and_notifies() -> anyhow::Result<()> {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/v1/slots/2/reservation", john()))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["slotId"], 2);
    assert_eq!(body["carNumber"], "1234567");
    let password = body["password"].as_str().unwrap_or_default();
    assert_eq!(password.len(), 8);
    assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/slots/2/availability"))
        .await?;
    assert_eq!(
        read_json(response).await,
        json!({ "slotId": 2, "available": false })
    );

    let sent = app.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind(), NotificationKind::ReservationCreated);
    let payload = serde_json::to_value(&sent[0])?;
    assert_eq!(payload["password"], password);
    assert_eq!(payload["slotId"], 2);
    Ok(())
}

#[tokio::test]
async fn invalid_input_is_rejected_without_mutation() -> anyhow::Result<()> {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/slots/1/reservation",
            json!({ "fullName": "John", "carNumber": "12345", "email": "john@" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "validation_error");

    assert!(app
        .registry
        .reservation_repository()
        .is_available(SlotId::new(1))
        .await?);
    assert!(app.notifier.sent.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn occupied_slot_and_duplicate_identity_conflict() -> anyhow::Result<()> {
    let app = test_app();
    app.router
        .clone()
        .oneshot(json_request("POST", "/api/v1/slots/1/reservation", john()))
        .await?;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/slots/1/reservation",
            json!({ "fullName": "Jane Doe", "carNumber": "7654321", "email": "jane@example.com" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["code"], "slot_occupied");
    assert_eq!(body["message"], "Parking slot 1 is already reserved.");

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/v1/slots/2/reservation", john()))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["code"], "duplicate_identity");

    let response = app
        .router
        .oneshot(json_request("POST", "/api/v1/slots/9/reservation", john()))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn first_available_reservation_until_full() -> anyhow::Result<()> {
    let app = test_app();
    for (i, car) in ["1111111", "2222222", "3333333"].iter().enumerate() {
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/reservations",
                json!({ "fullName": "John Smith", "carNumber": car, "email": format!("{car}@example.com") }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["slotId"], i + 1);
    }

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/v1/reservations",
            json!({ "fullName": "John Smith", "carNumber": "4444444", "email": "four@example.com" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["code"], "no_available_slot");
    Ok(())
}

#[tokio::test]
async fn admin_free_requires_confirmation() -> anyhow::Result<()> {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            "DELETE",
            "/api/v1/admin/slots/3/reservation?confirm=true",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["code"], "already_empty");
    assert_eq!(body["message"], "Slot 3 is already empty.");

    app.router
        .clone()
        .oneshot(json_request("POST", "/api/v1/slots/3/reservation", john()))
        .await?;

    let response = app
        .router
        .clone()
        .oneshot(empty_request("DELETE", "/api/v1/admin/slots/3/reservation"))
        .await?;
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    assert!(!app
        .registry
        .reservation_repository()
        .is_available(SlotId::new(3))
        .await?);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            "DELETE",
            "/api/v1/admin/slots/3/reservation?confirm=true",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["slotId"], 3);
    assert_eq!(body["formerOccupant"]["fullName"], "John Smith");

    // 管理者による解放では通知しない
    assert_eq!(app.notifier.sent.lock().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn views_show_ledger_and_sensor_state() -> anyhow::Result<()> {
    let app = test_app();
    app.router
        .clone()
        .oneshot(json_request("POST", "/api/v1/slots/1/reservation", john()))
        .await?;

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/slots"))
        .await?;
    assert_eq!(
        read_json(response).await,
        json!({ "slots": [
            { "slotId": 1, "reserved": true, "carNumber": "1234567" },
            { "slotId": 2, "reserved": false },
            { "slotId": 3, "reserved": false }
        ]})
    );

    *app.sensor.snapshot.lock().unwrap() = Some(vec![true, true, false]);
    app.registry.sensor_reconciler().tick().await;

    let response = app
        .router
        .oneshot(empty_request("GET", "/api/v1/admin/slots"))
        .await?;
    let body = read_json(response).await;
    assert_eq!(body["slots"][0]["occupant"]["email"], "john@example.com");
    assert_eq!(body["slots"][0]["sensor"], "occupied");
    assert_eq!(body["slots"][1]["occupant"], serde_json::Value::Null);
    assert_eq!(body["slots"][1]["sensor"], "occupied");
    assert_eq!(body["slots"][2]["sensor"], "free");
    assert!(body["sensorObservedAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn reconcile_releases_slot_reported_free() -> anyhow::Result<()> {
    let app = test_app();
    app.router
        .clone()
        .oneshot(json_request("POST", "/api/v1/slots/2/reservation", john()))
        .await?;
    app.sensor.events.lock().unwrap().push_back(SlotId::new(2));
    *app.sensor.snapshot.lock().unwrap() = Some(vec![false, false, false]);

    let response = app
        .router
        .clone()
        .oneshot(empty_request("POST", "/api/v1/admin/reconcile"))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let report = read_json(response).await;
    assert_eq!(report["freed"], 2);
    assert_eq!(report["snapshot"], json!([false, false, false]));

    assert!(app
        .registry
        .reservation_repository()
        .is_available(SlotId::new(2))
        .await?);
    let sent = app.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].kind(), NotificationKind::SlotFreed);
    Ok(())
}

#[tokio::test]
async fn gate_is_opened_on_request() -> anyhow::Result<()> {
    let app = test_app();
    let response = app
        .router
        .oneshot(empty_request("POST", "/api/v1/admin/gate"))
        .await?;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(*app.sensor.gate_opened.lock().unwrap(), 1);
    Ok(())
}

#[tokio::test]
async fn user_event_stream_sends_view_on_connect_and_on_change() -> anyhow::Result<()> {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/events/user"))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let mut stream = response.into_body().into_data_stream();

    let first = stream.next().await.expect("initial view")?;
    let first = String::from_utf8(first.to_vec())?;
    assert!(first.starts_with("event: user-view"));
    assert!(first.contains(r#""reserved":false"#));

    app.router
        .oneshot(json_request("POST", "/api/v1/slots/1/reservation", john()))
        .await?;
    let next = stream.next().await.expect("view after reservation")?;
    let next = String::from_utf8(next.to_vec())?;
    assert!(next.contains(r#""carNumber":"1234567""#));
    Ok(())
}

#[tokio::test]
async fn user_event_stream_ignores_sensor_updates() -> anyhow::Result<()> {
    let app = test_app();
    *app.sensor.snapshot.lock().unwrap() = Some(vec![true, false, false]);

    let user = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/events/user"))
        .await?;
    let mut user = user.into_body().into_data_stream();
    let admin = app
        .router
        .oneshot(empty_request("GET", "/api/v1/events/admin"))
        .await?;
    let mut admin = admin.into_body().into_data_stream();
    user.next().await.expect("initial user view")?;
    admin.next().await.expect("initial admin view")?;

    app.registry.sensor_reconciler().tick().await;

    let next = tokio::time::timeout(Duration::from_secs(1), admin.next())
        .await?
        .expect("admin view after sensor update")?;
    let next = String::from_utf8(next.to_vec())?;
    assert!(next.starts_with("event: admin-view"));
    assert!(next.contains(r#""sensor":"occupied""#));

    // 利用者画面は 5 秒ごとの再送まで何も送らない
    assert!(tokio::time::timeout(Duration::from_millis(500), user.next())
        .await
        .is_err());
    Ok(())
}

#[tokio::test]
async fn malformed_requests_use_the_error_body() -> anyhow::Result<()> {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/slots/abc/availability"))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "invalid_request");

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/slots/1/reservation",
            json!({ "fullName": "John Smith", "carNumber": "1234567" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert!(body["message"].is_string());

    let response = app
        .router
        .oneshot(empty_request(
            "DELETE",
            "/api/v1/admin/slots/1/reservation?confirm=maybe",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "invalid_request");
    assert!(app
        .registry
        .reservation_repository()
        .is_available(SlotId::new(1))
        .await?);
    Ok(())
}
