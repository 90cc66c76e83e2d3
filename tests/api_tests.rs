//! End-to-end tests for the subscription API over HTTP.

use reqwest::{Method, StatusCode};
use subscriptions_sdk::{SumQuery, UpdateSubscription};

mod common;

use common::{start_server, subscription};

const USER: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";
const OTHER_USER: &str = "3f0c8a9e-5d1b-4c47-9a0e-2b8f6d4e7a11";

#[tokio::test]
async fn test_health() {
    let server = start_server().await;

    let reply = server.client.health().await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.is_ok());
    assert!(reply.request_id.is_some());
}

#[tokio::test]
async fn test_create_get_update_delete() {
    let server = start_server().await;
    let client = &server.client;

    let created = client
        .create(&subscription(USER, "Yandex Plus", 400, "07-2025"))
        .await
        .unwrap();
    assert_eq!(created.status, StatusCode::OK);
    let created = created.body.data.unwrap();
    assert_eq!(created.created_at.len(), "2025-07-01 00:00:00".len());

    let fetched = client.get(&created.id).await.unwrap();
    assert_eq!(fetched.status, StatusCode::OK);
    let record = fetched.body.data.unwrap();
    assert_eq!(record.service_name, "Yandex Plus");
    assert_eq!(record.price, 400);
    assert_eq!(record.user_id, USER);
    assert_eq!(record.start_date, "07-2025");
    assert_eq!(record.end_date, None);

    let patch = UpdateSubscription {
        price: Some(599),
        end_date: Some("12-2025".to_string()),
        ..UpdateSubscription::default()
    };
    let updated = client.update(&created.id, &patch).await.unwrap();
    assert_eq!(updated.status, StatusCode::OK);
    let record = updated.body.data.unwrap();
    assert_eq!(record.price, 599);
    assert_eq!(record.service_name, "Yandex Plus");
    assert_eq!(record.end_date.as_deref(), Some("12-2025"));

    let cleared = UpdateSubscription {
        end_date: Some(String::new()),
        ..UpdateSubscription::default()
    };
    let record = client.update(&created.id, &cleared).await.unwrap().body.data.unwrap();
    assert_eq!(record.end_date, None);

    let deleted = client.delete(&created.id).await.unwrap();
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(deleted.body.is_ok());

    let missing = client.get(&created.id).await.unwrap();
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body.error.as_deref(), Some("not found"));

    let again = client.delete(&created.id).await.unwrap();
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_is_conflict() {
    let server = start_server().await;
    let body = subscription(USER, "Netflix", 999, "01-2025");

    let first = server.client.create(&body).await.unwrap();
    assert_eq!(first.status, StatusCode::OK);

    let second = server.client.create(&body).await.unwrap();
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body.status, "Error");

    let other_month = subscription(USER, "Netflix", 999, "02-2025");
    let third = server.client.create(&other_month).await.unwrap();
    assert_eq!(third.status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_validation() {
    let server = start_server().await;

    let reply = server
        .client
        .raw(
            Method::POST,
            "/api/v1/subscription",
            r#"{"service_name":"","price":-5,"user_id":"nope","start_date":"2025-07"}"#,
            None,
        )
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body.error.as_deref(),
        Some(
            "field service_name is a required field, field price is not valid, \
             field user_id is not valid, field start_date is not valid"
        )
    );

    let reply = server
        .client
        .raw(Method::POST, "/api/v1/subscription", "{not json", None)
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body.error.as_deref(), Some("invalid json"));
}

#[tokio::test]
async fn test_bad_ids() {
    let server = start_server().await;

    let reply = server.client.get("not-a-uuid").await.unwrap();
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body.error.as_deref(), Some("invalid id"));

    let reply = server
        .client
        .update("not-a-uuid", &UpdateSubscription::default())
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = server
        .client
        .update(USER, &UpdateSubscription::default())
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sum_filters() {
    let server = start_server().await;
    let client = &server.client;

    for body in [
        subscription(USER, "Netflix", 100, "01-2024"),
        subscription(USER, "Spotify", 200, "03-2024"),
        subscription(USER, "Netflix", 400, "06-2024"),
        subscription(OTHER_USER, "Netflix", 800, "02-2024"),
    ] {
        assert_eq!(client.create(&body).await.unwrap().status, StatusCode::OK);
    }

    let total = |query: SumQuery| async move {
        let reply = client.sum(&query).await.unwrap();
        assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body.error);
        reply.body.data.unwrap().total
    };

    assert_eq!(total(SumQuery::default()).await, 1500);
    assert_eq!(
        total(SumQuery {
            user_id: Some(USER.to_string()),
            ..SumQuery::default()
        })
        .await,
        700
    );
    assert_eq!(
        total(SumQuery {
            user_id: Some(USER.to_string()),
            service_name: Some("Netflix".to_string()),
            ..SumQuery::default()
        })
        .await,
        500
    );
    assert_eq!(
        total(SumQuery {
            start_date_from: Some("02-2024".to_string()),
            start_date_to: Some("03-2024".to_string()),
            ..SumQuery::default()
        })
        .await,
        1000
    );
    // An omitted upper bound defaults to the current month.
    assert_eq!(
        total(SumQuery {
            start_date_from: Some("03-2024".to_string()),
            ..SumQuery::default()
        })
        .await,
        600
    );
    // No subscription has an end date, so an end-date window matches nothing.
    assert_eq!(
        total(SumQuery {
            end_date_from: Some("01-2024".to_string()),
            end_date_to: Some("12-2024".to_string()),
            ..SumQuery::default()
        })
        .await,
        0
    );
}

#[tokio::test]
async fn test_sum_window_errors() {
    let server = start_server().await;

    let reply = server
        .client
        .sum(&SumQuery {
            start_date_from: Some("01-2999".to_string()),
            ..SumQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body.error.as_deref(),
        Some("start_date_from cannot be in the future when start_date_to is omitted")
    );

    let reply = server
        .client
        .sum(&SumQuery {
            end_date_from: Some("06-2024".to_string()),
            end_date_to: Some("01-2024".to_string()),
            ..SumQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body.error.as_deref(),
        Some("end_date_to must be >= end_date_from")
    );

    let reply = server
        .client
        .sum(&SumQuery {
            start_date_from: Some("01-2999".to_string()),
            start_date_to: Some("02-2999".to_string()),
            ..SumQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body.data.unwrap().total, 0);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let server = start_server().await;

    let reply = server
        .client
        .raw(Method::GET, "/api/v2/nothing", "", None)
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body.status, "Error");
    assert_eq!(reply.body.error.as_deref(), Some("not found"));

    // Known path, unregistered method.
    let reply = server
        .client
        .raw(Method::PUT, "/api/v1/subscription", "{}", None)
        .await
        .unwrap();
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = start_server().await;

    let reply = server
        .client
        .raw(Method::GET, "/health", "", Some("trace-me-123"))
        .await
        .unwrap();
    assert_eq!(reply.request_id.as_deref(), Some("trace-me-123"));

    let first = server.client.health().await.unwrap().request_id.unwrap();
    let second = server.client.health().await.unwrap().request_id.unwrap();
    assert_ne!(first, second);
    assert!(!server.base_url.is_empty());
}
