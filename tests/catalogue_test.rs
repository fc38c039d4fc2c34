mod common;

use common::{options_for, start_fixed_server, start_mock_server, Reply};
use padel_client::error::Error;
use padel_client::protocol::Catalogue;
use padel_client::PadelClient;
use serde_json::json;

#[tokio::test]
async fn test_manager_edits_send_catalogue_envelopes() {
    let (addr, received) = start_mock_server(|request| {
        let message = format!("{} done", request["action"].as_str().unwrap_or_default());
        Reply::Line(json!({"status": "success", "message": message}).to_string())
    })
    .await;
    let client = PadelClient::new_with_options(options_for(addr));
    let court = json!({"name": "Court A", "location": "Cairo"});
    let renamed = json!({"name": "Court B", "location": "Cairo"});
    let yoga = json!({"className": "Yoga", "instructor": "Sara"});

    let saved = client.api().save(Catalogue::PadelCenters, court.clone()).await.unwrap();
    let updated = client
        .api()
        .update(Catalogue::PadelCenters, court.clone(), renamed.clone())
        .await
        .unwrap();
    let deleted = client.api().delete(Catalogue::GymClasses, yoga.clone()).await.unwrap();

    assert_eq!(saved, "save_padel_center done");
    assert_eq!(updated, "update_padel_center done");
    assert_eq!(deleted, "delete_gym_class done");

    let received = received.lock().unwrap();
    assert_eq!(received[0], json!({"action": "save_padel_center", "data": court}));
    assert_eq!(
        received[1],
        json!({"action": "update_padel_center", "oldData": court, "newData": renamed})
    );
    assert_eq!(received[2], json!({"action": "delete_gym_class", "data": yoga}));
}

#[tokio::test]
async fn test_rejected_manager_edit_is_application_error() {
    let (addr, _) =
        start_fixed_server(r#"{"status":"error","message":"Padel center not found"}"#).await;
    let client = PadelClient::new_with_options(options_for(addr));

    let err = client
        .api()
        .delete(Catalogue::PadelCenters, json!({"name": "Ghost"}))
        .await
        .unwrap_err();

    assert!(err.is_application());
    assert_eq!(err.user_message(), "Padel center not found");
}

#[tokio::test]
async fn test_subscription_plans_decode_pricing() {
    let (addr, received) = start_fixed_server(
        &json!({
            "status": "success",
            "data": [
                {"name": "Gold", "pricing": {"1 Month": 500.0, "1 Year": 5000.0}},
                {"name": "Silver", "pricing": {"1 Month": 300.0}}
            ]
        })
        .to_string(),
    )
    .await;
    let client = PadelClient::new_with_options(options_for(addr));

    let plans = client.api().get_subscription_plans().await.unwrap();

    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].name, "Gold");
    assert_eq!(plans[0].price_for("1 Year"), Some(5000.0));
    assert_eq!(plans[1].price_for("1 Year"), None);
    assert_eq!(received.lock().unwrap()[0], json!({"action": "get_subscription_plans"}));
}

#[tokio::test]
async fn test_listings_return_data_entries() {
    let (addr, received) = start_mock_server(|request| match request["action"].as_str() {
        Some("get_padel_centers") => Reply::Line(
            json!({"status": "success", "data": [{"name": "Court A"}, {"name": "Court B"}]})
                .to_string(),
        ),
        _ => Reply::Line(json!({"status": "success", "data": [{"className": "Yoga"}]}).to_string()),
    })
    .await;
    let client = PadelClient::new_with_options(options_for(addr));

    let centers = client.api().get_padel_centers().await.unwrap();
    let classes = client.api().get_classes().await.unwrap();

    assert_eq!(centers, vec![json!({"name": "Court A"}), json!({"name": "Court B"})]);
    assert_eq!(classes, vec![json!({"className": "Yoga"})]);
    assert_eq!(received.lock().unwrap()[1], json!({"action": "get_classes"}));
}

#[tokio::test]
async fn test_listing_without_data_is_empty() {
    let (addr, _) = start_fixed_server(r#"{"status":"success","message":"ok"}"#).await;
    let client = PadelClient::new_with_options(options_for(addr));

    assert!(client.api().get_padel_centers().await.unwrap().is_empty());
    assert!(client.api().get_classes().await.unwrap().is_empty());
    assert!(client.api().get_subscription_plans().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_with_wrong_payload_shape_is_decode_error() {
    let (addr, _) = start_fixed_server(r#"{"status":"success","data":{"name":"Court A"}}"#).await;
    let client = PadelClient::new_with_options(options_for(addr));

    let err = client.api().get_subscription_plans().await.unwrap_err();

    assert!(matches!(err, Error::Json(_)), "got {:?}", err);
    assert!(err.user_message().starts_with("Unexpected response from server"));
}
