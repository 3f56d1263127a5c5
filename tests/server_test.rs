//! Integration tests for the sensor log HTTP server

#[cfg(feature = "server")]
mod server_tests {
    use sensorlog_dashboard::server::{run, ServerConfig};
    use sensorlog_dashboard::{Config, SchemaVariant};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::sync::oneshot;

    const LOG: &str = "Timestamp(ms),AccelX(g),AccelY(g),AccelZ(g),GyroX(deg/s),GyroY(deg/s),GyroZ(deg/s),Distance(cm)\n\
                       1000,0.1,0.2,0.3,1,2,3,50\n\
                       1500,0.1,0.2,0.3,1,2,3,55";

    async fn start() -> (SocketAddr, oneshot::Sender<()>) {
        let (addr, shutdown_tx) = run(ServerConfig::new(0, Config::default()))
            .await
            .expect("Failed to start server");

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;
        (addr, shutdown_tx)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (addr, shutdown_tx) = start().await;

        let response = reqwest::get(format!("http://{}/health", addr))
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert!(body["version"].as_str().is_some());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_parse_endpoint() {
        let (addr, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/parse", addr))
            .json(&serde_json::json!({ "motion": LOG }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["time"], serde_json::json!([0.0, 0.5]));
        assert_eq!(body["distance"]["kind"], "single");
        assert_eq!(body["distance"]["values"], serde_json::json!([50.0, 55.0]));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_parse_with_predictions_and_variant_override() {
        let (addr, shutdown_tx) = start().await;

        let motion = "Timestamp(ms),AccelX(g),AccelY(g),AccelZ(g),GyroX(deg/s),GyroY(deg/s),GyroZ(deg/s),DistanceLeft(cm),DistanceRight(cm)\n\
                      0,0,0,1,0,0,0,0,12\n\
                      100,0,0,1,0,0,0,11,12";
        let predictions = "Timestamp(ms),Shaking,Posture,Fall,Normal\n0,0.1,0.2,0.3,0.4";

        let client = reqwest::Client::new();
        let response = client
            .post(format!(
                "http://{}/api/parse?variant={}&alignment=pad",
                addr,
                SchemaVariant::DualZeroAsMissing
            ))
            .json(&serde_json::json!({ "motion": motion, "predictions": predictions }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert!(body["distance"]["left"][0].is_null());
        assert_eq!(body["prediction"][0]["name"], "Shaking");
        assert_eq!(body["prediction"][0]["values"], serde_json::json!([0.1, null]));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_parse_rejects_missing_columns() {
        let (addr, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/parse", addr))
            .json(&serde_json::json!({ "motion": "Timestamp(ms),AccelX(g)\n0,1" }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "MISSING_COLUMNS");
        assert!(body["error"].as_str().unwrap_or("").contains("Distance(cm)"));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_unknown_variant() {
        let (addr, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/parse?variant=triple", addr))
            .json(&serde_json::json!({ "motion": LOG }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "UNKNOWN_VARIANT");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let (addr, shutdown_tx) = start().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/api/validate", addr))
            .json(&serde_json::json!({ "file_name": "walk.csv", "content": LOG }))
            .send()
            .await
            .expect("Failed to send request");
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["is_valid"], true);

        let response = client
            .post(format!("http://{}/api/validate", addr))
            .json(&serde_json::json!({ "content": "Timestamp(ms)\n0" }))
            .send()
            .await
            .expect("Failed to send request");
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["is_valid"], false);
        assert_eq!(body["error"], "Invalid CSV format detected");
        assert!(body["missing_columns"]
            .as_array()
            .is_some_and(|cols| cols.iter().any(|c| c == "AccelX(g)")));

        let response = client
            .post(format!("http://{}/api/validate", addr))
            .json(&serde_json::json!({ "file_name": "walk.txt", "content": LOG }))
            .send()
            .await
            .expect("Failed to send request");
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["is_valid"], false);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_summary_endpoint() {
        let (addr, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/summary", addr))
            .json(&serde_json::json!({ "motion": LOG }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["rows"], 2);
        assert_eq!(body["distance"]["mean"], 52.5);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_download_template() {
        let (addr, shutdown_tx) = start().await;

        let response = reqwest::get(format!("http://{}/download-template?variant=dual-literal", addr))
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/csv")
        );

        let body = response.text().await.expect("Failed to read body");
        assert!(body.starts_with("Timestamp(ms),"));
        assert!(body.contains("DistanceRight(cm)"));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_live_demo_prediction() {
        let (addr, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/live-demo-prediction", addr))
            .json(&serde_json::json!([{ "time": 0.0 }, { "time": 5.0 }]))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["0"]["Shaking"], 0.125);
        assert_eq!(body["1"]["Shaking"], 0.2);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let (addr, shutdown_tx) = start().await;

        // Send OPTIONS request to check CORS
        let client = reqwest::Client::new();
        let response = client
            .request(reqwest::Method::OPTIONS, format!("http://{}/api/parse", addr))
            .header("Origin", "http://localhost")
            .header("Access-Control-Request-Method", "POST")
            .send()
            .await
            .expect("Failed to send request");

        // CORS preflight should succeed
        assert!(
            response.status().is_success() || response.status() == reqwest::StatusCode::NO_CONTENT,
            "CORS preflight failed: {}",
            response.status()
        );

        let _ = shutdown_tx.send(());
    }
}
