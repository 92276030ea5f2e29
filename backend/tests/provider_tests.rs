//! Provider client tests against mock HTTP servers
//!
//! Covers normalization, caching and the fallback path of both clients.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shared::{DataOrigin, GpsCoordinates, Trend};
use terra_backend::external::{FallbackGenerator, SatelliteClient, StacClient};
use terra_backend::ResponseCache;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn farm() -> GpsCoordinates {
    GpsCoordinates::new(-93.6250, 42.0308)
}

fn satellite_body() -> serde_json::Value {
    json!({
        "soil_moisture": {"value": 0.12, "trend": "decreasing"},
        "ndvi": {"value": 0.72, "trend": "increasing"},
        "precipitation": {"value": 1.5, "trend": "stable"},
        "temperature": {"value": 27.3},
        "timestamp": "2024-07-15T00:00:00Z"
    })
}

fn stac_body(collection: &str) -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "id": "scene-older",
                "collection": collection,
                "properties": {
                    "datetime": "2024-07-01T16:50:00Z",
                    "eo:cloud_cover": 1.0,
                    "gsd": 10,
                    "s2:vegetation_percentage": 50.0,
                    "s2:not_vegetated_percentage": 50.0
                },
                "assets": {"B08": {"href": "https://example.test/b08.tif", "roles": ["data"]}}
            },
            {
                "id": "scene-newest",
                "collection": collection,
                "properties": {
                    "datetime": "2024-07-11T16:50:00Z",
                    "eo:cloud_cover": 8.0,
                    "gsd": 10,
                    "s2:vegetation_percentage": 90.0,
                    "s2:water_percentage": 10.0
                },
                "assets": {"B04": {"href": "https://example.test/b04.tif", "roles": ["data"]}}
            }
        ]
    })
}

// =============================================================================
// Satellite client
// =============================================================================

mod satellite {
    use super::*;

    #[tokio::test]
    async fn normalizes_provider_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agricultural-data"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(satellite_body()))
            .mount(&server)
            .await;

        let cache = Arc::new(ResponseCache::default());
        let client = SatelliteClient::new(server.uri(), "test-key".to_string(), cache);

        let reading = client.fetch_satellite_reading(farm(), None).await;
        assert_eq!(reading.origin, DataOrigin::Observed);
        assert_eq!(reading.ndvi, Some(0.72));
        assert_eq!(reading.soil_moisture, Some(0.12));
        assert_eq!(reading.temperature_celsius, Some(27.3));
        assert_eq!(reading.trends.ndvi, Trend::Increasing);
        assert_eq!(reading.trends.temperature, Trend::Stable);
    }

    #[tokio::test]
    async fn second_call_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agricultural-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(satellite_body()))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(ResponseCache::default());
        let client = SatelliteClient::new(server.uri(), "k".to_string(), Arc::clone(&cache));

        let first = client.fetch_satellite_reading(farm(), None).await;
        let second = client.fetch_satellite_reading(farm(), None).await;
        assert_eq!(first, second);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn server_error_falls_back_and_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(2)
            .mount(&server)
            .await;

        let cache = Arc::new(ResponseCache::default());
        let client = SatelliteClient::new(server.uri(), "k".to_string(), Arc::clone(&cache))
            .with_fallback(FallbackGenerator::new(99));

        let first = client.fetch_satellite_reading(farm(), None).await;
        let second = client.fetch_satellite_reading(farm(), None).await;

        assert!(first.is_simulated());
        assert_eq!(first.ndvi, second.ndvi);
        assert_eq!(
            first.ndvi,
            FallbackGenerator::new(99).satellite_reading(farm()).ndvi
        );
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn malformed_body_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = SatelliteClient::new(
            server.uri(),
            "k".to_string(),
            Arc::new(ResponseCache::default()),
        );
        assert!(client.fetch_satellite_reading(farm(), None).await.is_simulated());
    }

    #[tokio::test]
    async fn slow_provider_times_out_to_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(satellite_body())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = SatelliteClient::new(
            server.uri(),
            "k".to_string(),
            Arc::new(ResponseCache::default()),
        )
        .with_timeout(Duration::from_millis(200));

        assert!(client.fetch_satellite_reading(farm(), None).await.is_simulated());
    }
}

// =============================================================================
// STAC client
// =============================================================================

mod stac {
    use super::*;

    #[tokio::test]
    async fn picks_most_recent_low_cloud_scene() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({"collections": ["sentinel-2-l2a"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(stac_body("sentinel-2-l2a")))
            .expect(1)
            .mount(&server)
            .await;

        let client = StacClient::new(server.uri(), Arc::new(ResponseCache::default()));
        let reading = client.search_high_res_imagery(farm(), 1.0, None).await;

        assert_eq!(reading.origin, DataOrigin::Observed);
        let scene = reading.scene.clone().unwrap();
        assert_eq!(scene.item_id, "scene-newest");
        assert_eq!(scene.collection, "sentinel-2-l2a");
        assert_eq!(reading.data_quality, 92.0);
        assert_eq!(reading.resolution, "10m");
        // 0.9 * 0.8 + 0.1 * -0.3
        assert!((reading.ndvi - 0.69).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_primary_collection_falls_through_to_next() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({"collections": ["sentinel-2-l2a"]})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"type": "FeatureCollection", "features": []})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({"collections": ["landsat-c2-l2"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(stac_body("landsat-c2-l2")))
            .mount(&server)
            .await;

        let client = StacClient::new(server.uri(), Arc::new(ResponseCache::default()));
        let reading = client.search_high_res_imagery(farm(), 2.0, None).await;

        assert_eq!(reading.origin, DataOrigin::Observed);
        assert_eq!(reading.scene.unwrap().collection, "landsat-c2-l2");
    }

    #[tokio::test]
    async fn no_scene_anywhere_gives_deterministic_simulation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"type": "FeatureCollection", "features": []})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = StacClient::new(server.uri(), Arc::new(ResponseCache::default()))
            .with_fallback(FallbackGenerator::new(5));
        let reading = client.search_high_res_imagery(farm(), 1.0, None).await;

        assert!(reading.is_simulated());
        assert_eq!(reading, FallbackGenerator::new(5).imagery_reading(farm(), "10m"));
        assert!(reading.crop_type.is_some());
    }

    #[tokio::test]
    async fn cloud_limit_is_applied_to_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stac_body("sentinel-2-l2a")))
            .mount(&server)
            .await;

        let client = StacClient::new(server.uri(), Arc::new(ResponseCache::default()))
            .with_search_limits(5.0, 10);
        let reading = client.search_high_res_imagery(farm(), 1.0, None).await;

        assert_eq!(reading.scene.unwrap().item_id, "scene-older");
    }

    #[tokio::test]
    async fn search_error_status_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let cache = Arc::new(ResponseCache::default());
        let client = StacClient::new(server.uri(), Arc::clone(&cache));
        let reading = client.search_high_res_imagery(farm(), 1.0, None).await;

        assert!(reading.is_simulated());
        assert!(cache.is_empty().await);
    }
}
