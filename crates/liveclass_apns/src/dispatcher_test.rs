#[cfg(test)]
mod tests {
    use crate::auth::ProviderTokenIssuer;
    use crate::dispatcher::DispatchSummary;
    use crate::error::ApnsError;
    use crate::payload::LiveActivityEvent;
    use crate::test_support::*;
    use liveclass_config::DispatchConfig;
    use liveclass_registry::{RegisterActivityRequest, RegisterPushToStartRequest, TokenRegistry};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, header_regex, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BEARER_JWT: &str = r"^Bearer [A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+$";

    async fn register_push_to_start(registry: &TokenRegistry, device: &str, token: &str) {
        registry
            .register_push_to_start(RegisterPushToStartRequest {
                token: token.to_string(),
                device_id: device.to_string(),
                bundle_id: BUNDLE_ID.to_string(),
                timestamp: None,
                grade: Some(2),
                class_number: Some(3),
            })
            .await
            .unwrap();
    }

    async fn register_activity(registry: &TokenRegistry, device: &str, token: &str, bundle_id: &str) {
        registry
            .register_activity(RegisterActivityRequest {
                token: token.to_string(),
                activity_id: format!("activity-{}", device),
                device_id: device.to_string(),
                bundle_id: bundle_id.to_string(),
                timestamp: None,
                grade: Some(2),
                class_number: Some(3),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_start_isolates_failed_device() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex("^/3/device/token-(a|c)$"))
            .and(header("apns-push-type", "liveactivity"))
            .and(header("apns-topic", "com.example.schedule.push-type.liveactivity"))
            .and(header("apns-priority", "10"))
            .and(header("apns-expiration", "0"))
            .and(header_regex("authorization", BEARER_JWT))
            .and(body_partial_json(json!({"aps": {"event": "start"}})))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/3/device/token-b"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"reason": "BadDeviceToken"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let registry = TokenRegistry::in_memory();
        register_push_to_start(&registry, "device-a", "token-a").await;
        register_push_to_start(&registry, "device-b", "token-b").await;
        register_push_to_start(&registry, "device-c", "token-c").await;

        let dispatcher = dispatcher(
            registry,
            &server.uri(),
            ready_issuer(),
            &DispatchConfig::default(),
        );
        let summary = dispatcher.fan_out_start().await.unwrap();

        assert_eq!(
            summary,
            DispatchSummary {
                sent: 2,
                failed: 1,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn test_authorization_uses_bearer_scheme() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_regex("authorization", BEARER_JWT))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let registry = TokenRegistry::in_memory();
        register_push_to_start(&registry, "device-a", "token-a").await;

        let dispatcher = dispatcher(
            registry,
            &server.uri(),
            ready_issuer(),
            &DispatchConfig::default(),
        );
        assert_eq!(
            dispatcher.fan_out_start().await.unwrap(),
            DispatchSummary {
                sent: 1,
                failed: 0,
                total: 1
            }
        );
    }

    #[tokio::test]
    async fn test_empty_registry_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dispatcher = dispatcher(
            TokenRegistry::in_memory(),
            &server.uri(),
            ready_issuer(),
            &DispatchConfig::default(),
        );

        for summary in [
            dispatcher.fan_out_start().await.unwrap(),
            dispatcher.fan_out_update().await.unwrap(),
            dispatcher.fan_out_end().await.unwrap(),
        ] {
            assert_eq!(summary, DispatchSummary::default());
        }
    }

    #[tokio::test]
    async fn test_not_ready_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let registry = TokenRegistry::in_memory();
        register_push_to_start(&registry, "device-a", "token-a").await;

        let dispatcher = dispatcher(
            registry,
            &server.uri(),
            Arc::new(ProviderTokenIssuer::unconfigured("APNs key id is missing")),
            &DispatchConfig::default(),
        );

        assert!(!dispatcher.is_ready());
        assert!(matches!(
            dispatcher.fan_out_start().await,
            Err(ApnsError::Configuration(_))
        ));
        assert!(matches!(
            dispatcher.fan_out_update().await,
            Err(ApnsError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_update_builds_per_token_payloads() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex("^/3/device/live-[0-9]$"))
            .and(body_partial_json(json!({"aps": {"event": "update"}})))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let registry = TokenRegistry::in_memory();
        register_activity(&registry, "device-1", "live-1", BUNDLE_ID).await;
        register_activity(&registry, "device-2", "live-2", BUNDLE_ID).await;
        // Cannot be addressed; counted as failed without a request.
        register_activity(&registry, "device-3", "live-3", "").await;

        let dispatcher = dispatcher(
            registry,
            &server.uri(),
            ready_issuer(),
            &DispatchConfig::default(),
        );
        let summary = dispatcher.fan_out_update().await.unwrap();

        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total, 3);
    }

    #[tokio::test]
    async fn test_end_targets_activity_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/3/device/live-1"))
            .and(body_partial_json(
                json!({"aps": {"event": "end", "content-state": {"status": "afterSchool"}}}),
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let registry = TokenRegistry::in_memory();
        register_push_to_start(&registry, "device-1", "start-1").await;
        register_activity(&registry, "device-1", "live-1", BUNDLE_ID).await;

        let dispatcher = dispatcher(
            registry,
            &server.uri(),
            ready_issuer(),
            &DispatchConfig::default(),
        );
        let summary = dispatcher.fan_out_end().await.unwrap();
        assert_eq!(
            summary,
            DispatchSummary {
                sent: 1,
                failed: 0,
                total: 1
            }
        );
    }

    #[tokio::test]
    async fn test_deadline_counts_outstanding_as_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let registry = TokenRegistry::in_memory();
        for i in 0..4 {
            register_push_to_start(&registry, &format!("device-{i}"), &format!("token-{i}")).await;
        }

        let dispatcher = dispatcher(
            registry,
            &server.uri(),
            ready_issuer(),
            &DispatchConfig::default(),
        );
        let deadline = tokio::time::Instant::now() + Duration::from_millis(200);
        let started = std::time::Instant::now();
        let summary = dispatcher
            .fan_out(LiveActivityEvent::Start, Some(deadline))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.failed, 4);
        assert_eq!(summary.total, 4);
    }

    #[tokio::test]
    async fn test_bounded_concurrency_still_sends_everything() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(5)
            .mount(&server)
            .await;

        let registry = TokenRegistry::in_memory();
        for i in 0..5 {
            register_push_to_start(&registry, &format!("device-{i}"), &format!("token-{i}")).await;
        }

        let config = DispatchConfig {
            max_concurrency: 1,
            ..DispatchConfig::default()
        };
        let dispatcher = dispatcher(registry, &server.uri(), ready_issuer(), &config);
        let summary = dispatcher.fan_out_start().await.unwrap();
        assert_eq!(summary.sent, 5);
        assert_eq!(summary.sent + summary.failed, summary.total);
    }

    #[tokio::test]
    async fn test_send_one_reports_gateway_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/3/device/gone"))
            .respond_with(ResponseTemplate::new(410).set_body_json(json!({"reason": "Unregistered"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/3/device/plain"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
            .mount(&server)
            .await;

        let client = client(&server.uri(), ready_issuer());
        let payload = builder().build_start(chrono::Utc::now());

        match client.send_one("gone", &payload, BUNDLE_ID).await {
            Err(ApnsError::Delivery { status, reason }) => {
                assert_eq!(status, 410);
                assert_eq!(reason, "Unregistered");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        match client.send_one("plain", &payload, BUNDLE_ID).await {
            Err(ApnsError::Delivery { status, reason }) => {
                assert_eq!(status, 500);
                assert_eq!(reason, "upstream broke");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        let client = client("http://127.0.0.1:1", ready_issuer());
        let payload = builder().build_start(chrono::Utc::now());
        assert!(matches!(
            client.send_one("token", &payload, BUNDLE_ID).await,
            Err(ApnsError::Transport(_))
        ));
    }
}
