#[cfg(test)]
mod tests {
    use crate::models::RegisterPushToStartRequest;
    use crate::registry::TokenRegistry;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime")
    }

    proptest! {
        // After a sweep nothing older than the TTL remains, and everything
        // within it is untouched
        #[test]
        fn test_sweep_partitions_by_age(
            ages_hours in prop::collection::vec(0i64..(60 * 24), 0..40),
            ttl_hours in 1i64..(45 * 24),
        ) {
            let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
            let ttl = Duration::hours(ttl_hours);

            runtime().block_on(async {
                let registry = TokenRegistry::in_memory();
                for (i, age) in ages_hours.iter().enumerate() {
                    registry
                        .register_push_to_start_at(
                            RegisterPushToStartRequest {
                                token: format!("token-{i}"),
                                device_id: format!("device-{i}"),
                                bundle_id: "com.example.schedule".to_string(),
                                timestamp: None,
                                grade: None,
                                class_number: None,
                            },
                            now - Duration::hours(*age),
                        )
                        .await
                        .unwrap();
                }

                let before = registry.all_push_to_start_tokens().await.unwrap();
                let removed = registry.sweep_at(ttl, now).await.unwrap();
                let after = registry.all_push_to_start_tokens().await.unwrap();

                let expected_kept: Vec<_> = before
                    .iter()
                    .filter(|t| now - t.last_updated <= ttl)
                    .cloned()
                    .collect();

                prop_assert_eq!(removed, before.len() - expected_kept.len());
                prop_assert!(after.iter().all(|t| now - t.last_updated <= ttl));
                prop_assert_eq!(after, expected_kept);
                Ok::<(), TestCaseError>(())
            })?;
        }

        // Re-registering one device any number of times keeps exactly one entry
        #[test]
        fn test_reregistration_keeps_single_entry(tokens in prop::collection::vec("[a-f0-9]{8}", 1..10)) {
            runtime().block_on(async {
                let registry = TokenRegistry::in_memory();
                for token in &tokens {
                    registry
                        .register_push_to_start(RegisterPushToStartRequest {
                            token: token.clone(),
                            device_id: "device-a".to_string(),
                            bundle_id: "com.example.schedule".to_string(),
                            timestamp: None,
                            grade: Some(1),
                            class_number: Some(1),
                        })
                        .await
                        .unwrap();
                }
                let stored = registry.all_push_to_start_tokens().await.unwrap();
                prop_assert_eq!(stored.len(), 1);
                prop_assert_eq!(&stored[0].token, tokens.last().unwrap());
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
