//! # Global Transactions over HTTP
//!
//! Drives `GlobalTransactionCoordinatorClient` against the in-process
//! coordinator and branch service from [`super::support`] and checks the
//! order of calls both sides observed.

#[cfg(test)]
mod tests {
    use super::super::support::{Harness, Observed, TENANT_HEADER};
    use serde_json::json;
    use tcc_client::{
        GlobalTransactionCoordinatorClient, ResponseClass, TccConfig, TccError, PARAM_DTM,
    };

    fn client(harness: &Harness) -> GlobalTransactionCoordinatorClient {
        let config = TccConfig {
            coordinator_url: harness.dtm(),
            ..TccConfig::default()
        };
        GlobalTransactionCoordinatorClient::http(&config).unwrap()
    }

    fn prepare(gid: &str) -> Observed {
        Observed::Prepare {
            gid: gid.to_string(),
        }
    }

    fn register(gid: &str, branch_id: &str) -> Observed {
        Observed::Register {
            gid: gid.to_string(),
            branch_id: branch_id.to_string(),
        }
    }

    fn tried(gid: &str, branch_id: &str) -> Observed {
        Observed::Try {
            gid: gid.to_string(),
            branch_id: branch_id.to_string(),
            op: "try".to_string(),
            tenant: None,
        }
    }

    fn submit(gid: &str) -> Observed {
        Observed::Submit {
            gid: gid.to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_two_branches_then_submit() {
        let harness = Harness::start().await;
        let client = client(&harness);
        let (try_url, confirm, cancel) = (
            harness.url("/svc/try"),
            harness.url("/svc/confirm"),
            harness.url("/svc/cancel"),
        );

        client
            .global_transaction(client.coordinator_url(), "order-1", |tcc| async move {
                tcc.call_branch(&json!({"amount": 30}), &try_url, &confirm, &cancel)
                    .await?;
                tcc.call_branch(&json!({"amount": 30}), &try_url, &confirm, &cancel)
                    .await?;
                Ok::<_, TccError>(())
            })
            .await
            .unwrap();

        assert_eq!(
            harness.log_for("order-1"),
            vec![
                prepare("order-1"),
                register("order-1", "01"),
                tried("order-1", "01"),
                register("order-1", "02"),
                tried("order-1", "02"),
                submit("order-1"),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_try_aborts_with_reason() {
        let harness = Harness::start().await;
        let client = client(&harness);
        let (ok_url, fail_url, confirm, cancel) = (
            harness.url("/svc/try"),
            harness.url("/svc/try-fail"),
            harness.url("/svc/confirm"),
            harness.url("/svc/cancel"),
        );

        let err = client
            .global_transaction(client.coordinator_url(), "order-2", |tcc| async move {
                tcc.call_branch(&json!({}), &ok_url, &confirm, &cancel).await?;
                tcc.call_branch(&json!({}), &fail_url, &confirm, &cancel)
                    .await?;
                Ok::<_, TccError>(())
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TccError::TryFailed { ref branch_id, class: Some(ResponseClass::Failure), .. }
                if branch_id == "02"
        ));

        let log = harness.log_for("order-2");
        assert_eq!(
            &log[..5],
            &[
                prepare("order-2"),
                register("order-2", "01"),
                tried("order-2", "01"),
                register("order-2", "02"),
                tried("order-2", "02"),
            ]
        );
        match &log[5] {
            Observed::Abort { reason, .. } => {
                let reason = reason.as_deref().unwrap_or_default();
                assert!(reason.contains("02"), "reason: {}", reason);
                assert!(reason.contains("FAILURE"), "reason: {}", reason);
            }
            other => panic!("expected abort, got {:?}", other),
        }
        assert_eq!(log.len(), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ongoing_try_is_reported_as_ongoing() {
        let harness = Harness::start().await;
        let client = client(&harness);
        let (ongoing_url, confirm, cancel) = (
            harness.url("/svc/try-ongoing"),
            harness.url("/svc/confirm"),
            harness.url("/svc/cancel"),
        );

        let err = client
            .global_transaction(client.coordinator_url(), "order-8", |tcc| async move {
                tcc.call_branch(&json!({}), &ongoing_url, &confirm, &cancel)
                    .await?;
                Ok::<_, TccError>(())
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TccError::TryFailed { class: Some(ResponseClass::Ongoing), .. }
        ));
        assert!(matches!(
            harness.log_for("order-8").last(),
            Some(Observed::Abort { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_branch_headers_reach_try() {
        let harness = Harness::start().await;
        let client = client(&harness);
        let (try_url, confirm, cancel) = (
            harness.url("/svc/try"),
            harness.url("/svc/confirm"),
            harness.url("/svc/cancel"),
        );

        client
            .global_transaction_with(
                client.coordinator_url(),
                "order-7",
                |ctx| {
                    ctx.options_mut()
                        .branch_headers
                        .insert(TENANT_HEADER.to_string(), "acme".to_string());
                },
                |tcc| async move {
                    tcc.call_branch(&json!({}), &try_url, &confirm, &cancel)
                        .await?;
                    Ok::<_, TccError>(())
                },
            )
            .await
            .unwrap();

        assert_eq!(
            harness.log_for("order-7"),
            vec![
                prepare("order-7"),
                register("order-7", "01"),
                Observed::Try {
                    gid: "order-7".to_string(),
                    branch_id: "01".to_string(),
                    op: "try".to_string(),
                    tenant: Some("acme".to_string()),
                },
                submit("order-7"),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rejected_registration_skips_try() {
        let harness = Harness::start().await;
        harness.reject_branch("01");
        let client = client(&harness);
        let (try_url, confirm, cancel) = (
            harness.url("/svc/try"),
            harness.url("/svc/confirm"),
            harness.url("/svc/cancel"),
        );

        let err = client
            .global_transaction(client.coordinator_url(), "order-3", |tcc| async move {
                tcc.call_branch(&json!({}), &try_url, &confirm, &cancel).await?;
                Ok::<_, TccError>(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TccError::RegistrationRejected { .. }));
        let log = harness.log_for("order-3");
        assert_eq!(log[..2], [prepare("order-3"), register("order-3", "01")]);
        assert!(matches!(log[2], Observed::Abort { .. }));
        assert!(!log.iter().any(|o| matches!(o, Observed::Try { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_business_error_aborts_without_branches() {
        let harness = Harness::start().await;
        let client = client(&harness);

        let err = client
            .global_transaction(client.coordinator_url(), "order-4", |_tcc| async move {
                Err::<(), _>(TccError::business("credit check failed"))
            })
            .await
            .unwrap_err();

        assert_eq!(err, TccError::business("credit check failed"));
        assert_eq!(
            harness.log_for("order-4"),
            vec![
                prepare("order-4"),
                Observed::Abort {
                    gid: "order-4".to_string(),
                    reason: Some("credit check failed".to_string()),
                },
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_nested_branch_registers_under_parent() {
        let harness = Harness::start().await;
        let client = client(&harness);
        let base = harness.url("");
        let (nested_url, confirm, cancel) = (
            harness.url("/svc/try-nested"),
            harness.url("/svc/confirm"),
            harness.url("/svc/cancel"),
        );

        client
            .global_transaction(client.coordinator_url(), "order-5", |tcc| async move {
                tcc.call_branch(&json!({ "base": base }), &nested_url, &confirm, &cancel)
                    .await?;
                Ok::<_, TccError>(())
            })
            .await
            .unwrap();

        assert_eq!(
            harness.log_for("order-5"),
            vec![
                prepare("order-5"),
                register("order-5", "01"),
                tried("order-5", "01"),
                register("order-5", "0101"),
                tried("order-5", "0101"),
                submit("order-5"),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_auto_gid_from_coordinator() {
        let harness = Harness::start().await;
        let client = client(&harness);

        let gid = client
            .global_transaction_auto(
                client.coordinator_url(),
                |ctx| ctx.set_custom_data("batch-7"),
                |tcc| async move { Ok::<_, TccError>(tcc.gid().to_string()) },
            )
            .await
            .unwrap();

        assert_eq!(gid, "auto-1");
        assert_eq!(
            harness.log_for("auto-1"),
            vec![
                Observed::NewGid {
                    gid: "auto-1".to_string()
                },
                prepare("auto-1"),
                submit("auto-1"),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_branch_without_identity_is_refused() {
        let harness = Harness::start().await;

        let response = reqwest::Client::new()
            .post(harness.url("/svc/try"))
            .query(&[(PARAM_DTM, harness.dtm())])
            .json(&json!({}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body = response.text().await.unwrap();
        assert!(body.starts_with("bad tcc info"), "body: {}", body);
        assert!(harness.log().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unreachable_coordinator_fails_prepare() {
        let client = GlobalTransactionCoordinatorClient::http(&TccConfig::default()).unwrap();
        let mut ran = false;
        let ran_ref = &mut ran;

        let err = client
            .global_transaction("http://127.0.0.1:9/api/dtmsvr", "order-6", move |_tcc| {
                *ran_ref = true;
                async move { Ok::<_, TccError>(()) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TccError::PrepareFailed { ref gid, .. } if gid == "order-6"));
        assert!(!ran);
    }
}
