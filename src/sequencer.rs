use crate::postback::{build_postback_url, pick_payout_cents, PostbackClient};
use crate::registry::TestRegistry;
use crate::storage::{AttemptRecord, SubmissionStore};
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

/// Generate the mock credit-score payload carried by sequencer postbacks.
fn mock_credit_snapshot(offer_id: &str) -> Value {
    let score: i64 = rand::thread_rng().gen_range(300..=850);
    let risk_level = if score > 700 {
        "low"
    } else if score > 600 {
        "medium"
    } else {
        "high"
    };
    let decision = if score > 650 {
        "approved"
    } else if score > 550 {
        "review"
    } else {
        "denied"
    };

    json!({
        "offer_id": offer_id,
        "credit_score": score,
        "risk_level": risk_level,
        "decision": decision,
        "tracking_id": Uuid::new_v4().to_string(),
        "timestamp": Utc::now().to_rfc3339(),
    })
}

/// Runs bounded sequences of delayed postbacks for test runs.
///
/// One sequencer instance is cloned into each spawned worker task; a
/// worker owns the whole lifetime of exactly one test run and executes
/// its iterations strictly in order. Different runs execute fully
/// concurrently, sharing only the registry and the store.
#[derive(Clone)]
pub struct TestSequencer {
    store: SubmissionStore,
    registry: TestRegistry,
    client: PostbackClient,
    base_urls: Vec<String>,
    iterations: u32,
    delay: Duration,
}

impl TestSequencer {
    pub fn new(
        store: SubmissionStore,
        registry: TestRegistry,
        client: PostbackClient,
        base_urls: Vec<String>,
        iterations: u32,
        delay: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            client,
            base_urls,
            iterations,
            delay,
        }
    }

    /// Spawn the sequence as a detached background task. The request
    /// thread returns immediately; the registry entry must already be
    /// in place so the first iteration sees a live run.
    pub fn spawn(self, test_id: String, offer_id: String) {
        tokio::spawn(async move {
            self.run(&test_id, &offer_id).await;
        });
    }

    /// Execute the full sequence for one test run.
    ///
    /// Cancellation is cooperative: the registry is consulted at every
    /// iteration boundary, and an absent entry stops the run without
    /// touching attempts already recorded. Failures inside an iteration
    /// are logged and the loop continues; a background worker never
    /// takes the process down.
    pub async fn run(&self, test_id: &str, offer_id: &str) {
        tracing::info!(
            "Starting test sequence for offer {} with test id {}",
            offer_id,
            test_id
        );

        for number in 1..=self.iterations {
            if !self.registry.contains(test_id).await {
                tracing::info!(
                    "Test {} was cancelled after {} iteration(s)",
                    test_id,
                    number - 1
                );
                return;
            }

            if let Err(e) = self.run_iteration(test_id, offer_id, number).await {
                tracing::error!("Iteration {} of test {} failed: {}", number, test_id, e);
            }

            // No sleep after the last iteration
            if number < self.iterations {
                tokio::time::sleep(self.delay).await;
            }
        }

        if let Err(e) = self.store.mark_test_complete(test_id).await {
            tracing::error!("Failed to mark test {} as completed: {}", test_id, e);
        }
        self.registry.remove(test_id).await;
        tracing::info!("Test {} completed", test_id);
    }

    /// One iteration: a fresh snapshot POSTed to every configured base
    /// endpoint with an independently drawn payout, one recorded attempt
    /// per endpoint.
    async fn run_iteration(
        &self,
        test_id: &str,
        offer_id: &str,
        number: u32,
    ) -> Result<(), crate::errors::AppError> {
        let snapshot = mock_credit_snapshot(offer_id);

        for base in &self.base_urls {
            let url = build_postback_url(base, pick_payout_cents(), Some(offer_id));
            let outcome = self.client.send(&url, &snapshot).await;

            let mut response_data = snapshot.clone();
            response_data["postback"] = json!({
                "url": url,
                "result": outcome.to_json(&url),
            });

            self.store
                .record_attempt(&AttemptRecord {
                    offer_id: offer_id.to_string(),
                    test_id: test_id.to_string(),
                    response_number: i64::from(number),
                    response_data: response_data.to_string(),
                    postback_url: url.clone(),
                    postback_status: outcome.status_label(),
                })
                .await?;

            tracing::info!(
                "Saved response {} for test {} with postback to {}",
                number,
                test_id,
                url
            );
        }

        Ok(())
    }
}
