use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};

/// Payout values offered by the tracking networks, in currency cents.
/// Drawn uniformly at random for every outgoing postback.
pub const PAYOUT_OPTIONS_CENTS: &[u32] = &[100, 75, 35, 25, 75, 20, 30, 40, 50, 85];

/// Pick a payout uniformly at random from the configured set.
pub fn pick_payout_cents() -> u32 {
    let mut rng = rand::thread_rng();
    PAYOUT_OPTIONS_CENTS[rng.gen_range(0..PAYOUT_OPTIONS_CENTS.len())]
}

/// Build a postback URL from a base endpoint, a payout in cents and an
/// optional offer id. The payout is rendered as a 2-decimal fraction
/// (`payout=0.75`). Bases conventionally end in `?`; other shapes get
/// the right separator inserted.
pub fn build_postback_url(base: &str, payout_cents: u32, offer_id: Option<&str>) -> String {
    let sep = if base.ends_with('?') || base.ends_with('&') {
        ""
    } else if base.contains('?') {
        "&"
    } else {
        "?"
    };

    let mut url = format!("{}{}payout={:.2}", base, sep, f64::from(payout_cents) / 100.0);
    if let Some(offer_id) = offer_id {
        let encoded: String = url::form_urlencoded::byte_serialize(offer_id.as_bytes()).collect();
        url.push_str("&offer_id=");
        url.push_str(&encoded);
    }
    url
}

/// Outcome of a single best-effort postback POST.
///
/// Non-2xx responses and transport errors are both recorded, never
/// retried and never propagated to the caller's request.
#[derive(Debug, Clone)]
pub enum PostbackOutcome {
    /// The endpoint answered; any status code counts as delivered.
    Delivered { status: u16, body: String },
    /// The request never completed (DNS, connect, read failure).
    Failed { error: String },
}

impl PostbackOutcome {
    /// Status label stored alongside the attempt: the HTTP status code
    /// as a string, or "error" on transport failure.
    pub fn status_label(&self) -> String {
        match self {
            PostbackOutcome::Delivered { status, .. } => status.to_string(),
            PostbackOutcome::Failed { .. } => "error".to_string(),
        }
    }

    /// JSON representation recorded in the attempt's response data.
    pub fn to_json(&self, url: &str) -> Value {
        match self {
            PostbackOutcome::Delivered { status, body } => json!({
                "url": url,
                "status_code": status,
                "response": body,
            }),
            PostbackOutcome::Failed { error } => json!({
                "url": url,
                "status": "error",
                "error": error,
            }),
        }
    }
}

/// Thin HTTP client for outbound postbacks.
///
/// No retry, no backoff, and no timeout beyond reqwest's defaults; the
/// missing total-request timeout is a known resilience gap inherited
/// from the observed behavior.
#[derive(Clone)]
pub struct PostbackClient {
    client: Client,
}

impl Default for PostbackClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PostbackClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// POST a JSON payload to `url` and report what happened.
    pub async fn send(&self, url: &str, payload: &Value) -> PostbackOutcome {
        match self.client.post(url).json(payload).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                // Char-boundary-safe truncation of long response bodies
                let body = match body.char_indices().nth(100) {
                    Some((idx, _)) => format!("{}...", &body[..idx]),
                    None => body,
                };
                PostbackOutcome::Delivered { status, body }
            }
            Err(e) => PostbackOutcome::Failed {
                error: e.to_string(),
            },
        }
    }

    /// One-shot snapshot fan-out triggered synchronously by every form
    /// submission: POSTs the full store snapshot to each base URL with a
    /// randomly drawn payout, plus the optional plain target endpoint.
    ///
    /// Known smell kept from observed behavior: the snapshot is the
    /// entire submissions table, re-read and re-sent on every write.
    /// Failures are logged and swallowed so submissions never fail on it.
    pub async fn fan_out_snapshot(
        &self,
        base_urls: &[String],
        target_url: Option<&str>,
        snapshot: &Value,
    ) {
        for base in base_urls {
            let url = build_postback_url(base, pick_payout_cents(), None);
            match self.send(&url, snapshot).await {
                PostbackOutcome::Delivered { status, body } => {
                    tracing::info!("Sent JSON payload to {}: {} {}", url, status, body);
                }
                PostbackOutcome::Failed { error } => {
                    tracing::error!("Error sending payload to {}: {}", url, error);
                }
            }
        }

        if let Some(target) = target_url {
            match self.send(target, snapshot).await {
                PostbackOutcome::Delivered { status, .. } => {
                    tracing::info!("Sent JSON snapshot to {}: {}", target, status);
                }
                PostbackOutcome::Failed { error } => {
                    tracing::error!("Error sending snapshot to {}: {}", target, error);
                }
            }
        }
    }
}
