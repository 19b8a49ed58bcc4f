use serde::Deserialize;

/// Default postback base URLs (survey-network tracking endpoints).
/// Each ends with `?` so query parameters are appended directly.
const DEFAULT_POSTBACK_BASE_URLS: &[&str] = &[
    "https://surveytitans.com/postback/7b7662e8159314ef0bdb32bf038bba29?",
    "https://kingopinions.com/postback/d90a817d5474da1feb49ec55c69f6bbf?",
    "https://surveytitans.com/postback/6ccfb58eb8c47a7a54f4ca8a9bbcabcc?",
    "https://surveytitans.com/postback/db2321a6b97f71653fd07f2ac70af751?",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URLs that receive postbacks, both from the per-submission
    /// snapshot fan-out and from background test sequences.
    pub postback_base_urls: Vec<String>,
    /// Optional extra endpoint that receives the raw store snapshot
    /// on every submission, without payout parameters.
    pub snapshot_target_url: Option<String>,
    /// Number of iterations a test sequence runs.
    pub test_iterations: u32,
    /// Delay between iterations, in seconds. Production default is 1200
    /// (20 minutes); lower it for fast verification.
    pub iteration_delay_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://loan_submissions.db?mode=rwc".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            postback_base_urls: match std::env::var("POSTBACK_BASE_URLS") {
                Ok(raw) => {
                    let urls: Vec<String> = raw
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                    if urls.is_empty() {
                        anyhow::bail!("POSTBACK_BASE_URLS must contain at least one URL");
                    }
                    for url in &urls {
                        if !url.starts_with("http://") && !url.starts_with("https://") {
                            anyhow::bail!(
                                "POSTBACK_BASE_URLS entries must start with http:// or https://"
                            );
                        }
                    }
                    urls
                }
                Err(_) => DEFAULT_POSTBACK_BASE_URLS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            snapshot_target_url: std::env::var("SNAPSHOT_TARGET_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            test_iterations: std::env::var("TEST_ITERATIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("TEST_ITERATIONS must be a positive number"))?,
            iteration_delay_secs: std::env::var("ITERATION_DELAY_SECS")
                .unwrap_or_else(|_| "1200".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ITERATION_DELAY_SECS must be a number"))?,
        };

        if config.test_iterations == 0 {
            anyhow::bail!("TEST_ITERATIONS must be at least 1");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}", config.database_url);
        tracing::debug!(
            "Postback base URLs configured: {}",
            config.postback_base_urls.len()
        );
        if let Some(ref target) = config.snapshot_target_url {
            tracing::info!("Snapshot target URL configured: {}", target);
        }
        tracing::debug!(
            "Test sequence: {} iterations, {}s apart",
            config.test_iterations,
            config.iteration_delay_secs
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Total expected duration of one test sequence, in minutes.
    pub fn expected_duration_minutes(&self) -> u64 {
        u64::from(self.test_iterations) * self.iteration_delay_secs / 60
    }
}
