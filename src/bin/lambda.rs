//! AWS Lambda entry point for the bundle canary.
//!
//! Deploy with `cargo lambda build --release --features lambda` and attach a
//! scheduled EventBridge rule.
//!
//! ## Environment Variables
//!
//! - `S3_BUCKET`: bucket for daily snapshots (default: `humble-bundle-canary`)
//! - `SNS_TOPIC_ARN`: topic notifications are published to
//! - `CANARY_TIMEOUT_SECS`: HTTP request timeout
//! - `CANARY_USER_AGENT`: User-Agent sent with page requests
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bundle_canary::lambda::handler;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    // Library code logs through `log`; `init` also bridges those records.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Bundle canary Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
