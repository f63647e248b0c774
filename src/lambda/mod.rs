// src/lambda/mod.rs

//! AWS Lambda handler for the canary.
//!
//! The function is invoked on a schedule. The event payload and context are
//! not used; the response is a JSON boolean telling whether the run
//! succeeded.

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Canary;
use crate::services::SnsPublisher;
use crate::storage::S3ObjectStore;
use crate::utils::http::HttpFetcher;

/// Main Lambda handler function.
#[instrument(skip(event), fields(request_id = %event.context.request_id))]
pub async fn handler(event: LambdaEvent<Value>) -> std::result::Result<bool, LambdaError> {
    info!("Handling event: {:?}", event.payload);
    Ok(execute(build_canary().await).await)
}

/// Run a wired canary, reporting a setup failure as an unsuccessful run.
async fn execute(canary: Result<Canary>) -> bool {
    let canary = match canary {
        Ok(canary) => canary,
        Err(e) => {
            error!("Failed to set up canary: {}", e);
            return false;
        }
    };

    let success = canary.run().await;
    if success {
        info!("Canary run successful");
    } else {
        error!("Canary run failed");
    }
    success
}

/// Wire the production collaborators from the environment.
async fn build_canary() -> Result<Canary> {
    let config = Config::from_env();
    config.validate()?;

    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3ObjectStore::new(aws_sdk_s3::Client::new(&aws), config.bucket.clone());
    let publisher = SnsPublisher::new(aws_sdk_sns::Client::new(&aws));
    let fetcher = HttpFetcher::from_config(&config.scraper)?;

    info!(
        "Canary configured: bucket={}, topic configured={}",
        config.bucket,
        config.topic_arn.is_some()
    );
    Canary::new(config, Arc::new(fetcher), Arc::new(store), Arc::new(publisher))
}
