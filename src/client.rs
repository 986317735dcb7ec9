use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_lambda::config::Region;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use aws_sdk_lambda::Client;

use crate::config::BedlambConfig;
use crate::error::{BedlambError, Result};

/// Outcome of a single synchronous invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResult {
    pub status_code: i32,
    /// Set when the function ran but raised an error.
    pub function_error: Option<String>,
    pub payload: Vec<u8>,
}

/// Something that can run a function and wait for its answer.
pub trait Invoke {
    async fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<InvocationResult>;
}

pub struct LambdaInvoker {
    client: Client,
}

impl LambdaInvoker {
    /// Resolves region and credentials from the AWS default chain, with
    /// `settings` overriding it field by field.
    pub async fn connect(settings: &BedlambConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(url) = &settings.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;

        let region = sdk_config.region().ok_or_else(|| {
            BedlambError::Config("no region configured (set --region or AWS_REGION)".into())
        })?;
        tracing::debug!(%region, profile = ?settings.profile, "resolved AWS region");

        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| BedlambError::Config("no credentials provider available".into()))?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| BedlambError::Config(DisplayErrorContext(&e).to_string()))?;
        tracing::debug!("resolved AWS credentials");

        Ok(Self {
            client: Client::new(&sdk_config),
        })
    }
}

impl Invoke for LambdaInvoker {
    async fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<InvocationResult> {
        tracing::debug!(function = target, bytes = payload.len(), "invoking function");
        let output = self
            .client
            .invoke()
            .function_name(target)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| BedlambError::Invoke(DisplayErrorContext(&e).to_string()))?;

        let result = InvocationResult {
            status_code: output.status_code(),
            function_error: output.function_error().map(String::from),
            payload: output
                .payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default(),
        };
        tracing::debug!(
            status = result.status_code,
            function_error = ?result.function_error,
            bytes = result.payload.len(),
            "invocation returned"
        );
        Ok(result)
    }
}
