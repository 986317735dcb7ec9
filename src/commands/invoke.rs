use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::client::{InvocationResult, Invoke, LambdaInvoker};
use crate::config::BedlambConfig;
use crate::error::{BedlambError, Result};
use crate::event::{self, ProxyEvent, RequestSpec};
use crate::output;

pub struct InvokeArgs {
    pub target: String,
    pub request: RequestSpec,
    pub verbose: bool,
}

/// Echoes the request before any AWS configuration is read, then invokes.
/// `overrides` win over values from the config file.
pub async fn run(
    args: &InvokeArgs,
    overrides: BedlambConfig,
    config_path: Option<&Path>,
) -> Result<()> {
    let payload = prepare(args, &mut std::io::stderr())?;
    let settings = overrides.or(BedlambConfig::load(config_path)?);
    let invoker = LambdaInvoker::connect(&settings).await?;
    let result = execute(&invoker, &args.target, payload).await?;
    report(
        &result,
        args.verbose,
        &mut std::io::stderr(),
        &mut std::io::stdout().lock(),
    )
}

/// Builds and serializes the proxy event, echoing it to `trace` in verbose mode.
pub fn prepare(args: &InvokeArgs, trace: &mut impl Write) -> Result<Vec<u8>> {
    let request_id = event::new_request_id(crate::VERSION);
    tracing::debug!(%request_id, "building proxy event");
    let event = ProxyEvent::build(&args.request, request_id);
    let payload = serde_json::to_vec(&event)?;

    if args.verbose {
        let pretty = serde_json::to_string_pretty(&event)?;
        output::write_request_trace(trace, &args.target, &pretty)?;
    }
    Ok(payload)
}

/// Writes the status line (verbose only) to `trace` and the response to `out`.
pub fn report(
    result: &InvocationResult,
    verbose: bool,
    trace: &mut impl Write,
    out: &mut impl Write,
) -> Result<()> {
    if verbose {
        output::write_status_trace(trace, result.status_code)?;
    }
    output::write_response(out, &result.payload)?;
    Ok(())
}

/// Invokes `target` and turns a function-level error into a failure.
pub async fn execute<I: Invoke>(
    invoker: &I,
    target: &str,
    payload: Vec<u8>,
) -> Result<InvocationResult> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} Invoking {msg}...")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(target.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = invoker.invoke(target, payload).await;
    spinner.finish_and_clear();
    let result = result?;

    if let Some(error) = &result.function_error {
        return Err(BedlambError::function(error.as_str(), &result.payload));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;

    struct FakeInvoker {
        reply: std::result::Result<InvocationResult, String>,
        seen: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl FakeInvoker {
        fn replying(reply: InvocationResult) -> Self {
            Self {
                reply: Ok(reply),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Invoke for FakeInvoker {
        async fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<InvocationResult> {
            self.seen.lock().unwrap().push((target.to_string(), payload));
            self.reply.clone().map_err(BedlambError::Invoke)
        }
    }

    fn args(method: &str, headers: &str) -> InvokeArgs {
        InvokeArgs {
            target: "arn:aws:lambda:us-east-1:123456789012:function:my-function".into(),
            request: RequestSpec {
                method: method.into(),
                path: "/api/users".into(),
                headers: headers.into(),
                query: String::new(),
                body: r#"{"name":"John"}"#.into(),
            },
            verbose: false,
        }
    }

    fn ok_result(payload: &[u8]) -> InvocationResult {
        InvocationResult {
            status_code: 200,
            function_error: None,
            payload: payload.to_vec(),
        }
    }

    #[test]
    fn prepared_payload_is_a_gateway_event() {
        let payload = prepare(&args("post", "X-Trace:abc,broken"), &mut Vec::new()).unwrap();
        let value: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value["httpMethod"], "POST");
        assert_eq!(value["requestContext"]["httpMethod"], "POST");
        assert_eq!(value["requestContext"]["stage"], "prod");
        assert_eq!(value["headers"], serde_json::json!({"X-Trace": "abc"}));
        assert_eq!(value["body"], r#"{"name":"John"}"#);
        let request_id = value["requestContext"]["requestId"].as_str().unwrap();
        assert!(request_id.starts_with(&format!("bedlamb-{}-", crate::VERSION)));
    }

    #[test]
    fn identical_flags_get_distinct_request_ids() {
        let a = prepare(&args("get", ""), &mut Vec::new()).unwrap();
        let b = prepare(&args("get", ""), &mut Vec::new()).unwrap();
        let a: Value = serde_json::from_slice(&a).unwrap();
        let b: Value = serde_json::from_slice(&b).unwrap();
        assert_ne!(
            a["requestContext"]["requestId"],
            b["requestContext"]["requestId"]
        );
    }

    #[tokio::test]
    async fn execute_forwards_target_and_payload() {
        let invoker = FakeInvoker::replying(ok_result(br#"{"ok":true}"#));
        let result = execute(&invoker, "my-function", b"{}".to_vec())
            .await
            .unwrap();
        assert_eq!(result.status_code, 200);
        assert_eq!(result.payload, br#"{"ok":true}"#);

        let seen = invoker.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "my-function");
        assert_eq!(seen[0].1, b"{}");
    }

    #[tokio::test]
    async fn function_error_carries_error_and_body() {
        let invoker = FakeInvoker::replying(InvocationResult {
            status_code: 200,
            function_error: Some("Unhandled".into()),
            payload: br#"{"errorMessage":"boom"}"#.to_vec(),
        });
        let err = execute(&invoker, "my-function", b"{}".to_vec())
            .await
            .unwrap_err();
        match &err {
            BedlambError::Function { error, payload } => {
                assert_eq!(error, "Unhandled");
                assert_eq!(payload, r#"{"errorMessage":"boom"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("Lambda function error: Unhandled"));
        assert!(msg.contains("boom"));
    }

    #[tokio::test]
    async fn transport_failure_is_an_invoke_error() {
        let invoker = FakeInvoker::failing("dispatch failure");
        let err = execute(&invoker, "my-function", b"{}".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, BedlambError::Invoke(_)));
        assert_eq!(err.to_string(), "Error invoking Lambda: dispatch failure");
    }

    #[test]
    fn verbose_prepare_echoes_target_and_pretty_request() {
        let mut verbose = args("get", "");
        verbose.verbose = true;
        let mut trace = Vec::new();
        prepare(&verbose, &mut trace).unwrap();

        let trace = String::from_utf8(trace).unwrap();
        let head = format!("Lambda ARN: {}\nRequest payload:\n{{\n", verbose.target);
        assert!(trace.starts_with(&head));
        assert!(trace.contains("\n  \"httpMethod\": \"GET\",\n"));
        assert!(trace.ends_with("}\n\nInvoking Lambda...\n\n"));
    }

    #[test]
    fn quiet_prepare_writes_nothing() {
        let mut trace = Vec::new();
        prepare(&args("get", ""), &mut trace).unwrap();
        assert!(trace.is_empty());
    }

    #[tokio::test]
    async fn verbose_report_puts_status_on_trace_and_body_on_out() {
        let invoker = FakeInvoker::replying(ok_result(br#"{"ok":true}"#));
        let result = execute(&invoker, "my-function", b"{}".to_vec())
            .await
            .unwrap();

        let (mut trace, mut out) = (Vec::new(), Vec::new());
        report(&result, true, &mut trace, &mut out).unwrap();
        assert_eq!(String::from_utf8(trace).unwrap(), "Status code: 200\nResponse:\n");
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"ok\": true\n}\n");
    }

    #[test]
    fn quiet_report_prints_raw_non_json_body() {
        let (mut trace, mut out) = (Vec::new(), Vec::new());
        report(&ok_result(b"plain text"), false, &mut trace, &mut out).unwrap();
        assert!(trace.is_empty());
        assert_eq!(out, b"plain text\n");
    }
}
