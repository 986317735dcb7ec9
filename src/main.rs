mod client;
mod commands;
mod config;
mod error;
mod event;
mod output;

use clap::{CommandFactory, Parser};
use commands::invoke::InvokeArgs;
use config::BedlambConfig;
use error::{BedlambError, Result};
use event::RequestSpec;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Release builds may stamp their own version through `BEDLAMB_VERSION`.
pub const VERSION: &str = match option_env!("BEDLAMB_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

const EXAMPLE: &str = "Example:\n  bedlamb -X POST --path /api/users -d '{\"name\":\"John\"}' \
arn:aws:lambda:us-east-1:123456789012:function:my-function";

#[derive(Parser, Debug)]
#[command(
    name = "bedlamb",
    about = "Invoke a Lambda function with a synthetic API Gateway proxy event",
    disable_version_flag = true,
    after_help = EXAMPLE
)]
struct Cli {
    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request path
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Headers in format 'Key1:Value1,Key2:Value2'
    #[arg(short = 'H', long)]
    headers: Option<String>,

    /// Request body data
    #[arg(short, long)]
    data: Option<String>,

    /// Query string parameters in format 'key1=value1,key2=value2'
    #[arg(short, long)]
    query: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,

    /// AWS region (defaults to the SDK chain)
    #[arg(long)]
    region: Option<String>,

    /// AWS shared config profile
    #[arg(long)]
    profile: Option<String>,

    /// Override the Lambda endpoint, e.g. a local emulator
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Config file (default ~/.bedlamb/config.toml)
    #[arg(long, env = "BEDLAMB_CONFIG")]
    config: Option<PathBuf>,

    /// Lambda function name or ARN
    #[arg(value_name = "LAMBDA_ARN")]
    target: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BEDLAMB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let target = cli
        .target
        .ok_or_else(|| BedlambError::Usage("Error: Lambda ARN is required".into()))?;

    let flags = BedlambConfig {
        region: cli.region,
        profile: cli.profile,
        endpoint_url: cli.endpoint_url,
    };

    let args = InvokeArgs {
        target,
        request: RequestSpec {
            method: cli.method,
            path: cli.path,
            headers: cli.headers.unwrap_or_default(),
            query: cli.query.unwrap_or_default(),
            body: cli.data.unwrap_or_default(),
        },
        verbose: cli.verbose,
    };
    commands::invoke::run(&args, flags, cli.config.as_deref()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if cli.version {
        println!("{VERSION}");
        return;
    }

    init_tracing();

    if let Err(e) = run(cli).await {
        output::print_error(&e.to_string());
        if matches!(e, BedlambError::Usage(_)) {
            eprintln!("\n{}", Cli::command().render_help());
        }
        std::process::exit(1);
    }
}
