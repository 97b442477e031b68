//! cognito-domain-link binary entry point.

use clap::Parser;
use cognito_domain_link::response::{self, CustomResourceResponse};
use cognito_domain_link::{
    telemetry, CognitoStatusReader, Config, Deadline, LifecycleEvent, LifecycleOrchestrator,
    Route53Zone,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Link a Cognito custom domain's CloudFront distribution to a Route53 alias.
#[derive(Parser, Debug)]
#[command(name = "cognito-domain-link")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML). Optional.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CloudFormation custom resource request (JSON); `-` reads stdin.
    #[arg(short, long, default_value = "-")]
    event: PathBuf,

    /// Also PUT the response document to the event's ResponseURL.
    #[arg(long)]
    send_response: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let mut builder = config::Config::builder();
    if let Some(path) = &args.config {
        builder = builder.add_source(config::File::from(path.clone()));
    }
    let config: Config = builder
        .add_source(
            config::Environment::with_prefix("DOMAIN_LINK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    // Initialize telemetry
    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    let event = read_event(&args.event)?;
    info!(
        request_type = %event.request_type,
        logical_resource_id = %event.logical_resource_id,
        stack_id = %event.stack_id,
        "Starting cognito-domain-link"
    );

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let orchestrator = LifecycleOrchestrator::new(
        Arc::new(CognitoStatusReader::new(&sdk_config, &config.aws)),
        Arc::new(Route53Zone::new(&sdk_config, &config.aws)),
        config.resolver.backoff(),
    );

    let deadline = Deadline::after(config.invocation.budget());
    let invocation = orchestrator
        .handle_until(&event, &deadline, shutdown_signal())
        .await;

    let log_hint = std::env::var("AWS_LAMBDA_LOG_STREAM_NAME")
        .unwrap_or_else(|_| "the cognito-domain-link logs".to_string());
    let document = CustomResourceResponse::new(&event, &invocation, &log_hint);
    println!("{}", serde_json::to_string_pretty(&document)?);

    if args.send_response {
        if event.response_url.is_empty() {
            error!("--send-response given but the event has no ResponseURL");
            return Err("missing ResponseURL".into());
        }
        let client = reqwest::Client::new();
        response::send(&client, &event.response_url, &document).await?;
    }

    if let Err(e) = invocation.outcome {
        error!("cognito-domain-link failed: {}", e);
        return Err(e.into());
    }

    info!("cognito-domain-link complete");
    Ok(())
}

/// Resolves with the name of the first SIGINT or SIGTERM received.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => tokio::select! {
                _ = ctrl_c() => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
            },
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                ctrl_c().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
        "SIGINT"
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn read_event(path: &Path) -> Result<LifecycleEvent, Box<dyn std::error::Error>> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&raw)?)
}
