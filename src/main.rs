use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use harcap::configuration::{Config, Settings};
use harcap::diagnostics::FileDiagnostics;
use harcap::error_handling::types::RunError;
use harcap::lifecycle::{UnitOfWork, UnitRunner};
use harcap::proxy::{BrowserMobEngine, CaptureProxy};
use harcap::recorder::CaptureRecorder;
use log::{error, info, warn};
use tokio::process::Command;

const PROXY_ENV_VARS: [&str; 4] = ["HTTP_PROXY", "HTTPS_PROXY", "http_proxy", "https_proxy"];

#[derive(Parser)]
#[command(name = "harcap")]
#[command(version)]
#[command(about = "Runs a command behind a recording proxy and keeps its HAR according to a recording policy")]
struct Args {
    /// TOML configuration file; when given, it replaces the settings flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name of this unit of work, also used for its diagnostics directory
    #[arg(long, default_value = "harcap-run")]
    label: String,

    #[command(flatten)]
    settings: Settings,

    /// Command to run, given after `--`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Args::parse();

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            match e {
                RunError::ProxyStartup(_) => 2,
                _ => 1,
            }
        }
    };
    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32, RunError> {
    info!("Importing configuration");
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::resolve(args.settings)?,
    };

    let engine = BrowserMobEngine::new(config.engine_url.as_str())?;
    let proxy = Arc::new(CaptureProxy::new(Arc::new(engine)));
    let sink = FileDiagnostics::new(&config.diagnostics_dir).map_err(RunError::SinkError)?;
    let recorder = Arc::new(
        CaptureRecorder::new(config.policy, Arc::clone(&proxy), Arc::new(sink))
            .with_artifact_name(config.artifact_name.clone())
            .with_snapshot_mode(config.snapshot_mode),
    );

    let mut command = Command::new(&args.command[0]);
    command.args(&args.command[1..]);

    if recorder.is_capture_enabled() {
        proxy.acquire().await?;
        if let Some(address) = proxy.proxy_address().await {
            let proxy_url = format!("http://{}", address);
            info!("Routing command traffic through {}", proxy_url);
            for var in PROXY_ENV_VARS {
                command.env(var, &proxy_url);
            }
        }
    } else {
        info!("Recording policy is {}, running without capture proxy", config.policy);
    }

    let runner = UnitRunner::new().with_observer(recorder.clone());
    let unit = UnitOfWork::new(args.label);
    let result = runner
        .run(&unit, async {
            let status = command.status().await.map_err(RunError::SpawnFailed)?;
            if status.success() {
                Ok(())
            } else {
                Err(RunError::CommandFailed(status.code()))
            }
        })
        .await;

    let stats = recorder.stats();
    if stats.failed > 0 {
        warn!("[{}] {} artifact write(s) failed", unit.label, stats.failed);
    }

    match result {
        Ok(()) => Ok(0),
        Err(RunError::CommandFailed(code)) => Ok(code.unwrap_or(1)),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_split_command_after_separator() {
        let args = Args::try_parse_from([
            "harcap",
            "--label",
            "smoke",
            "--record-browser-traffic",
            "always",
            "--",
            "curl",
            "-sf",
            "http://example.test/",
        ])
        .unwrap();

        assert_eq!(args.label, "smoke");
        assert_eq!(args.settings.record_browser_traffic.as_deref(), Some("always"));
        assert_eq!(args.command, vec!["curl", "-sf", "http://example.test/"]);
    }

    #[test]
    fn test_args_require_command() {
        assert!(Args::try_parse_from(["harcap", "--label", "x"]).is_err());
    }
}
