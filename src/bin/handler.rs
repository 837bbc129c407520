use anyhow::Context as _;
use log::{error, info};
use tokio::io::AsyncReadExt;

use reconciler::{Config, LifecycleEvent, ProcessRunner, ReconcileError, Reconciler};

/// Exit 0 tells the invoking framework the resource operation succeeded, 1 that it failed.
#[tokio::main]
async fn main() {
  env_logger::init();

  match run().await {
    Ok(()) => std::process::exit(0),
    Err(e) => {
      error!("{:?}", e);
      if let Some(code) = e.downcast_ref::<ReconcileError>().and_then(ReconcileError::exit_code) {
        error!("Command exit code: {}", code);
      }
      error!("Signaling failure");
      std::process::exit(1);
    }
  }
}

async fn run() -> anyhow::Result<()> {
  let config = Config::from_env();
  info!(
    "Configuration loaded: kubeconfig={}",
    config.kubeconfig_path.display()
  );

  let event = read_event(std::env::args().nth(1)).await?;

  let reconciler = Reconciler::new(ProcessRunner, config);
  let outcome = reconciler
    .handle(&event)
    .await
    .with_context(|| format!("Failed to handle {:?} request", event.request_type))?;

  println!("{}", serde_json::to_string(&outcome)?);
  Ok(())
}

// the event comes from a file argument, or stdin when none (or `-`) is given
async fn read_event(source: Option<String>) -> anyhow::Result<LifecycleEvent> {
  let raw = match source.as_deref() {
    None | Some("-") => {
      let mut buf = String::new();
      tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("Failed to read event from stdin")?;
      buf
    }
    Some(path) => tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("Failed to read event file {}", path))?,
  };

  serde_json::from_str(&raw).context("Failed to decode lifecycle event")
}
