use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rivulet_components::register_all;
use rivulet_graph::Factory;
use rivulet_protocol::{Message, Runtime};

mod settings;

use settings::Settings;

/// Rivulet - a flow-based programming runtime
#[derive(Parser)]
#[command(name = "rivulet")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to a JSON settings file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Log filter, e.g. `debug` or `rivulet_graph=trace` (overrides RUST_LOG)
  #[arg(long, global = true)]
  log: Option<String>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Serve the protocol over stdin/stdout, one JSON message per line
  Serve,

  /// Dispatch a JSON array of protocol messages and wait for the network
  Run {
    /// Path to the message script
    script: PathBuf,
  },

  /// List the registered component types
  Components,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  let settings = Settings::load(cli.config.as_deref())?;
  init_tracing(cli.log.as_deref(), settings.log_filter.as_deref());

  let factory = Arc::new(Factory::with_config(settings.registry.clone()));
  register_all(&factory, settings.network.clone()).context("failed to register components")?;

  match cli.command {
    Some(Commands::Serve) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(serve(Runtime::new(factory, settings.network)))?;
    }
    Some(Commands::Run { script }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(run_script(Runtime::new(factory, settings.network), script))?;
    }
    Some(Commands::Components) => {
      for registered in factory.list() {
        let description = registered
          .annotation
          .map(|a| a.description)
          .unwrap_or_default();
        println!("{:<20} {}", registered.name, description);
      }
    }
    None => {
      println!("rivulet - use --help to see available commands");
    }
  }

  Ok(())
}

/// `--log` wins, then `RUST_LOG`, then the settings file, then `info`.
fn init_tracing(cli_filter: Option<&str>, settings_filter: Option<&str>) {
  let filter = match cli_filter {
    Some(directive) => EnvFilter::new(directive),
    None => EnvFilter::try_from_default_env()
      .unwrap_or_else(|_| EnvFilter::new(settings_filter.unwrap_or("info"))),
  };

  tracing_subscriber::registry()
    .with(
      fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter),
    )
    .init();
}

fn error_reply(err: impl Display) -> Message {
  Message::new("runtime", "error", json!({ "message": err.to_string() }))
}

async fn serve(mut runtime: Runtime) -> Result<()> {
  let cancel = CancellationToken::new();
  let interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      interrupt.cancel();
    }
  });

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  let mut stdout = tokio::io::stdout();
  info!("serve_started");

  loop {
    let line = tokio::select! {
      _ = cancel.cancelled() => {
        info!("serve_interrupted");
        break;
      }
      line = lines.next_line() => line.context("failed to read from stdin")?,
    };
    let Some(line) = line else {
      break;
    };
    if line.trim().is_empty() {
      continue;
    }

    let replies = match serde_json::from_str::<Message>(&line) {
      Ok(msg) => runtime.handle(msg).unwrap_or_else(|err| {
        warn!(error = %err, "command_failed");
        vec![error_reply(err)]
      }),
      Err(err) => vec![error_reply(format!("malformed message: {}", err))],
    };

    for reply in replies {
      let mut out = serde_json::to_string(&reply)?;
      out.push('\n');
      stdout.write_all(out.as_bytes()).await?;
    }
    stdout.flush().await?;
  }

  info!("serve_stopped");
  Ok(())
}

async fn run_script(mut runtime: Runtime, script: PathBuf) -> Result<()> {
  let content = tokio::fs::read_to_string(&script)
    .await
    .with_context(|| format!("failed to read script: {}", script.display()))?;
  let messages: Vec<Message> = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse script: {}", script.display()))?;

  eprintln!("Loaded {} messages", messages.len());

  for msg in messages {
    let key = msg.key();
    let replies = runtime
      .handle(msg)
      .with_context(|| format!("command failed: {}", key))?;
    for reply in replies {
      eprintln!("{}", serde_json::to_string(&reply)?);
    }
  }

  if let Ok(wait) = runtime.wait() {
    wait.wait().await;
    eprintln!("Network finished");
  }

  Ok(())
}
