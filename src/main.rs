use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use webjars_server::config::{self, AppState, Config};
use webjars_server::handler::WebjarsHandler;
use webjars_server::{logger, server, store};

/// Serve packaged webjars over HTTP
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file path (extension optional)
    #[arg(short, long, env = "WEBJARS_CONFIG", default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

impl Cli {
    fn apply(&self, cfg: &mut Config) {
        if let Some(host) = &self.host {
            cfg.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from '{}'", cli.config))?;
    cli.apply(&mut cfg);

    logger::init(&cfg.logging)?;

    // Tokio runtime, thread count from `server.workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> anyhow::Result<()> {
    let store = store::from_config(&cfg.resources).context("failed to open resource store")?;
    let handler = WebjarsHandler::new(store, &cfg.webjars);
    let state = Arc::new(AppState::new(cfg, handler));
    server::run(state).await
}
