use std::sync::Arc;

mod config;
mod feed;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;

    // Worker thread count follows `server.workers`, defaulting to CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr, cfg.server.backlog)?;

    logger::log_server_start(&addr, &cfg);
    if !cfg.feeds.root_dir.is_dir() {
        logger::log_warning(&format!(
            "Feed root '{}' is not a directory; every feed request will fail",
            cfg.feeds.root_dir.display()
        ));
    }

    let state = Arc::new(config::AppState::new(cfg));
    server::start_signal_handler(Arc::clone(&state))?;
    server::start_server_loop(listener, state).await;

    Ok(())
}
