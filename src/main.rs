use std::path::Path;
use std::process;
use std::sync::Arc;

use clap::Parser;

use redirector::config::{AppState, Config};
use redirector::store::Store;
use redirector::{logger, server};

/// Host-header HTTP redirect resolver.
#[derive(Parser, Debug)]
#[command(name = "redirector")]
#[command(about = "Answers HTTP requests with redirects looked up by Host header")]
#[command(version)]
struct Args {
    /// Config file path, without extension
    #[arg(short, long, default_value = "redirector")]
    config: String,

    /// Store file holding the redirect records
    #[arg(short, long)]
    file: Option<String>,

    /// IP to bind to
    #[arg(short, long)]
    ip: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    port: Option<u16>,

    /// Log every request to the access log (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> redirector::Result<()> {
    let args = Args::parse();

    let mut cfg = Config::load_from(&args.config)?;
    cfg.apply_overrides(args.file, args.ip, args.port, args.verbose);
    cfg.validate()?;

    logger::init(&cfg)?;

    // Opened once, read-only, for the process lifetime. Open failure is
    // fatal before any request is served.
    let store = Arc::new(Store::open(Path::new(cfg.store_file()?))?);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(serve(cfg, store))
}

async fn serve(cfg: Config, store: Arc<Store>) -> redirector::Result<()> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg, store.len());

    let state = Arc::new(AppState::new(&cfg, store));
    server::run(listener, state).await
}
