use mentionsp::{create_service, discover_settings};
use tower_lsp::Server;
use tracing_subscriber::EnvFilter;

/// Log to stderr; stdout carries the protocol.
///
/// `MENTIONSP_LOG` overrides the `[log] level` setting.
fn initialize_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env("MENTIONSP_LOG")
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let start_dir = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let (settings, _) = discover_settings(&start_dir);
    initialize_logging(&settings.log.level);

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = create_service();
    Server::new(stdin, stdout, socket).serve(service).await;
}
