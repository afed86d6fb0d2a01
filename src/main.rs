use reposync::presentation::cli::CliApp;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let app = CliApp::new();

    // Logs go to stderr; stdout carries progress and reports
    let default_level = if app.verbose() { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(app.log_ansi())
        .with_target(false)
        .init();

    let code = app.run().await;
    std::process::exit(code);
}
