use askterm::core::config::{self, CliOverrides};
use askterm::tui;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "askterm", about = "Terminal chat client for a streaming /ask endpoint")]
struct Args {
    /// Server base URL (overrides config file and ASKTERM_SERVER_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// Endpoint path or absolute URL (overrides config file and ASKTERM_ENDPOINT)
    #[arg(short, long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to askterm.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("askterm.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        Default::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            server: args.server,
            endpoint: args.endpoint,
        },
    );

    log::info!("askterm starting up, endpoint {}", resolved.endpoint_url());

    tui::run(resolved)
}
