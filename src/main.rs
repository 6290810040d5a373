use std::sync::Arc;

use anyhow::anyhow;
use tokio::io::{AsyncBufReadExt, BufReader};

use voicelink::config::AppConfig;
use voicelink::connection::ConnectionDetailsFetcher;
use voicelink::language::Language;
use voicelink::session::{LiveKitSession, SessionController};
use voicelink::shell::{AppView, Shell};
use voicelink::AlertSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;

    let session = Arc::new(LiveKitSession::new(config.capture_config()));
    let details = Arc::new(ConnectionDetailsFetcher::new(
        config.conn_details_endpoint.clone(),
    ));
    let (alerts, mut alerts_rx) = AlertSink::new();

    let controller = Arc::new(SessionController::new(
        session,
        details,
        alerts,
        config.pre_connect_buffer,
    ));

    // Drain alerts to the console as dismissible notifications.
    tokio::spawn(async move {
        while let Some(alert) = alerts_rx.recv().await {
            eprintln!("\n[!] {}\n    {}", alert.title, alert.description);
        }
    });

    // Announce view transitions as the requested flag changes.
    let mut shell = Shell::new(controller.watch_requested());
    tokio::spawn(async move {
        while let Some(view) = shell.changed().await {
            match view {
                AppView::Live => println!("-- live --"),
                AppView::Welcome => println!("-- welcome --"),
            }
        }
    });

    print_welcome(&config, &controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("start") => controller.start().await,
            Some("stop") => controller.stop().await,
            Some("lang") => match parts.next().and_then(Language::parse) {
                Some(language) => controller.select_language(language).await,
                None => println!("usage: lang <en|kn|hi>"),
            },
            Some("status") => {
                println!(
                    "requested: {}, session: {:?}, language: {}",
                    controller.requested(),
                    controller.session_state(),
                    controller.language()
                );
            }
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command '{other}'"),
            None => {}
        }
    }

    controller.shutdown().await;
    Ok(())
}

fn print_welcome(config: &AppConfig, controller: &SessionController) {
    println!("Chat live with your voice AI agent");
    println!();
    let labels: Vec<String> = Language::ALL
        .iter()
        .map(|l| {
            if *l == controller.language() {
                format!("[{} {}]", l.code(), l.label())
            } else {
                format!(" {} {} ", l.code(), l.label())
            }
        })
        .collect();
    println!("languages: {}", labels.join("  "));
    println!();
    println!("commands: start ({}), stop, lang <en|kn|hi>, status, quit", config.start_button_text);
}
