//! Terminal chat client
//!
//! Run with: cargo run -p pdf-rag --features cli --bin pdf-rag-chat

use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use pdf_rag::client::{
    render_session, ChatController, Disclosure, HttpChatClient, SendError, TYPING_INDICATOR,
};
use pdf_rag::config::RagConfig;

#[derive(Parser)]
#[command(name = "pdf-rag-chat")]
#[command(about = "Ask questions about your uploaded PDFs")]
struct Cli {
    /// Chat server base URL (overrides CHAT_SERVER_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// Request deadline in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = RagConfig::load()?.client;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }

    let api = HttpChatClient::new(&config)?;
    let controller = Arc::new(ChatController::new(Arc::new(api)));
    let mut disclosure = Disclosure::new();
    let term = Term::stdout();

    println!(
        "{} {}",
        style("pdf-rag chat").bold(),
        style(format!("({})", config.server_url)).dim()
    );
    println!(
        "{}",
        style("Enter sends. :sources N toggles sources of message N. :quit exits.").dim()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", style(">").cyan().bold());
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = line.trim();

        if command == ":quit" {
            break;
        }

        if let Some(arg) = command.strip_prefix(":sources") {
            match toggle_sources(&controller, &mut disclosure, arg.trim()) {
                Ok(()) => redraw(&term, &controller, &disclosure)?,
                Err(message) => println!("{}", style(message).yellow()),
            }
            continue;
        }

        let id = match controller.begin(&line) {
            Ok(id) => id,
            Err(SendError::Empty) => continue,
            Err(e @ SendError::Busy) => {
                println!("{}", style(e).yellow());
                continue;
            }
        };
        redraw(&term, &controller, &disclosure)?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(TYPING_INDICATOR);
        spinner.enable_steady_tick(Duration::from_millis(100));

        controller.dispatch(id, &line).await;

        spinner.finish_and_clear();
        redraw(&term, &controller, &disclosure)?;
    }

    Ok(())
}

/// Toggle the sources disclosure of the 1-based message `arg`
fn toggle_sources(
    controller: &ChatController,
    disclosure: &mut Disclosure,
    arg: &str,
) -> Result<(), String> {
    let index: usize = arg
        .parse()
        .map_err(|_| format!("Usage: :sources N (got '{}')", arg))?;

    let session = controller.snapshot();
    let message = index
        .checked_sub(1)
        .and_then(|i| session.messages().get(i))
        .ok_or_else(|| format!("No message {}", index))?;

    if message.sources.is_empty() {
        return Err(format!("Message {} has no sources", index));
    }

    disclosure.toggle(message.id);
    Ok(())
}

/// Redraw the conversation, scrolled to the newest message
fn redraw(term: &Term, controller: &ChatController, disclosure: &Disclosure) -> std::io::Result<()> {
    let (rows, _) = term.size();
    let viewport = usize::from(rows).saturating_sub(2).max(1);

    term.clear_screen()?;
    for line in render_session(&controller.snapshot(), disclosure, Some(viewport)) {
        term.write_line(&line)?;
    }
    Ok(())
}
