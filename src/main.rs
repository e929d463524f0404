//! echo-chat: terminal chat against a stub echo endpoint
//!
//! Runs, in one process:
//! - An HTTP echo endpoint (`POST /api/chat`) that replies with the message
//! - A message exchange sequencer that sends one message at a time to it
//! - A speech capture state machine for dictating messages
//! - A line-oriented terminal front end
//!
//! No persistence, authentication or real language model: the reply is
//! always the message that was sent.

mod chat;
mod config;
mod dictation;
mod echo;
mod events;
mod lifecycle;
mod speech;
mod ui;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::chat::Sequencer;
use crate::config::Config;
use crate::echo::{HttpEchoClient, Server};
use crate::events::{ChatEvent, SpeechEvent};
use crate::lifecycle::ShutdownSignal;
use crate::speech::{SpeechMachine, UnsupportedProvider};
use crate::ui::{Command, Terminal, HELP};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "echo-chat starting"
    );

    let config = Config::load()?;
    info!(endpoint = ?config.endpoint, serve = config.serve, "configuration loaded");

    let shutdown = ShutdownSignal::new();

    let server = if config.serve {
        Some(Server::start(config.bind_addr).await?)
    } else {
        None
    };

    // Sequencer and speech machine -> presentation
    let (chat_tx, _chat_rx) = broadcast::channel::<ChatEvent>(64);
    let (speech_tx, _speech_rx) = broadcast::channel::<SpeechEvent>(64);

    // An explicit endpoint wins; otherwise talk to the local server, which
    // may have been bound to an ephemeral port
    let endpoint = match (&config.endpoint, &server) {
        (Some(url), _) => url.clone(),
        (None, Some(server)) => server.base_url(),
        (None, None) => bail!("no echo endpoint configured"),
    };

    let client = HttpEchoClient::new(&endpoint, config.request_timeout)
        .context("failed to build echo client")?;
    info!(url = %client.url(), "echo client ready");
    let sequencer = Sequencer::new(Arc::new(client), chat_tx);

    // No speech engine is linked on terminal targets
    let (speech, recognition_rx) =
        SpeechMachine::new(&UnsupportedProvider, config.speech.clone(), speech_tx);
    let speech_runner = {
        let speech = speech.clone();
        tokio::spawn(async move { speech.run(recognition_rx).await })
    };

    let mut chat_events = sequencer.subscribe();
    let mut speech_events = speech.subscribe();

    let mut terminal = Terminal::new(std::io::stdout());
    terminal.show_intro(&sequencer.snapshot(), &speech.snapshot())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let shutdown_wait = shutdown.wait();
    tokio::pin!(shutdown_wait);

    info!("entering main loop");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    info!("input closed");
                    break;
                };

                match Command::parse(&line) {
                    Command::Send(text) => {
                        if sequencer.submit(&text).is_none() && sequencer.is_awaiting_reply() {
                            terminal.show_text("Still waiting for the previous reply.")?;
                        }
                    }
                    Command::Clear => sequencer.reset(),
                    Command::ToggleMic => {
                        if speech.is_supported() {
                            speech.toggle();
                        } else if let Some(error) = speech.error() {
                            terminal.show_text(&error)?;
                        }
                    }
                    Command::Help => terminal.show_text(HELP)?,
                    Command::Quit => break,
                    Command::Nothing => {}
                    Command::Unknown(command) => {
                        terminal.show_text(&format!("Unknown command {command}, try /help"))?;
                    }
                }
            }

            event = chat_events.recv() => {
                match event {
                    Ok(event) => terminal.show_chat_event(&event)?,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "chat event receiver lagged");
                        terminal.show_conversation(&sequencer.snapshot())?;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            event = speech_events.recv() => {
                match event {
                    Ok(event) => {
                        terminal.show_speech_event(&event)?;
                        dictation::forward(&sequencer, &event);
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "speech event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            result = &mut shutdown_wait => {
                result?;
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!("shutting down...");

    speech.stop();
    speech_runner.abort();
    if let Some(server) = server {
        server.shutdown().await;
    }

    info!("echo-chat stopped");

    Ok(())
}
