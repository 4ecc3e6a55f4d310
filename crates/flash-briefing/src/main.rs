//! Runs one briefing in the terminal.
//!
//! The message sent to the model is taken from the command line, or
//! [`SEED_MESSAGE`] if none is given.

#[macro_use]
extern crate tracing;

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use flash_briefing::core::DriverError;
use flash_briefing::core::tool::failure_sentinel;
use flash_briefing::{Config, SEED_MESSAGE, SessionBuilder};
use flash_briefing_model::{ContentBlock, Role, ToolRequest, Turn};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde_json::Value;
use tokio::select;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum SessionEvent {
    Transcript(Turn),
    ToolCall(ToolRequest),
    ToolResult(String, Value),
    Finished(Result<(), DriverError>),
}

const BAR_CHAR: &str = "▎";
const PREVIEW_CHARS: usize = 240;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    debug!("loaded {config:?}");

    let args: Vec<String> = env::args().skip(1).collect();
    let message = if args.is_empty() {
        SEED_MESSAGE.to_owned()
    } else {
        args.join(" ")
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let session = SessionBuilder::from_config(&config)
        .on_transcript({
            let event_tx = event_tx.clone();
            move |turn| {
                event_tx.send(SessionEvent::Transcript(turn.clone())).ok();
            }
        })
        .on_tool_call({
            let event_tx = event_tx.clone();
            move |req| {
                event_tx.send(SessionEvent::ToolCall(req.clone())).ok();
            }
        })
        .on_tool_result({
            let event_tx = event_tx.clone();
            move |req, value| {
                event_tx
                    .send(SessionEvent::ToolResult(
                        req.tool_name.clone(),
                        value.clone(),
                    ))
                    .ok();
            }
        })
        .build();
    let session = match session {
        Ok(session) => session,
        Err(err) => {
            eprintln!("failed to set up tools: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}🧑 {}", BAR_CHAR.bright_magenta(), message.bright_white());

    let task = tokio::spawn(async move {
        let result = session.send_message(&message).await.map(|_| ());
        event_tx.send(SessionEvent::Finished(result)).ok();
    });

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let mut progress_bar: Option<ProgressBar> = None;

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        // Create a new progress bar if it has been finished.
        progress_bar
            .get_or_insert_with(|| {
                let progress_bar = ProgressBar::new_spinner();
                progress_bar.set_style(progress_style.clone());
                progress_bar.set_message("🤔 Thinking...");
                progress_bar
            })
            .inc(1);

        let sleep = sleep(Duration::from_millis(100));
        let event = select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                event
            },
            _ = &mut ctrl_c => {
                if let Some(progress_bar) = &progress_bar {
                    progress_bar.finish_and_clear();
                }
                task.abort();
                println!("{}", "Interrupted.".dimmed());
                return ExitCode::SUCCESS;
            },
            _ = sleep => {
                continue;
            }
        };

        // Finish the progress bar before printing anything else.
        if let Some(progress_bar) = progress_bar.take() {
            progress_bar.finish_and_clear();
        }

        match event {
            SessionEvent::Transcript(turn) => print_turn(&turn),
            SessionEvent::ToolCall(req) => {
                println!(
                    "{}🛠️  {} {}",
                    BAR_CHAR.bright_yellow(),
                    req.tool_name.bright_white().bold(),
                    preview(&req.input.to_string()).dimmed()
                );
            }
            SessionEvent::ToolResult(tool_name, value) => {
                if value == failure_sentinel() {
                    println!(
                        "{}❌ {} failed",
                        BAR_CHAR.bright_red(),
                        tool_name.bright_white()
                    );
                } else {
                    println!(
                        "{}✅ {} {}",
                        BAR_CHAR.bright_green(),
                        tool_name.bright_white(),
                        preview(&value.to_string()).dimmed()
                    );
                }
            }
            SessionEvent::Finished(Ok(())) => return ExitCode::SUCCESS,
            SessionEvent::Finished(Err(err)) => {
                error!("briefing failed: {err:?}");
                eprintln!("{}❌ {err}", BAR_CHAR.bright_red());
                return ExitCode::FAILURE;
            }
        }
    }

    // The driver task went away without reporting back.
    ExitCode::FAILURE
}

fn print_turn(turn: &Turn) {
    if turn.role() != Role::Assistant {
        return;
    }
    for block in turn.blocks() {
        if let ContentBlock::Text(text) = block {
            println!("{}🤖 {}", BAR_CHAR.bright_cyan(), text.bright_white());
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_owned();
    }
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push('…');
    preview
}
