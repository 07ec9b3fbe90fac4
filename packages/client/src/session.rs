//! Chat session: stdin lines out, relay messages in.

use futures_util::{SinkExt, StreamExt};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::{
    config::ClientConfig,
    error::ClientError,
    format::{encode_outgoing, format_incoming},
};

/// Command that ends the session
const QUIT_COMMAND: &str = "/quit";

/// Events produced by the input thread
#[derive(Debug, PartialEq, Eq)]
enum InputEvent {
    Line(String),
    Quit,
}

/// Connect to the relay and run an interactive session until `/quit`, EOF or
/// the server closing the connection.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let (ws_stream, _) =
        connect_async(config.url.as_str())
            .await
            .map_err(|source| ClientError::Connect {
                url: config.url.clone(),
                source,
            })?;
    tracing::info!(url = %config.url, username = %config.username, "Connected");
    println!("*** connected as {} (type {QUIT_COMMAND} to leave)", config.username);

    let (mut sink, mut stream) = ws_stream.split();
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    spawn_input_reader(input_tx)?;

    // Print everything the relay sends, including our own messages
    let mut printer = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => println!("{}", format_incoming(text.as_str())),
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "Server sent close");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Connection error");
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            event = input_rx.recv() => match event {
                Some(InputEvent::Line(text)) => {
                    let payload = encode_outgoing(&config.username, &text)?;
                    sink.send(Message::text(payload)).await.map_err(ClientError::Send)?;
                }
                Some(InputEvent::Quit) | None => {
                    let _ = sink.close().await;
                    println!("*** leaving chat");
                    break;
                }
            },
            _ = &mut printer => {
                println!("*** server closed the connection");
                break;
            }
        }
    }

    printer.abort();
    Ok(())
}

/// Read lines on a dedicated thread; rustyline blocks.
///
/// The thread is detached so a pending `readline` never holds up process exit.
fn spawn_input_reader(tx: mpsc::UnboundedSender<InputEvent>) -> Result<(), ClientError> {
    std::thread::Builder::new()
        .name("readline".to_string())
        .spawn(move || {
            let mut editor = match DefaultEditor::new() {
                Ok(editor) => editor,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to initialize line editor");
                    let _ = tx.send(InputEvent::Quit);
                    return;
                }
            };

            loop {
                let event = match editor.readline("> ") {
                    Ok(line) => {
                        let event = classify_line(&line);
                        if let Some(InputEvent::Line(text)) = &event {
                            let _ = editor.add_history_entry(text.as_str());
                        }
                        event
                    }
                    Err(ReadlineError::Interrupted | ReadlineError::Eof) => Some(InputEvent::Quit),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read input");
                        Some(InputEvent::Quit)
                    }
                };

                let Some(event) = event else { continue };
                let quit = event == InputEvent::Quit;
                if tx.send(event).is_err() || quit {
                    break;
                }
            }
        })?;
    Ok(())
}

/// Blank lines are skipped
fn classify_line(line: &str) -> Option<InputEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed == QUIT_COMMAND {
        Some(InputEvent::Quit)
    } else {
        Some(InputEvent::Line(trimmed.to_string()))
    }
}
