//! Interactive chat loop

use std::sync::Arc;

use magpt_api::{ApiConfig, HttpApiClient};
use magpt_config::{ClientSettings, FileStorage, PreferenceStore, SettingChange, SettingKey};
use magpt_session::{ChatSession, EventSink, SendOutcome, TokioScheduler};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::commands::{help, parse_input, Command, Input};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;
use crate::render::{render_loop, Renderer};
use crate::router::Cli;

const PROMPT: &str = "ܡ>";

/// Run the chat client until the user quits
pub async fn run(cli: Cli, settings: ClientSettings) -> CliResult<()> {
    let style = OutputStyle::default();

    let storage = Arc::new(FileStorage::new(settings.storage_dir.clone()));
    let prefs = Arc::new(PreferenceStore::load(storage));
    if let Some(url) = &cli.api_url {
        prefs.apply(SettingChange::ApiUrl(url.clone()))?;
    }

    let api = Arc::new(HttpApiClient::new(
        prefs.clone(),
        ApiConfig::from_settings(&settings),
    )?);
    info!("Using backend {}", api.base_url());

    let (sink, events) = EventSink::channel();
    let session = Arc::new(ChatSession::new(
        prefs,
        api,
        Arc::new(TokioScheduler::new()),
        sink,
    ));
    let renderer = tokio::spawn(render_loop(events, Renderer::new(style)));

    if !cli.quiet {
        println!("{}", style.header("Modern Assyrian GPT"));
        println!("{}", style.dim("Type /help for commands, /quit to leave."));
    }
    session.start().await;

    let mut lines = spawn_line_reader(style.prompt(PROMPT));
    while let Some(line) = lines.recv().await {
        match parse_input(&line) {
            Ok(Input::Prompt(text)) => spawn_send(&session, text, style),
            Ok(Input::Command(Command::Quit)) => break,
            Ok(Input::Command(command)) => {
                if let Err(e) = execute(&session, command, &style).await {
                    println!("{}", style.error(&e.user_message()));
                }
            }
            Err(e) => println!("{}", style.error(&e.user_message())),
        }
    }

    session.shutdown();
    renderer.abort();
    println!("Goodbye!");
    Ok(())
}

/// Read lines on a dedicated thread; the channel closes on EOF or Ctrl-C
fn spawn_line_reader(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                error!("Failed to start line editor: {}", e);
                return;
            }
        };

        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

/// Send in the background so commands stay usable while generating
fn spawn_send(session: &Arc<ChatSession>, text: String, style: OutputStyle) {
    let controller = session.controller.clone();
    tokio::spawn(async move {
        if controller.send_message(&text).await == SendOutcome::Busy {
            println!(
                "{}",
                style.warning("Still waiting for the previous reply, message not sent")
            );
        }
    });
}

/// Run one slash command
pub async fn execute(session: &ChatSession, command: Command, style: &OutputStyle) -> CliResult<()> {
    match command {
        Command::Settings => {
            let prefs = session.settings.preferences();
            println!("{}", style.header("Settings"));
            for key in SettingKey::ALL {
                let value = match key {
                    SettingKey::ApiUrl if prefs.api_url.is_empty() => "(same origin)".to_string(),
                    SettingKey::ApiUrl => prefs.api_url.clone(),
                    SettingKey::Font => prefs.font.clone(),
                    SettingKey::FontSize => prefs.font_size.to_string(),
                    SettingKey::Temperature => prefs.temperature.to_string(),
                    SettingKey::MaxTokens => prefs.max_tokens.to_string(),
                    SettingKey::TopK => prefs.top_k.to_string(),
                    SettingKey::Model => prefs
                        .model_id
                        .clone()
                        .unwrap_or_else(|| "default".to_string()),
                };
                println!("  {:<12} {}", key.name(), value);
            }
        }
        Command::Set { key, value } => {
            session.settings.apply_text(&key, &value).await?;
            println!("{}", style.success(&format!("{} updated", key)));
        }
        Command::Models => {
            if !session.catalog.is_loaded() {
                println!("{}", style.warning("Model list not available from the server"));
            }
            let selected = session.settings.preferences().model_id;
            for option in session.catalog.options() {
                let marker = if option.id == selected { "*" } else { " " };
                let id = option.id.as_deref().unwrap_or("default");
                let line = format!("{} {:<16} {}", marker, id, option.label);
                if option.disabled {
                    println!("{}", style.dim(&line));
                } else {
                    println!("{}", line);
                }
            }
        }
        Command::Reconnect => {
            session.monitor.reconnect().await;
        }
        Command::Copy(position) => {
            let text = session.controller.message_text(position)?;
            copy_to_clipboard(&text)?;
            println!("{}", style.success(&format!("Message {} copied", position)));
        }
        Command::Status => {
            println!("{}", style.status(&session.monitor.status()));
            println!("{}", style.info(&session.settings.indicator().text));
            if session.controller.is_sending() {
                println!("{}", style.dim("Waiting for a reply..."));
            }
        }
        Command::Help => println!("{}", help::render(style)),
        Command::Quit => {}
    }
    Ok(())
}

fn copy_to_clipboard(text: &str) -> CliResult<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| {
        warn!("Clipboard unavailable: {}", e);
        CliError::Clipboard(e.to_string())
    })?;
    clipboard.set_text(text.to_string()).map_err(|e| {
        warn!("Failed to copy text: {}", e);
        CliError::Clipboard(e.to_string())
    })
}
