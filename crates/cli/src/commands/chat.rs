//! `lingobridge chat` — Interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;
use lingobridge_agent::{ConversationStateMachine, GenerationOrchestrator, Turn, TurnError};
use lingobridge_config::AppConfig;
use lingobridge_core::event::EventBus;
use lingobridge_providers::build_from_config;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::debug;

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Message(String),
    /// `/mode` alone shows the current mode
    Mode(Option<String>),
    Retry,
    Clear,
    History,
    Help,
    Exit,
    Unknown(String),
    Empty,
}

fn parse_input(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if matches!(line, "exit" | "quit") {
        return ReplCommand::Exit;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplCommand::Message(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "mode" => ReplCommand::Mode(parts.next().map(str::to_string)),
        "retry" => ReplCommand::Retry,
        "clear" => ReplCommand::Clear,
        "history" => ReplCommand::History,
        "help" => ReplCommand::Help,
        "exit" | "quit" => ReplCommand::Exit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

pub async fn run(
    mode: Option<String>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let services = build_from_config(&config);
    let event_bus = Arc::new(EventBus::default());
    let mut orchestrator = GenerationOrchestrator::from_config(&config, services, event_bus)?;
    if let Some(mode) = &mode {
        orchestrator = orchestrator.with_mode(mode);
    }
    let mut machine = ConversationStateMachine::new(orchestrator);
    debug!(mode = %machine.active_mode().id, "Chat session started");

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let turn = machine.send(&msg).await?;
        eprint!("\r              \r");
        println!("{}", turn.assistant_text.as_deref().unwrap_or_default());
        return Ok(());
    }

    // Interactive mode
    let active = machine.active_mode();
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║       LingoBridge — Interactive Mode         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Mode:        {} — {}", active.id, active.description);
    println!("  Generation:  {}", config.generation.api_url);
    println!("  Translation: {} ({})", config.translation.backend, config.translation.api_url);
    println!(
        "  Languages:   display {}, bridge {}",
        config.languages.display,
        config.languages.bridge_language().unwrap_or("off")
    );
    println!();
    println!("  Type your message and press Enter. /help lists commands.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Exit => break,
            ReplCommand::Message(text) => {
                eprint!("  ...");
                let result = machine.send(&text).await;
                eprint!("\r     \r");
                print_result(result);
            }
            ReplCommand::Retry => {
                eprint!("  ...");
                let result = machine.retry().await;
                eprint!("\r     \r");
                print_result(result);
            }
            ReplCommand::Mode(None) => {
                let mode = machine.active_mode();
                println!("  Current mode: {} — {}", mode.id, mode.description);
                let ids: Vec<&str> = machine
                    .orchestrator()
                    .registry()
                    .modes()
                    .map(|m| m.id.as_str())
                    .collect();
                println!("  Available:    {}", ids.join(", "));
            }
            ReplCommand::Mode(Some(id)) => {
                if !machine.orchestrator().registry().contains(&id) {
                    println!("  Unknown mode '{id}', using the default");
                }
                if machine.change_mode(&id) {
                    let mode = machine.active_mode();
                    println!("  Switched to {} — {}", mode.id, mode.description);
                } else {
                    println!("  Already in {} mode", machine.active_mode().id);
                }
            }
            ReplCommand::Clear => {
                machine.clear();
                println!("  Conversation cleared");
            }
            ReplCommand::History => print_history(machine.turns()),
            ReplCommand::Help => print_help(),
            ReplCommand::Unknown(command) => {
                println!("  Unknown command '/{command}'. Type /help for commands.");
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_result(result: Result<&Turn, TurnError>) {
    match result {
        Ok(turn) => {
            println!();
            for line in turn.assistant_text.as_deref().unwrap_or_default().lines() {
                println!("  Assistant > {line}");
            }
            println!();
        }
        Err(e) => {
            eprintln!("  [{e}]");
            println!();
        }
    }
}

fn print_history(turns: &[Turn]) {
    if turns.is_empty() {
        println!("  (no turns yet)");
        return;
    }
    for (i, turn) in turns.iter().enumerate() {
        println!("  [{}] You > {}", i + 1, turn.user_text);
        match &turn.assistant_text {
            Some(text) if turn.failed => println!("      Assistant (failed) > {text}"),
            Some(text) => println!("      Assistant > {text}"),
            None => println!("      Assistant > ..."),
        }
    }
}

fn print_help() {
    println!("  /mode [id]  Show or switch the mode (fast, balanced, smart)");
    println!("  /retry      Re-answer the last message");
    println!("  /clear      Forget the conversation");
    println!("  /history    Show this session's turns");
    println!("  /exit       Quit");
}
