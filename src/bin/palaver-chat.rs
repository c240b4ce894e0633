//! Interactive chat REPL for the Palaver completion API.
//!
//! Reads lines from the terminal, streams replies back token by token, and
//! keeps the whole conversation as context (or a windowed subset of it).
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! palaver-chat
//!
//! # Specify a model
//! palaver-chat --model mistral-small-latest
//!
//! # Set a system prompt
//! palaver-chat --system "You are a helpful assistant"
//!
//! # Send only the most recent 20 turns as context
//! palaver-chat --window 20
//!
//! # Disable colors (useful for piping output)
//! palaver-chat --no-color
//! ```
//!
//! While chatting, slash commands control the session; see `/help`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use palaver::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use palaver::{Model, Palaver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("palaver-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    let client = Palaver::new(None)?;
    let mut session = ChatSession::new(client, config);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Raised by ctrl-c while a response is streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("Palaver Chat (model: {})", session.model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        interrupted.store(false, Ordering::Relaxed);

        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    if handle_command(&mut session, &mut renderer, cmd) {
                        break;
                    }
                    continue;
                }

                println!("Assistant:");
                if let Err(e) = session
                    .submit_streaming(line, &mut renderer, interrupted.clone())
                    .await
                {
                    renderer.print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt just clears the line
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Applies one slash command to the session. Returns true to exit the REPL.
fn handle_command(
    session: &mut ChatSession,
    renderer: &mut PlainTextRenderer,
    cmd: ChatCommand,
) -> bool {
    match cmd {
        ChatCommand::Quit => {
            println!("Goodbye!");
            return true;
        }
        ChatCommand::Clear => {
            session.clear();
            renderer.print_info("Conversation cleared.");
        }
        ChatCommand::Help => {
            for line in help_text().lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::Model(model_name) => {
            let model = model_name
                .parse()
                .unwrap_or_else(|_| Model::Custom(model_name.clone()));
            session.set_model(model);
            renderer.print_info(&format!("Model changed to: {}", model_name));
        }
        ChatCommand::System(prompt) => {
            session.set_system_prompt(prompt.clone());
            match prompt {
                Some(p) => renderer.print_info(&format!("System prompt set to: {}", p)),
                None => renderer.print_info("System prompt cleared."),
            }
        }
        ChatCommand::MaxTokens(value) => {
            session.set_max_tokens(value);
            renderer.print_info(&format!("max_tokens set to {value}"));
        }
        ChatCommand::Temperature(value) => {
            session.set_temperature(Some(value));
            renderer.print_info(&format!("temperature set to {:.2}", value));
        }
        ChatCommand::ClearTemperature => {
            session.set_temperature(None);
            renderer.print_info("temperature reset to model default");
        }
        ChatCommand::TopP(value) => {
            session.set_top_p(Some(value));
            renderer.print_info(&format!("top_p set to {:.2}", value));
        }
        ChatCommand::ClearTopP => {
            session.set_top_p(None);
            renderer.print_info("top_p reset to model default");
        }
        ChatCommand::AddStopSequence(sequence) => {
            session.add_stop_sequence(sequence.clone());
            renderer.print_info(&format!("Added stop sequence: {sequence}"));
        }
        ChatCommand::ClearStopSequences => {
            session.clear_stop_sequences();
            renderer.print_info("Stop sequences cleared.");
        }
        ChatCommand::ListStopSequences => {
            print_stop_sequences(session.stop_sequences());
        }
        ChatCommand::Window(turns) => {
            session.set_context_window(Some(turns));
            renderer.print_info(&format!("Context window set to {turns} turns."));
        }
        ChatCommand::ClearWindow => {
            session.set_context_window(None);
            renderer.print_info("Context window cleared; sending full history.");
        }
        ChatCommand::Stats => {
            print_stats(session);
        }
        ChatCommand::ShowConfig => {
            print_config(session);
        }
        ChatCommand::Invalid(message) => {
            renderer.print_error(&message);
        }
    }
    false
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Turns: {}", stats.turn_count);
    println!("      Max tokens: {}", stats.max_tokens);
    println!("      Temperature: {}", describe_float(stats.temperature));
    println!("      Top-p: {}", describe_float(stats.top_p));
    match stats.system_prompt.as_deref() {
        Some(prompt) => println!("      System prompt: {}", prompt),
        None => println!("      System prompt: (none)"),
    }
    print_window(stats.context_window);
    print_stop_sequences(&stats.stop_sequences);
    println!(
        "      Total tokens: {} in / {} out ({} requests)",
        stats.total_input_tokens, stats.total_output_tokens, stats.total_requests
    );
    if let Some(input) = stats.last_turn_input_tokens {
        let output = stats.last_turn_output_tokens.unwrap_or(0);
        println!("      Last turn tokens: {input} in / {output} out");
    }
}

fn print_config(session: &ChatSession) {
    let stats = session.stats();
    println!("    Current Configuration:");
    println!("      Model: {}", stats.model);
    println!("      Max tokens: {}", stats.max_tokens);
    println!("      Temperature: {}", describe_float(stats.temperature));
    println!("      Top-p: {}", describe_float(stats.top_p));
    match stats.system_prompt.as_deref() {
        Some(prompt) => println!("      System prompt: {}", prompt),
        None => println!("      System prompt: (none)"),
    }
    print_window(stats.context_window);
    print_stop_sequences(&stats.stop_sequences);
}

fn print_window(window: Option<usize>) {
    match window {
        Some(turns) => println!("      Context window: last {} turns", turns),
        None => println!("      Context window: full history"),
    }
}

fn print_stop_sequences(stop_sequences: &[String]) {
    if stop_sequences.is_empty() {
        println!("      Stop sequences: (none)");
    } else {
        println!("      Stop sequences:");
        for seq in stop_sequences {
            println!("        - {}", seq);
        }
    }
}

fn describe_float(value: Option<f32>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "default".to_string())
}
