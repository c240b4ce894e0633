//! Slash command parsing for the chat application.
//!
//! Input starting with `/` controls the session locally; everything else is
//! sent to the provider as a user turn.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Change the model.
    Model(String),

    /// Set the system prompt; `None` clears it.
    System(Option<String>),

    /// Set the maximum tokens per response.
    MaxTokens(u32),

    /// Set the sampling temperature.
    Temperature(f32),

    /// Revert to the model's default temperature.
    ClearTemperature,

    /// Set the top-p value.
    TopP(f32),

    /// Revert to the model's default top-p.
    ClearTopP,

    /// Add a stop sequence.
    AddStopSequence(String),

    /// Clear all stop sequences.
    ClearStopSequences,

    /// List stop sequences.
    ListStopSequences,

    /// Limit the context sent to the provider to the most recent N turns.
    Window(usize),

    /// Send the full transcript with every request.
    ClearWindow,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics (turn count, token usage, etc.).
    Stats,

    /// Show the current configuration.
    ShowConfig,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` when the input is a command, or `None` when
/// it should go to the provider as a message.
///
/// # Examples
///
/// ```
/// # use palaver::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/window 10").is_some());
/// assert!(parse_command("what's the weather like?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model needs a model name".to_string()),
        },
        "system" => ChatCommand::System(argument.map(String::from)),
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "config" => ChatCommand::ShowConfig,
        "max_tokens" => match argument.and_then(|arg| arg.parse::<u32>().ok()) {
            Some(value) if value > 0 => ChatCommand::MaxTokens(value),
            _ => ChatCommand::Invalid("/max_tokens needs a positive integer".to_string()),
        },
        "temperature" => {
            parse_sampling(argument, "/temperature", ChatCommand::ClearTemperature, |v| {
                ChatCommand::Temperature(v)
            })
        }
        "top_p" => parse_sampling(argument, "/top_p", ChatCommand::ClearTopP, |v| {
            ChatCommand::TopP(v)
        }),
        "stop" => parse_stop_command(argument),
        "window" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearWindow,
            Some(arg) => match arg.parse::<usize>() {
                Ok(value) if value > 0 => ChatCommand::Window(value),
                _ => ChatCommand::Invalid("/window needs a positive turn count".to_string()),
            },
            None => ChatCommand::Invalid("/window needs a turn count or 'clear'".to_string()),
        },
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Shared parsing for the 0.0-1.0 sampling knobs.
fn parse_sampling(
    argument: Option<&str>,
    name: &str,
    clear: ChatCommand,
    make: impl Fn(f32) -> ChatCommand,
) -> ChatCommand {
    let Some(arg) = argument else {
        return ChatCommand::Invalid(format!("{name} needs a value between 0.0 and 1.0"));
    };
    if arg.eq_ignore_ascii_case("clear") {
        return clear;
    }
    match arg.parse::<f32>() {
        Ok(value) if value.is_finite() && (0.0..=1.0).contains(&value) => make(value),
        _ => ChatCommand::Invalid(format!("{name} needs a value between 0.0 and 1.0")),
    }
}

fn parse_stop_command(argument: Option<&str>) -> ChatCommand {
    let Some(arg) = argument else {
        return ChatCommand::Invalid("/stop needs 'add <sequence>', 'clear', or 'list'".to_string());
    };

    let mut parts = arg.splitn(2, ' ');
    let action = parts.next().unwrap_or_default();
    match action.to_lowercase().as_str() {
        "add" => match parts.next().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(sequence) => ChatCommand::AddStopSequence(sequence.to_string()),
            None => ChatCommand::Invalid("/stop add needs a sequence".to_string()),
        },
        "clear" => ChatCommand::ClearStopSequences,
        "list" => ChatCommand::ListStopSequences,
        _ => ChatCommand::Invalid("Unrecognized /stop action (use add, clear, or list)".to_string()),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history
  /model <name>          Change the model (e.g., /model mistral-small-latest)
  /system [prompt]       Set system prompt (no argument clears it)
  /max_tokens <n>        Set maximum response tokens
  /temperature <v>       Set temperature 0.0-1.0 (use 'clear' to reset)
  /top_p <v>             Set top-p 0.0-1.0 (use 'clear' to reset)
  /stop add <seq>        Add a stop sequence
  /stop clear            Clear all stop sequences
  /stop list             List current stop sequences
  /window <n>            Send only the most recent n turns (or 'clear')
  /stats                 Show session statistics
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_and_aliases() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn clear_is_case_insensitive() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Clear));
    }

    #[test]
    fn model_command() {
        assert_eq!(
            parse_command("/model llama-3.1-8b-instruct"),
            Some(ChatCommand::Model("llama-3.1-8b-instruct".to_string()))
        );
        assert_eq!(
            parse_command("/model   mistral-large-latest  "),
            Some(ChatCommand::Model("mistral-large-latest".to_string()))
        );
        assert!(matches!(
            parse_command("/model"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("model name")
        ));
    }

    #[test]
    fn system_command() {
        assert_eq!(
            parse_command("/system Answer in French."),
            Some(ChatCommand::System(Some("Answer in French.".to_string())))
        );
        assert_eq!(parse_command("/system"), Some(ChatCommand::System(None)));
    }

    #[test]
    fn max_tokens_command() {
        assert_eq!(
            parse_command("/max_tokens 2048"),
            Some(ChatCommand::MaxTokens(2048))
        );
        for bad in ["/max_tokens lots", "/max_tokens 0", "/max_tokens"] {
            assert!(matches!(
                parse_command(bad),
                Some(ChatCommand::Invalid(msg)) if msg.contains("positive")
            ));
        }
    }

    #[test]
    fn sampling_commands() {
        assert_eq!(
            parse_command("/temperature 0.5"),
            Some(ChatCommand::Temperature(0.5))
        );
        assert_eq!(
            parse_command("/temperature clear"),
            Some(ChatCommand::ClearTemperature)
        );
        assert_eq!(parse_command("/top_p 0.9"), Some(ChatCommand::TopP(0.9)));
        assert_eq!(parse_command("/top_p CLEAR"), Some(ChatCommand::ClearTopP));
        for bad in ["/temperature", "/temperature 1.5", "/top_p nan"] {
            assert!(matches!(
                parse_command(bad),
                Some(ChatCommand::Invalid(msg)) if msg.contains("between")
            ));
        }
    }

    #[test]
    fn stop_commands() {
        assert_eq!(
            parse_command("/stop add <|eot|>"),
            Some(ChatCommand::AddStopSequence("<|eot|>".to_string()))
        );
        assert_eq!(
            parse_command("/stop clear"),
            Some(ChatCommand::ClearStopSequences)
        );
        assert_eq!(
            parse_command("/stop list"),
            Some(ChatCommand::ListStopSequences)
        );
        assert!(matches!(
            parse_command("/stop drop"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn window_commands() {
        assert_eq!(parse_command("/window 10"), Some(ChatCommand::Window(10)));
        assert_eq!(
            parse_command("/window clear"),
            Some(ChatCommand::ClearWindow)
        );
        assert!(matches!(
            parse_command("/window 0"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("positive")
        ));
    }

    #[test]
    fn stats_and_config() {
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/status"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/config"), Some(ChatCommand::ShowConfig));
    }

    #[test]
    fn plain_messages_pass_through() {
        assert_eq!(parse_command("what's the weather like?"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_covers_commands() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/clear"));
        assert!(help.contains("/model"));
        assert!(help.contains("/window"));
    }
}
