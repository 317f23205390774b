use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::error::ExpertError;
use crate::mode::Mode;
use crate::responder::ExpertResponder;

/// One parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Message(String),
    SwitchMode(Mode),
    ShowMode,
    Help,
    Quit,
}

/// Parse a REPL line. Only the exact commands listed in `/help` are
/// commands; every other non-empty line is a message, returned exactly as
/// typed.
pub fn parse_line(line: &str) -> Result<Input, ExpertError> {
    if line.is_empty() {
        return Err(ExpertError::Validation(
            "enter a message before sending".to_owned(),
        ));
    }

    let input = match line.trim() {
        "/health" => Input::SwitchMode(Mode::HealthExpert),
        "/animal" => Input::SwitchMode(Mode::AnimalExpert),
        "/mode" => Input::ShowMode,
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        _ => Input::Message(line.to_owned()),
    };
    Ok(input)
}

pub fn banner() -> String {
    let mut out = String::from("Expert LLM chat\n");
    for (i, mode) in Mode::ALL.iter().enumerate() {
        out.push_str(&format!(
            "  Mode {}: {} (/{})\n    {}\n",
            i + 1,
            mode.label(),
            mode.keyword(),
            mode.description()
        ));
    }
    out
}

const HELP: &str = "\
Commands:
  /health   chat with the health expert
  /animal   chat with the animal expert
  /mode     show the current mode
  /help     show this help
  /quit     leave
Anything else is sent to the current expert.";

/// Interactive loop: one request in flight at a time.
pub async fn run(responder: &ExpertResponder, initial_mode: Mode) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut mode = initial_mode;

    println!("{}", banner());
    println!("Current mode: {}", mode.label());

    loop {
        let prompt = format!("[{mode}]> ");
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match parse_line(&line) {
            Ok(Input::Message(text)) => {
                if let Err(e) = editor.add_history_entry(line.as_str()) {
                    debug!(error = %e, "history entry not recorded");
                }
                println!("Generating answer...");
                match responder.respond(&text, mode).await {
                    Ok(answer) => println!("Answer:\n{answer}\n"),
                    Err(e) => {
                        debug!(error = ?e, "request failed");
                        eprintln!("An error occurred: {e}");
                    }
                }
            }
            Ok(Input::SwitchMode(next)) => {
                mode = next;
                println!("Switched to: {}", mode.label());
            }
            Ok(Input::ShowMode) => println!("Current mode: {}", mode.label()),
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Quit) => break,
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_is_validation_error() {
        let err = parse_line("").unwrap_err();
        assert!(matches!(err, ExpertError::Validation(_)));
    }

    #[test]
    fn whitespace_only_line_is_sent() {
        assert_eq!(parse_line("   ").unwrap(), Input::Message("   ".to_owned()));
    }

    #[test]
    fn message_kept_verbatim() {
        let line = "  What does a hedgehog eat?  ";
        assert_eq!(parse_line(line).unwrap(), Input::Message(line.to_owned()));
    }

    #[test]
    fn mode_commands() {
        assert_eq!(
            parse_line("/health").unwrap(),
            Input::SwitchMode(Mode::HealthExpert)
        );
        assert_eq!(
            parse_line(" /animal ").unwrap(),
            Input::SwitchMode(Mode::AnimalExpert)
        );
        assert_eq!(parse_line("/mode").unwrap(), Input::ShowMode);
    }

    #[test]
    fn help_and_quit() {
        assert_eq!(parse_line("/help").unwrap(), Input::Help);
        assert_eq!(parse_line("/quit").unwrap(), Input::Quit);
        assert_eq!(parse_line("/exit").unwrap(), Input::Quit);
    }

    #[test]
    fn slash_prefixed_question_is_a_message() {
        for line in ["/usr/bin is where?", "/ what about dogs?", "/plants", "//health"] {
            assert_eq!(parse_line(line).unwrap(), Input::Message(line.to_owned()));
        }
    }

    #[test]
    fn command_with_trailing_text_is_a_message() {
        assert_eq!(
            parse_line("/health tips for winter").unwrap(),
            Input::Message("/health tips for winter".to_owned())
        );
    }

    #[test]
    fn banner_lists_both_modes() {
        let text = banner();
        for mode in Mode::ALL {
            assert!(text.contains(mode.label()));
            assert!(text.contains(mode.description()));
        }
    }
}
