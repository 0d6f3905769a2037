use eyre::{bail, Result};

/// One line of REPL input, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Load(String),
    Unload,
    Clear,
    History,
    Status,
    Session(String),
    Sessions,
    End(String),
    Help,
    Quit,
}

impl Command {
    /// Parse a line of input. Blank lines yield `None`; anything that does
    /// not start with `/` is a question.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let Some(rest) = trimmed.strip_prefix('/') else {
            return Ok(Some(Self::Ask(trimmed.to_string())));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "load" => Self::Load(required(name, arg, "<path>")?),
            "unload" => Self::Unload,
            "clear" => Self::Clear,
            "history" => Self::History,
            "status" => Self::Status,
            "session" => Self::Session(required(name, arg, "<name>")?),
            "sessions" => Self::Sessions,
            "end" => Self::End(required(name, arg, "<name>")?),
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => bail!("Unknown command /{}. Type /help for the list of commands.", name),
        };

        Ok(Some(command))
    }
}

fn required(name: &str, arg: &str, placeholder: &str) -> Result<String> {
    if arg.is_empty() {
        bail!("Usage: /{} {}", name, placeholder);
    }
    Ok(arg.to_string())
}
