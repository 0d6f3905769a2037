use rustyline::{Config, Editor, Result};

/// Prompt shown before each line: the session name, plus a marker when a
/// document is loaded.
pub fn generate_prompt(session: &str, has_document: bool) -> String {
    if has_document {
        format!("{session} [doc]> ")
    } else {
        format!("{session}> ")
    }
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_marks_loaded_document() {
        assert_eq!(generate_prompt("default", false), "default> ");
        assert_eq!(generate_prompt("work", true), "work [doc]> ");
    }
}
