pub mod command;
pub mod document_source;
pub mod prompt;

use std::io::Write;
use std::process::ExitCode;

use color_print::cformat;
use command::Command;
use eyre::Result;
use prompt::generate_prompt;
use rustyline::error::ReadlineError;

use crate::session::controller::SessionController;
use crate::session::registry::SessionRegistry;

const WELCOME_TEXT: &str = "
Hi, I'm DocuMind. Ask me anything, or load a document and ask about it.

Things to try
• /load ~/notes/report.pdf
• Summarize the document.
• What are the key dates mentioned?

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
DocuMind

/load <path>     Load a .txt or .pdf document (replaces the current one)
/unload          Unload the current document
/clear           Clear the conversation history
/history         Show the conversation so far
/status          Show the loaded document and message count
/session <name>  Switch to (or start) another session
/sessions        List sessions
/end <name>      End a session and discard its state
/help            Show this help dialogue
/quit            Quit the application
";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    registry: SessionRegistry,
    active_session: String,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        mut registry: SessionRegistry,
        active_session: String,
    ) -> Self {
        registry.get_or_create(&active_session);
        Self {
            output,
            input,
            interactive,
            registry,
            active_session,
        }
    }

    pub async fn run(&mut self, document: Option<String>) -> Result<ExitCode> {
        if let Some(path) = document {
            if !self.load_document(&path)? && !self.interactive {
                return Ok(ExitCode::FAILURE);
            }
        }

        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            let succeeded = match Command::parse(&input) {
                Ok(Some(Command::Ask(question))) => self.ask(&question).await?,
                Ok(Some(command)) => {
                    self.execute(command).await?;
                    true
                }
                Ok(None) => {
                    writeln!(self.output, "Nothing to ask.")?;
                    false
                }
                Err(e) => {
                    self.print_error(&e)?;
                    false
                }
            };
            return Ok(if succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }

        if self.interactive {
            self.print_welcome()?;
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let has_document = self.session().state().document().is_some();
            let prompt_text = generate_prompt(&self.active_session, has_document);

            match rl.readline(&prompt_text) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if !self.handle_input(&line).await? {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one line of input. Returns `false` when the user asked to quit.
    async fn handle_input(&mut self, input: &str) -> Result<bool> {
        match Command::parse(input) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Ok(true),
            Err(e) => {
                self.print_error(&e)?;
                Ok(true)
            }
        }
    }

    /// Run one parsed command. Returns `false` for `/quit`.
    async fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Ask(question) => {
                self.ask(&question).await?;
            }
            Command::Load(path) => {
                self.load_document(&path)?;
            }
            Command::Unload => {
                if self.session().state().document().is_some() {
                    self.session().clear_documents();
                    writeln!(self.output, "Document unloaded.")?;
                } else {
                    writeln!(self.output, "No document loaded.")?;
                }
            }
            Command::Clear => {
                self.session().reset_conversation();
                writeln!(self.output, "Conversation cleared.")?;
            }
            Command::History => self.print_history()?,
            Command::Status => self.print_status()?,
            Command::Session(name) => {
                self.registry.get_or_create(&name);
                writeln!(self.output, "Switched to session {}.", name)?;
                self.active_session = name;
            }
            Command::Sessions => {
                writeln!(self.output, "{} session(s):", self.registry.len())?;
                for id in self.registry.ids() {
                    let marker = if id == self.active_session { "*" } else { " " };
                    writeln!(self.output, "{} {}", marker, id)?;
                }
            }
            Command::End(name) => {
                if name == self.active_session {
                    writeln!(
                        self.output,
                        "Cannot end the active session; switch to another one first."
                    )?;
                } else if self.registry.remove(&name).is_some() {
                    writeln!(self.output, "Session {} ended.", name)?;
                } else {
                    writeln!(self.output, "No session named {}.", name)?;
                }
            }
            Command::Help => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            Command::Quit => return Ok(false),
        }

        Ok(true)
    }

    fn session(&mut self) -> &mut SessionController {
        self.registry.get_or_create(&self.active_session)
    }

    /// Returns whether the document was loaded.
    fn load_document(&mut self, path: &str) -> Result<bool> {
        let source = match document_source::read_document(path) {
            Ok(source) => source,
            Err(e) => {
                self.print_error(&e)?;
                return Ok(false);
            }
        };

        let loaded = self
            .session()
            .load_document(&source.name, &source.bytes, &source.extension)
            .map(|doc| {
                let kept_chars = doc.original_chars.map(|total| (doc.text.chars().count(), total));
                (doc.name.clone(), doc.segments, kept_chars)
            });

        match loaded {
            Ok((name, segments, kept_chars)) => {
                writeln!(
                    self.output,
                    "{}",
                    cformat!("<green>Document loaded:</green> {} ({} segment(s))", name, segments)
                )?;
                if let Some((kept, total)) = kept_chars {
                    writeln!(
                        self.output,
                        "Document is long: only its first {} of {} characters will be used.",
                        kept, total
                    )?;
                }
                Ok(true)
            }
            Err(e) => {
                self.print_error(&e)?;
                Ok(false)
            }
        }
    }

    /// Returns whether an answer came back.
    async fn ask(&mut self, question: &str) -> Result<bool> {
        let result = self.session().ask_question(question).await;
        match result {
            Ok(answer) => {
                writeln!(self.output, "{}", answer)?;
                Ok(true)
            }
            Err(e) => {
                self.print_error(&e)?;
                Ok(false)
            }
        }
    }

    fn print_history(&mut self) -> Result<()> {
        let turns = match self.registry.get(&self.active_session) {
            Some(session) => session.state().turns(),
            None => &[][..],
        };
        if turns.is_empty() {
            writeln!(self.output, "No messages yet. Ask your first question to start.")?;
            return Ok(());
        }

        for turn in turns {
            let time = turn.answered_at.format("%H:%M:%S");
            writeln!(
                self.output,
                "{}",
                cformat!("<dim>[{}]</dim> <bold>You:</bold> {}", time, turn.question)
            )?;
            writeln!(self.output, "{}", cformat!("<bold>Assistant:</bold> {}", turn.answer))?;
        }
        Ok(())
    }

    fn print_status(&mut self) -> Result<()> {
        writeln!(self.output, "Session: {}", self.active_session)?;
        let Some(state) = self.registry.get(&self.active_session).map(|s| s.state()) else {
            return Ok(());
        };

        match state.document() {
            Some(doc) => {
                writeln!(
                    self.output,
                    "Document: {} ({}, {} segment(s){})",
                    doc.name,
                    doc.format,
                    doc.segments,
                    if doc.is_truncated() { ", truncated" } else { "" }
                )?;
            }
            None => writeln!(self.output, "Document: none loaded")?,
        }
        writeln!(self.output, "Messages: {}", state.turns().len())?;
        Ok(())
    }

    fn print_error(&mut self, err: &dyn std::fmt::Display) -> Result<()> {
        writeln!(self.output, "{}", cformat!("<red>Error:</red> {}", err))?;
        Ok(())
    }
}
