//! Terminal adapter — interactive and single-message command line interface.

use std::io::{BufRead, Write};

use crate::chat::Session;
use crate::llm::CompletionClient;
use crate::Result;

/// Words that end the interactive loop with a normal exit.
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

/// Check whether a line is a terminal sentinel (case-insensitive).
pub fn is_exit_word(input: &str) -> bool {
    EXIT_WORDS
        .iter()
        .any(|word| input.eq_ignore_ascii_case(word))
}

/// Terminal channel for interactive sessions.
pub struct TerminalChannel<C: CompletionClient> {
    session: Session<C>,
}

impl<C: CompletionClient> TerminalChannel<C> {
    /// Create a new terminal channel.
    pub fn new(session: Session<C>) -> Self {
        Self { session }
    }

    /// Run a single message and return the reply.
    pub async fn run_once(&mut self, message: &str) -> Result<String> {
        self.session.respond(message).await
    }

    /// Run the interactive REPL on stdin/stdout until a sentinel word.
    pub async fn run_interactive(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.run_loop(stdin.lock(), stdout.lock()).await
    }

    /// REPL loop over arbitrary reader/writer.
    ///
    /// Empty lines re-prompt without calling the session. Service errors
    /// are printed and the loop continues.
    async fn run_loop<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<()> {
        loop {
            write!(writer, "\nYou: ")?;
            writer.flush()?;

            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                // EOF
                break;
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if is_exit_word(input) {
                writeln!(writer, "Thank you for using Lynn. Goodbye!")?;
                break;
            }

            match self.session.respond(input).await {
                Ok(reply) => {
                    writeln!(writer, "\nLynn: {}", reply)?;
                }
                Err(e) => {
                    writeln!(writer, "\nError: {}", e)?;
                }
            }
        }

        Ok(())
    }
}
