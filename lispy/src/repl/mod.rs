//! REPL (Read-Eval-Print Loop) for Lispy

use crate::error::report_error;
use crate::interp::{Interpreter, Value};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "lispy> ";
const HISTORY_FILE: &str = ".lispy_history";
const BANNER: &str = "Lispy Version 0.0.0.1";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    interpreter: Interpreter,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a REPL around a fresh interpreter
    pub fn new() -> RlResult<Self> {
        Self::with_interpreter(Interpreter::new())
    }

    /// Create a REPL around an interpreter that may already have files loaded
    pub fn with_interpreter(interpreter: Interpreter) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            interpreter,
            history_path,
        };

        // Load history if available
        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Run the REPL until Ctrl+C, Ctrl+D or `:quit`
    pub fn run(&mut self) -> RlResult<()> {
        println!("{BANNER}");
        println!("Press Ctrl+c to Exit\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    // Add to history
                    let _ = self.editor.add_history_entry(line);

                    // Handle special commands
                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    if let Some(value) = self.eval_input(line) {
                        println!("{value}");
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => true,
            ":help" | ":h" | ":?" => {
                self.print_help();
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  :help, :h, :?   Show this help");
        println!("  :quit, :q       Exit the REPL");
        println!("  :clear          Clear the screen");
        println!();
        println!("A line is evaluated as one S-expression, so `+ 1 2` is `(+ 1 2)`.");
        println!();
        println!("Examples:");
        println!("  def {{x y}} 1 2             Bind globally");
        println!("  (\\ {{a b}} {{+ a b}}) 2 3     Apply a lambda");
        println!("  if (> x y) {{x}} {{y}}        Branch on a number");
        println!("  load \"lib/prelude.lspy\"     Load definitions from a file");
    }

    /// Evaluate one line; read errors are reported and yield `None`
    fn eval_input(&mut self, input: &str) -> Option<Value> {
        match self.interpreter.eval_line(input) {
            Ok(value) => Some(value),
            Err(err) => {
                report_error("<repl>", input, &err);
                None
            }
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new().expect("Failed to create REPL")
    }
}

/// Get home directory (cross-platform)
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
