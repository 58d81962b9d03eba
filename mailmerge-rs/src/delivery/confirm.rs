//! Human confirmation gates

use console::Term;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::{MergeError, Result};

/// The exact answer that counts as confirmation
pub const CONFIRMATION_TOKEN: &str = "yes";

/// Asks a human to approve a step
pub trait Confirmer {
    /// Show `details`, ask `prompt`, and report whether the answer was
    /// exactly [`CONFIRMATION_TOKEN`]
    fn confirm(&mut self, details: &str, prompt: &str) -> Result<bool>;
}

/// Confirmation on the controlling terminal, or on stdin when there is none
#[derive(Debug, Default)]
pub struct TerminalConfirmer;

impl TerminalConfirmer {
    pub fn new() -> Self {
        Self
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, details: &str, prompt: &str) -> Result<bool> {
        println!("{}", details);
        Ok(is_affirmative(&ask(prompt)?))
    }
}

/// Whether `answer` is exactly the confirmation token
pub fn is_affirmative(answer: &str) -> bool {
    answer == CONFIRMATION_TOKEN
}

/// Whether prompts can be drawn and answered interactively
///
/// dialoguer draws on stderr and reads keys from stdin, so both must be a
/// terminal.
pub fn is_interactive() -> bool {
    Term::stderr().is_term() && io::stdin().is_terminal()
}

/// Ask `prompt` and return the answer line
///
/// Without a terminal the prompt goes to stdout and the answer is read from
/// stdin, so logs redirected away from the console or answers piped in
/// still work.
pub fn ask(prompt: &str) -> Result<String> {
    if is_interactive() {
        return Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| MergeError::Prompt(e.to_string()));
    }

    let stdin = io::stdin();
    read_answer(&mut stdin.lock(), &mut io::stdout(), prompt)
}

/// Write `prompt` and read one line, without its line terminator
///
/// End of input reads as an empty answer.
pub fn read_answer(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<String> {
    write!(output, "{}: ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let line = line.strip_suffix('\n').unwrap_or(&line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    Ok(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_only_exact_token_confirms() {
        assert!(is_affirmative("yes"));
        assert!(!is_affirmative("y"));
        assert!(!is_affirmative("Yes"));
        assert!(!is_affirmative("yes "));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn test_read_answer_from_piped_input() {
        let mut input = Cursor::new("yes\nno\n");
        let mut output = Vec::new();

        let answer = read_answer(&mut input, &mut output, "Type 'yes' to proceed").unwrap();
        assert_eq!(answer, "yes");
        assert!(is_affirmative(&answer));
        assert_eq!(String::from_utf8(output).unwrap(), "Type 'yes' to proceed: ");

        let answer = read_answer(&mut input, &mut Vec::new(), "Type 'yes' to proceed").unwrap();
        assert_eq!(answer, "no");
    }

    #[test]
    fn test_read_answer_strips_only_line_terminator() {
        let answer = read_answer(&mut Cursor::new("yes\r\n"), &mut Vec::new(), "p").unwrap();
        assert_eq!(answer, "yes");

        let answer = read_answer(&mut Cursor::new(" yes \n"), &mut Vec::new(), "p").unwrap();
        assert_eq!(answer, " yes ");
        assert!(!is_affirmative(&answer));
    }

    #[test]
    fn test_read_answer_at_end_of_input_declines() {
        let answer = read_answer(&mut Cursor::new(""), &mut Vec::new(), "p").unwrap();
        assert_eq!(answer, "");
        assert!(!is_affirmative(&answer));
    }
}
