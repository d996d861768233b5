//! Line-based prompts for choosing which files to keep.
//!
//! Parsing is separated from I/O so the decisions can be tested without a
//! terminal. [`Prompter`] works over any `BufRead`/`Write` pair; the binary
//! hands it locked stdin and stdout.

use std::io::{self, BufRead, Write};

use crate::duplicates::Side;

/// Answer to `Keep [1-N/all/skip]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepChoice {
    /// Leave the group untouched.
    Skip,
    /// Keep every file.
    KeepAll,
    /// Keep the file at this 0-based index and delete the rest.
    Keep(usize),
    /// Unrecognised answer; treated as skip.
    Invalid,
}

/// Answer to `Delete from [1/2/skip]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideChoice {
    /// Delete this side's copies.
    Delete(Side),
    /// Leave the group untouched.
    Skip,
    /// Unrecognised answer; treated as skip.
    Invalid,
}

/// Parse a keep answer for a group of `len` files. Numbers are 1-based.
#[must_use]
pub fn parse_keep_choice(input: &str, len: usize) -> KeepChoice {
    let answer = input.trim().to_lowercase();
    match answer.as_str() {
        "" | "s" | "skip" => KeepChoice::Skip,
        "a" | "all" => KeepChoice::KeepAll,
        _ => match answer.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => KeepChoice::Keep(n - 1),
            _ => KeepChoice::Invalid,
        },
    }
}

/// Parse a side answer.
#[must_use]
pub fn parse_side_choice(input: &str) -> SideChoice {
    match input.trim().to_lowercase().as_str() {
        "1" => SideChoice::Delete(Side::First),
        "2" => SideChoice::Delete(Side::Second),
        "" | "s" | "skip" => SideChoice::Skip,
        _ => SideChoice::Invalid,
    }
}

/// `y` or `yes`, case-insensitive. Anything else declines.
#[must_use]
pub fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Reads answers from `input` after writing questions to `output`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Create a prompter over the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write `question`, then read one line. End of input reads as empty.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from either stream.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }

    /// Ask which file of a `len`-file group to keep.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from either stream.
    pub fn ask_keep(&mut self, len: usize) -> io::Result<KeepChoice> {
        let answer = self.ask(&format!("Keep [1-{len}/all/skip]: "))?;
        Ok(parse_keep_choice(&answer, len))
    }

    /// Ask which side of a cross-directory group to delete from.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from either stream.
    pub fn ask_side(&mut self) -> io::Result<SideChoice> {
        let answer = self.ask("Delete from [1/2/skip]: ")?;
        Ok(parse_side_choice(&answer))
    }

    /// Ask a yes/no question that defaults to no.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from either stream.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{question} [y/N]: "))?;
        Ok(parse_confirmation(&answer))
    }

    /// Write a line to the prompt output.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the output stream.
    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    /// The output stream, for writing tables between prompts.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_keep_choice() {
        assert_eq!(parse_keep_choice("", 3), KeepChoice::Skip);
        assert_eq!(parse_keep_choice("skip\n", 3), KeepChoice::Skip);
        assert_eq!(parse_keep_choice(" ALL ", 3), KeepChoice::KeepAll);
        assert_eq!(parse_keep_choice("1", 3), KeepChoice::Keep(0));
        assert_eq!(parse_keep_choice("3\n", 3), KeepChoice::Keep(2));
    }

    #[test]
    fn test_parse_keep_choice_out_of_range() {
        assert_eq!(parse_keep_choice("0", 3), KeepChoice::Invalid);
        assert_eq!(parse_keep_choice("4", 3), KeepChoice::Invalid);
        assert_eq!(parse_keep_choice("-1", 3), KeepChoice::Invalid);
        assert_eq!(parse_keep_choice("two", 3), KeepChoice::Invalid);
    }

    #[test]
    fn test_parse_side_choice() {
        assert_eq!(parse_side_choice("1\n"), SideChoice::Delete(Side::First));
        assert_eq!(parse_side_choice("2"), SideChoice::Delete(Side::Second));
        assert_eq!(parse_side_choice(""), SideChoice::Skip);
        assert_eq!(parse_side_choice("skip"), SideChoice::Skip);
        assert_eq!(parse_side_choice("3"), SideChoice::Invalid);
    }

    #[test]
    fn test_parse_confirmation() {
        assert!(parse_confirmation("y"));
        assert!(parse_confirmation("YES\n"));
        assert!(!parse_confirmation(""));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("yep"));
    }

    #[test]
    fn test_prompter_reads_lines_in_order() {
        let input = Cursor::new("2\nskip\ny\n");
        let mut output = Vec::new();
        {
            let mut prompter = Prompter::new(input, &mut output);
            assert_eq!(prompter.ask_keep(2).unwrap(), KeepChoice::Keep(1));
            assert_eq!(prompter.ask_side().unwrap(), SideChoice::Skip);
            assert!(prompter.confirm("Proceed?").unwrap());
        }

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Keep [1-2/all/skip]: "));
        assert!(text.contains("Delete from [1/2/skip]: "));
        assert!(text.contains("Proceed? [y/N]: "));
    }

    #[test]
    fn test_prompter_end_of_input_is_skip() {
        let mut prompter = Prompter::new(Cursor::new(""), Vec::new());
        assert_eq!(prompter.ask_keep(5).unwrap(), KeepChoice::Skip);
        assert!(!prompter.confirm("Delete?").unwrap());
    }
}
