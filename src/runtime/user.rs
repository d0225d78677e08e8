//! User interaction operations (confirmation prompts).

use anyhow::Result;

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Ask `prompt` on `output` and read a single answer line from `input`.
///
/// Only `y` and `yes` (case-insensitive, surrounding whitespace ignored) confirm.
pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let response = line.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

impl RealRuntime {
    pub(crate) fn confirm_impl(&self, prompt: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        confirm_with_io(prompt, &mut stdin_lock, &mut stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::confirm_with_io;
    use anyhow::Result;
    use std::io::Cursor;

    #[test]
    fn confirms_yes_and_short_y() -> Result<()> {
        for case in ["y\n", "Y\n", "yes\n", " YES \n"] {
            let mut input = Cursor::new(case.as_bytes());
            let mut output = Vec::new();
            let ok = confirm_with_io("Remove awesome-component?", &mut input, &mut output)?;
            assert!(ok, "expected '{}' to be accepted as yes", case);
        }
        Ok(())
    }

    #[test]
    fn rejects_everything_else() -> Result<()> {
        for case in ["n\n", "no\n", "\n", "", "yep\n"] {
            let mut input = Cursor::new(case.as_bytes());
            let mut output = Vec::new();
            let ok = confirm_with_io("Remove awesome-component?", &mut input, &mut output)?;
            assert!(!ok, "expected '{}' to be rejected", case);
        }
        Ok(())
    }

    #[test]
    fn prompt_is_written_before_reading() -> Result<()> {
        let mut input = Cursor::new(b"n\n");
        let mut output = Vec::new();
        confirm_with_io("Remove awesome-component?", &mut input, &mut output)?;
        assert_eq!(String::from_utf8(output)?, "Remove awesome-component? [y/N] ");
        Ok(())
    }
}
