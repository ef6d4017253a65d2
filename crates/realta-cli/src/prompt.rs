use realta_core::ConfirmGate;
use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stderr. An empty answer takes `default`; without
/// a default the question is repeated.
pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let stdin = io::stdin();
    let mut stderr = io::stderr();
    ask(prompt, default, &mut stdin.lock(), &mut stderr)
}

fn ask<R: BufRead, W: Write>(
    prompt: &str,
    default: Option<bool>,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    let mut line = String::new();

    loop {
        line.clear();

        match default {
            Some(true) => write!(output, "{} (Y/n): ", prompt)?,
            Some(false) | None => write!(output, "{} (y/N): ", prompt)?,
        }
        output.flush()?;

        if input.read_line(&mut line)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match line.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

/// Interactive gate for `--confirm`; declines unless the operator says yes.
pub struct PromptGate;

impl ConfirmGate for PromptGate {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        prompt_confirm(prompt, Some(false))
    }
}
