//! Session script parsing
//!
//! A script is one command per line. Blank lines and lines starting with `#`
//! are skipped; words are split shell-style so titles can be quoted.
//!
//! ```text
//! click
//! key WAKE
//! wait 1500ms
//! navigate "/about.html" "About us"
//! ```

use std::time::Duration;

use crate::error::ScriptError;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Activate the logo.
    Click,
    /// Type each character in order.
    Keys(String),
    /// Let scheduled effects run for this long.
    Wait(Duration),
    /// Accept the finale invitation.
    Accept,
    /// Leave the current page and load another.
    Navigate {
        /// Location path of the next page.
        path: String,
        /// Document title, if given.
        title: Option<String>,
    },
    /// Print the current phase.
    Phase,
}

/// Parses a whole script.
///
/// # Errors
///
/// Returns the first [`ScriptError`] encountered, tagged with its 1-based
/// line number.
pub fn parse(text: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if let Some(step) = parse_line(idx + 1, raw)? {
            steps.push(step);
        }
    }
    Ok(steps)
}

fn parse_line(line: usize, raw: &str) -> Result<Option<Step>, ScriptError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let words = shlex::split(trimmed).ok_or_else(|| ScriptError::Unparseable {
        line,
        text: trimmed.to_owned(),
    })?;
    let Some((command, rest)) = words.split_first() else {
        return Ok(None);
    };

    let step = match command.as_str() {
        "click" => {
            no_args(line, command, rest)?;
            Step::Click
        }
        "accept" => {
            no_args(line, command, rest)?;
            Step::Accept
        }
        "phase" => {
            no_args(line, command, rest)?;
            Step::Phase
        }
        "key" | "keys" => {
            if rest.is_empty() {
                return Err(invalid(line, "key needs at least one character"));
            }
            Step::Keys(rest.concat())
        }
        "wait" => match rest {
            [d] => Step::Wait(
                humantime::parse_duration(d)
                    .map_err(|e| invalid(line, format!("bad duration '{d}': {e}")))?,
            ),
            _ => return Err(invalid(line, "wait takes exactly one duration")),
        },
        "navigate" => match rest {
            [path] => Step::Navigate {
                path: path.clone(),
                title: None,
            },
            [path, title] => Step::Navigate {
                path: path.clone(),
                title: Some(title.clone()),
            },
            _ => return Err(invalid(line, "navigate takes a path and an optional title")),
        },
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_owned(),
            });
        }
    };
    Ok(Some(step))
}

fn no_args(line: usize, command: &str, rest: &[String]) -> Result<(), ScriptError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(invalid(line, format!("{command} takes no arguments")))
    }
}

fn invalid(line: usize, message: impl Into<String>) -> ScriptError {
    ScriptError::InvalidArgument {
        line,
        message: message.into(),
    }
}
