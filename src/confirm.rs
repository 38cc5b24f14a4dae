//! Pre-flight confirmation gate
//!
//! The one cancellation point in a run. Prints what is about to happen and
//! requires the operator to type the literal word `yes`; anything else is a
//! decline, which ends the run as a normal no-op. `--no-confirm` skips the
//! prompt entirely.

use std::io::BufRead;

use dialoguer::Input;
use is_terminal::IsTerminal;

use crate::error::DeployResult;

/// Gate verdict. Declining is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Declined,
}

/// Only the exact word `yes`, case-insensitively, confirms.
pub fn is_affirmative(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

/// Render the pending-action summary shown before the prompt.
pub fn summary(instance_key: &str, servers: &[String]) -> String {
    format!(
        "We are about to deploy the instance '{instance_key}' to the following servers: {}.",
        servers.join(", ")
    )
}

/// Print the summary and block for operator confirmation.
pub fn confirm_deploy(
    instance_key: &str,
    servers: &[String],
    no_confirm: bool,
) -> DeployResult<Verdict> {
    println!("{}", summary(instance_key, servers));

    if no_confirm {
        return Ok(Verdict::Proceed);
    }

    const PROMPT: &str = "Are you sure you want to do this (enter 'yes' to proceed)?";

    // dialoguer refuses to read from anything but a tty, so a piped or
    // scripted stdin is read directly. Absent or empty input declines.
    let answer: String = if std::io::stdin().is_terminal() {
        Input::new().with_prompt(PROMPT).allow_empty(true).interact_text()?
    } else {
        println!("{PROMPT}");
        read_answer(std::io::stdin().lock())?
    };

    if is_affirmative(&answer) {
        Ok(Verdict::Proceed)
    } else {
        Ok(Verdict::Declined)
    }
}

fn read_answer(mut input: impl BufRead) -> std::io::Result<String> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer)
}
