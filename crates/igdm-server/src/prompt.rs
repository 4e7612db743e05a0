//! Interactive credential entry
//!
//! Used only when no credential was found and a person is at the terminal.
//! Prompts go to stderr so stdout stays clean.

use std::io::{self, BufRead, IsTerminal, Write};

use igdm_core::Credential;

/// Credential typed at the prompt
#[derive(Debug, PartialEq, Eq)]
pub struct PromptedCredential {
    pub credential: Credential,
    /// Whether the user asked to write it to the cookie file
    pub save: bool,
}

/// Whether stdin and stderr are both attached to a terminal
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<String> {
    write!(output, "{} ", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Ask for the three credential parts, then whether to save them
///
/// Returns `None` when any part is left empty.
pub fn prompt_credential<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    cookie_file: &str,
) -> io::Result<Option<PromptedCredential>> {
    writeln!(output, "Instagram credentials not found, please enter them manually:")?;

    let session_id = ask(&mut input, &mut output, "Instagram Session ID:")?;
    let csrf_token = ask(&mut input, &mut output, "Instagram CSRF Token:")?;
    let user_id = ask(&mut input, &mut output, "Instagram DS User ID:")?;

    let Some(credential) = Credential::from_parts(Some(session_id), Some(csrf_token), Some(user_id))
    else {
        writeln!(output, "Some credentials were not provided.")?;
        return Ok(None);
    };

    let answer = ask(
        &mut input,
        &mut output,
        &format!("Save credentials to {}? [y/N]", cookie_file),
    )?;
    let save = matches!(answer.to_lowercase().as_str(), "y" | "yes");

    Ok(Some(PromptedCredential { credential, save }))
}

/// Prompt on the process's terminal
pub fn prompt_on_terminal(cookie_file: &str) -> io::Result<Option<PromptedCredential>> {
    prompt_credential(io::stdin().lock(), io::stderr(), cookie_file)
}
