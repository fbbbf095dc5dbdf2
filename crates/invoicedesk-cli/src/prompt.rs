//! Interactive yes/no confirmation on the terminal.

use std::io::{self, BufRead, Write};

use invoicedesk_core::Confirm;

/// Asks on stderr and reads the answer from stdin. Anything but an explicit
/// yes (including EOF or a read error) counts as a refusal.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&line),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    )
}
