//! Commands accepted by the interactive booking terminal.
//!
//! Doctor and slot numbers are 1-based as printed by [`render_page`].

use std::fmt::Write as _;
use std::str::FromStr;

use crate::page::Page;

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reprint every doctor and their visible slots.
    List,
    /// Toggle the slot list of a doctor (0-based index).
    Show {
        /// Doctor index.
        doctor: usize,
    },
    /// Book a slot (0-based indices).
    Book {
        /// Doctor index.
        doctor: usize,
        /// Slot position within the doctor's container.
        slot: usize,
    },
    /// Print the command summary.
    Help,
    /// Leave the terminal.
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".to_string());
        };
        let command = match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" => Self::List,
            "show" | "toggle" => Self::Show {
                doctor: ordinal(words.next(), "doctor")?,
            },
            "book" => Self::Book {
                doctor: ordinal(words.next(), "doctor")?,
                slot: ordinal(words.next(), "slot")?,
            },
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command {other:?}; try `help`")),
        };
        if let Some(extra) = words.next() {
            return Err(format!("unexpected argument {extra:?}"));
        }
        Ok(command)
    }
}

/// Parses a 1-based number into a 0-based index.
fn ordinal(word: Option<&str>, what: &str) -> Result<usize, String> {
    let word = word.ok_or_else(|| format!("missing {what} number"))?;
    match word.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("{what} number must be 1 or more, got {word:?}")),
    }
}

/// Command summary.
pub const HELP: &str = "\
commands:
  list                 show doctors and open slot lists
  show <doctor>        open or close a doctor's slot list
  book <doctor> <slot> book a slot for today
  help                 this text
  quit                 leave";

/// Renders the page as numbered text, listing slots of visible containers.
#[must_use]
pub fn render_page(page: &Page) -> String {
    let mut out = String::new();
    if page.doctors().is_empty() {
        out.push_str("no doctors on this page\n");
        return out;
    }
    for (index, card) in page.doctors().iter().enumerate() {
        let title = card.title().unwrap_or("Doctor");
        let id = card
            .doctor_id()
            .map_or_else(|_| "invalid".to_string(), |id| id.to_string());
        let _ = writeln!(
            out,
            "[{}] {title} (id {id}) - {} slot(s){}",
            index + 1,
            card.slots().controls().len(),
            if card.slots().display().is_visible() {
                ""
            } else {
                ", hidden"
            }
        );
        if card.slots().display().is_visible() {
            for control in card.slots().controls() {
                let _ = writeln!(
                    out,
                    "    ({}) {}",
                    control.position() + 1,
                    control.slot().display_label()
                );
            }
        }
    }
    out
}
