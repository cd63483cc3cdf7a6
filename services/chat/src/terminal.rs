//! Terminal render surface.
//!
//! Prints the transcript incrementally and shows the two confirmation options as numbered
//! "buttons". Typed lines are mapped back to `UserEvent`s by [`parse_line`].

use dialogue_client::Stats;
use std::io::{self, Write};
use trip_assistant_core::types::Speaker;
use trip_assistant_core::{Choice, ConversationView, InputMode, UserEvent};

pub const HEADER: &str = "Trip-Assistant";
pub const PLACEHOLDER: &str = "Ask about your booking, flight, or policy...";

/// Shortcut commands that submit a canned query.
pub const QUICK_ACTIONS: [(&str, &str); 4] = [
    ("/status", "What is the status of flight AI202?"),
    ("/book", "I want to book a flight"),
    ("/cancel", "I want to cancel my flight ticket"),
    ("/policy", "What is the baggage policy?"),
];

/// What a typed line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    Send(UserEvent),
    Stats,
    Quit,
}

pub fn parse_line(line: &str, mode: InputMode) -> LineAction {
    let command = line.trim();
    match command {
        "/quit" | "/exit" => return LineAction::Quit,
        "/stats" => return LineAction::Stats,
        _ => {}
    }

    if let Some((_, query)) = QUICK_ACTIONS.iter().find(|(name, _)| *name == command) {
        return LineAction::Send(UserEvent::Submit(query.to_string()));
    }

    if mode == InputMode::Confirmation {
        match command {
            "1" | "/yes" => return LineAction::Send(UserEvent::Choose(Choice::Yes)),
            "2" | "/no" => return LineAction::Send(UserEvent::Choose(Choice::No)),
            _ => {}
        }
    }

    // Blank lines are passed through too; the store decides they are a no-op.
    LineAction::Send(UserEvent::Submit(line.to_string()))
}

fn label(choice: &Choice) -> &'static str {
    match choice {
        Choice::Yes => "Yes",
        Choice::No => "No",
    }
}

pub struct TerminalRenderer<W: Write> {
    out: W,
    printed: usize,
    header_shown: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            header_shown: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, view: &ConversationView) -> io::Result<()> {
        if !self.header_shown {
            writeln!(self.out, "=== {HEADER} ===")?;
            writeln!(self.out, "{PLACEHOLDER}")?;
            writeln!(
                self.out,
                "(/status /book /cancel /policy are shortcuts, /stats shows request counters, /quit leaves)"
            )?;
            self.header_shown = true;
        }

        let added = view.transcript.len() > self.printed;
        for message in view.transcript.iter().skip(self.printed) {
            let tag = match message.sender() {
                Speaker::User => "you",
                Speaker::Bot => "bot",
            };
            writeln!(self.out, "{tag}> {}", message.text())?;
        }
        self.printed = view.transcript.len();

        if added && view.mode == InputMode::Confirmation {
            let buttons = view
                .options
                .iter()
                .enumerate()
                .map(|(i, choice)| format!("[{}] {}", i + 1, label(choice)))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(self.out, "    {buttons}")?;
        }

        self.out.flush()
    }
}

pub fn write_stats<W: Write>(out: &mut W, stats: &Stats) -> io::Result<()> {
    writeln!(
        out,
        "requests: {} sent, {} answered, {} failed, {} pending",
        stats.sent(),
        stats.answered(),
        stats.failed(),
        stats.pending()
    )?;
    out.flush()
}
