//! Decides whether a bot reply is a yes/no confirmation prompt.
//!
//! The rule is a plain, case-insensitive substring match on the service's phrasing. It is a
//! heuristic and will misfire on replies that happen to quote these phrases, but the match has to
//! stay literal to keep working with the dialogue service's current wording.

/// Phrases (lower-case) that mark a reply as requiring a yes/no answer.
pub const CONFIRMATION_PHRASES: [&str; 2] = ["do you want to cancel", "do you want to confirm"];

/// Returns `true` if `reply_text` asks the user to confirm or cancel something.
pub fn classify(reply_text: &str) -> bool {
    let lowered = reply_text.to_lowercase();
    CONFIRMATION_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}
