use crate::models::chat::{ Message, Role };

/// How many stored messages, newest first, are considered as context.
pub const CONTEXT_WINDOW_LEN: usize = 5;

/// Builds the `prompt` sent to the generator from the history as it was
/// *before* the new user message was appended.
///
/// The last `window` messages are taken, system messages are dropped, and
/// each remaining one becomes a `role: text` line. The new input is always
/// the final `user:` line.
pub fn build_context_prompt(history: &[Message], window: usize, input: &str) -> String {
    let start = history.len().saturating_sub(window);
    let mut lines: Vec<String> = history[start..]
        .iter()
        .filter(|m| m.role() != Role::System)
        .map(|m| format!("{}: {}", m.role(), m.text()))
        .collect();
    lines.push(format!("user: {}", input));
    lines.join("\n")
}
