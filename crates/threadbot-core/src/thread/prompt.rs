//! Prompt compilation from thread history.
//!
//! The rendered history is wrapped in a fixed instruction template and sent
//! as the user prompt. The persona's system prompt travels separately.

use threadbot_types::thread::ConversationStore;

/// Instruction block placed ahead of the thread history.
const INSTRUCTIONS: &str = "Write a short 1-2 sentence reply to this conversation. \
Do not include any hashtags.
Just return the message, do not write anything other than the response. Do not write anything
like 'sure here's my response'. Do not include the username. Do not prefix response with your name.
Only respond in character. Only return the message.";

/// Render every stored post in sequence order.
///
/// Each post becomes a `User:` line and a `Message:` line followed by a blank
/// line. Nothing is omitted or summarized.
pub fn render_history(store: &ConversationStore) -> String {
    let mut history = String::new();
    for post in store.posts() {
        history.push_str("User: ");
        history.push_str(&post.username);
        history.push_str("\nMessage: ");
        history.push_str(&post.message);
        history.push_str("\n\n");
    }
    history
}

/// Wrap rendered history in the instruction template.
pub fn build_prompt(history: &str) -> String {
    format!("{INSTRUCTIONS}\n\nPrevious Messages:\n{history}")
}
