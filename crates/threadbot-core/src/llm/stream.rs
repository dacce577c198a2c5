//! Stream draining for token-streaming backends.

use futures_util::{Stream, StreamExt};

use threadbot_types::llm::{LlmError, StreamEvent};

/// Drain a token stream and concatenate every text chunk in arrival order.
///
/// No separators are inserted and the stream is always read to its end; a
/// `Done` event does not cut reading short. The first error aborts collection.
pub async fn collect_text<S>(stream: S) -> Result<String, LlmError>
where
    S: Stream<Item = Result<StreamEvent, LlmError>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut text = String::new();
    let mut chunks = 0usize;

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::TextDelta { text: chunk } => {
                text.push_str(&chunk);
                chunks += 1;
            }
            StreamEvent::Connected | StreamEvent::Done => {}
        }
    }

    tracing::debug!(chunks, chars = text.chars().count(), "token stream drained");
    Ok(text)
}
