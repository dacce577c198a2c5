//! SSE stream reader for Replicate prediction output.
//!
//! After a prediction is created with `stream: true`, its `urls.stream`
//! endpoint serves server-sent events:
//! 1. `output` -- `data` is the next chunk of generated text, verbatim
//! 2. `error` -- `data` describes a failure; the prediction is over
//! 3. `done` -- `data` is `{}` on success, or carries a `reason` such as
//!    `"canceled"`
//!
//! Unknown event names are ignored. Multi-line `output` data arrives already
//! joined with `\n` by the SSE parser, which is exactly the generated text.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest_eventsource::{Event, EventSource};

use threadbot_types::llm::{LlmError, StreamEvent};

use super::types::DonePayload;

/// What to do with one SSE message.
#[derive(Debug, PartialEq, Eq)]
pub enum SseAction {
    Emit(StreamEvent),
    Skip,
    Finish,
}

/// Map one SSE message (event name + data) to an action.
pub fn map_sse_event(event: &str, data: &str) -> Result<SseAction, LlmError> {
    match event {
        "output" => Ok(SseAction::Emit(StreamEvent::TextDelta {
            text: data.to_string(),
        })),
        "error" => Err(LlmError::Provider {
            message: format!("prediction failed: {data}"),
        }),
        "done" => {
            let payload: DonePayload = if data.trim().is_empty() {
                DonePayload::default()
            } else {
                serde_json::from_str(data)
                    .map_err(|e| LlmError::Deserialization(format!("bad done event: {e}")))?
            };
            match payload.reason.as_deref() {
                Some("canceled") => Err(LlmError::Stream("prediction was canceled".to_string())),
                Some(other) if !other.is_empty() => {
                    tracing::debug!(reason = other, "prediction finished with reason");
                    Ok(SseAction::Finish)
                }
                _ => Ok(SseAction::Finish),
            }
        }
        _ => Ok(SseAction::Skip),
    }
}

/// Open the prediction's SSE stream and yield [`StreamEvent`]s.
///
/// The stream ends after the `done` event or when the server closes the
/// connection, whichever comes first. Reconnects are not attempted.
pub fn create_replicate_stream(
    client: &reqwest::Client,
    stream_url: &str,
    auth: HeaderValue,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    let builder = client
        .get(stream_url)
        .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
        .header(AUTHORIZATION, auth);

    Box::pin(async_stream::try_stream! {
        let mut source = EventSource::new(builder)
            .map_err(|e| LlmError::Stream(format!("cannot open event stream: {e}")))?;

        loop {
            let Some(next) = source.next().await else {
                break;
            };

            match next {
                Ok(Event::Open) => {
                    tracing::debug!("replicate stream connected");
                    yield StreamEvent::Connected;
                }
                Ok(Event::Message(message)) => {
                    match map_sse_event(&message.event, &message.data) {
                        Ok(SseAction::Emit(event)) => yield event,
                        Ok(SseAction::Skip) => {}
                        Ok(SseAction::Finish) => {
                            source.close();
                            yield StreamEvent::Done;
                            break;
                        }
                        Err(e) => {
                            source.close();
                            Err(e)?;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    source.close();
                    break;
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, _)) => {
                    source.close();
                    Err(match status.as_u16() {
                        401 => LlmError::AuthenticationFailed,
                        429 => LlmError::RateLimited,
                        _ => LlmError::Stream(format!("stream returned HTTP {status}")),
                    })?;
                }
                Err(e) => {
                    source.close();
                    Err(LlmError::Stream(e.to_string()))?;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_verbatim_delta() {
        let action = map_sse_event("output", " Well,\nactually").unwrap();
        assert_eq!(
            action,
            SseAction::Emit(StreamEvent::TextDelta {
                text: " Well,\nactually".to_string()
            })
        );
    }

    #[test]
    fn test_empty_output_chunk_still_emitted() {
        let action = map_sse_event("output", "").unwrap();
        assert_eq!(
            action,
            SseAction::Emit(StreamEvent::TextDelta {
                text: String::new()
            })
        );
    }

    #[test]
    fn test_done_finishes() {
        assert_eq!(map_sse_event("done", "{}").unwrap(), SseAction::Finish);
        assert_eq!(map_sse_event("done", "").unwrap(), SseAction::Finish);
    }

    #[test]
    fn test_done_canceled_is_error() {
        let err = map_sse_event("done", r#"{"reason":"canceled"}"#).unwrap_err();
        assert!(matches!(err, LlmError::Stream(_)));
    }

    #[test]
    fn test_error_event() {
        let err = map_sse_event("error", "CUDA out of memory").unwrap_err();
        match err {
            LlmError::Provider { message } => assert!(message.contains("CUDA out of memory")),
            other => panic!("expected Provider error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_skipped() {
        assert_eq!(map_sse_event("logs", "loading weights").unwrap(), SseAction::Skip);
        assert_eq!(map_sse_event("message", "hi").unwrap(), SseAction::Skip);
    }
}
