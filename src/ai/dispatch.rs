//! Streaming dispatch of prepared prompts
//!
//! A backend produces text deltas; [`send_prompt`] relays them to the
//! caller's callbacks in arrival order. `on_chunk` fires for every
//! non-empty delta, `on_done` fires exactly once at the end, carrying the
//! text of the closing delta (the one with a finish reason), which is often
//! empty.

use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;

/// One piece of a streamed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub text: String,
    /// Set on the closing delta
    pub finish_reason: Option<String>,
}

#[cfg(test)]
impl Delta {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
        }
    }
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Delta>> + Send>>;

/// A remote completion API that can stream its response
pub trait CompletionBackend {
    fn stream(&self, prompt: &str) -> impl Future<Output = Result<ChunkStream>> + Send;
}

/// Send `prompt` and relay the streamed response.
///
/// Returns the full response text. On failure `on_done` still runs once,
/// with any closing text already received (usually empty), before the
/// error is returned; nothing is retried.
pub async fn send_prompt<B, C, D>(
    backend: &B,
    prompt: &str,
    mut on_chunk: C,
    on_done: D,
) -> Result<String>
where
    B: CompletionBackend,
    C: FnMut(&str),
    D: FnOnce(&str),
{
    let mut stream = match backend.stream(prompt).await {
        Ok(stream) => stream,
        Err(e) => {
            on_done("");
            return Err(e);
        }
    };

    let mut response = String::new();
    let mut closing: Option<String> = None;
    let mut chunks = 0usize;

    while let Some(item) = stream.next().await {
        let delta = match item {
            Ok(delta) => delta,
            Err(e) => {
                // Whatever closing text arrived is still part of the response
                let tail = closing.take().unwrap_or_default();
                response.push_str(&tail);
                on_done(&tail);
                return Err(e);
            }
        };

        // A delta after the closing one: the closing text was not last after all
        if let Some(text) = closing.take() {
            if !text.is_empty() {
                response.push_str(&text);
                on_chunk(&text);
                chunks += 1;
            }
        }

        if delta.finish_reason.is_some() {
            tracing::debug!("Stream finished: {:?}", delta.finish_reason);
            closing = Some(delta.text);
        } else if !delta.text.is_empty() {
            tracing::trace!("Chunk {}: {} bytes", chunks, delta.text.len());
            response.push_str(&delta.text);
            on_chunk(&delta.text);
            chunks += 1;
        }
    }

    let tail = closing.unwrap_or_default();
    response.push_str(&tail);
    on_done(&tail);

    tracing::debug!("Relayed {} chunks, {} bytes", chunks, response.len());
    Ok(response)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::stream;
    use std::cell::RefCell;

    /// Backend replaying a fixed script of deltas
    pub(crate) struct ScriptedBackend {
        pub script: Vec<std::result::Result<Delta, String>>,
        pub fail_to_open: bool,
    }

    impl ScriptedBackend {
        pub(crate) fn new(script: Vec<std::result::Result<Delta, String>>) -> Self {
            Self {
                script,
                fail_to_open: false,
            }
        }
    }

    impl CompletionBackend for ScriptedBackend {
        async fn stream(&self, _prompt: &str) -> Result<ChunkStream> {
            if self.fail_to_open {
                anyhow::bail!("connection refused");
            }
            let items: Vec<Result<Delta>> = self
                .script
                .iter()
                .cloned()
                .map(|item| item.map_err(anyhow::Error::msg))
                .collect();
            Ok(Box::pin(stream::iter(items)))
        }
    }

    fn closing(text: &str) -> Delta {
        Delta {
            text: text.to_string(),
            finish_reason: Some("stop".to_string()),
        }
    }

    #[tokio::test]
    async fn test_chunks_in_order_then_done_once() {
        let backend = ScriptedBackend::new(vec![
            Ok(Delta::text("Hal")),
            Ok(Delta::text("")),
            Ok(Delta::text("lo")),
            Ok(closing("!")),
        ]);

        let chunks = RefCell::new(Vec::new());
        let done = RefCell::new(Vec::new());
        let response = send_prompt(
            &backend,
            "p",
            |c| chunks.borrow_mut().push(c.to_string()),
            |d| done.borrow_mut().push(d.to_string()),
        )
        .await
        .unwrap();

        assert_eq!(*chunks.borrow(), vec!["Hal", "lo"]);
        assert_eq!(*done.borrow(), vec!["!"]);
        assert_eq!(response, "Hallo!");
    }

    #[tokio::test]
    async fn test_no_closing_delta() {
        let backend = ScriptedBackend::new(vec![Ok(Delta::text("a")), Ok(Delta::text("b"))]);
        let done = RefCell::new(Vec::new());

        let response = send_prompt(&backend, "p", |_| {}, |d| done.borrow_mut().push(d.to_string()))
            .await
            .unwrap();

        assert_eq!(response, "ab");
        assert_eq!(*done.borrow(), vec![""]);
    }

    #[tokio::test]
    async fn test_delta_after_closing_is_relayed_in_order() {
        let backend = ScriptedBackend::new(vec![
            Ok(Delta::text("a")),
            Ok(closing("b")),
            Ok(Delta::text("c")),
        ]);
        let chunks = RefCell::new(Vec::new());

        let response = send_prompt(&backend, "p", |c| chunks.borrow_mut().push(c.to_string()), |_| {})
            .await
            .unwrap();

        assert_eq!(*chunks.borrow(), vec!["a", "b", "c"]);
        assert_eq!(response, "abc");
    }

    #[tokio::test]
    async fn test_stream_error_still_terminates_sequence() {
        let backend = ScriptedBackend::new(vec![Ok(Delta::text("partial")), Err("reset".into())]);
        let chunks = RefCell::new(Vec::new());
        let done = RefCell::new(0);

        let result = send_prompt(
            &backend,
            "p",
            |c| chunks.borrow_mut().push(c.to_string()),
            |_| *done.borrow_mut() += 1,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(*chunks.borrow(), vec!["partial"]);
        assert_eq!(*done.borrow(), 1);
    }

    #[tokio::test]
    async fn test_stream_error_delivers_held_closing_text() {
        let backend = ScriptedBackend::new(vec![
            Ok(Delta::text("Hel")),
            Ok(Delta {
                text: "lo".to_string(),
                finish_reason: Some("stop".to_string()),
            }),
            Err("reset".into()),
        ]);
        let chunks = RefCell::new(Vec::new());
        let done = RefCell::new(Vec::new());

        let result = send_prompt(
            &backend,
            "p",
            |c| chunks.borrow_mut().push(c.to_string()),
            |d| done.borrow_mut().push(d.to_string()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(*chunks.borrow(), vec!["Hel"]);
        assert_eq!(*done.borrow(), vec!["lo"]);
    }

    #[tokio::test]
    async fn test_open_failure_calls_done() {
        let mut backend = ScriptedBackend::new(vec![]);
        backend.fail_to_open = true;
        let done = RefCell::new(0);

        let result = send_prompt(&backend, "p", |_| panic!("no chunks"), |_| *done.borrow_mut() += 1).await;

        assert!(result.unwrap_err().to_string().contains("connection refused"));
        assert_eq!(*done.borrow(), 1);
    }
}
