//! Editor buffer bound to a persisted slot

use anyhow::Result;

use super::store::Store;

/// Separator placed between the edited content and a streamed response
pub const RESPONSE_SEPARATOR: &str = "\n---\n";

/// Editable content of one slot, written through to the store
pub struct EditorBuffer<'a> {
    store: &'a Store,
    slot: String,
    content: String,
}

impl<'a> EditorBuffer<'a> {
    /// Load the slot, starting empty if it was never written
    pub fn load(store: &'a Store, slot: &str) -> Result<Self> {
        let content = store.slot(slot)?.unwrap_or_default();
        Ok(Self {
            store,
            slot: slot.to_string(),
            content,
        })
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content and persist it
    pub fn set(&mut self, content: impl Into<String>) -> Result<()> {
        self.content = content.into();
        self.store.set_slot(&self.slot, &self.content)
    }

    /// Append text and persist
    pub fn append(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.content.push_str(text);
        self.store.set_slot(&self.slot, &self.content)
    }

    /// Append streamed text, behind the separator when it is the first piece
    pub fn append_response_chunk(&mut self, text: &str, is_first: bool) -> Result<()> {
        if is_first {
            self.append(&format!("{}{}", RESPONSE_SEPARATOR, text))
        } else {
            self.append(text)
        }
    }
}

/// Feeds a streamed response into an [`EditorBuffer`]
///
/// The separator goes in front of the first non-empty text, whether it
/// arrives as a chunk or as the closing text.
pub struct StreamRelay<'b, 'a> {
    buffer: &'b mut EditorBuffer<'a>,
    is_beginning: bool,
    error: Option<anyhow::Error>,
}

impl<'b, 'a> StreamRelay<'b, 'a> {
    pub fn new(buffer: &'b mut EditorBuffer<'a>) -> Self {
        Self {
            buffer,
            is_beginning: true,
            error: None,
        }
    }

    pub fn on_chunk(&mut self, text: &str) {
        self.push(text);
    }

    pub fn on_done(&mut self, text: &str) {
        self.push(text);
    }

    fn push(&mut self, text: &str) {
        if text.is_empty() || self.error.is_some() {
            return;
        }
        let is_first = std::mem::replace(&mut self.is_beginning, false);
        if let Err(e) = self.buffer.append_response_chunk(text, is_first) {
            tracing::error!("Failed to persist streamed text: {}", e);
            self.error = Some(e);
        }
    }

    /// Surface the first persistence failure, if any
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::dispatch::send_prompt;
    use crate::ai::dispatch::tests::ScriptedBackend;
    use crate::ai::dispatch::Delta;
    use std::cell::RefCell;

    #[test]
    fn test_set_persists() {
        let store = Store::in_memory().unwrap();
        let mut buffer = EditorBuffer::load(&store, "translation").unwrap();
        assert_eq!(buffer.content(), "");

        buffer.set("page text").unwrap();
        assert_eq!(store.slot("translation").unwrap().as_deref(), Some("page text"));
    }

    #[test]
    fn test_relay_prefixes_separator_once() {
        let store = Store::in_memory().unwrap();
        store.set_slot("s", "Original").unwrap();
        let mut buffer = EditorBuffer::load(&store, "s").unwrap();

        let mut relay = StreamRelay::new(&mut buffer);
        relay.on_chunk("Hal");
        relay.on_chunk("lo");
        relay.on_done("");
        relay.finish().unwrap();

        assert_eq!(buffer.content(), "Original\n---\nHallo");
        assert_eq!(store.slot("s").unwrap().as_deref(), Some("Original\n---\nHallo"));
    }

    #[test]
    fn test_relay_with_only_closing_text() {
        let store = Store::in_memory().unwrap();
        let mut buffer = EditorBuffer::load(&store, "s").unwrap();

        let mut relay = StreamRelay::new(&mut buffer);
        relay.on_done("whole answer");
        relay.finish().unwrap();

        assert_eq!(buffer.content(), "\n---\nwhole answer");
    }

    #[tokio::test]
    async fn test_buffer_equals_prior_plus_streamed_chunks() {
        let store = Store::in_memory().unwrap();
        store.set_slot("translation", "Bonjour").unwrap();
        let mut buffer = EditorBuffer::load(&store, "translation").unwrap();

        let backend = ScriptedBackend::new(vec![
            Ok(Delta::text("Hel")),
            Ok(Delta::text("lo")),
            Ok(Delta::text(" there")),
            Ok(Delta {
                text: ".".to_string(),
                finish_reason: Some("stop".to_string()),
            }),
        ]);

        let relay = RefCell::new(StreamRelay::new(&mut buffer));
        let response = send_prompt(
            &backend,
            "prompt",
            |c| relay.borrow_mut().on_chunk(c),
            |d| relay.borrow_mut().on_done(d),
        )
        .await
        .unwrap();
        relay.into_inner().finish().unwrap();

        assert_eq!(response, "Hello there.");
        assert_eq!(buffer.content(), format!("Bonjour{}{}", RESPONSE_SEPARATOR, response));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn buffer_is_prior_then_separated_response(
                prior in ".{0,16}",
                chunks in proptest::collection::vec("[a-z ]{0,5}", 0..8),
                closing in "[a-z.]{0,4}",
            ) {
                let store = Store::in_memory().unwrap();
                store.set_slot("s", &prior).unwrap();
                let mut buffer = EditorBuffer::load(&store, "s").unwrap();

                let mut script: Vec<std::result::Result<Delta, String>> =
                    chunks.iter().map(|c| Ok(Delta::text(c.as_str()))).collect();
                script.push(Ok(Delta {
                    text: closing.clone(),
                    finish_reason: Some("stop".to_string()),
                }));
                let backend = ScriptedBackend::new(script);

                let runtime = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                let relay = RefCell::new(StreamRelay::new(&mut buffer));
                let response = runtime
                    .block_on(send_prompt(
                        &backend,
                        "prompt",
                        |c| relay.borrow_mut().on_chunk(c),
                        |d| relay.borrow_mut().on_done(d),
                    ))
                    .unwrap();
                relay.into_inner().finish().unwrap();

                let streamed = format!("{}{}", chunks.concat(), closing);
                prop_assert_eq!(&response, &streamed);
                let expected = if streamed.is_empty() {
                    prior.clone()
                } else {
                    format!("{}{}{}", prior, RESPONSE_SEPARATOR, streamed)
                };
                prop_assert_eq!(buffer.content(), expected.as_str());
                prop_assert_eq!(store.slot("s").unwrap(), Some(expected));
            }
        }
    }
}
