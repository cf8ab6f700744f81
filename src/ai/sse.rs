//! Server-sent events decoding for streamed completions
//!
//! Bytes arrive in arbitrary chunks; lines are buffered until complete and
//! only `data:` payloads are surfaced.

use bytes::BytesMut;

/// A decoded SSE payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Incremental line decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and collect every complete event
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line = self.buffer.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }

            match std::str::from_utf8(&line) {
                Ok(text) => events.extend(parse_line(text)),
                Err(_) => tracing::warn!("Skipping non UTF-8 SSE line"),
            }
        }
        events
    }

    /// Decode whatever is left once the body has ended
    pub fn finish(&mut self) -> Option<SseEvent> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = self.buffer.split();
        std::str::from_utf8(&rest).ok().and_then(parse_line)
    }
}

fn parse_line(line: &str) -> Option<SseEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }

    let data = trimmed.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        Some(SseEvent::Done)
    } else if data.is_empty() {
        None
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        let events = decoder.push(b":1}\n\ndata: {\"b\":2}\n");
        assert_eq!(
            events,
            vec![
                SseEvent::Data("{\"a\":1}".to_string()),
                SseEvent::Data("{\"b\":2}".to_string()),
            ]
        );
    }

    #[test]
    fn test_done_and_comments() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\r\nevent: message\r\ndata: [DONE]\r\n");
        assert_eq!(events, vec![SseEvent::Done]);
    }

    #[test]
    fn test_multibyte_char_split_between_chunks() {
        let mut decoder = SseDecoder::new();
        let line = "data: grüß\n".as_bytes();
        let (head, tail) = line.split_at(9);
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec![SseEvent::Data("grüß".to_string())]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some(SseEvent::Data("tail".to_string())));
        assert_eq!(decoder.finish(), None);
    }
}
