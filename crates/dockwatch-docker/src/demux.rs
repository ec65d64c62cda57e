//! Decoding of the engine's multiplexed log byte stream.

/// Each multiplexed record starts with an 8-byte header: one stream-id
/// byte, three zero bytes, and a big-endian u32 payload length.
pub const FRAME_HEADER_LEN: usize = 8;

/// Decode a raw chunk of the combined stdout/stderr stream into text lines.
///
/// Best-effort by design: the chunk is split on newlines, blank segments and
/// segments of [`FRAME_HEADER_LEN`] bytes or fewer are discarded, and each
/// survivor has exactly its first 8 bytes stripped. Frames split across
/// chunk boundaries are not reassembled; misaligned input passes through
/// garbled rather than failing the stream.
pub fn demux_chunk(chunk: &[u8]) -> Vec<String> {
    chunk
        .split(|&byte| byte == b'\n')
        .filter(|segment| segment.iter().any(|b| !b.is_ascii_whitespace()))
        .filter(|segment| segment.len() > FRAME_HEADER_LEN)
        .map(|segment| String::from_utf8_lossy(&segment[FRAME_HEADER_LEN..]).into_owned())
        .collect()
}

/// Re-encode a payload with the engine's wire framing.
pub fn encode_frame(stream_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.push(stream_id);
    frame.extend_from_slice(&[0, 0, 0]);
    frame.extend_from_slice(&u32::try_from(payload.len()).unwrap_or(u32::MAX).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_decodes_to_one_line() {
        let lines = demux_chunk(b"\x01\x00\x00\x00\x00\x00\x00\x05hello\n");
        assert_eq!(lines, vec!["hello".to_string()]);
    }

    #[test]
    fn header_only_and_blank_segments_are_dropped() {
        assert!(demux_chunk(b"\x01\x00\x00\x00\x00\x00\x00\x00\n").is_empty());
        assert!(demux_chunk(b"\n\n   \n").is_empty());
        assert!(demux_chunk(b"").is_empty());
        // Exactly 8 bytes is still header-only.
        assert!(demux_chunk(b"\x01\x00\x00\x00\x00\x00\x00\x05\n").is_empty());
    }

    #[test]
    fn every_line_loses_exactly_the_header() {
        let mut chunk = encode_frame(1, b"first line\n");
        chunk.extend_from_slice(&encode_frame(2, b"second line\n"));
        let lines = demux_chunk(&chunk);
        assert_eq!(
            lines,
            vec!["first line".to_string(), "second line".to_string()]
        );
    }

    #[test]
    fn timestamped_payload_keeps_the_embedded_token() {
        let chunk = encode_frame(1, b"2024-01-01T00:00:00.000000000Z starting up\n");
        let lines = demux_chunk(&chunk);
        assert_eq!(
            lines,
            vec!["2024-01-01T00:00:00.000000000Z starting up".to_string()]
        );
    }

    #[test]
    fn misaligned_input_passes_through_garbled() {
        // A payload with an interior newline: the second half has no header
        // to strip, so it loses 8 real bytes. Known limitation, preserved.
        let chunk = encode_frame(1, b"first half\nsecond half of the line\n");
        let lines = demux_chunk(&chunk);
        assert_eq!(
            lines,
            vec!["first half".to_string(), "alf of the line".to_string()]
        );
    }

    #[test]
    fn trailing_partial_segment_still_decodes() {
        // No trailing newline: the last segment is still emitted.
        let lines = demux_chunk(b"\x01\x00\x00\x00\x00\x00\x00\x07partial");
        assert_eq!(lines, vec!["partial".to_string()]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let chunk = encode_frame(1, b"ok \xff\xfe bytes\n");
        let lines = demux_chunk(&chunk);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("ok "));
        assert!(lines[0].contains('\u{FFFD}'));
    }

    #[test]
    fn encode_frame_writes_big_endian_length() {
        let frame = encode_frame(2, b"hello");
        assert_eq!(&frame[..FRAME_HEADER_LEN], b"\x02\x00\x00\x00\x00\x00\x00\x05");
        assert_eq!(&frame[FRAME_HEADER_LEN..], b"hello");
    }
}
