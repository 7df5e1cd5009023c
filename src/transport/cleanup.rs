//! Reply cleanup
//!
//! Byte-level repair of a raw reply before it is handed out as text.
//!
//! ## Steps (in order)
//! 1. Strip [`GARBAGE_PREFIX`] once, only if the buffer starts with all of it
//! 2. Remove every NUL byte
//! 3. Collapse every LF CR pair into a single LF
//!
//! The prefix contains a NUL itself, so step 1 must run before step 2.

/// Control-negotiation bytes some unit firmware emits ahead of a reply
pub const GARBAGE_PREFIX: [u8; 12] = [
    0xFF, 0xFB, 0x01, 0xFF, 0xFB, 0x03, 0xFF, 0xFD, 0x00, 0xFF, 0xFB, 0x2C,
];

/// Apply the cleanup steps and return the repaired bytes
pub fn clean_bytes(raw: &[u8]) -> Vec<u8> {
    let body = match raw.strip_prefix(&GARBAGE_PREFIX[..]) {
        Some(rest) => {
            tracing::debug!("Stripped {}-byte garbage prefix", GARBAGE_PREFIX.len());
            rest
        }
        None => raw,
    };

    let mut cleaned = Vec::with_capacity(body.len());
    let mut bytes = body.iter().copied().filter(|&b| b != 0x00).peekable();

    while let Some(b) = bytes.next() {
        cleaned.push(b);
        // LF CR -> LF (the CR is dropped, the next byte starts fresh)
        if b == b'\n' && bytes.peek() == Some(&b'\r') {
            bytes.next();
        }
    }

    cleaned
}

/// Clean a raw reply and decode it as text.
///
/// Decoding maps each byte to the code point of the same value (Latin-1),
/// so stray high bytes survive instead of failing the whole reply.
pub fn clean_response(raw: &[u8]) -> String {
    clean_bytes(raw).iter().map(|&b| b as char).collect()
}
