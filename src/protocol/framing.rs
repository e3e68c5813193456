//! Response framing.
//!
//! Every payload written to the peer ends with exactly one `$`. A payload
//! that already ends in `$` is sent unchanged; nothing else is added, so an
//! empty payload is sent as a bare `$`.

/// Frame terminator appended to every response.
pub const FRAME_TERMINATOR: char = '$';

/// Append the frame terminator to `payload` unless it is already there.
pub fn frame(payload: &str) -> String {
    let mut framed = String::with_capacity(payload.len() + 1);
    framed.push_str(payload);
    if !payload.ends_with(FRAME_TERMINATOR) {
        framed.push(FRAME_TERMINATOR);
    }
    framed
}
