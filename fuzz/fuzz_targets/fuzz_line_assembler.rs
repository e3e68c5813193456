//! Fuzz target: `LineAssembler::feed`
//!
//! Drives arbitrary byte sequences into the line assembler and asserts
//! that it never panics, never buffers past its cap, and yields exactly
//! one item per newline.
//!
//! cargo fuzz run fuzz_line_assembler

#![no_main]

use gpiolink::protocol::line::{AssembledLine, LineAssembler, MAX_LINE_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut asm = LineAssembler::new();
    let mut items = 0;

    for &byte in data {
        if let Some(item) = asm.feed(byte) {
            items += 1;
            if let AssembledLine::Command(line) = item {
                assert!(!line.contains('\n'));
                assert!(!line.contains('\r'));
            }
        }
        assert!(asm.buffered() <= MAX_LINE_LEN);
    }

    assert_eq!(items, data.iter().filter(|&&b| b == b'\n').count());
});
