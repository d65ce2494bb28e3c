#![no_main]

use goiface_syntax::lexer::{Lexer, Tok};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let mut max_end = 0usize;
    let mut last_real_end = 0usize;
    let max_steps = s.len().saturating_mul(4) + 64;

    for (steps, (start, tok, end)) in Lexer::new(&s).enumerate() {
        assert!(start <= end);
        assert!(end <= s.len());

        if tok == Tok::Semi && start == end {
            assert!(start >= max_end);
        } else {
            assert!(start >= last_real_end);
            last_real_end = end;
        }
        max_end = max_end.max(end);

        assert!(steps <= max_steps);
    }
});
