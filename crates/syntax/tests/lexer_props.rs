use goiface_syntax::lexer::{Lexer, Tok};
use goiface_syntax::{parse_source, parse_type_expr};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn lexer_never_panics_and_progresses(s in ".*") {
        let mut last_real_end = 0usize;
        let mut max_end = 0usize;
        let max_steps = s.len().saturating_mul(4) + 64;

        for (steps, (start, tok, end)) in Lexer::new(&s).enumerate() {
            prop_assert!(start <= end, "start>end: ({start},{end}) tok={tok:?} input={s:?}");
            prop_assert!(end <= s.len(), "end out of bounds: ({start},{end}) input={s:?}");

            if tok == Tok::Semi && start == end {
                prop_assert!(start >= max_end, "injected semi before progress: pos={start} input={s:?}");
            } else {
                prop_assert!(start >= last_real_end, "token moved backwards: {start} < {last_real_end} input={s:?}");
                last_real_end = end;
            }
            max_end = max_end.max(end);

            prop_assert!(steps <= max_steps, "too many steps: {steps} input={s:?}");
        }
    }

    #[test]
    fn parser_never_panics(s in ".*") {
        let _ = parse_source(&s);
        let _ = parse_type_expr(&s);
    }

    #[test]
    fn parser_never_panics_on_type_soup(
        parts in prop::collection::vec(
            prop::sample::select(vec![
                "*", "[", "]", "[]", "map[", "chan", "<-", "func(", ")", "(", ",",
                "...", "struct{", "interface{", "}", "int", "pkg.T", "x", ";", "\n", "[4]",
            ]),
            0..24,
        )
    ) {
        let src = parts.concat();
        let _ = parse_type_expr(&src);
        let _ = parse_source(&format!("package p\ntype T {src}\nfunc (T) M({src}) {{}}\n"));
    }
}
