#![no_main]

use goiface::TypeParser;
use goiface_syntax::parse_type_expr;
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

// Any type expression that converts must render to text that converts back
// to the same type.
fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(tree) = parse_type_expr(src) else {
        return;
    };
    let locals = HashSet::new();
    let Ok(ty) = TypeParser::new(&tree, &locals, "").parse(tree.root) else {
        return;
    };

    let rendered = ty.to_string();
    let again = parse_type_expr(&rendered)
        .unwrap_or_else(|e| panic!("{src:?} rendered as unparsable {rendered:?}: {e}"));
    let back = TypeParser::new(&again, &locals, "")
        .parse(again.root)
        .unwrap_or_else(|e| panic!("{rendered:?}: {e}"));
    assert_eq!(back.to_string(), rendered);
});
