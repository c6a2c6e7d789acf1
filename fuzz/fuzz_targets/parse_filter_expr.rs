#![no_main]

// Feed arbitrary text to the filter-expression parser. It must never panic,
// and anything it accepts must survive a render/parse round trip.

use libfuzzer_sys::fuzz_target;
use grit_roles::filters::FilterExpr;

fuzz_target!(|src: &str| {
    if let Ok(expr) = FilterExpr::parse(src) {
        let reparsed = FilterExpr::parse(&expr.to_string()).expect("rendered expression must parse");
        assert_eq!(reparsed, expr);
    }
});
