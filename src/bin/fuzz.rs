#[macro_use]
extern crate afl;

use exprcalc::{vars, Evaluator};

fn main() {
    let ctx = vars::create();

    fuzz!(|data: &[u8]| {
        if let Ok(line) = std::str::from_utf8(data) {
            let _ = Evaluator::new(line).with_lookup(&ctx).evaluate();
        }
    });
}
