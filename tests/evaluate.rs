use exprcalc::{evaluate, Context, EvalError, LookupError, TokenKind, Unbound};
use rstest::rstest;

fn vars() -> Context<'static> {
    vec![("var1", 2.1), ("var2", 4.2)].into_iter().collect()
}

#[rstest]
#[case::add_sub("32+21.1-21", 32.1)]
#[case::precedence("2.1-2*4/2+1", -0.9)]
#[case::parens("2.1/(2.1+4.2)", 0.33)]
#[case::variables("2.1/(var1 + var2)", 0.33)]
#[case::empty("", 0.0)]
#[case::nested("((1 + 2) * (3 - 1)) / 4", 1.5)]
#[case::left_assoc_div("64 / 4 / 2 / 2", 4.0)]
#[case::left_assoc_sub("1 - 1 - 1", -1.0)]
fn evaluates(#[case] input: &str, #[case] expected: f64) {
    let ctx = vars();
    let got = evaluate(input, Some(&ctx)).unwrap();

    assert!((got - expected).abs() < 0.01, "{} != {}", got, expected);
}

#[test]
fn division_by_zero_is_not_an_error() {
    assert_eq!(evaluate("2.1/0", None), Ok(f64::INFINITY));
    assert!(evaluate("0/0", None).unwrap().is_nan());
}

#[rstest]
#[case::unclosed_paren("(1+2")]
#[case::malformed_numeral("1.2.3")]
#[case::dangling_operator("1 *")]
#[case::unknown_char("1 ^ 2")]
#[case::tab("1\t+ 2")]
#[case::unary_minus("-3")]
#[case::missing_variable("var3")]
fn rejects(#[case] input: &str) {
    let ctx = vars();

    assert!(evaluate(input, Some(&ctx)).is_err());
}

#[test]
fn unbound_without_lookup() {
    match evaluate("var1 + 1", None) {
        Err(EvalError::UnboundVariable { name, reason, .. }) => {
            assert_eq!(name, "var1");
            assert_eq!(reason, Unbound::NoLookup);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn unbound_with_lookup() {
    let ctx = vars();

    match evaluate("var1 + nope", Some(&ctx)) {
        Err(EvalError::UnboundVariable { reason, .. }) => {
            assert_eq!(reason, Unbound::Lookup(LookupError::Missing("nope".into())));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn unexpected_token_message() {
    let err = evaluate("(1+2", None).unwrap_err();

    assert_eq!(
        err,
        EvalError::UnexpectedToken {
            expected: TokenKind::RightParen,
            found: TokenKind::EndOfInput,
            span: exprcalc::Span(4, 4),
        }
    );
    assert_eq!(err.to_string(), "expected token type RPAREN but found EOF");
}

#[test]
fn independent_evaluations_agree() {
    let input = "var2 * (var1 - 3) / 7 + 1";
    let results: Vec<u64> = (0..4)
        .map(|_| {
            let ctx = vars();
            evaluate(input, Some(&ctx)).unwrap().to_bits()
        })
        .collect();

    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn evaluators_on_threads() {
    let handles: Vec<_> = (1..5)
        .map(|i| {
            std::thread::spawn(move || {
                let ctx: Context = vec![("n", i as f64)].into_iter().collect();
                evaluate("n * n + 1", Some(&ctx))
            })
        })
        .collect();

    for (i, handle) in (1..5).zip(handles) {
        let n = i as f64;
        assert_eq!(handle.join().unwrap(), Ok(n * n + 1.0));
    }
}
