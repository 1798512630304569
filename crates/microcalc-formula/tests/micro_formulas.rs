//! Tests for micro-formula evaluation against a table

use microcalc_core::{CellValue, Table};
use microcalc_formula::{
    compute_micro, evaluate, parse_formula, BinaryOperator, EvaluationContext, FormulaError,
    MicroConfig, MicroExpr, ResolveError, UnaryOperator,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn ledger() -> Table {
    let mut table = Table::new(["cont", "A", "sold_debit", "sold_credit"]).unwrap();
    let rows = [
        ("1", 3.0, 7.5, Some(2.0)),
        ("401", 0.0, 1200.0, Some(350.75)),
        ("5121", 1.0, 80.1, None),
    ];
    for (key, a, debit, credit) in rows {
        table
            .push_row(vec![
                CellValue::text(key),
                CellValue::Number(a),
                CellValue::Number(debit),
                credit.map_or(CellValue::Empty, CellValue::Number),
            ])
            .unwrap();
    }
    table
}

fn eval(table: &Table, formula: &str) -> Result<(Option<f64>, Vec<ResolveError>), FormulaError> {
    let config = MicroConfig::default();
    let ast = parse_formula(formula, &config)?;
    let ctx = EvaluationContext::new(table, "cont", &config);
    let evaluation = evaluate(&ast, &ctx)?;
    Ok((evaluation.value, evaluation.errors))
}

/// Precedence and grouping
#[test]
fn test_precedence_and_grouping() {
    let table = ledger();
    assert_eq!(eval(&table, "2+3*4").unwrap(), (Some(14.0), vec![]));
    assert_eq!(eval(&table, "(2+3)*4").unwrap(), (Some(20.0), vec![]));
}

/// Negating zero never yields a negative zero
#[test]
fn test_negative_zero_normalized() {
    let table = ledger();
    let (value, errors) = eval(&table, "-0").unwrap();
    let value = value.unwrap();
    assert_eq!(value, 0.0);
    assert!(value.is_sign_positive());
    assert!(errors.is_empty());

    let (value, _) = eval(&table, "-(sold_debit@1 - 7.5)").unwrap();
    assert!(value.unwrap().is_sign_positive());
}

/// The same reference subtracted from itself is zero
#[test]
fn test_self_subtraction() {
    let table = ledger();
    for formula in ["A@1-A@1", "sold_debit@401-sold_debit@401", "sold_debit@5121 - sold_debit@5121"]
    {
        assert_eq!(eval(&table, formula).unwrap(), (Some(0.0), vec![]), "{}", formula);
    }
}

/// Division by zero is fatal
#[test]
fn test_division_by_zero() {
    let table = ledger();
    assert_eq!(eval(&table, "5/0"), Err(FormulaError::DivisionByZero));

    let outcome = compute_micro(&table, "cont", "5/0", &MicroConfig::default());
    assert_eq!(outcome.value, None);
    assert_eq!(outcome.error, Some(FormulaError::DivisionByZero.to_string()));
}

/// Misplaced operators are fatal and leave no partial result
#[test]
fn test_adjacent_operators() {
    let table = ledger();
    assert!(matches!(
        eval(&table, "+*3"),
        Err(FormulaError::AdjacentOperators { first: '+', second: '*', .. })
    ));

    let outcome = compute_micro(&table, "cont", "+*3", &MicroConfig::default());
    assert_eq!(outcome.value, None);
    assert!(outcome.error.is_some());
}

/// A bad reference fails its own formula only
#[test]
fn test_unresolved_reference_does_not_affect_siblings() {
    let table = ledger();
    let config = MicroConfig::default();

    let (value, errors) = eval(&table, "sold_debit@missing").unwrap();
    assert_eq!(value, None);
    assert!(matches!(
        errors.as_slice(),
        [ResolveError::UnresolvedReference { .. }]
    ));

    let batch = ["sold_debit@missing", "sold_debit@401 - sold_credit@401"];
    let outcomes: Vec<_> = batch
        .iter()
        .map(|formula| compute_micro(&table, "cont", formula, &config))
        .collect();
    assert!(outcomes[0].error.is_some());
    assert_eq!(outcomes[1].value, Some(849.25));
    assert_eq!(outcomes[1].error, None);
}

/// All soft errors of a formula are reported together
#[test]
fn test_errors_from_both_branches() {
    let table = ledger();
    let outcome = compute_micro(
        &table,
        "cont",
        "sold_credit@5121 + (nope@1 - sold_debit@1) * sold_debit@9",
        &MicroConfig::default(),
    );
    assert_eq!(outcome.value, None);
    let error = outcome.error.unwrap();
    let lines: Vec<&str> = error.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("sold_credit@5121"));
    assert!(lines[1].contains("nope@1"));
    assert!(lines[2].contains("sold_debit@9"));
}

/// Non-strict mode counts empty cells as zero
#[test]
fn test_flexible_empty_cells() {
    let table = ledger();
    let config = MicroConfig::default().with_strict(false);
    let outcome = compute_micro(&table, "cont", "sold_debit@5121 - sold_credit@5121", &config);
    assert_eq!(outcome.value, Some(80.1));
}

/// Ten thousand nested signs fail cleanly instead of overflowing the stack
#[test]
fn test_deeply_nested_formula() {
    let table = ledger();
    let formula = format!("{}1{}", "-(".repeat(10_000), ")".repeat(10_000));
    assert!(matches!(
        eval(&table, &formula),
        Err(FormulaError::RecursionLimitExceeded { limit: 256 })
    ));

    let outcome = compute_micro(&table, "cont", &formula, &MicroConfig::default());
    assert_eq!(outcome.value, None);
    assert!(outcome.error.unwrap().contains("nested too deeply"));
}

/// A long flat sum is not nesting
#[test]
fn test_long_sum() {
    let table = ledger();
    let formula = vec!["sold_debit@1"; 1_000].join("+");
    let outcome = compute_micro(&table, "cont", &formula, &MicroConfig::default());
    assert_eq!(outcome.value, Some(7500.0));
    assert_eq!(outcome.error, None);

    let formula = vec!["A@1 * 2"; 400].join(" - ");
    let outcome = compute_micro(&table, "cont", &formula, &MicroConfig::default());
    assert_eq!(outcome.value, Some(-2388.0));
}

/// Each binary step is rounded before it feeds the next one
#[test]
fn test_rounding_points() {
    let table = ledger();
    // 1/3 -> 0.33, then 0.33*3 -> 0.99
    assert_eq!(eval(&table, "1/3*3").unwrap().0, Some(0.99));
    // Rounding only at the end would give 1.0
    assert_eq!(eval(&table, "1/3").unwrap().0, Some(0.33));
    assert_eq!(eval(&table, "0.33*3").unwrap().0, Some(0.99));
    // 2/3 -> 0.67, then 0.67*3 -> 2.01
    assert_eq!(eval(&table, "2/3*3").unwrap().0, Some(2.01));
    // Literals themselves are not rounded
    assert_eq!(eval(&table, "0.125").unwrap().0, Some(0.125));
    assert_eq!(eval(&table, "0.125*1").unwrap().0, Some(0.12));
}

/// One table serves formulas from many threads
#[test]
fn test_concurrent_evaluation() {
    let table = ledger();
    let config = MicroConfig::default();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let table = &table;
                let config = &config;
                scope.spawn(move || {
                    let formula = format!("sold_debit@401 * {} - sold_credit@401", i);
                    compute_micro(table, "cont", &formula, config)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let outcome = handle.join().unwrap();
            assert_eq!(outcome.value, Some(1200.0 * i as f64 - 350.75));
        }
    });
}

fn arb_unary() -> impl Strategy<Value = UnaryOperator> {
    prop_oneof![Just(UnaryOperator::Plus), Just(UnaryOperator::Minus)]
}

fn arb_binary() -> impl Strategy<Value = BinaryOperator> {
    prop_oneof![
        Just(BinaryOperator::Add),
        Just(BinaryOperator::Subtract),
        Just(BinaryOperator::Multiply),
        Just(BinaryOperator::Divide),
    ]
}

fn arb_expr() -> impl Strategy<Value = MicroExpr> {
    let leaf = prop_oneof![
        (0u32..10_000).prop_map(|n| MicroExpr::Literal(f64::from(n) / 4.0)),
        "[a-z][a-z0-9_]{0,5}@[0-9]{1,3}".prop_map(MicroExpr::Reference),
    ];
    leaf.prop_recursive(6, 48, 2, |inner| {
        prop_oneof![
            (arb_unary(), inner.clone()).prop_map(|(op, e)| MicroExpr::unary(op, e)),
            (arb_binary(), inner.clone(), inner)
                .prop_map(|(op, l, r)| MicroExpr::binary(op, l, r)),
        ]
    })
}

proptest! {
    /// Re-parsing the canonical rendering yields the same tree
    #[test]
    fn prop_parse_render_idempotent(expr in arb_expr()) {
        let config = MicroConfig::default();
        let rendered = expr.to_string();
        let reparsed = parse_formula(&rendered, &config).unwrap();
        prop_assert_eq!(&reparsed, &expr);
        prop_assert_eq!(reparsed.to_string(), rendered);
    }

    /// Evaluation never panics, whatever the formula text
    #[test]
    fn prop_compute_never_panics(formula in "[a-z0-9@._+*/() -]{0,40}") {
        let table = ledger();
        let outcome = compute_micro(&table, "cont", &formula, &MicroConfig::default());
        prop_assert!(outcome.value.is_some() != outcome.error.is_some());
    }
}
