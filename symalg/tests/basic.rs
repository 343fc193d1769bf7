use std::collections::HashMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use symalg::{AlgebraError, Expr, SymMatrix, Symbol, SymbolTable, parse_expr};

fn sym(name: &str) -> Expr {
    Expr::Symbol(Symbol::new(name))
}

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

#[test]
fn undefined_symbol_is_reported() {
    let mut symbols = SymbolTable::new();
    symbols.declare("e1", "varepsilon1").expect("declare");
    assert_eq!(symbols.get("e1").expect("get").name(), "varepsilon1");
    match symbols.get("e2") {
        Err(AlgebraError::UndefinedSymbol(name)) => assert_eq!(name, "e2"),
        other => panic!("expected undefined symbol, got {other:?}"),
    }
}

#[test]
fn redeclaring_a_binding_with_another_name_fails() {
    let mut symbols = SymbolTable::new();
    let first = symbols.declare("a", "alpha").expect("declare");
    let again = symbols.declare("a", "alpha").expect("same declaration");
    assert_eq!(first, again);
    assert_eq!(symbols.len(), 1);
    assert!(matches!(
        symbols.declare("a", "beta"),
        Err(AlgebraError::DuplicateSymbol { .. })
    ));
}

#[test]
fn products_of_sums_stay_unexpanded() {
    let sum = sym("a") + sym("b");
    let square = sum.clone() * sum;
    assert_eq!(square.to_string(), "(a + b)**2");

    let expanded = square.expand().expect("expand");
    assert_eq!(expanded.to_string(), "2*a*b + a**2 + b**2");
}

#[test]
fn expand_is_idempotent() {
    let e = (sym("alpha") + sym("varepsilon1") + sym("beta") * sym("x1"))
        * (sym("alpha") + sym("varepsilon3") + sym("beta") * sym("x3"));
    let once = e.expand().expect("expand");
    let twice = once.expand().expect("expand again");
    assert_eq!(once, twice);
    assert!(once.equals(&e).expect("compare"));

    let fraction = (sym("a") + sym("b")) / (Expr::one() - sym("c"));
    let once = fraction.expand().expect("expand");
    assert_eq!(once.expand().expect("expand again"), once);
}

#[test]
fn like_terms_are_collected() {
    let e = sym("x") + sym("x") + Expr::int(2) * sym("y") - sym("y");
    assert_eq!(e, Expr::int(2) * sym("x") + sym("y"));
    assert_eq!(e.to_string(), "2*x + y");
    assert!((sym("x") - sym("x")).is_zero());
}

#[test]
fn feedback_loop_inverts_to_rational_functions() {
    let m = SymMatrix::from_rows(vec![
        vec![Expr::one(), -sym("b12")],
        vec![-sym("b21"), Expr::one()],
    ])
    .expect("matrix");
    let inv = m.inverse().expect("invertible");
    assert_eq!(inv.get(0, 0).expect("cell").to_string(), "1/(1 - b12*b21)");
    assert_eq!(inv.get(0, 1).expect("cell").to_string(), "b12/(1 - b12*b21)");

    let product = m.matmul(&inv).expect("matmul");
    let identity = SymMatrix::identity(2);
    for i in 0..2 {
        for j in 0..2 {
            let cell = product.get(i, j).expect("cell");
            let expected = identity.get(i, j).expect("cell");
            assert!(cell.equals(expected).expect("compare"), "cell ({i}, {j})");
        }
    }
}

#[test]
fn triangular_inverse_has_polynomial_entries() {
    let b = sym("beta");
    let m = SymMatrix::from_entries(
        3,
        3,
        &[
            (0, 0, Expr::one()),
            (0, 1, -b.clone()),
            (1, 1, Expr::one()),
            (1, 2, -Expr::one()),
            (2, 2, Expr::one()),
        ],
    )
    .expect("matrix");
    let inv = m.inverse().expect("invertible");
    assert_eq!(inv.get(0, 1).expect("cell"), &b);
    assert_eq!(inv.get(0, 2).expect("cell"), &b);
    assert_eq!(inv.get(1, 2).expect("cell"), &Expr::one());
    assert!(inv.get(2, 0).expect("cell").is_zero());
}

#[test]
fn singular_matrix_cannot_be_inverted() {
    let m = SymMatrix::from_rows(vec![
        vec![Expr::one(), sym("b")],
        vec![Expr::one(), sym("b")],
    ])
    .expect("matrix");
    assert_eq!(m.inverse(), Err(AlgebraError::SingularMatrix));
    assert!(m.determinant().expect("determinant").is_zero());

    let self_loop = SymMatrix::identity(1)
        .sub(&SymMatrix::identity(1))
        .expect("sub");
    assert_eq!(self_loop.inverse(), Err(AlgebraError::SingularMatrix));
}

#[test]
fn determinant_of_generic_two_by_two() {
    let m = SymMatrix::from_rows(vec![vec![sym("a"), sym("b")], vec![sym("c"), sym("d")]])
        .expect("matrix");
    let det = m.determinant().expect("determinant");
    assert!(det
        .equals(&(sym("a") * sym("d") - sym("b") * sym("c")))
        .expect("compare"));
    assert_eq!(det.to_string(), "a*d - b*c");
}

#[test]
fn shape_errors_are_reported() {
    let a = SymMatrix::zeros(2, 3);
    assert!(matches!(
        a.matmul(&a),
        Err(AlgebraError::DimensionMismatch { op: "matmul", .. })
    ));
    assert!(matches!(
        a.sub(&SymMatrix::zeros(3, 2)),
        Err(AlgebraError::DimensionMismatch { op: "sub", .. })
    ));
    assert_eq!(a.inverse(), Err(AlgebraError::NotSquare((2, 3))));
    assert!(matches!(
        a.get(2, 0),
        Err(AlgebraError::IndexOutOfBounds { row: 2, col: 0, .. })
    ));
    assert!(matches!(
        SymMatrix::from_rows(vec![vec![Expr::one()], vec![Expr::one(), Expr::one()]]),
        Err(AlgebraError::DimensionMismatch { .. })
    ));
}

#[test]
fn sparse_entries_are_validated() {
    assert_eq!(
        SymMatrix::from_entries(2, 2, &[(0, 0, Expr::one()), (0, 0, sym("b"))]),
        Err(AlgebraError::DuplicateEntry { row: 0, col: 0 })
    );
    assert!(matches!(
        SymMatrix::from_entries(2, 2, &[(2, 1, Expr::one())]),
        Err(AlgebraError::IndexOutOfBounds { row: 2, col: 1, .. })
    ));
    let m = SymMatrix::from_entries(2, 3, &[(0, 2, sym("b")), (1, 2, Expr::one())])
        .expect("matrix");
    assert_eq!(m.row_nonzero_counts(), vec![1, 1]);
    assert_eq!(m.col_nonzero_counts(), vec![0, 0, 2]);
}

#[test]
fn parser_resolves_declared_symbols() {
    let mut symbols = SymbolTable::new();
    symbols
        .declare_all(&[("a", "alpha"), ("b", "beta"), ("x1", "x1")])
        .expect("declare");

    let parsed = parse_expr("b*x1 + 2*a - 1/2", &symbols).expect("parse");
    let expected = sym("beta") * sym("x1") + Expr::int(2) * sym("alpha")
        - Expr::rational(1, 2).expect("rational");
    assert_eq!(parsed, expected);

    assert_eq!(parse_expr("0.25*a", &symbols).expect("parse").to_string(), "alpha/4");
    assert_eq!(
        parse_expr("(a + b)^2", &symbols).expect("parse").to_string(),
        "(alpha + beta)**2"
    );
    assert_eq!(
        parse_expr("-x1**-1", &symbols).expect("parse").to_string(),
        "-1/x1"
    );
}

#[test]
fn parser_rejects_bad_input() {
    let mut symbols = SymbolTable::new();
    symbols.declare_plain(&["a"]).expect("declare");
    assert!(matches!(
        parse_expr("a + c", &symbols),
        Err(AlgebraError::UndefinedSymbol(name)) if name == "c"
    ));
    assert!(matches!(parse_expr("a +", &symbols), Err(AlgebraError::Parse(_))));
    assert_eq!(parse_expr("a/0", &symbols), Err(AlgebraError::DivisionByZero));
}

#[test]
fn parsed_exponents_are_bounded() {
    let mut symbols = SymbolTable::new();
    symbols.declare_plain(&["x"]).expect("declare");
    assert_eq!(
        parse_expr("x^-256", &symbols).expect("parse").to_string(),
        "1/x**256"
    );
    assert!(matches!(
        parse_expr("x^-2147483648", &symbols),
        Err(AlgebraError::Parse(_))
    ));
    assert!(matches!(
        parse_expr("2^2147483647", &symbols),
        Err(AlgebraError::Parse(_))
    ));
    assert!(matches!(
        parse_expr("x**257", &symbols),
        Err(AlgebraError::Parse(_))
    ));
}

#[test]
fn latex_rendering() {
    assert_eq!(Symbol::new("varepsilon1").latex(), "\\varepsilon_{1}");
    assert_eq!(Symbol::new("x11").latex(), "x_{11}");
    assert_eq!(Symbol::new("alpha").latex(), "\\alpha");

    let e = sym("alpha") + sym("beta") * sym("xi1");
    assert_eq!(e.latex(), "\\alpha + \\beta \\xi_{1}");

    let half = Expr::rational(1, 2).expect("rational") * sym("a");
    assert_eq!(half.latex(), "\\frac{a}{2}");

    let column = SymMatrix::column(vec![sym("a"), sym("b")]);
    assert_eq!(column.to_string(), "Matrix([[a], [b]])");
    assert_eq!(
        column.latex(),
        "\\left[\\begin{matrix}a\\\\b\\end{matrix}\\right]"
    );
}

#[test]
fn exact_evaluation_and_substitution() {
    let a = Symbol::new("a");
    let b = Symbol::new("b");
    let sum = Expr::Symbol(a.clone()) + Expr::Symbol(b.clone());
    let e = sum.clone() * sum;

    let mut values = HashMap::new();
    values.insert(a.clone(), ratio(2, 1));
    values.insert(b.clone(), ratio(1, 2));
    assert_eq!(e.evaluate(&values).expect("evaluate"), ratio(25, 4));

    let substituted = e.subs(&b, &Expr::zero());
    assert_eq!(substituted.to_string(), "a**2");
    assert_eq!(
        e.free_symbols().into_iter().collect::<Vec<_>>(),
        vec![a.clone(), b]
    );

    values.remove(&a);
    assert!(matches!(
        e.evaluate(&values),
        Err(AlgebraError::UndefinedSymbol(name)) if name == "a"
    ));
}
