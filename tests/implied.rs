use std::collections::BTreeSet;

use fesem::implied::evaluate;
use fesem::model_file::{parse_model_file, read_model_file};
use fesem::report::{ReportConfig, render_report};
use fesem::spec::{MatrixBuilder, ModelSpec, column_vector};
use fesem::types::{OutputFormat, Variant};
use fesem::{BasicModelSpec, ExtendedModelSpec, FesemError};
use symalg::{AlgebraError, Expr, SymMatrix, Symbol};

fn sym(name: &str) -> Expr {
    Expr::Symbol(Symbol::new(name))
}

fn model_path(file: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join(file)
}

#[test]
fn basic_mean_matches_the_article() {
    let spec = BasicModelSpec::build().expect("build basic model");
    let moments = evaluate(&spec).expect("evaluate");
    let mean = moments.mean();
    assert_eq!(mean.shape(), (6, 1));

    for t in 1..=3 {
        let expected = sym("alpha")
            + sym(&format!("varepsilon{t}"))
            + sym("beta") * sym(&format!("x{t}"));
        let got = mean.get(t - 1, 0).expect("cell");
        assert!(got.equals(&expected).expect("compare"), "y{t}: {got}");
        assert_eq!(mean.get(t + 2, 0).expect("cell"), &sym(&format!("x{t}")));
    }
    assert_eq!(
        mean.get(0, 0).expect("cell").to_string(),
        "alpha + varepsilon1 + beta*x1"
    );
}

#[test]
fn basic_mean_uses_only_model_symbols() {
    let spec = BasicModelSpec::build().expect("build basic model");
    let moments = evaluate(&spec).expect("evaluate");
    let allowed: BTreeSet<Symbol> = [
        "varepsilon1",
        "varepsilon2",
        "varepsilon3",
        "x1",
        "x2",
        "x3",
        "alpha",
        "beta",
    ]
    .into_iter()
    .map(Symbol::new)
    .collect();
    for entry in moments.mean().iter() {
        assert!(entry.free_symbols().is_subset(&allowed), "{entry}");
    }
}

#[test]
fn basic_covariance_is_symmetric_outer_product() {
    let spec = BasicModelSpec::build().expect("build basic model");
    let moments = evaluate(&spec).expect("evaluate");
    assert_eq!(moments.covariance().shape(), (6, 6));
    assert!(moments.is_symmetric().expect("symmetry"));

    let y1 = moments.mean().get(0, 0).expect("cell").clone();
    let var_y1 = moments.expanded_cell((0, 0)).expect("cell");
    assert_eq!(var_y1, (y1.clone() * y1).expand().expect("expand"));
}

#[test]
fn extended_shapes_and_cells() {
    let spec = ExtendedModelSpec::build().expect("build extended model");
    let moments = evaluate(&spec).expect("evaluate");
    assert_eq!(moments.mean().shape(), (12, 1));
    assert_eq!(moments.covariance().shape(), (12, 12));
    assert_eq!(moments.total_effects().shape(), (16, 16));

    let mean = moments.mean();
    assert_eq!(
        mean.get(0, 0).expect("cell").to_string(),
        "alpha + varepsilon1 + beta*xi1"
    );
    assert!(
        mean.get(4, 0)
            .expect("cell")
            .equals(&(sym("delta21") + sym("lambda21") * sym("xi1")))
            .expect("compare")
    );
    assert!(
        mean.get(3, 0)
            .expect("cell")
            .equals(&(sym("delta11") + sym("xi1")))
            .expect("compare")
    );

    let y1 = sym("alpha") + sym("varepsilon1") + sym("beta") * sym("xi1");
    let y3 = sym("alpha") + sym("varepsilon3") + sym("beta") * sym("xi3");
    let var_y1 = moments.expanded_cell((0, 0)).expect("Var(y1)");
    assert_eq!(var_y1, (y1.clone() * y1.clone()).expand().expect("expand"));
    let cov_y1_y3 = moments.expanded_cell((0, 2)).expect("Cov(y1, y3)");
    assert_eq!(cov_y1_y3, (y1 * y3).expand().expect("expand"));
    assert_eq!(
        cov_y1_y3,
        moments.expanded_cell((2, 0)).expect("Cov(y3, y1)")
    );

    assert!(matches!(
        moments.cell((12, 0)),
        Err(FesemError::Algebra(AlgebraError::IndexOutOfBounds { .. }))
    ));
}

#[test]
fn transcription_counts() {
    let basic = BasicModelSpec::build().expect("build basic model");
    assert_eq!(basic.loading_counts(), vec![1; 6]);
    assert_eq!(basic.path_counts(), vec![2, 2, 2, 0, 0, 0, 0]);

    let extended = ExtendedModelSpec::build().expect("build extended model");
    assert_eq!(extended.loading_counts(), vec![1; 12]);
    let mut expected = vec![2, 2, 2];
    expected.extend([1; 9]);
    expected.extend([0; 4]);
    assert_eq!(extended.path_counts(), expected);
}

#[test]
fn self_loop_makes_the_system_singular() {
    let mut spec = BasicModelSpec::build().expect("build basic model");
    let b = spec.symbols.expr("b").expect("beta");
    let mut beta = MatrixBuilder::new("B", BasicModelSpec::ETA, BasicModelSpec::ETA);
    beta.set("y1", "y1", Expr::one()).expect("self loop");
    for t in 1..=3 {
        let y = format!("y{t}");
        beta.set(&y, &format!("x{t}"), b.clone())
            .expect("slope")
            .set(&y, "a", Expr::one())
            .expect("intercept");
    }
    spec.beta = beta.build().expect("build B");

    assert!(matches!(
        evaluate(&spec),
        Err(FesemError::Algebra(AlgebraError::SingularMatrix))
    ));
}

#[test]
fn without_structure_the_mean_is_the_disturbance() {
    let base = BasicModelSpec::build().expect("build basic model");
    let observed = BasicModelSpec::OBSERVED;
    let mut lambda_y = MatrixBuilder::new("Lambda_y", observed, observed);
    for var in observed {
        lambda_y.set(var, var, Expr::one()).expect("loading");
    }
    let zeta = column_vector(&base.symbols, &["e1", "e2", "e3", "x1", "x2", "x3"])
        .expect("zeta");
    let spec = ModelSpec {
        name: "no structure".to_string(),
        y: base.y.clone(),
        lambda_y: lambda_y.build().expect("Lambda_y"),
        eta: column_vector(&base.symbols, observed).expect("eta"),
        beta: SymMatrix::zeros(6, 6),
        zeta,
        symbols: base.symbols.clone(),
    };

    let moments = evaluate(&spec).expect("evaluate");
    let direct = spec.lambda_y.matmul(&spec.zeta).expect("matmul");
    assert_eq!(moments.expanded_mean().expect("expand"), direct);
    assert_eq!(moments.mean().get(0, 0).expect("cell"), &sym("varepsilon1"));
}

#[test]
fn builder_rejects_repeated_coordinates() {
    let mut beta = MatrixBuilder::new("B", &["y1", "x1"], &["y1", "x1"]);
    beta.set("y1", "x1", sym("beta")).expect("first entry");
    assert!(matches!(
        beta.set("y1", "x1", Expr::one()),
        Err(FesemError::InvalidSpec(_))
    ));
    assert!(matches!(
        beta.set("y2", "x1", Expr::one()),
        Err(FesemError::InvalidSpec(_))
    ));
    let built = beta.build().expect("build");
    assert_eq!(built.get(0, 1).expect("cell"), &sym("beta"));
}

#[test]
fn invalid_shapes_are_rejected() {
    let mut spec = BasicModelSpec::build().expect("build basic model");
    spec.zeta = SymMatrix::zeros(6, 1);
    assert!(matches!(evaluate(&spec), Err(FesemError::InvalidSpec(_))));

    let mut spec = BasicModelSpec::build().expect("build basic model");
    spec.lambda_y = SymMatrix::zeros(6, 6);
    assert!(matches!(evaluate(&spec), Err(FesemError::InvalidSpec(_))));
}

#[test]
fn feedback_loop_gives_rational_means() {
    let text = "\
symbols: y1, y2, e1, e2, c12, c21
observed: y1, y2
eta: y1, y2
zeta: e1, e2
y1 =~ y1; y2 =~ y2
y1 ~ c12*y2
y2 ~ c21*y1
";
    let spec = parse_model_file("feedback", text).expect("parse");
    let moments = evaluate(&spec).expect("evaluate");
    let expected = (sym("e1") + sym("c12") * sym("e2")) / (Expr::one() - sym("c12") * sym("c21"));
    assert!(
        moments
            .mean()
            .get(0, 0)
            .expect("cell")
            .equals(&expected)
            .expect("compare")
    );
    assert!(moments.is_symmetric().expect("symmetry"));
}

#[test]
fn shipped_model_files_match_builders() {
    let cases = [
        ("basic.fesem", BasicModelSpec::build().expect("basic")),
        ("extended.fesem", ExtendedModelSpec::build().expect("extended")),
    ];
    for (file, built) in cases {
        let parsed = read_model_file(&model_path(file)).expect("read model file");
        assert_eq!(parsed.name, built.name, "{file}");
        assert_eq!(parsed.y, built.y, "{file}");
        assert_eq!(parsed.lambda_y, built.lambda_y, "{file}");
        assert_eq!(parsed.beta, built.beta, "{file}");
        assert_eq!(parsed.zeta, built.zeta, "{file}");

        let from_file = evaluate(&parsed).expect("evaluate file");
        let from_builder = evaluate(&built).expect("evaluate builder");
        assert_eq!(from_file.mean(), from_builder.mean(), "{file}");
    }
}

#[test]
fn reports_follow_variant_defaults() {
    let spec = BasicModelSpec::build().expect("build basic model");
    let moments = evaluate(&spec).expect("evaluate");
    let report = render_report(
        &spec,
        &moments,
        &ReportConfig::for_variant(Variant::Basic, OutputFormat::Plain),
    )
    .expect("render");
    assert!(report.starts_with(
        "# FE-SEM: equations for y\nMatrix([[alpha + varepsilon1 + beta*x1], "
    ));
    assert!(report.contains("# FE-SEM: equations for yy'\n"));

    let spec = ExtendedModelSpec::build().expect("build extended model");
    let moments = evaluate(&spec).expect("evaluate");
    let report = render_report(
        &spec,
        &moments,
        &ReportConfig::for_variant(Variant::Extended, OutputFormat::Latex),
    )
    .expect("render");
    assert!(report.contains("\n# Var(y1)\n$"));
    assert!(report.contains("\n# Cov(y1, y3)\n$"));
    assert!(!report.contains("equations for yy'"));
    assert!(report.contains("\\xi_{1}"));
}

#[test]
fn report_rejects_out_of_range_cells() {
    let spec = BasicModelSpec::build().expect("build basic model");
    let moments = evaluate(&spec).expect("evaluate");
    let config = ReportConfig {
        cells: vec![(0, 9)],
        ..Default::default()
    };
    assert!(render_report(&spec, &moments, &config).is_err());
}
