use quickcheck::{QuickCheck, TestResult};
use tally_units::{Dimension, Error, UnitDimension, UnitEngine};

fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

const LINEAR_PAIRS: &[(&str, &str)] = &[
    ("km", "mi"),
    ("ft", "nm"),
    ("mg", "lb"),
    ("ozt", "ct"),
    ("fortnight", "min"),
    ("semester", "ms"),
    ("acre", "ha"),
    ("sqft", "km2"),
    ("mph", "knots"),
    ("GB", "Mb"),
    ("Mbps", "KBps"),
    ("dozen", "gross"),
];

#[test]
fn linear_round_trip_property() {
    fn prop(value: u32, pair_index: usize) -> TestResult {
        if value == 0 {
            return TestResult::discard();
        }
        let engine = UnitEngine::new();
        let (a, b) = LINEAR_PAIRS[pair_index % LINEAR_PAIRS.len()];
        let v = f64::from(value) / 7.0;
        let there = engine.convert(v, a, b).unwrap();
        let back = engine.convert(there, b, a).unwrap();
        TestResult::from_bool((back - v).abs() <= 1e-9 * v.abs().max(1.0))
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(u32, usize) -> TestResult);
}

#[test]
fn dimension_mismatch_always_errors() {
    let engine = UnitEngine::new();
    assert!(engine.convert(10.0, "kg", "m").is_err());
    assert!(engine.convert(10.0, "s", "B").is_err());
    assert!(engine.convert(10.0, "c", "kg").is_err());
    assert!(engine.convert_compound(10.0, "km/h", "MB/s").is_err());
}

#[test]
fn temperature_fixed_points_are_exact() {
    let engine = UnitEngine::new();
    assert_eq!(engine.convert(0.0, "c", "f").unwrap(), 32.0);
    assert_eq!(engine.convert(0.0, "k", "c").unwrap(), -273.15);
    assert_eq!(engine.convert(273.15, "k", "f").unwrap(), 32.0);
}

#[test]
fn compound_and_abbreviation_are_interchangeable() {
    let engine = UnitEngine::new();
    assert_close(engine.convert_compound(50.0, "kph", "km/h").unwrap(), 50.0);
    let mph = engine.convert_compound(50.0, "km/h", "mph").unwrap();
    assert!((mph - 31.07).abs() < 0.01, "got {mph}");
    assert_close(engine.convert_compound(1.0, "m/s", "mps").unwrap(), 1.0);
    assert_close(engine.convert(8.0, "Mbps", "MB/s").unwrap(), 1.0);
}

#[test]
fn named_ratio_units_have_ratio_dimension() {
    let engine = UnitEngine::new();
    assert_eq!(
        engine.dimension_of("kph").unwrap().normalized(),
        engine.dimension_of("km/h").unwrap()
    );
    assert_eq!(
        engine.dimension_of("km/h").unwrap(),
        UnitDimension::Ratio(Dimension::Length, Dimension::Time)
    );
}

#[test]
fn custom_unit_joins_its_base_dimension() {
    let mut engine = UnitEngine::new();
    engine.add_custom_unit("box", 20.0, "kg").unwrap();
    assert_close(engine.convert(2.0, "box", "kg").unwrap(), 40.0);
    assert_close(engine.convert(1.0, "BOX", "g").unwrap(), 20_000.0);
    assert!(engine.is_unit("box"));
    assert!(matches!(
        engine.convert(1.0, "box", "m"),
        Err(Error::Incompatible { .. })
    ));

    engine.clear_custom_units();
    assert!(!engine.is_unit("box"));
}

#[test]
fn custom_unit_can_build_on_custom_unit() {
    let mut engine = UnitEngine::new();
    engine.add_custom_unit("box", 20.0, "kg").unwrap();
    engine.add_custom_unit("pallet", 40.0, "box").unwrap();
    assert_close(engine.convert(1.0, "pallet", "kg").unwrap(), 800.0);
    assert_eq!(engine.custom_units().count(), 2);
}

#[test]
fn informal_time_spans_are_fixed_day_counts() {
    let engine = UnitEngine::new();
    assert_close(engine.convert(1.0, "fortnight", "days").unwrap(), 14.0);
    assert_close(engine.convert(1.0, "quarter", "days").unwrap(), 90.0);
    assert_close(engine.convert(1.0, "semester", "days").unwrap(), 180.0);
    assert_close(engine.convert(1.0, "year", "days").unwrap(), 365.0);
}

#[test]
fn canonical_names_normalise_case() {
    let engine = UnitEngine::new();
    assert_eq!(engine.canonical_name("KM").unwrap(), "km");
    assert_eq!(engine.canonical_name("Km/Hour").unwrap(), "km/h");
    assert_eq!(engine.canonical_name("fahrenheit").unwrap(), "°F");
}
