use crate::compound::{self, CompoundUnit};
use crate::db::{UnitDb, UnitDef};
use crate::dimension::{Conversion, Dimension, UnitDimension};
use crate::error::{Error, Result};

/// A unit name resolved against the built-in and custom tables.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedUnit {
    pub name: String,
    pub dimension: Dimension,
    pub conversion: Conversion,
}

impl ResolvedUnit {
    fn from_def(def: &UnitDef) -> Self {
        Self {
            name: def.name.clone(),
            dimension: def.dimension,
            conversion: def.conversion,
        }
    }

    /// Multiplicative factor to the dimension's base unit. Affine units only
    /// report their scale, which is why ratios refuse them.
    pub fn factor(&self) -> f64 {
        match self.conversion {
            Conversion::Linear(factor) => factor,
            Conversion::Affine { scale, .. } => scale,
        }
    }
}

/// Unit conversion engine: the shared built-in table plus units registered
/// at runtime.
#[derive(Clone, Debug, Default)]
pub struct UnitEngine {
    custom: UnitDb,
}

impl UnitEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, name: &str) -> Option<&UnitDef> {
        crate::builtin()
            .lookup(name)
            .or_else(|| self.custom.lookup(name))
    }

    /// Resolve a plain (non-ratio) unit name or alias, case-insensitively.
    pub fn resolve(&self, name: &str) -> Result<ResolvedUnit> {
        self.lookup(name.trim())
            .map(ResolvedUnit::from_def)
            .ok_or_else(|| Error::UnknownUnit(name.to_string()))
    }

    /// `true` for any plain unit or well-formed ratio of plain units.
    pub fn is_unit(&self, name: &str) -> bool {
        if name.contains('/') {
            self.parse_compound_unit(name).is_ok()
        } else {
            self.lookup(name.trim()).is_some()
        }
    }

    pub fn dimension_of(&self, name: &str) -> Result<UnitDimension> {
        if name.contains('/') {
            Ok(self.parse_compound_unit(name)?.dimension())
        } else {
            Ok(UnitDimension::Plain(self.resolve(name)?.dimension))
        }
    }

    /// Display name for a unit spec, e.g. `KM` -> `km`, `Km/H` -> `km/h`.
    pub fn canonical_name(&self, name: &str) -> Result<String> {
        if name.contains('/') {
            Ok(self.parse_compound_unit(name)?.name())
        } else {
            Ok(self.resolve(name)?.name)
        }
    }

    /// Convert `value` between two units of the same dimension.
    ///
    /// Ratio specs on either side (`km/h`) are routed through
    /// [`UnitEngine::convert_compound`].
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64> {
        if from.contains('/') || to.contains('/') {
            return self.convert_compound(value, from, to);
        }
        let src = self.resolve(from)?;
        let dst = self.resolve(to)?;
        if src.dimension != dst.dimension {
            return Err(Error::Incompatible {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if src.name == dst.name {
            return Ok(value);
        }
        Ok(dst.conversion.from_base(src.conversion.to_base(value)))
    }

    /// Numerator and denominator units of a rate.
    ///
    /// An explicit ratio keeps its written units (`km/h` -> `km`, `h`); a
    /// named rate maps to the base units of its pairing (`kph` -> `m`, `s`),
    /// so `convert(v, "kph", "m/s")` puts a value into those units.
    pub fn rate_units(&self, spec: &str) -> Result<(String, String)> {
        if spec.contains('/') {
            let compound = self.parse_compound_unit(spec)?;
            return Ok((compound.numerator.name, compound.denominator.name));
        }
        match self.dimension_of(spec)?.normalized() {
            UnitDimension::Ratio(num, den) => {
                Ok((num.base_unit().to_string(), den.base_unit().to_string()))
            }
            UnitDimension::Plain(_) => Err(Error::InvalidCompound {
                spec: spec.to_string(),
                message: "not a ratio unit",
            }),
        }
    }

    pub fn parse_compound_unit(&self, spec: &str) -> Result<CompoundUnit> {
        compound::parse(self, spec)
    }

    /// Convert between ratio units. Either side may be a named abbreviation
    /// (`kph`) or an explicit ratio (`km/h`).
    pub fn convert_compound(&self, value: f64, from: &str, to: &str) -> Result<f64> {
        let src = compound::ratio_spec(self, from)?;
        let dst = compound::ratio_spec(self, to)?;
        if src.pair != dst.pair {
            return Err(Error::Incompatible {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(value * src.factor / dst.factor)
    }

    /// Register `name` as `scale` x `base`, inheriting the base unit's dimension.
    pub fn add_custom_unit(&mut self, name: &str, scale: f64, base: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty()
            || name.contains('/')
            || name.chars().any(char::is_whitespace)
            || name.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(Error::InvalidCompound {
                spec: name.to_string(),
                message: "custom unit names must be a single word",
            });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::InvalidScale(scale));
        }
        if self.lookup(name).is_some() {
            return Err(Error::DuplicateUnit(name.to_string()));
        }
        let base = self.resolve(base)?;
        if base.conversion.is_affine() {
            return Err(Error::AffineBase(base.name));
        }

        tracing::debug!(unit = name, scale, base = %base.name, "registered custom unit");
        self.custom.insert(
            &[name],
            base.dimension,
            Conversion::Linear(scale * base.factor()),
        );
        Ok(())
    }

    pub fn custom_units(&self) -> impl Iterator<Item = &UnitDef> {
        self.custom.units.iter()
    }

    pub fn clear_custom_units(&mut self) {
        self.custom.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn linear_conversion_uses_factor_ratio() {
        let engine = UnitEngine::new();
        assert!(approx(engine.convert(1.0, "km", "m").unwrap(), 1000.0));
        assert!(approx(engine.convert(12.0, "inches", "ft").unwrap(), 1.0));
        assert!(approx(engine.convert(1.0, "GB", "MB").unwrap(), 1024.0));
        assert!(approx(engine.convert(1.0, "byte", "bits").unwrap(), 8.0));
    }

    #[test]
    fn temperature_pivots_through_celsius() {
        let engine = UnitEngine::new();
        assert_eq!(engine.convert(0.0, "c", "f").unwrap(), 32.0);
        assert_eq!(engine.convert(0.0, "k", "c").unwrap(), -273.15);
        assert_eq!(engine.convert(273.15, "k", "f").unwrap(), 32.0);
        assert!(approx(engine.convert(100.0, "celsius", "fahrenheit").unwrap(), 212.0));
        assert!(approx(engine.convert(-40.0, "f", "c").unwrap(), -40.0));
    }

    #[test]
    fn mismatched_dimensions_fail() {
        let engine = UnitEngine::new();
        let err = engine.convert(10.0, "kg", "m").unwrap_err();
        assert!(matches!(err, Error::Incompatible { .. }));
        assert!(err.to_string().starts_with("incompatible units"));
    }

    #[test]
    fn unknown_unit_fails() {
        let engine = UnitEngine::new();
        assert_eq!(
            engine.convert(1.0, "parsec", "m").unwrap_err(),
            Error::UnknownUnit("parsec".into())
        );
    }

    #[test]
    fn custom_unit_rejects_bad_input() {
        let mut engine = UnitEngine::new();
        assert!(matches!(
            engine.add_custom_unit("crate", 0.0, "kg"),
            Err(Error::InvalidScale(_))
        ));
        assert!(matches!(
            engine.add_custom_unit("km", 2.0, "m"),
            Err(Error::DuplicateUnit(_))
        ));
        assert!(matches!(
            engine.add_custom_unit("warm", 2.0, "c"),
            Err(Error::AffineBase(_))
        ));
        assert!(matches!(
            engine.add_custom_unit("crate", 2.0, "nothing"),
            Err(Error::UnknownUnit(_))
        ));
    }

    #[test]
    fn compound_factor_is_numerator_over_denominator() {
        let engine = UnitEngine::new();
        let unit = engine.parse_compound_unit("km/h").unwrap();
        assert_eq!(unit.numerator.dimension, Dimension::Length);
        assert_eq!(unit.denominator.dimension, Dimension::Time);
        assert!(approx(unit.factor(), 1000.0 / 3600.0));
        assert_eq!(unit.name(), "km/h");
    }

    #[test]
    fn compound_rejects_nested_and_affine_sides() {
        let engine = UnitEngine::new();
        assert!(engine.parse_compound_unit("kph/h").is_err());
        assert!(engine.parse_compound_unit("c/s").is_err());
        assert!(engine.parse_compound_unit("km/").is_err());
        assert!(engine.parse_compound_unit("km/h/s").is_err());
    }

    #[test]
    fn rate_units_of_explicit_and_named_rates() {
        let engine = UnitEngine::new();
        let pair = |a: &str, b: &str| (a.to_string(), b.to_string());
        assert_eq!(engine.rate_units("KM/H").unwrap(), pair("km", "h"));
        assert_eq!(engine.rate_units("kph").unwrap(), pair("m", "s"));
        assert_eq!(engine.rate_units("MBps").unwrap(), pair("B", "s"));
        assert!(engine.rate_units("km").is_err());
        assert!(approx(engine.convert(36.0, "kph", "m/s").unwrap(), 10.0));
    }
}
