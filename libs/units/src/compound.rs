//! Ratio units such as `km/h` or `MB/s`.

use crate::dimension::{Dimension, UnitDimension};
use crate::error::{Error, Result};
use crate::unit::{ResolvedUnit, UnitEngine};

/// A parsed `numerator/denominator` unit.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundUnit {
    pub numerator: ResolvedUnit,
    pub denominator: ResolvedUnit,
}

impl CompoundUnit {
    /// Multiplicative distance from the pair's compound base
    /// (e.g. metres per second for length/time).
    pub fn factor(&self) -> f64 {
        self.numerator.factor() / self.denominator.factor()
    }

    pub fn dimension(&self) -> UnitDimension {
        UnitDimension::Ratio(self.numerator.dimension, self.denominator.dimension)
    }

    pub fn name(&self) -> String {
        format!("{}/{}", self.numerator.name, self.denominator.name)
    }
}

/// Either side of a compound conversion once resolved: the ratio pairing it
/// belongs to and its factor relative to that pairing's base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RatioSpec {
    pub pair: (Dimension, Dimension),
    pub factor: f64,
}

pub(crate) fn split_ratio(spec: &str) -> Result<(&str, &str)> {
    let invalid = |message| Error::InvalidCompound {
        spec: spec.to_string(),
        message,
    };
    let (num, den) = spec.split_once('/').ok_or_else(|| invalid("expected 'num/den'"))?;
    let (num, den) = (num.trim(), den.trim());
    if num.is_empty() {
        return Err(invalid("missing numerator"));
    }
    if den.is_empty() {
        return Err(invalid("missing denominator"));
    }
    if den.contains('/') {
        return Err(invalid("only one '/' is allowed"));
    }
    Ok((num, den))
}

pub(crate) fn parse(engine: &UnitEngine, spec: &str) -> Result<CompoundUnit> {
    let (num, den) = split_ratio(spec)?;
    let numerator = resolve_side(engine, spec, num)?;
    let denominator = resolve_side(engine, spec, den)?;
    Ok(CompoundUnit {
        numerator,
        denominator,
    })
}

fn resolve_side(engine: &UnitEngine, spec: &str, name: &str) -> Result<ResolvedUnit> {
    let unit = engine.resolve(name)?;
    if unit.conversion.is_affine() {
        return Err(Error::InvalidCompound {
            spec: spec.to_string(),
            message: "temperature units cannot form a ratio",
        });
    }
    if unit.dimension.ratio_pair().is_some() {
        return Err(Error::InvalidCompound {
            spec: spec.to_string(),
            message: "each side must be a plain unit",
        });
    }
    Ok(unit)
}

pub(crate) fn ratio_spec(engine: &UnitEngine, spec: &str) -> Result<RatioSpec> {
    if spec.contains('/') {
        let compound = parse(engine, spec)?;
        return Ok(RatioSpec {
            pair: (compound.numerator.dimension, compound.denominator.dimension),
            factor: compound.factor(),
        });
    }
    let unit = engine.resolve(spec)?;
    let pair = unit
        .dimension
        .ratio_pair()
        .ok_or_else(|| Error::InvalidCompound {
            spec: spec.to_string(),
            message: "not a ratio unit",
        })?;
    Ok(RatioSpec {
        pair,
        factor: unit.factor(),
    })
}
