#![forbid(unsafe_code)]
//! Dimensional unit conversion.
//!
//! Every unit name resolves case-insensitively to one [`Dimension`] and a
//! [`Conversion`] rule. Linear units convert by factor ratio; temperature is
//! affine and pivots through Celsius. Ratio units (`km/h`) are resolved as
//! `factor(numerator) / factor(denominator)` and interchange freely with the
//! named abbreviations (`kph`) of the same pairing.

mod compound;
mod db;
mod dimension;
mod error;
mod unit;

use once_cell::sync::Lazy;

pub use compound::CompoundUnit;
pub use db::{UnitDb, UnitDef};
pub use dimension::{Conversion, Dimension, UnitDimension};
pub use error::{Error, Result};
pub use unit::{ResolvedUnit, UnitEngine};

static BUILTIN_DB: Lazy<UnitDb> = Lazy::new(UnitDb::builtin);

pub(crate) fn builtin() -> &'static UnitDb {
    &BUILTIN_DB
}
