//! Built-in unit table and the alias index used to resolve names.

use crate::dimension::{Conversion, Dimension};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct UnitDef {
    /// Canonical display name.
    pub name: String,
    pub dimension: Dimension,
    pub conversion: Conversion,
}

/// Unit definitions plus two alias indexes: exact spelling first, then a
/// lowercase fold. Exact matching keeps `b` (bit) and `B` (byte) apart while
/// `mb` still finds the first-registered `MB`.
#[derive(Clone, Debug, Default)]
pub struct UnitDb {
    pub(crate) units: Vec<UnitDef>,
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

impl UnitDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut db = Self::new();
        for (aliases, dimension, conversion) in BUILTIN_UNITS {
            db.insert(aliases, *dimension, *conversion);
        }
        tracing::trace!(units = db.units.len(), "loaded built-in unit table");
        db
    }

    pub fn insert(&mut self, aliases: &[&str], dimension: Dimension, conversion: Conversion) {
        let Some(name) = aliases.first() else {
            return;
        };
        let index = self.units.len();
        self.units.push(UnitDef {
            name: (*name).to_string(),
            dimension,
            conversion,
        });
        for alias in aliases {
            debug_assert!(
                !self.exact.contains_key(*alias),
                "duplicate unit alias {alias}"
            );
            self.exact.entry((*alias).to_string()).or_insert(index);
            self.folded.entry(alias.to_lowercase()).or_insert(index);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&UnitDef> {
        self.exact
            .get(name)
            .or_else(|| self.folded.get(&name.to_lowercase()))
            .map(|&i| &self.units[i])
    }

    pub fn clear(&mut self) {
        self.units.clear();
        self.exact.clear();
        self.folded.clear();
    }
}

const DAY: f64 = 86_400.0;
const KIB: f64 = 1024.0;

use Conversion::{Affine, Linear};
use Dimension::*;

// "pound"/"pounds" are intentionally absent: they would clash with the
// currency. "in" is absent because it is the conversion keyword.
static BUILTIN_UNITS: &[(&[&str], Dimension, Conversion)] = &[
    // Length (base: metre)
    (&["m", "meter", "meters", "metre", "metres"], Length, Linear(1.0)),
    (&["km", "kilometer", "kilometers", "kilometre", "kilometres"], Length, Linear(1000.0)),
    (&["cm", "centimeter", "centimeters", "centimetre", "centimetres"], Length, Linear(0.01)),
    (&["mm", "millimeter", "millimeters", "millimetre", "millimetres"], Length, Linear(0.001)),
    (&["um", "µm", "micrometer", "micrometers", "micron", "microns"], Length, Linear(1e-6)),
    (&["nm", "nanometer", "nanometers"], Length, Linear(1e-9)),
    (&["inch", "inches"], Length, Linear(0.0254)),
    (&["ft", "foot", "feet"], Length, Linear(0.3048)),
    (&["yd", "yard", "yards"], Length, Linear(0.9144)),
    (&["mi", "mile", "miles"], Length, Linear(1609.344)),
    (&["nmi", "nauticalmile", "nauticalmiles"], Length, Linear(1852.0)),
    // Mass (base: kilogram)
    (&["kg", "kilogram", "kilograms", "kilo", "kilos"], Mass, Linear(1.0)),
    (&["g", "gram", "grams", "gramme", "grammes"], Mass, Linear(1e-3)),
    (&["mg", "milligram", "milligrams"], Mass, Linear(1e-6)),
    (&["ug", "µg", "mcg", "microgram", "micrograms"], Mass, Linear(1e-9)),
    (&["t", "tonne", "tonnes"], Mass, Linear(1000.0)),
    (&["lb", "lbs"], Mass, Linear(0.453_592_37)),
    (&["oz", "ounce", "ounces"], Mass, Linear(0.028_349_523_125)),
    (&["st", "stone", "stones"], Mass, Linear(6.350_293_18)),
    (&["ct", "carat", "carats"], Mass, Linear(0.0002)),
    (&["ozt", "troyounce", "troyounces"], Mass, Linear(0.031_103_476_8)),
    (&["gr", "grain", "grains"], Mass, Linear(0.000_064_798_91)),
    (&["dwt", "pennyweight", "pennyweights"], Mass, Linear(0.001_555_173_84)),
    // Time (base: second). Informal spans are fixed day counts.
    (&["ns", "nanosecond", "nanoseconds"], Time, Linear(1e-9)),
    (&["us", "µs", "microsecond", "microseconds"], Time, Linear(1e-6)),
    (&["ms", "millisecond", "milliseconds"], Time, Linear(1e-3)),
    (&["s", "sec", "secs", "second", "seconds"], Time, Linear(1.0)),
    (&["min", "mins", "minute", "minutes"], Time, Linear(60.0)),
    (&["h", "hr", "hrs", "hour", "hours"], Time, Linear(3600.0)),
    (&["day", "days", "d"], Time, Linear(DAY)),
    (&["week", "weeks", "wk", "wks"], Time, Linear(7.0 * DAY)),
    (&["fortnight", "fortnights"], Time, Linear(14.0 * DAY)),
    (&["month", "months", "mo"], Time, Linear(30.0 * DAY)),
    (&["quarter", "quarters", "qtr"], Time, Linear(90.0 * DAY)),
    (&["semester", "semesters"], Time, Linear(180.0 * DAY)),
    (&["year", "years", "yr", "yrs", "y"], Time, Linear(365.0 * DAY)),
    (&["decade", "decades"], Time, Linear(3650.0 * DAY)),
    (&["century", "centuries"], Time, Linear(36500.0 * DAY)),
    // Area (base: square metre)
    (&["m2", "m²", "sqm"], Area, Linear(1.0)),
    (&["km2", "km²", "sqkm"], Area, Linear(1e6)),
    (&["cm2", "cm²"], Area, Linear(1e-4)),
    (&["mm2", "mm²"], Area, Linear(1e-6)),
    (&["ha", "hectare", "hectares"], Area, Linear(1e4)),
    (&["acre", "acres", "ac"], Area, Linear(4046.856_422_4)),
    (&["ft2", "ft²", "sqft"], Area, Linear(0.092_903_04)),
    (&["in2", "in²", "sqin"], Area, Linear(0.000_645_16)),
    (&["yd2", "yd²", "sqyd"], Area, Linear(0.836_127_36)),
    (&["mi2", "mi²", "sqmi"], Area, Linear(2_589_988.110_336)),
    // Temperature (affine, pivots through Celsius)
    (&["°C", "c", "celsius", "degc"], Temperature, Affine { scale: 1.0, offset: 0.0 }),
    (&["°F", "f", "fahrenheit", "degf"], Temperature, Affine { scale: 5.0 / 9.0, offset: -32.0 }),
    (&["K", "kelvin"], Temperature, Affine { scale: 1.0, offset: -273.15 }),
    (&["°R", "rankine"], Temperature, Affine { scale: 5.0 / 9.0, offset: -491.67 }),
    // Speed (base: metre per second)
    (&["mps"], Speed, Linear(1.0)),
    (&["kph", "kmh", "kmph"], Speed, Linear(1000.0 / 3600.0)),
    (&["mph"], Speed, Linear(0.447_04)),
    (&["knots", "knot", "kn", "kt", "kts"], Speed, Linear(1852.0 / 3600.0)),
    (&["fps"], Speed, Linear(0.3048)),
    // Digital storage (base: byte, binary scaling). Bytes register first so
    // case-folded lookups prefer them.
    (&["B", "byte", "bytes"], DigitalStorage, Linear(1.0)),
    (&["KB", "KiB", "kilobyte", "kilobytes"], DigitalStorage, Linear(KIB)),
    (&["MB", "MiB", "megabyte", "megabytes"], DigitalStorage, Linear(KIB * KIB)),
    (&["GB", "GiB", "gigabyte", "gigabytes"], DigitalStorage, Linear(KIB * KIB * KIB)),
    (&["TB", "TiB", "terabyte", "terabytes"], DigitalStorage, Linear(KIB * KIB * KIB * KIB)),
    (&["PB", "PiB", "petabyte", "petabytes"], DigitalStorage, Linear(KIB * KIB * KIB * KIB * KIB)),
    (&["b", "bit", "bits"], DigitalStorage, Linear(0.125)),
    (&["Kb", "Kib", "kilobit", "kilobits"], DigitalStorage, Linear(KIB / 8.0)),
    (&["Mb", "Mib", "megabit", "megabits"], DigitalStorage, Linear(KIB * KIB / 8.0)),
    (&["Gb", "Gib", "gigabit", "gigabits"], DigitalStorage, Linear(KIB * KIB * KIB / 8.0)),
    (&["Tb", "Tib", "terabit", "terabits"], DigitalStorage, Linear(KIB * KIB * KIB * KIB / 8.0)),
    // Data rate (base: byte per second). Bit rates register first.
    (&["bps"], DataRate, Linear(0.125)),
    (&["kbps", "Kbps"], DataRate, Linear(KIB / 8.0)),
    (&["Mbps"], DataRate, Linear(KIB * KIB / 8.0)),
    (&["Gbps"], DataRate, Linear(KIB * KIB * KIB / 8.0)),
    (&["Bps"], DataRate, Linear(1.0)),
    (&["KBps"], DataRate, Linear(KIB)),
    (&["MBps"], DataRate, Linear(KIB * KIB)),
    (&["GBps"], DataRate, Linear(KIB * KIB * KIB)),
    // Dimensionless counts
    (&["each", "ea", "pcs", "pc", "piece", "pieces"], Dimensionless, Linear(1.0)),
    (&["pair", "pairs"], Dimensionless, Linear(2.0)),
    (&["dozen", "dozens", "doz"], Dimensionless, Linear(12.0)),
    (&["score"], Dimensionless, Linear(20.0)),
    (&["gross"], Dimensionless, Linear(144.0)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_spelling_wins_over_fold() {
        let db = UnitDb::builtin();
        assert_eq!(db.lookup("b").unwrap().name, "b");
        assert_eq!(db.lookup("B").unwrap().name, "B");
        assert_eq!(db.lookup("Mb").unwrap().name, "Mb");
        assert_eq!(db.lookup("mb").unwrap().name, "MB");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let db = UnitDb::builtin();
        assert_eq!(db.lookup("KM").unwrap().name, "km");
        assert_eq!(db.lookup("Celsius").unwrap().name, "°C");
        assert_eq!(db.lookup("MPH").unwrap().dimension, Dimension::Speed);
    }

    #[test]
    fn pound_is_not_a_unit() {
        let db = UnitDb::builtin();
        assert!(db.lookup("pound").is_none());
        assert!(db.lookup("pounds").is_none());
        assert!(db.lookup("lbs").is_some());
    }

    #[test]
    fn every_alias_has_one_dimension() {
        let db = UnitDb::builtin();
        for (aliases, dimension, _) in BUILTIN_UNITS {
            for alias in *aliases {
                assert_eq!(db.lookup(alias).unwrap().dimension, *dimension, "{alias}");
            }
        }
    }
}
