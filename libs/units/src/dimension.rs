use std::fmt;

/// Physical quantity family a unit belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Dimension {
    Length,
    Mass,
    Time,
    Area,
    Temperature,
    Speed,
    DigitalStorage,
    DataRate,
    Dimensionless,
}

impl Dimension {
    /// Name of the unit every factor in this dimension is relative to.
    pub fn base_unit(self) -> &'static str {
        match self {
            Dimension::Length => "m",
            Dimension::Mass => "kg",
            Dimension::Time => "s",
            Dimension::Area => "m2",
            Dimension::Temperature => "°C",
            Dimension::Speed => "mps",
            Dimension::DigitalStorage => "B",
            Dimension::DataRate => "Bps",
            Dimension::Dimensionless => "each",
        }
    }

    /// The numerator/denominator pairing a named ratio dimension stands for.
    ///
    /// `mph` and `km/h` are interchangeable because speed is length over time
    /// with the same base (metres per second).
    pub fn ratio_pair(self) -> Option<(Dimension, Dimension)> {
        match self {
            Dimension::Speed => Some((Dimension::Length, Dimension::Time)),
            Dimension::DataRate => Some((Dimension::DigitalStorage, Dimension::Time)),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Length => "length",
            Dimension::Mass => "mass",
            Dimension::Time => "time",
            Dimension::Area => "area",
            Dimension::Temperature => "temperature",
            Dimension::Speed => "speed",
            Dimension::DigitalStorage => "digital-storage",
            Dimension::DataRate => "data-rate",
            Dimension::Dimensionless => "dimensionless",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimension of an arbitrary unit spec: a plain unit or an explicit ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitDimension {
    Plain(Dimension),
    Ratio(Dimension, Dimension),
}

impl UnitDimension {
    /// Collapse named ratio dimensions into their explicit pairing so that
    /// `Plain(Speed)` and `Ratio(Length, Time)` compare equal.
    pub fn normalized(self) -> UnitDimension {
        match self {
            UnitDimension::Plain(d) => match d.ratio_pair() {
                Some((num, den)) => UnitDimension::Ratio(num, den),
                None => self,
            },
            UnitDimension::Ratio(..) => self,
        }
    }
}

impl fmt::Display for UnitDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitDimension::Plain(d) => write!(f, "{d}"),
            UnitDimension::Ratio(n, d) => write!(f, "{n}/{d}"),
        }
    }
}

/// How a unit maps onto its dimension's base unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Conversion {
    /// `base = value * factor`
    Linear(f64),
    /// Temperature only: `celsius = (value + offset) * scale`.
    Affine { scale: f64, offset: f64 },
}

impl Conversion {
    pub fn to_base(self, value: f64) -> f64 {
        match self {
            Conversion::Linear(factor) => value * factor,
            Conversion::Affine { scale, offset } => (value + offset) * scale,
        }
    }

    pub fn from_base(self, base: f64) -> f64 {
        match self {
            Conversion::Linear(factor) => base / factor,
            Conversion::Affine { scale, offset } => base / scale - offset,
        }
    }

    pub fn is_affine(self) -> bool {
        matches!(self, Conversion::Affine { .. })
    }
}
