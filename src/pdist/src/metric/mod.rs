use std::{fmt::{self, Display, Formatter}, str::FromStr};

use ndarray::ArrayView1;

/// Distance metric between two observation vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Sum of absolute coordinate differences (a.k.a. Manhattan, L1)
    #[default]
    Cityblock,
    /// Square root of the sum of squared coordinate differences (L2)
    Euclidean,
}

impl Metric {
    pub fn distance(&self, u: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>) -> f64 {
        let pairs = u.iter().zip(v.iter());
        match self {
            Self::Cityblock => pairs.map(|(a, b)| (a - b).abs()).sum(),
            Self::Euclidean => pairs.map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt(),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cityblock => write!(f, "cityblock"),
            Self::Euclidean => write!(f, "euclidean"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cityblock" | "manhattan" => Ok(Self::Cityblock),
            "euclidean"               => Ok(Self::Euclidean),
            other                     => Err(format!("Unknown distance metric '{other}'")),
        }
    }
}
