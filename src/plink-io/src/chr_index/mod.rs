use std::{str::FromStr, fmt::{Display, Formatter, self}, ops::Deref};

mod error;
pub use error::ChrIdxError;

use located_error::prelude::*;

/// 1-based chromosome index, as understood by PLINK's `--chr` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChrIdx(pub u8);

impl FromStr for ChrIdx {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim_start_matches("chr")
            .parse::<u8>()
            .loc(ChrIdxError(s.to_owned()))?;
        Ok(Self(inner))
    }
}

impl Display for ChrIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u8> for ChrIdx {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl Deref for ChrIdx {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
