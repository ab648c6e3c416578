use std::{ffi::OsString, path::Path};

use clap::Parser;
use exchangeability_rs::ExchangeabilityReport;
use located_error::prelude::Result;
use parser::Cli;

/// Build and run the command line of a single run.
pub struct ExchangeabilityRunner {
    args: Vec<OsString>,
}

impl ExchangeabilityRunner {
    pub fn new(input: &Path, plink: &Path, num_perms: u32) -> Self {
        let args = vec![
            "exchangeability-rs".into(),
            "--input".into(), input.into(),
            "--plink".into(), plink.into(),
            "--num-perms".into(), num_perms.to_string().into(),
        ];
        Self { args }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn seed(self, seed: u64) -> Self {
        self.arg("--seed").arg(seed.to_string())
    }

    pub fn chr(self, chr: &str) -> Self {
        self.arg("--chr").arg(chr)
    }

    pub fn output_dir(self, dir: &Path) -> Self {
        self.arg("--output-dir").arg(dir)
    }

    pub fn cli(&self) -> Cli {
        Cli::parse_from(&self.args)
    }

    pub fn run(&self) -> Result<ExchangeabilityReport> {
        exchangeability_rs::run(&self.cli())
    }
}
