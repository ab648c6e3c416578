use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use log::{debug, trace, warn};

use crate::ChrIdx;

mod error;
pub use error::PlinkCommandError;

/// Number of trailing stderr lines reported when the external tool fails.
const STDERR_TAIL_LEN: usize = 10;

/// Outcome of a per-chromosome extraction.
///
/// A failed extraction is deliberately not an error: the missing or incomplete fileset is reported
/// once it gets read.
#[derive(Debug)]
pub struct Extraction {
    pub chr    : ChrIdx,
    pub prefix : PathBuf,
    pub success: bool,
}

/// Thin wrapper around an external PLINK executable.
///
/// Arguments are always passed as a list, and never through a shell: paths containing whitespace or
/// shell metacharacters are thus forwarded verbatim.
#[derive(Debug, Clone)]
pub struct PlinkCommand {
    executable: PathBuf,
}

impl PlinkCommand {
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self { executable: executable.as_ref().to_path_buf() }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Output prefix of a per-chromosome fileset: `<input>_<chr>`
    pub fn chromosome_prefix(input: &Path, chr: ChrIdx) -> PathBuf {
        let mut prefix = input.as_os_str().to_os_string();
        prefix.push(format!("_{chr}"));
        PathBuf::from(prefix)
    }

    /// `--bfile <input> --chr <chr> --make-bed --out <output>`
    pub fn extract_chromosome_args(input: &Path, chr: ChrIdx, output: &Path) -> Vec<OsString> {
        vec![
            "--bfile".into(), input.into(),
            "--chr".into(), chr.to_string().into(),
            "--make-bed".into(),
            "--out".into(), output.into(),
        ]
    }

    /// Filter the `input` fileset down to a single chromosome, writing a new binary fileset at
    /// `<input>_<chr>.{bed,bim,fam}`.
    ///
    /// Failures of the external tool (spawn failure, non-zero exit status) are logged as warnings.
    pub fn extract_chromosome(&self, input: &Path, chr: ChrIdx) -> Extraction {
        let prefix = Self::chromosome_prefix(input, chr);
        let args   = Self::extract_chromosome_args(input, chr, &prefix);
        debug!("Running {} {:?}", self.executable.display(), args);

        let success = match self.run(&args) {
            Ok(output) => {
                Self::log_output(&output);
                true
            },
            Err(e) => {
                let e = anyhow::Error::from(e);
                warn!("Extraction of chromosome {chr} may have failed: {e:#}");
                false
            }
        };
        Extraction { chr, prefix, success }
    }

    fn run(&self, args: &[OsString]) -> Result<Output, PlinkCommandError> {
        let tool = self.executable.display().to_string();
        let output = Command::new(&self.executable)
            .args(args)
            .output()
            .map_err(|e| PlinkCommandError::Spawn(tool.clone(), e))?;

        if ! output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            for line in &lines[lines.len().saturating_sub(STDERR_TAIL_LEN)..] {
                warn!("[{tool}] {line}");
            }
            return Err(PlinkCommandError::ExitStatus{tool, status: output.status})
        }
        Ok(output)
    }

    fn log_output(output: &Output) {
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            trace!("{line}");
        }
    }
}
