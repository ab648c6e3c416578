use std::{fs::File, io::{Write, BufWriter}, path::Path};

use located_error::prelude::*;
use regex::Regex;
use lazy_static::lazy_static;

mod error;
pub use error::WriterError;

/// Field separator of every results table.
pub const WRITER_SEPARATOR: &str = "\t";

/// Line-oriented writer, targeting either a file or stdout.
pub struct GenericWriter<'a> {
    source: BufWriter<Box<dyn Write + 'a>>
}

impl<'a> GenericWriter<'a> {
    /// Open a writer on `path`, or on stdout if `None`.
    ///
    /// # Errors
    /// if `path` cannot be created (missing parent directory, permissions).
    pub fn new(path: Option<impl AsRef<Path>>) -> Result<GenericWriter<'a>> {
        use WriterError::IOError;
        let source: BufWriter<Box<dyn Write + 'a>> = match path {
            Some(path) => {
                let path = path.as_ref();
                let file = File::create(path).map_err(IOError)
                    .with_loc(|| format!("While creating {}", path.display()))?;
                BufWriter::new(Box::new(file))
            },
            None => BufWriter::new(Box::new(std::io::stdout()))
        };
        Ok(GenericWriter{source})
    }

    /// Write each item of `iter` on its own line.
    ///
    /// Pretty-print separators (`[ ]+-[ ]+`) are replaced with [`WRITER_SEPARATOR`], so that the
    /// tables displayed on the console become plain tab-separated files.
    pub fn write_iter<T, I>(&mut self, iter: T) -> Result<()>
    where   T: IntoIterator<Item = I>,
            I: std::fmt::Display,
    {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"[ ]+-[ ]+").expect("Failed to parse regex.");
        }
        for obj in iter {
            let line = format!("{obj}\n");
            self.source.write_all(RE.replace_all(&line, WRITER_SEPARATOR).as_bytes())
                .map_err(WriterError::IOError)
                .loc("While writing contents into file")?;
        }
        self.source.flush().loc("While flushing buffer contents of Writer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_becomes_tsv() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path = tmpdir.path().join("1KG.exch");
        let mut writer = GenericWriter::new(Some(&path))?;
        writer.write_iter(["Chr - Samples   - Variants", "1   - 5         - 3"])?;
        drop(writer);

        let got = std::fs::read_to_string(&path)?;
        assert_eq!(got, "Chr\tSamples\tVariants\n1\t5\t3\n");
        Ok(())
    }

    #[test]
    fn missing_parent_directory() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("missing").join("1KG.exch");
        assert!(GenericWriter::new(Some(&path)).is_err());
    }
}
