use std::{fs, io::Write, ops::Deref, path::{Path, PathBuf}, fmt::{self, Formatter, Display}};
use tempfile::{self, TempDir};

/// Number of samples of every fixture.
pub const N_SAMPLES: usize = 5;

/// Number of variants of every fixture chromosome.
pub const N_VARIANTS: usize = 8;

/// PLINK `.bed` magic number, followed by the SNP-major mode flag.
const BED_MAGIC: [u8; 3] = [0x6c, 0x1b, 0x01];

/// Stand-in for PLINK: copies the pre-split '<bfile>.chr<chr>.*' fileset to '<out>.*'.
/// Fails (exit 1) if no such fileset was prepared.
const MOCK_PLINK: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
    case "$1" in
        --bfile) bfile="$2"; shift 2 ;;
        --chr)   chr="$2";   shift 2 ;;
        --out)   out="$2";   shift 2 ;;
        *)       shift ;;
    esac
done
for ext in bed bim fam; do
    cp "$bfile.chr$chr.$ext" "$out.$ext" || exit 1
done
echo "mock plink: --chr $chr --out $out" > "$out.log"
"#;

/// 2-bit encoding of an allele-1 count within a SNP-major `.bed` file. `-127` stands for a missing call.
fn encode_call(count: i8) -> u8 {
    match count {
        2 => 0b00,
        1 => 0b10,
        0 => 0b11,
        _ => 0b01,
    }
}

/// Write a `<dir>/<stem>.{bed,bim,fam}` fileset from a samples x variants matrix of allele-1 counts.
pub fn write_fileset(dir: &Path, stem: &str, genotypes: &[Vec<i8>], chromosomes: &[u8]) -> PathBuf {
    let mut fam = String::new();
    for i in 0..genotypes.len() {
        fam.push_str(&format!("fam{i} ind{i} 0 0 0 -9\n"));
    }
    fs::write(dir.join(format!("{stem}.fam")), fam).expect("Failed to write .fam");

    let mut bim = String::new();
    for (j, chr) in chromosomes.iter().enumerate() {
        bim.push_str(&format!("{chr}\tsnp{j}\t0\t{}\tA\tG\n", (j + 1) * 1000));
    }
    fs::write(dir.join(format!("{stem}.bim")), bim).expect("Failed to write .bim");

    let mut bed = fs::File::create(dir.join(format!("{stem}.bed"))).expect("Failed to create .bed");
    bed.write_all(&BED_MAGIC).expect("Failed to write .bed");
    for j in 0..chromosomes.len() {
        for samples in genotypes.chunks(4) {
            let byte = samples.iter().enumerate()
                .fold(0u8, |byte, (k, sample)| byte | (encode_call(sample[j]) << (2 * k)));
            bed.write_all(&[byte]).expect("Failed to write .bed");
        }
    }
    dir.join(stem)
}

/// A temporary PLINK fileset, pre-split by chromosome, along with an executable standing in for PLINK.
pub struct Fixture {
    prefix  : PathBuf,
    plink   : PathBuf,
    _tempdir: TempDir,
}

impl Fixture {
    /// Fileset `<tmpdir>/<subdir>/<stem>` spanning `chromosomes`. Genotypes are drawn from a seeded RNG.
    pub fn new(subdir: &str, stem: &str, chromosomes: &[u8]) -> Self {
        let tempdir = tempfile::tempdir().expect("Failed to generate temp directory");
        let dir = tempdir.path().join(subdir);
        fs::create_dir_all(&dir).expect("Failed to create fixture directory");

        let mut all_genotypes = vec![Vec::new(); N_SAMPLES];
        let mut all_chromosomes = Vec::new();
        for &chr in chromosomes {
            let genotypes = Self::genotypes(chr);
            write_fileset(&dir, &format!("{stem}.chr{chr}"), &genotypes, &[chr; N_VARIANTS]);
            for (sample, calls) in all_genotypes.iter_mut().zip(genotypes) {
                sample.extend(calls);
            }
            all_chromosomes.extend([chr; N_VARIANTS]);
        }
        let prefix = write_fileset(&dir, stem, &all_genotypes, &all_chromosomes);
        let plink = Self::mock_executable(tempdir.path(), "plink", MOCK_PLINK);
        Fixture { prefix, plink, _tempdir: tempdir }
    }

    /// samples x variants allele-1 counts of a given chromosome.
    pub fn genotypes(chr: u8) -> Vec<Vec<i8>> {
        let mut rng = fastrand::Rng::with_seed(u64::from(chr));
        (0..N_SAMPLES).map(|_| (0..N_VARIANTS).map(|_| rng.i8(0..=2)).collect()).collect()
    }

    pub fn plink(&self) -> &Path {
        &self.plink
    }

    pub fn dir(&self) -> &Path {
        self.prefix.parent().expect("No parent directory")
    }

    /// Files of the fixture directory whose name starts with `<stem>_`
    pub fn intermediate_files(&self) -> Vec<PathBuf> {
        let stem = self.prefix.file_name().expect("Invalid prefix").to_string_lossy();
        let mut files: Vec<PathBuf> = fs::read_dir(self.dir()).expect("Failed to read fixture directory")
            .map(|entry| entry.expect("Invalid directory entry").path())
            .filter(|path| path.file_name().is_some_and(|name| name.to_string_lossy().starts_with(&format!("{stem}_"))))
            .collect();
        files.sort();
        files
    }

    #[cfg(unix)]
    fn mock_executable(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, script).expect("Failed to write mock executable");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("Failed to set permissions");
        path
    }
}

impl Deref for Fixture {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.prefix.deref()
    }
}

impl Display for Fixture {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix.display())
    }
}
