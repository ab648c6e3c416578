use std::{fs, io::Write, path::{Path, PathBuf}};

/// PLINK `.bed` magic number, followed by the SNP-major mode flag.
const BED_MAGIC: [u8; 3] = [0x6c, 0x1b, 0x01];

/// 2-bit encoding of an allele-1 count within a SNP-major `.bed` file. `-127` stands for a missing call.
fn encode_call(count: i8) -> u8 {
    match count {
        2 => 0b00,
        1 => 0b10,
        0 => 0b11,
        _ => 0b01,
    }
}

/// Write a tiny `<dir>/<stem>.{bed,bim,fam}` fileset from a samples x variants matrix of allele-1 counts.
/// `chromosomes` holds the chromosome of each variant.
pub fn write_fileset(dir: &Path, stem: &str, genotypes: &[&[i8]], chromosomes: &[u8]) -> PathBuf {
    let prefix = dir.join(stem);
    let n_variants = chromosomes.len();

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
    bed.write_all(&BED_MAGIC).unwrap();
    for j in 0..n_variants {
        for samples in genotypes.chunks(4) {
            let byte = samples.iter().enumerate()
                .fold(0u8, |byte, (k, sample)| byte | (encode_call(sample[j]) << (2 * k)));
            bed.write_all(&[byte]).unwrap();
        }
    }
    prefix
}

/// Write an executable shell script standing in for an external tool.
#[cfg(unix)]
pub fn mock_executable(dir: &Path, name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, script).expect("Failed to write mock executable");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("Failed to set permissions");
    path
}
