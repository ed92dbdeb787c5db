use std::{
    io::{self, BufRead},
    cmp::min,
    path::Path,
};
use bio::io::fasta;
use crate::{
    ext,
    err::add_path,
};
use super::NamedSeq;

/// Line width of FASTA files, written by this crate.
pub const WIDTH: usize = 80;

/// Opens FASTA file (possibly gzip compressed).
pub fn reader(path: &Path) -> crate::Result<fasta::Reader<Box<dyn BufRead + Send>>> {
    Ok(fasta::Reader::from_bufread(ext::sys::open(path)?))
}

/// Calls `f` on every record of the FASTA file, in order of appearance.
pub fn for_each_record(
    path: &Path,
    mut f: impl FnMut(fasta::Record) -> crate::Result<()>,
) -> crate::Result<()>
{
    for record in reader(path)?.records() {
        f(record.map_err(add_path!(path))?)?;
    }
    Ok(())
}

/// Reads all records from the FASTA file. Descriptions are discarded.
pub fn read_all(path: &Path) -> crate::Result<Vec<NamedSeq>> {
    let mut seqs = Vec::new();
    for_each_record(path, |record| {
        seqs.push(NamedSeq::new(record.id().to_owned(), record.seq().to_vec()));
        Ok(())
    })?;
    Ok(seqs)
}

/// Write a single sequence to the FASTA file.
/// Use this function instead of `bio::fasta::Writer` as the latter
/// writes the sequence into a single line, without splitting.
pub fn write_fasta<W: io::Write>(mut writer: W, name: &str, seq: &[u8]) -> io::Result<()> {
    writeln!(writer, ">{}", name)?;
    let n = seq.len();
    for i in (0..n).step_by(WIDTH) {
        writer.write_all(&seq[i..min(i + WIDTH, n)])?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn wrapped_output() {
        let seq = vec![b'A'; 170];
        let mut out = Vec::new();
        write_fasta(&mut out, "seq1", &seq).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], ">seq1");
        assert_eq!(lines[1].len(), 80);
        assert_eq!(lines[2].len(), 80);
        assert_eq!(lines[3].len(), 10);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn read_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.fa");
        fs::write(&path, ">a first\nMKV\nLU\n>b\nMK-O\n").unwrap();
        let seqs = read_all(&path).unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].name(), "a");
        assert_eq!(seqs[0].seq(), b"MKVLU");
        assert_eq!(seqs[1].seq(), b"MK-O");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(read_all(&dir.path().join("absent.fa")), Err(crate::Error::Io(..))));
    }
}
