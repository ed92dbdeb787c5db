use std::{
    io::{Read, BufRead, BufReader, BufWriter},
    fs::{self, File},
    path::{Path, PathBuf},
    ffi::OsStr,
    thread,
    time::Duration,
};
use flate2::bufread::MultiGzDecoder;
use crate::{
    Error,
    err::add_path,
};

/// Finds an executable, and returns Error, if executable is not available.
pub fn find_exe(p: impl AsRef<Path>) -> Result<PathBuf, Error> {
    which::which(p.as_ref()).map_err(|_| Error::NoExec(p.as_ref().to_owned()))
}

/// Returns
/// - gzip reader if the file starts with gzip magic number,
/// - regular text file otherwise.
pub fn open(filename: &Path) -> Result<Box<dyn BufRead + Send>, Error> {
    let mut stream = BufReader::new(File::open(filename).map_err(add_path!(filename))?);
    let mut two_bytes = [0_u8; 2];
    let bytes_read = stream.read(&mut two_bytes).map_err(add_path!(filename))?;
    stream.seek_relative(-(bytes_read as i64)).map_err(add_path!(filename))?;
    // Check gzip magic number.
    if bytes_read == 2 && two_bytes[0] == 0x1f && two_bytes[1] == 0x8b {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(stream))))
    } else {
        Ok(Box::new(stream))
    }
}

/// Creates buffered file.
pub fn create(filename: &Path) -> Result<BufWriter<File>, Error> {
    File::create(filename).map(BufWriter::new).map_err(add_path!(filename))
}

/// Returns a path with a new suffix appended to the end.
pub fn append_path(path: &Path, suffix: impl AsRef<OsStr>) -> PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(suffix.as_ref());
    os_string.into()
}

/// Converts relative path into absolute, using the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        Ok(path.to_owned())
    } else {
        Ok(std::env::current_dir().map_err(add_path!(!))?.join(path))
    }
}

/// Create directory, if it does not exist yet.
pub fn mkdir(path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(add_path!(path))
    } else {
        Ok(())
    }
}

/// Creates directory (with all parents) that anyone can write to.
pub fn mkdir_shared(path: &Path) -> Result<(), Error> {
    if path.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    std::os::unix::fs::DirBuilderExt::mode(&mut builder, 0o777);
    builder.create(path).map_err(add_path!(path))?;
    // Mode passed to the builder is limited by the umask.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o777)).map_err(add_path!(path))?;
    }
    Ok(())
}

/// Returns true if the file exists and is not empty.
pub fn nonempty_file(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_file() && meta.len() > 0).unwrap_or(false)
}

/// Checks whether the file exists and is not empty, making at most `attempts` checks `delay` apart.
/// Output of finished processes is not always immediately visible on networked file systems.
pub fn wait_for_file(path: &Path, attempts: u32, delay: Duration) -> bool {
    for i in 0..attempts.max(1) {
        if nonempty_file(path) {
            return true;
        }
        if i + 1 < attempts {
            log::debug!("    Waiting for {} to appear", crate::ext::fmt::path(path));
            thread::sleep(delay);
        }
    }
    false
}

/// Name of the current user, used to separate temporary directories.
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "nobody".to_string())
}

/// RAII guard that changes the working directory and changes it back when dropped.
pub struct DirGuard {
    prev: PathBuf,
}

impl DirGuard {
    pub fn new(dir: &Path) -> Result<Self, Error> {
        let prev = std::env::current_dir().map_err(add_path!(!))?;
        std::env::set_current_dir(dir).map_err(add_path!(dir))?;
        Ok(Self { prev })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.prev) {
            log::error!("Could not return to directory {}: {}", crate::ext::fmt::path(&self.prev), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn nonempty_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.fa");
        let full = dir.path().join("full.fa");
        File::create(&empty).unwrap();
        File::create(&full).unwrap().write_all(b">a\nACGT\n").unwrap();
        assert!(!nonempty_file(&empty));
        assert!(nonempty_file(&full));
        assert!(!nonempty_file(&dir.path().join("absent.fa")));
        assert!(!nonempty_file(dir.path()));
        assert!(!wait_for_file(&empty, 3, Duration::ZERO));
        assert!(wait_for_file(&full, 3, Duration::ZERO));
    }

    #[test]
    fn gzip_input() {
        use flate2::{write::GzEncoder, Compression};
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqs.fa.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b">a\nACGT\n").unwrap();
        enc.finish().unwrap();
        let mut s = String::new();
        open(&path).unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, ">a\nACGT\n");
    }

    #[test]
    fn appended_paths() {
        assert_eq!(append_path(Path::new("out/fam.alg"), ".paths"), PathBuf::from("out/fam.alg.paths"));
    }
}
