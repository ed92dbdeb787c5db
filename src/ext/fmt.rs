use std::{
    fmt::{self, Display, Debug},
    path::{Path, PathBuf},
    ffi::OsStr,
};

/// Pretty path formatting: replace $HOME with ~, put quotes around if needed.
pub fn path(path: &Path) -> String {
    lazy_static::lazy_static!{
        static ref HOME: Option<PathBuf> = std::env::var_os("HOME").map(|s| PathBuf::from(s));
    }
    if let Some(home) = (*HOME).as_ref() {
        if let Ok(suffix) = path.strip_prefix(home) {
            let tilde_path = Path::new("~").join(suffix);
            let s = tilde_path.to_string_lossy();
            return if s.contains(char::is_whitespace) { format!("'{}'", s) } else { s.into_owned() };
        }
    }
    let s = path.to_string_lossy();
    if s.contains(char::is_whitespace) { format!("'{}'", s) } else { s.into_owned() }
}

/// Converts program and arguments into a string, removing quotes if argument has no whitespace,
/// and replacing HOME with ~.
pub fn command<'a>(program: &'a OsStr, args: impl IntoIterator<Item = &'a OsStr>) -> String {
    std::iter::once(program)
        .chain(args)
        .map(|s| path(Path::new(s)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Current local time, as it appears in tool log headers.
pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S %m/%d/%y").to_string()
}

/// Formats duration as `HH:MM:SS.SSS`.
pub struct Duration(pub std::time::Duration);

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const IN_HOUR: u64 = 3600;
        const IN_MINUTE: u64 = 60;
        let mut seconds = self.0.as_secs();
        write!(f, "{}:", seconds / IN_HOUR)?;
        seconds %= IN_HOUR;
        write!(f, "{:02}:", seconds / IN_MINUTE)?;
        seconds %= IN_MINUTE;
        write!(f, "{:02}.{:03}", seconds, self.0.subsec_millis())?;
        Ok(())
    }
}

impl Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        let d = Duration(std::time::Duration::from_millis(3_723_045));
        assert_eq!(d.to_string(), "1:02:03.045");
        assert_eq!(Duration(std::time::Duration::ZERO).to_string(), "0:00:00.000");
    }

    #[test]
    fn commands() {
        let args = [OsStr::new("-in"), OsStr::new("my seqs.fa"), OsStr::new("-reverse")];
        assert_eq!(command(OsStr::new("readal"), args), "readal -in 'my seqs.fa' -reverse");
    }
}
