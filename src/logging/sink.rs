// backend_common/src/logging/sink.rs
//
// Output destinations for log lines

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// A destination a level writes whole lines to
///
/// Clones refer to the same underlying handle, so several levels can share
/// one file.
#[derive(Clone)]
pub enum Sink {
    Stdout,
    Stderr,
    File(Arc<Mutex<File>>),
    Writer(SharedWriter),
}

impl Sink {
    /// Open `path` for appending, creating it if absent
    pub fn open_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        let file = options.open(path)?;
        Ok(Sink::File(Arc::new(Mutex::new(file))))
    }

    /// Wrap an arbitrary writer
    pub fn writer<W: Write + Send + 'static>(writer: W) -> Self {
        Sink::Writer(Arc::new(Mutex::new(Box::new(writer))))
    }

    /// Write one complete line and flush it
    ///
    /// Errors are returned to the caller, which is expected to drop them.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        match self {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            Sink::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(line.as_bytes())?;
                err.flush()
            }
            Sink::File(file) => {
                let mut file = lock(file);
                file.write_all(line.as_bytes())?;
                file.flush()
            }
            Sink::Writer(writer) => {
                let mut writer = lock(writer);
                writer.write_all(line.as_bytes())?;
                writer.flush()
            }
        }
    }

    /// Whether two sinks write to the same handle
    pub fn same_as(&self, other: &Sink) -> bool {
        match (self, other) {
            (Sink::Stdout, Sink::Stdout) | (Sink::Stderr, Sink::Stderr) => true,
            (Sink::File(a), Sink::File(b)) => Arc::ptr_eq(a, b),
            (Sink::Writer(a), Sink::Writer(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// A panic in another writer must not silence logging
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Stdout => f.write_str("Stdout"),
            Sink::Stderr => f.write_str("Stderr"),
            Sink::File(_) => f.write_str("File"),
            Sink::Writer(_) => f.write_str("Writer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "existing\n").unwrap();

        let sink = Sink::open_file(&path).unwrap();
        sink.write_line("first\n").unwrap();
        sink.clone().write_line("second\n").unwrap();

        let mut content = String::new();
        File::open(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "existing\nfirst\nsecond\n");
    }

    #[test]
    fn test_open_file_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.log");
        Sink::open_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_file_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/app.log");
        assert!(Sink::open_file(&path).is_err());
    }

    #[test]
    fn test_same_as() {
        let dir = tempfile::tempdir().unwrap();
        let a = Sink::open_file(dir.path().join("a.log")).unwrap();
        let b = Sink::open_file(dir.path().join("a.log")).unwrap();
        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
        assert!(Sink::Stdout.same_as(&Sink::Stdout));
        assert!(!Sink::Stdout.same_as(&Sink::Stderr));
    }
}
