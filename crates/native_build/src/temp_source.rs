use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::io::FromRawFd;
use std::path::{Path, PathBuf};

use errno::errno;
use tracing::{debug, warn};

use crate::BuildError;

const SUFFIX: &str = ".c";

/// A uniquely-named C source file in the system's temporary directory, created by `mkstemps(3)`.
///
/// The file is automatically deleted when the value is dropped.
pub struct TempSource {
    path: PathBuf,
    file: File,
}

impl TempSource {
    /// Creates an empty file named `<prefix>-XXXXXX.c`.
    pub fn create(prefix: &str) -> crate::Result<Self> {
        let template = std::env::temp_dir().join(format!("{}-XXXXXX{}", prefix, SUFFIX));
        if template.as_os_str().as_bytes().contains(&0) {
            return Err(BuildError::InvalidPath(template));
        }

        let mut template = template.into_os_string().into_vec();
        template.push(0);

        let fd = unsafe {
            libc::mkstemps(
                template.as_mut_ptr() as *mut libc::c_char,
                SUFFIX.len() as libc::c_int,
            )
        };
        if fd < 0 {
            return Err(BuildError::TempFile(errno()));
        }

        // mkstemps filled in the X's; drop the NUL again.
        template.pop();
        let path = PathBuf::from(OsString::from_vec(template));
        let file = unsafe { File::from_raw_fd(fd) };

        debug!(path = %path.display(), "created temporary source file");
        Ok(TempSource { path, file })
    }

    /// Replaces the contents of the file with `source`.
    pub fn write_source(&mut self, source: &str) -> crate::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(source.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempSource {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), %err, "could not remove temporary source file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_unique_c_files() {
        let a = TempSource::create("fudge-test").unwrap();
        let b = TempSource::create("fudge-test").unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(a.path().extension().and_then(|e| e.to_str()), Some("c"));
        assert!(a.path().exists());
    }

    #[test]
    fn writes_source() {
        let mut file = TempSource::create("fudge-test-write").unwrap();
        file.write_source("int main(void) { return 0; }\n").unwrap();
        file.write_source("int main(void) { return 1; }\n").unwrap();

        let text = fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "int main(void) { return 1; }\n");
    }

    #[test]
    fn removed_on_drop() {
        let file = TempSource::create("fudge-test-drop").unwrap();
        let path = file.path().to_owned();
        drop(file);

        assert!(!path.exists());
    }
}
