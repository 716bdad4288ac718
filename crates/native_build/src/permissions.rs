use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use errno::errno;
use tracing::debug;

use crate::BuildError;

/// `rwxr-xr-x`
const EXECUTABLE_MODE: libc::mode_t = 0o755;

/// Marks the file at `path` as readable and executable by everyone, writable by its owner.
pub fn make_executable(path: &Path) -> crate::Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| BuildError::InvalidPath(path.to_owned()))?;

    unsafe {
        if libc::chmod(c_path.as_ptr(), EXECUTABLE_MODE) < 0 {
            return Err(BuildError::Permissions {
                path: path.to_owned(),
                errno: errno(),
            });
        }
    }

    debug!(path = %path.display(), "marked executable");
    Ok(())
}
