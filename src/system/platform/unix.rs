use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::system::error::ProbeError;
use crate::system::source::VolumeUsage;

/// Volume usage via `statvfs(3)`. Free space is what an unprivileged user can allocate.
#[allow(clippy::unnecessary_cast)]
pub fn statvfs_usage(path: &Path) -> Result<VolumeUsage, ProbeError> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| ProbeError::partial("volume usage", e.to_string()))?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    // SAFETY: `c_path` is NUL-terminated and `stat` is a valid out pointer.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(ProbeError::io(
            "volume usage",
            &std::io::Error::last_os_error(),
        ));
    }
    let fragment = stat.f_frsize as u64;
    Ok(VolumeUsage {
        total: (stat.f_blocks as u64).saturating_mul(fragment),
        free: (stat.f_bavail as u64).saturating_mul(fragment),
    })
}
