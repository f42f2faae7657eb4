// SPDX-License-Identifier: AGPL-3.0-or-later
// Part of hipshim — Licensed under AGPL-3.0-or-later.

//! Status adaptation for the HIP runtime and the ROCm math libraries
//! (hipSOLVER, hipSPARSE, hipBLAS), plus a helper that stages a flat table of
//! device pointers for batched kernel launches.
//!
//! Default build is stub-only. Enable `hip-real` for the real FFI path.
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod batch;
pub mod status;

#[cfg(feature = "hip-real")]
pub mod real;

pub use batch::{batch_pointer_table, stage_batch_pointers};
pub use status::{BlasStatus, RuntimeStatus, SolverStatus, SparseStatus, VendorStatus};

/// Which vendor library produced a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorLib {
    Runtime,
    Solver,
    Sparse,
    Blas,
}

impl VendorLib {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorLib::Runtime => "HIP",
            VendorLib::Solver => "hipSOLVER",
            VendorLib::Sparse => "hipSPARSE",
            VendorLib::Blas => "hipBLAS",
        }
    }
}

/// Unified status-result error for everything this crate adapts.
#[derive(Debug, Error)]
pub enum ShimError {
    #[error("HIP not enabled (build with feature 'hip-real')")]
    NotEnabled,
    /// A vendor call returned a non-success status. `detail` is the
    /// human-readable rendering of `code` for `lib`.
    #[error("{file}:{line}: operation {expr} failed: {detail}")]
    Vendor {
        lib: VendorLib,
        code: i32,
        file: &'static str,
        line: u32,
        expr: &'static str,
        detail: String,
    },
    #[error("Other: {0}")]
    Other(String),
}

pub type ShimResult<T> = Result<T, ShimError>;

/// Borrowed HIP stream handle. A null handle denotes the default stream.
#[derive(Debug, Clone, Copy)]
pub struct HipStream(pub *mut c_void);

impl HipStream {
    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn raw(&self) -> *mut c_void {
        self.0
    }
}

impl Default for HipStream {
    fn default() -> Self {
        Self::null()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: u32,
    pub name: Cow<'static, str>,
}

impl DeviceInfo {
    pub fn new<N: Into<Cow<'static, str>>>(id: u32, name: N) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[cfg(not(feature = "hip-real"))]
pub mod stub {
    use super::{hip_env_available, DeviceInfo};

    /// Returns `true` when the process appears to have access to a ROCm
    /// runtime. The stub checks for explicit opt-in via `HIPSHIM_FORCE_HIP`,
    /// then searches common ROCm install locations (`ROCM_PATH` / `HIP_PATH`,
    /// default `/opt/rocm*` directories, library search paths, and `PATH`
    /// entries for `hipcc`).
    pub fn hip_available() -> bool {
        hip_env_available()
    }

    /// Surface a lightweight view of devices hinted through environment
    /// variables so callers can exercise batching paths on machines without
    /// a runtime.
    pub fn device_info() -> Vec<DeviceInfo> {
        super::probe_from_env()
    }
}

#[cfg(not(feature = "hip-real"))]
pub use stub::{device_info, hip_available};

#[cfg(feature = "hip-real")]
pub fn hip_available() -> bool {
    hip_env_available()
}

#[cfg(feature = "hip-real")]
pub fn device_info() -> Vec<DeviceInfo> {
    let devices = collect_env_devices();
    if !devices.is_empty() {
        return devices;
    }
    if !hip_env_available() {
        return devices;
    }

    match crate::real::enumerate_devices() {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!("failed to enumerate HIP devices: {err}");
            Vec::new()
        }
    }
}

fn hip_env_available() -> bool {
    if std::env::var("HIPSHIM_FORCE_HIP")
        .map(|flag| matches!(flag.as_str(), "1" | "true" | "TRUE"))
        .unwrap_or(false)
    {
        return true;
    }

    for root in gather_rocm_roots() {
        if rocm_markers_present(&root) {
            return true;
        }
    }

    for dir in gather_library_search_paths() {
        for library in ["libamdhip64.so", "libhiprtc.so"] {
            if dir.join(library).exists() {
                return true;
            }
        }
    }

    for dir in gather_binary_search_paths() {
        for tool in ["hipcc", "rocminfo"] {
            if dir.join(tool).exists() {
                return true;
            }
        }
    }

    false
}

fn gather_rocm_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for key in ["ROCM_PATH", "ROCM_HOME", "HIP_PATH", "HIP_HOME"] {
        if let Some(path) = std::env::var_os(key) {
            roots.push(PathBuf::from(path));
        }
    }

    for default in ["/opt/rocm", "/usr/local/rocm"] {
        roots.push(PathBuf::from(default));
    }

    if let Ok(entries) = std::fs::read_dir("/opt") {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with("rocm") {
                    roots.push(path);
                }
            }
        }
    }

    roots
}

fn rocm_markers_present(root: &Path) -> bool {
    let lib_dirs = [
        root.join("lib"),
        root.join("lib64"),
        root.join("hip").join("lib"),
    ];
    for dir in lib_dirs {
        if dir.join("libamdhip64.so").exists() || dir.join("libhiprtc.so").exists() {
            return true;
        }
    }

    let bin_dir = root.join("bin");
    ["hipcc", "rocminfo"]
        .iter()
        .any(|tool| bin_dir.join(tool).exists())
}

fn gather_library_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for key in ["LD_LIBRARY_PATH", "LIBRARY_PATH", "ROCM_LIBRARY_PATH"] {
        if let Some(value) = std::env::var_os(key) {
            paths.extend(std::env::split_paths(&value));
        }
    }
    paths
}

fn gather_binary_search_paths() -> Vec<PathBuf> {
    match std::env::var_os("PATH") {
        Some(value) => std::env::split_paths(&value).collect(),
        None => Vec::new(),
    }
}

fn collect_env_devices() -> Vec<DeviceInfo> {
    let mut devices = Vec::new();
    if let Some(list) = std::env::var("ROCM_VISIBLE_DEVICES")
        .ok()
        .or_else(|| std::env::var("HIP_VISIBLE_DEVICES").ok())
    {
        for (slot, token) in list.split(',').enumerate() {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                continue;
            }
            let id = trimmed.parse::<u32>().unwrap_or(slot as u32);
            devices.push(DeviceInfo::new(id, format!("hip-device-{trimmed}")));
        }
    }
    devices
}

#[allow(dead_code)]
fn probe_from_env() -> Vec<DeviceInfo> {
    let mut devices = collect_env_devices();

    if devices.is_empty() && hip_env_available() {
        tracing::debug!("no device hints set; surfacing a synthetic probe device");
        devices.push(DeviceInfo::new(0, Cow::Borrowed("rocm-probe")));
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_force_flag() {
        std::env::remove_var("HIPSHIM_FORCE_HIP");
    }

    fn restore_env(key: &str, previous: Option<std::ffi::OsString>) {
        match previous {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    #[test]
    fn hip_available_when_forced() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let prev = std::env::var_os("HIPSHIM_FORCE_HIP");
        std::env::set_var("HIPSHIM_FORCE_HIP", "1");
        assert!(hip_env_available());
        restore_env("HIPSHIM_FORCE_HIP", prev);
    }

    #[test]
    fn hip_available_via_rocm_path_marker() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_force_flag();
        let prev_rocm = std::env::var_os("ROCM_PATH");

        let temp = tempdir().expect("tempdir");
        let lib_dir = temp.path().join("lib");
        fs::create_dir(&lib_dir).expect("lib dir");
        fs::write(lib_dir.join("libamdhip64.so"), b"").expect("touch lib");

        std::env::set_var("ROCM_PATH", temp.path());
        assert!(hip_env_available());

        restore_env("ROCM_PATH", prev_rocm);
    }

    #[test]
    fn hip_available_via_path_hipcc() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_force_flag();

        let prev_path = std::env::var_os("PATH");
        let temp = tempdir().expect("tempdir");
        let bin_dir = temp.path().join("bin");
        fs::create_dir(&bin_dir).expect("bin dir");
        fs::write(bin_dir.join("hipcc"), b"").expect("touch hipcc");

        let mut paths = vec![bin_dir];
        if let Some(existing) = prev_path.clone() {
            paths.extend(std::env::split_paths(&existing));
        }
        let joined = std::env::join_paths(paths).expect("join paths");
        std::env::set_var("PATH", &joined);

        assert!(hip_env_available());

        restore_env("PATH", prev_path);
    }

    #[test]
    fn visible_devices_hints_are_parsed() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let prev = std::env::var_os("ROCM_VISIBLE_DEVICES");
        std::env::set_var("ROCM_VISIBLE_DEVICES", "0, 2,x");

        let devices = collect_env_devices();
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0], DeviceInfo::new(0, "hip-device-0"));
        assert_eq!(devices[1], DeviceInfo::new(2, "hip-device-2"));
        // Unparsable tokens fall back to their slot index.
        assert_eq!(devices[2], DeviceInfo::new(2, "hip-device-x"));

        restore_env("ROCM_VISIBLE_DEVICES", prev);
    }
}
