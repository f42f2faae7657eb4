// SPDX-License-Identifier: AGPL-3.0-or-later
// Part of hipshim — Licensed under AGPL-3.0-or-later.

//! Real HIP runtime bindings, linked against `amdhip64` (see build.rs).

use crate::status::RuntimeStatus;
use crate::{DeviceInfo, HipStream, ShimResult};
use std::ffi::{c_char, c_void, CStr};

pub(crate) const HIP_MEMCPY_HOST_TO_DEVICE: i32 = 1;

#[allow(non_snake_case)]
extern "C" {
    fn hipGetErrorString(error: i32) -> *const c_char;
    fn hipGetDeviceCount(count: *mut i32) -> i32;
    fn hipStreamSynchronize(stream: *mut c_void) -> i32;
    pub(crate) fn hipMemcpyAsync(
        dst: *mut c_void,
        src: *const c_void,
        size_bytes: usize,
        kind: i32,
        stream: *mut c_void,
    ) -> i32;
}

/// Asks the runtime for its rendering of `status`. Returns `None` when the
/// runtime has no string for the code, letting the caller fall back to the
/// local table.
pub(crate) fn runtime_error_string(status: RuntimeStatus) -> Option<String> {
    let ptr = unsafe { hipGetErrorString(status.0) };
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Enumerates devices through `hipGetDeviceCount`. Names are synthesized
/// from ordinals; the runtime's device-properties query is out of scope here.
pub fn enumerate_devices() -> ShimResult<Vec<DeviceInfo>> {
    let mut count: i32 = 0;
    crate::hip_check!(RuntimeStatus(unsafe { hipGetDeviceCount(&mut count) }))?;

    let count = count.max(0) as u32;
    tracing::debug!("HIP runtime reports {count} device(s)");
    Ok((0..count)
        .map(|id| DeviceInfo::new(id, format!("hip-device-{id}")))
        .collect())
}

impl HipStream {
    /// Blocks until all work queued on the stream has completed. Staged
    /// batch-pointer tables may be dropped once this returns.
    pub fn synchronize(&self) -> ShimResult<()> {
        crate::hip_check!(RuntimeStatus(unsafe { hipStreamSynchronize(self.0) }))
    }
}
