// SPDX-License-Identifier: AGPL-3.0-or-later
// Part of hipshim — Licensed under AGPL-3.0-or-later.

//! Staging of a flat device-pointer table for batched kernel launches.
//!
//! Batched vendor routines take an array of device pointers, one per batch
//! element, living in device memory. The batch payloads themselves sit
//! back-to-back in one allocation, so the table is pure stride arithmetic
//! over the base pointer, built on the host and copied up asynchronously.

use crate::ShimResult;
use std::ffi::c_void;

/// Builds the host-side pointer table: entry `i` is `buffer + i * elem_size`.
///
/// No memory is touched; the entries are only meaningful to the device that
/// owns `buffer`. An `elem_size` of 0 is degenerate but well-defined: every
/// entry aliases `buffer`.
pub fn batch_pointer_table(buffer: *mut c_void, batch: usize, elem_size: usize) -> Vec<*mut c_void> {
    let base = buffer.cast::<u8>();
    (0..batch)
        .map(|i| base.wrapping_add(i * elem_size).cast::<c_void>())
        .collect()
}

/// Builds the pointer table for `batch` elements of `elem_size` bytes inside
/// `buffer` and copies it asynchronously to `dev_ptrs` on `stream`.
///
/// Returns the host table. The caller must keep it alive until the stream
/// has consumed the copy; dropping it earlier leaves `hipMemcpyAsync` reading
/// freed memory.
#[cfg(feature = "hip-real")]
pub fn stage_batch_pointers(
    stream: &crate::HipStream,
    buffer: *mut c_void,
    dev_ptrs: *mut c_void,
    batch: usize,
    elem_size: usize,
) -> ShimResult<Vec<*mut c_void>> {
    use crate::real::{hipMemcpyAsync, HIP_MEMCPY_HOST_TO_DEVICE};
    use crate::status::RuntimeStatus;

    let host_ptrs = batch_pointer_table(buffer, batch, elem_size);
    if host_ptrs.is_empty() {
        return Ok(host_ptrs);
    }

    let bytes = host_ptrs.len() * std::mem::size_of::<*mut c_void>();
    crate::hip_check!(RuntimeStatus(unsafe {
        hipMemcpyAsync(
            dev_ptrs,
            host_ptrs.as_ptr().cast::<c_void>(),
            bytes,
            HIP_MEMCPY_HOST_TO_DEVICE,
            stream.raw(),
        )
    }))?;

    Ok(host_ptrs)
}

#[cfg(not(feature = "hip-real"))]
pub fn stage_batch_pointers(
    _stream: &crate::HipStream,
    _buffer: *mut c_void,
    _dev_ptrs: *mut c_void,
    _batch: usize,
    _elem_size: usize,
) -> ShimResult<Vec<*mut c_void>> {
    Err(crate::ShimError::NotEnabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_entries_are_stride_apart() {
        let mut backing = vec![0u8; 4 * 16];
        let base = backing.as_mut_ptr().cast::<c_void>();

        let table = batch_pointer_table(base, 4, 16);
        assert_eq!(table.len(), 4);
        for (i, entry) in table.iter().enumerate() {
            assert_eq!(*entry as usize, base as usize + i * 16);
        }
    }

    #[test]
    fn empty_batch_yields_empty_table() {
        let mut backing = [0u8; 8];
        let base = backing.as_mut_ptr().cast::<c_void>();
        assert!(batch_pointer_table(base, 0, 8).is_empty());
    }

    #[test]
    fn zero_stride_aliases_the_base() {
        let mut backing = [0u8; 8];
        let base = backing.as_mut_ptr().cast::<c_void>();
        let table = batch_pointer_table(base, 3, 0);
        assert!(table.iter().all(|entry| *entry == base));
    }

    #[cfg(not(feature = "hip-real"))]
    #[test]
    fn staging_requires_the_real_path() {
        let stream = crate::HipStream::null();
        let err = stage_batch_pointers(&stream, std::ptr::null_mut(), std::ptr::null_mut(), 1, 8)
            .unwrap_err();
        assert!(matches!(err, crate::ShimError::NotEnabled));
    }
}
