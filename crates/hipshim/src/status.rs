// SPDX-License-Identifier: AGPL-3.0-or-later
// Part of hipshim — Licensed under AGPL-3.0-or-later.

//! Vendor status codes and their conversion into the unified [`ShimResult`].
//!
//! Each vendor call returns a raw `i32` over the FFI boundary. The newtypes
//! here give those codes a home, render them as human-readable text, and the
//! [`hip_check!`] macro annotates failures with the call site and the failing
//! expression.

use crate::{ShimError, ShimResult, VendorLib};

/// Common surface of the four vendor status types.
pub trait VendorStatus: Copy {
    fn lib(self) -> VendorLib;
    fn code(self) -> i32;
    fn describe(self) -> String;

    /// All four vendor enums reserve 0 for success.
    fn is_success(self) -> bool {
        self.code() == 0
    }

    /// Maps success to `Ok(())` and anything else to a [`ShimError::Vendor`]
    /// annotated with the call site and failing expression.
    fn into_result(self, file: &'static str, line: u32, expr: &'static str) -> ShimResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(ShimError::Vendor {
                lib: self.lib(),
                code: self.code(),
                file,
                line,
                expr,
                detail: self.describe(),
            })
        }
    }
}

/// Converts a vendor status expression into a [`ShimResult`], capturing the
/// call site and the expression text for the error message. Combine with `?`:
///
/// ```ignore
/// hip_check!(RuntimeStatus(unsafe { hipMemcpyAsync(dst, src, n, kind, stream) }))?;
/// ```
#[macro_export]
macro_rules! hip_check {
    ($status:expr) => {
        $crate::status::VendorStatus::into_result($status, file!(), line!(), stringify!($status))
    };
}

/// A `hipError_t` from the HIP runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct RuntimeStatus(pub i32);

impl RuntimeStatus {
    pub const SUCCESS: Self = Self(0);
    pub const INVALID_VALUE: Self = Self(1);
    pub const OUT_OF_MEMORY: Self = Self(2);
    pub const NOT_INITIALIZED: Self = Self(3);
    pub const DEINITIALIZED: Self = Self(4);
    pub const NO_DEVICE: Self = Self(100);
    pub const INVALID_DEVICE: Self = Self(101);
    pub const ILLEGAL_ADDRESS: Self = Self(700);
    pub const LAUNCH_TIMEOUT: Self = Self(702);
    pub const LAUNCH_FAILURE: Self = Self(719);
    pub const NOT_SUPPORTED: Self = Self(801);

    /// Local rendering of the common runtime codes, used by stub builds and
    /// as the fallback when the runtime returns no string.
    pub(crate) fn fallback_describe(self) -> String {
        match self {
            Self::SUCCESS => "HIP success".to_string(),
            Self::INVALID_VALUE => "HIP invalid value error".to_string(),
            Self::OUT_OF_MEMORY => "HIP out of memory".to_string(),
            Self::NOT_INITIALIZED => "HIP runtime has not been initialized".to_string(),
            Self::DEINITIALIZED => "HIP runtime has been deinitialized".to_string(),
            Self::NO_DEVICE => "HIP no device available".to_string(),
            Self::INVALID_DEVICE => "HIP invalid device ordinal".to_string(),
            Self::ILLEGAL_ADDRESS => "HIP illegal memory address".to_string(),
            Self::LAUNCH_TIMEOUT => "HIP kernel launch timed out".to_string(),
            Self::LAUNCH_FAILURE => "HIP kernel launch failed".to_string(),
            Self::NOT_SUPPORTED => "HIP operation not supported".to_string(),
            other => format!("unknown HIP error: {}", other.0),
        }
    }
}

impl VendorStatus for RuntimeStatus {
    fn lib(self) -> VendorLib {
        VendorLib::Runtime
    }

    fn code(self) -> i32 {
        self.0
    }

    fn describe(self) -> String {
        #[cfg(feature = "hip-real")]
        if let Some(text) = crate::real::runtime_error_string(self) {
            return text;
        }
        self.fallback_describe()
    }
}

/// A `hipsolverStatus_t` from hipSOLVER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SolverStatus(pub i32);

impl SolverStatus {
    pub const SUCCESS: Self = Self(0);
    pub const NOT_INITIALIZED: Self = Self(1);
    pub const ALLOC_FAILED: Self = Self(2);
    pub const INVALID_VALUE: Self = Self(3);
    pub const MAPPING_ERROR: Self = Self(4);
    pub const EXECUTION_FAILED: Self = Self(5);
    pub const INTERNAL_ERROR: Self = Self(6);
    pub const NOT_SUPPORTED: Self = Self(7);
    pub const ARCH_MISMATCH: Self = Self(8);
    pub const HANDLE_IS_NULLPTR: Self = Self(9);
    pub const INVALID_ENUM: Self = Self(10);
}

impl VendorStatus for SolverStatus {
    fn lib(self) -> VendorLib {
        VendorLib::Solver
    }

    fn code(self) -> i32 {
        self.0
    }

    fn describe(self) -> String {
        match self {
            Self::SUCCESS => "hipSOLVER success".to_string(),
            Self::NOT_INITIALIZED => "hipSOLVER has not been initialized".to_string(),
            Self::ALLOC_FAILED => "hipSOLVER allocation failed".to_string(),
            Self::INVALID_VALUE => "hipSOLVER invalid value error".to_string(),
            Self::MAPPING_ERROR => "hipSOLVER mapping error".to_string(),
            Self::EXECUTION_FAILED => "hipSOLVER execution failed".to_string(),
            Self::INTERNAL_ERROR => "hipSOLVER internal error".to_string(),
            Self::NOT_SUPPORTED => "hipSOLVER not supported error".to_string(),
            Self::ARCH_MISMATCH => "hipSOLVER architecture mismatch error".to_string(),
            Self::HANDLE_IS_NULLPTR => "hipSOLVER null pointer handle error".to_string(),
            Self::INVALID_ENUM => "hipSOLVER unsupported enum value error".to_string(),
            other => format!("unknown hipSOLVER error: {}", other.0),
        }
    }
}

/// A `hipsparseStatus_t` from hipSPARSE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SparseStatus(pub i32);

impl SparseStatus {
    pub const SUCCESS: Self = Self(0);
    pub const NOT_INITIALIZED: Self = Self(1);
    pub const ALLOC_FAILED: Self = Self(2);
    pub const INVALID_VALUE: Self = Self(3);
    pub const ARCH_MISMATCH: Self = Self(4);
    pub const MAPPING_ERROR: Self = Self(5);
    pub const EXECUTION_FAILED: Self = Self(6);
    pub const INTERNAL_ERROR: Self = Self(7);
    pub const MATRIX_TYPE_NOT_SUPPORTED: Self = Self(8);
    pub const ZERO_PIVOT: Self = Self(9);
    pub const NOT_SUPPORTED: Self = Self(10);
    pub const INSUFFICIENT_RESOURCES: Self = Self(11);
}

impl VendorStatus for SparseStatus {
    fn lib(self) -> VendorLib {
        VendorLib::Sparse
    }

    fn code(self) -> i32 {
        self.0
    }

    fn describe(self) -> String {
        match self {
            Self::SUCCESS => "hipSPARSE success".to_string(),
            Self::NOT_INITIALIZED => "hipSPARSE has not been initialized".to_string(),
            Self::ALLOC_FAILED => "hipSPARSE allocation failed".to_string(),
            Self::INVALID_VALUE => "hipSPARSE invalid value error".to_string(),
            Self::ARCH_MISMATCH => "hipSPARSE architecture mismatch error".to_string(),
            Self::MAPPING_ERROR => "hipSPARSE mapping error".to_string(),
            Self::EXECUTION_FAILED => "hipSPARSE execution failed".to_string(),
            Self::INTERNAL_ERROR => "hipSPARSE internal error".to_string(),
            Self::MATRIX_TYPE_NOT_SUPPORTED => {
                "hipSPARSE matrix type not supported error".to_string()
            }
            Self::ZERO_PIVOT => "hipSPARSE zero pivot error".to_string(),
            Self::NOT_SUPPORTED => "hipSPARSE not supported error".to_string(),
            Self::INSUFFICIENT_RESOURCES => "hipSPARSE insufficient resources error".to_string(),
            other => format!("unknown hipSPARSE error: {}", other.0),
        }
    }
}

/// A `hipblasStatus_t` from hipBLAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct BlasStatus(pub i32);

impl BlasStatus {
    pub const SUCCESS: Self = Self(0);
    pub const NOT_INITIALIZED: Self = Self(1);
    pub const ALLOC_FAILED: Self = Self(2);
    pub const INVALID_VALUE: Self = Self(3);
    pub const MAPPING_ERROR: Self = Self(4);
    pub const EXECUTION_FAILED: Self = Self(5);
    pub const INTERNAL_ERROR: Self = Self(6);
    pub const NOT_SUPPORTED: Self = Self(7);
    pub const ARCH_MISMATCH: Self = Self(8);
    pub const HANDLE_IS_NULLPTR: Self = Self(9);
    pub const INVALID_ENUM: Self = Self(10);
}

impl VendorStatus for BlasStatus {
    fn lib(self) -> VendorLib {
        VendorLib::Blas
    }

    fn code(self) -> i32 {
        self.0
    }

    fn describe(self) -> String {
        match self {
            Self::SUCCESS => "hipBLAS success".to_string(),
            Self::NOT_INITIALIZED => "hipBLAS has not been initialized".to_string(),
            Self::ALLOC_FAILED => "hipBLAS resource allocation failed".to_string(),
            Self::INVALID_VALUE => "hipBLAS invalid value error".to_string(),
            Self::MAPPING_ERROR => "hipBLAS mapping error".to_string(),
            Self::EXECUTION_FAILED => "hipBLAS execution failed".to_string(),
            Self::INTERNAL_ERROR => "hipBLAS internal error".to_string(),
            Self::NOT_SUPPORTED => "hipBLAS not supported error".to_string(),
            Self::ARCH_MISMATCH => "hipBLAS architecture mismatch error".to_string(),
            Self::HANDLE_IS_NULLPTR => "hipBLAS null pointer handle error".to_string(),
            Self::INVALID_ENUM => "hipBLAS unsupported enum value error".to_string(),
            other => format!("unknown hipBLAS error: {}", other.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hip_check;

    #[test]
    fn success_codes_convert_to_ok() {
        assert!(hip_check!(RuntimeStatus::SUCCESS).is_ok());
        assert!(hip_check!(SolverStatus::SUCCESS).is_ok());
        assert!(hip_check!(SparseStatus::SUCCESS).is_ok());
        assert!(hip_check!(BlasStatus::SUCCESS).is_ok());
    }

    #[test]
    fn failure_carries_call_site_and_expression() {
        let err = hip_check!(BlasStatus::EXECUTION_FAILED).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("status.rs"));
        assert!(message.contains("operation BlasStatus::EXECUTION_FAILED failed"));
        assert!(message.contains("hipBLAS execution failed"));

        match err {
            ShimError::Vendor { lib, code, .. } => {
                assert_eq!(lib, VendorLib::Blas);
                assert_eq!(code, BlasStatus::EXECUTION_FAILED.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn known_codes_render_vendor_text() {
        assert_eq!(
            SparseStatus::ZERO_PIVOT.describe(),
            "hipSPARSE zero pivot error"
        );
        assert_eq!(
            SolverStatus::HANDLE_IS_NULLPTR.describe(),
            "hipSOLVER null pointer handle error"
        );
        assert_eq!(
            BlasStatus::NOT_INITIALIZED.describe(),
            "hipBLAS has not been initialized"
        );
        assert_eq!(
            RuntimeStatus::OUT_OF_MEMORY.fallback_describe(),
            "HIP out of memory"
        );
    }

    #[test]
    fn unknown_codes_render_fallback_text() {
        assert_eq!(SparseStatus(999).describe(), "unknown hipSPARSE error: 999");
        assert_eq!(SolverStatus(-1).describe(), "unknown hipSOLVER error: -1");
        assert_eq!(BlasStatus(42).describe(), "unknown hipBLAS error: 42");
        assert_eq!(
            RuntimeStatus(12345).fallback_describe(),
            "unknown HIP error: 12345"
        );
    }

    #[test]
    fn describe_is_total_on_success() {
        // Callers sometimes log the status of an operation that succeeded;
        // success codes must render text rather than fail.
        assert_eq!(SparseStatus::SUCCESS.describe(), "hipSPARSE success");
        assert_eq!(BlasStatus::SUCCESS.describe(), "hipBLAS success");
    }
}
