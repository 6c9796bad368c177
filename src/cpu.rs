//! CPU-feature probe (C1).
//!
//! Detects available SIMD lanes once at process start and publishes an
//! immutable capability set. Consumers in [`crate::simd`] select the
//! highest-supported lane width; a scalar fallback always exists, and
//! detection failure (an unrecognized platform) silently degrades to
//! scalar rather than aborting.

#[cfg(feature = "std")]
use std::sync::OnceLock;

/// Immutable SIMD capability bits for the running CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuFeatures {
    /// 128-bit integer lanes (SSE2 on x86_64, always true since it's part
    /// of the x86_64 baseline; NEON on aarch64).
    pub lanes_128: bool,
    /// 256-bit integer lanes (AVX2 on x86_64).
    pub lanes_256: bool,
    /// 512-bit integer lanes with byte-granularity compares (AVX-512BW).
    pub lanes_512: bool,
}

impl CpuFeatures {
    /// The widest lane width this CPU supports, in bits (128 is the
    /// universal floor: every supported target has at least SSE2 or
    /// NEON, and the scalar fallback is always correct regardless).
    pub fn max_lane_width(&self) -> u32 {
        if self.lanes_512 {
            512
        } else if self.lanes_256 {
            256
        } else if self.lanes_128 {
            128
        } else {
            0
        }
    }

    fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                lanes_128: is_x86_feature_detected!("sse2"),
                lanes_256: is_x86_feature_detected!("avx2"),
                lanes_512: is_x86_feature_detected!("avx512bw"),
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            Self { lanes_128: std::arch::is_aarch64_feature_detected!("neon"), lanes_256: false, lanes_512: false }
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            // Unrecognized platform: fall back to scalar, never abort.
            Self { lanes_128: false, lanes_256: false, lanes_512: false }
        }
    }
}

#[cfg(feature = "std")]
static FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// Returns the process-wide capability set, probing the CPU on first call
/// and caching the result for the remainder of the process's lifetime.
#[cfg(feature = "std")]
pub fn features() -> CpuFeatures {
    *FEATURES.get_or_init(CpuFeatures::detect)
}

/// `no_std` fallback: re-probes every call (no global cache is available
/// without `std::sync::OnceLock`). Detection itself is still cheap.
#[cfg(not(feature = "std"))]
pub fn features() -> CpuFeatures {
    CpuFeatures::detect()
}
