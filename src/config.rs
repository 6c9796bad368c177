//! Parse configuration.
//!
//! Plain public-field struct with a `Default` impl, matching the base
//! crate's [`crate::Config`]-style configuration (no external config-file
//! parsing, no builder macro).

/// NUMA placement hint threaded through the parallel parser.
///
/// This crate never performs real NUMA syscalls (the C++ original's NUMA
/// allocator module is an empty stub); the enum exists so that callers who
/// do their own NUMA-aware allocation upstream have somewhere to record the
/// intent, and so the parallel driver's API matches the specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumaBinding {
    /// No NUMA awareness; the default allocator is used everywhere.
    #[default]
    None,
    /// Bind each worker's arena to the node it runs on.
    Local,
    /// Rotate page placement round-robin across nodes.
    Interleaved,
}

/// Configuration accepted by [`crate::parse_with`].
///
/// Unknown/invalid combinations are not possible (there is no text-based
/// config format to fail closed against); individual fields are validated
/// structurally by their type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseConfig {
    /// Maximum recursive nesting depth for objects/arrays. Default 1000.
    pub max_depth: usize,
    /// Maximum length (bytes) of a single decoded string. Default 1 GiB.
    pub max_string_length: usize,
    /// Minimum input size (bytes) before the parallel path is considered.
    /// Default 64 KiB (see DESIGN.md for why this deviates from the C++
    /// original's benchmark-only default of 100 bytes).
    pub parallel_threshold: usize,
    /// Worker thread count for the parallel parser. 0 = one per hardware
    /// thread.
    pub worker_count: usize,
    /// Whether SIMD-accelerated primitives may be used at all (a scalar
    /// fallback is always available).
    pub simd_enabled: bool,
    /// NUMA placement hint (see [`NumaBinding`]).
    pub numa_binding: NumaBinding,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_string_length: 1 << 30,
            parallel_threshold: 64 * 1024,
            worker_count: 0,
            simd_enabled: true,
            numa_binding: NumaBinding::None,
        }
    }
}

impl ParseConfig {
    /// A configuration that disables the parallel path entirely, used by
    /// the sequential/parallel-equivalence property tests.
    pub fn sequential_only() -> Self {
        Self { parallel_threshold: usize::MAX, ..Self::default() }
    }

    /// A configuration that forces the parallel path for any non-empty
    /// top-level array.
    pub fn force_parallel(worker_count: usize) -> Self {
        Self { parallel_threshold: 0, worker_count, ..Self::default() }
    }
}
