//! Error types for library loading and the checked call surface.

use thiserror::Error;

/// Errors surfaced by the binding.
///
/// Load-time failures (`Load`, `MissingExport`, `InstallDir`) are
/// unrecoverable for the current environment: there is no retry or
/// fallback path. The buffer variants come from the checked call
/// surface only; calls through [`crate::RawApi`] bypass them entirely.
#[derive(Debug, Error)]
pub enum Error {
    /// The shared library could not be loaded: file absent, not on the
    /// platform search path, wrong architecture, or a missing transitive
    /// dependency (e.g. the bundled clFFT library).
    #[error("failed to load native library '{library}': {source}")]
    Load {
        library: String,
        #[source]
        source: libloading::Error,
    },

    /// The library loaded but one of the three expected exports is
    /// missing. No partial handle is returned in this case.
    #[error("export '{symbol}' not found in '{library}': {source}")]
    MissingExport {
        symbol: &'static str,
        library: String,
        #[source]
        source: libloading::Error,
    },

    /// The install-relative dylib path could not be resolved (macOS only).
    #[error("could not resolve the bundled library path: {0}")]
    InstallDir(#[from] std::io::Error),

    /// A buffer passed to the checked surface does not match the shape
    /// of the image volume.
    #[error("{buffer} has shape {got:?}, expected {expected:?}")]
    ShapeMismatch {
        buffer: &'static str,
        expected: [usize; 3],
        got: [usize; 3],
    },

    /// A buffer passed to the checked surface is not contiguous in
    /// standard (row-major) order.
    #[error("{buffer} is not contiguous in standard (C) order")]
    NonContiguous { buffer: &'static str },

    /// A volume dimension does not fit in the 32-bit int the native
    /// signature requires.
    #[error("dimension '{dim}' = {value} does not fit in a 32-bit int")]
    DimensionOverflow { dim: &'static str, value: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_names_both_shapes() {
        let err = Error::ShapeMismatch {
            buffer: "psf",
            expected: [4, 8, 8],
            got: [4, 8, 9],
        };
        let msg = err.to_string();
        assert!(msg.contains("psf"));
        assert!(msg.contains("[4, 8, 8]"));
        assert!(msg.contains("[4, 8, 9]"));
    }

    #[test]
    fn dimension_overflow_names_the_dimension() {
        let err = Error::DimensionOverflow {
            dim: "width",
            value: usize::MAX,
        };
        assert!(err.to_string().contains("width"));
    }
}
