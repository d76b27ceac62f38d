//! Rust bindings for clij2-fft, a GPU-accelerated FFT deconvolution
//! library built on OpenCL and clFFT.
//!
//! All of the heavy lifting - iterative Richardson-Lucy and
//! total-variation deconvolution, FFT planning, OpenCL buffer
//! management, the convolution kernels - lives in the precompiled
//! native library. This crate is the glue: it resolves the
//! platform-specific binary, loads it, declares the exact C signatures
//! of the three exports, and hands back a callable handle.
//!
//! # Loading policy
//!
//! - POSIX, non-Apple: `libclij2fft.so` by logical name from the
//!   system library search path.
//! - macOS: `libclij2fft.dylib` from `../lib/macosx/` relative to the
//!   install directory.
//! - Anything else (assumed Windows): `clij2fft.dll` via the standard
//!   DLL search path.
//!
//! On POSIX the library is opened with `RTLD_NOW | RTLD_GLOBAL` so its
//! internal symbol resolution against the bundled clFFT dependency
//! succeeds. Global visibility is a process-wide effect: the library's
//! symbols become visible to anything loaded later in the same process.
//!
//! # Example
//!
//! ```no_run
//! use ndarray::Array3;
//!
//! # fn main() -> Result<(), clij2fft::Error> {
//! let lib = clij2fft::get()?;
//!
//! let image = Array3::<f32>::zeros((64, 128, 128));
//! let psf = Array3::<f32>::zeros((64, 128, 128));
//! let mut estimate = image.clone();
//! let mut normal = Array3::<f32>::zeros(image.dim());
//!
//! lib.deconv3d_tv(
//!     100,
//!     0.002,
//!     image.view(),
//!     psf.view(),
//!     estimate.view_mut(),
//!     normal.view_mut(),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # Caveat: the raw surface
//!
//! The checked methods on [`Clij2Fft`] verify shape agreement and
//! contiguity before calling through. The raw pointers behind
//! [`Clij2Fft::raw`] do not: the native side trusts the dimension
//! arguments completely, and a buffer whose real shape disagrees with
//! them corrupts memory or crashes rather than raising an error. That
//! contract is inherited from the native API and cannot be enforced
//! from this side of the boundary.

mod bindings;
mod error;
mod loader;
mod platform;

pub use bindings::{
    descriptor, ConvCorr3dFn, Deconv3dFn, Deconv3dTvFn, FunctionDescriptor, ParamType,
    CONVCORR3D_32F, DECONV3D_32F, DECONV3D_32F_TV, DESCRIPTORS,
};
pub use error::Error;
pub use loader::{get, Clij2Fft, RawApi};
pub use platform::{LibraryLocation, Platform};
