//! Loading of the native clij2fft library and the callable handle.

use libloading::{Library, Symbol};
use ndarray::{ArrayView3, ArrayViewMut3};
use once_cell::sync::OnceCell;
use std::os::raw::c_int;

use crate::bindings::{
    ConvCorr3dFn, Deconv3dFn, Deconv3dTvFn, CONVCORR3D_32F, DECONV3D_32F, DECONV3D_32F_TV,
};
use crate::error::Error;
use crate::platform::{LibraryLocation, Platform};

static HANDLE: OnceCell<Clij2Fft> = OnceCell::new();

/// Load the native library (once per process) and return the shared
/// handle.
///
/// The first successful load is cached for the lifetime of the process;
/// later calls return the same handle without touching the platform
/// loader again. A failed load leaves the cache empty, so a later call
/// retries after the environment is fixed.
pub fn get() -> Result<&'static Clij2Fft, Error> {
    HANDLE.get_or_try_init(Clij2Fft::load)
}

/// The three resolved entry points, exactly as exported.
///
/// Calls through these pointers are the unchecked pass-through
/// contract: the native side trusts the dimension arguments and assumes
/// every buffer is a contiguous float32 volume of the declared size. A
/// mismatch is undefined behavior, not a catchable error.
#[derive(Clone, Copy)]
pub struct RawApi {
    pub deconv3d_32f: Deconv3dFn,
    pub deconv3d_32f_tv: Deconv3dTvFn,
    pub convcorr3d_32f: ConvCorr3dFn,
}

/// Immutable handle over the loaded native library.
///
/// Construction resolves the platform's library location, loads the
/// binary (with global symbol visibility on POSIX), and resolves all
/// three exports. Any failure aborts construction; no partial handle is
/// ever returned.
pub struct Clij2Fft {
    raw: RawApi,
    location: String,
    // Keeps the function pointers in `raw` valid. Never unloaded.
    _library: Library,
}

impl Clij2Fft {
    /// Load the platform's clij2fft binary and resolve its exports.
    ///
    /// Most callers want [`get`] instead, which caches the handle
    /// process-wide. Loading an already-loaded library again is
    /// permitted by every supported platform loader and yields an
    /// independent handle over the same mapping.
    pub fn load() -> Result<Self, Error> {
        let location = Platform::current().location()?;
        let library = open_global(&location).map_err(|source| Error::Load {
            library: location.to_string(),
            source,
        })?;

        let raw = RawApi {
            deconv3d_32f: resolve::<Deconv3dFn>(&library, &location, DECONV3D_32F)?,
            deconv3d_32f_tv: resolve::<Deconv3dTvFn>(&library, &location, DECONV3D_32F_TV)?,
            convcorr3d_32f: resolve::<ConvCorr3dFn>(&library, &location, CONVCORR3D_32F)?,
        };

        Ok(Self {
            raw,
            location: location.to_string(),
            _library: library,
        })
    }

    /// The name or path the library was loaded from.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The raw entry points, for callers that need the unchecked
    /// pass-through contract.
    pub fn raw(&self) -> RawApi {
        self.raw
    }

    /// Richardson-Lucy deconvolution.
    ///
    /// All four buffers must share one shape and be contiguous in
    /// standard (row-major) order. `estimate` holds the current guess on
    /// entry and the deconvolved result on exit; `normal` is a
    /// normalization buffer the native side writes into. Returns the
    /// native status code.
    pub fn deconv3d(
        &self,
        iterations: i32,
        image: ArrayView3<f32>,
        psf: ArrayView3<f32>,
        mut estimate: ArrayViewMut3<f32>,
        mut normal: ArrayViewMut3<f32>,
    ) -> Result<i32, Error> {
        let shape = image.dim();
        let [n0, n1, n2] = c_dims(shape)?;
        let image_ptr = input_ptr("image", &image, shape)?;
        let psf_ptr = input_ptr("psf", &psf, shape)?;
        let estimate_ptr = output_ptr("estimate", &mut estimate, shape)?;
        let normal_ptr = output_ptr("normal", &mut normal, shape)?;

        // Safety: all four buffers are contiguous float32 volumes of the
        // declared shape; the native side reads image/psf and writes
        // estimate/normal.
        let status = unsafe {
            (self.raw.deconv3d_32f)(
                iterations,
                n0,
                n1,
                n2,
                image_ptr,
                psf_ptr,
                estimate_ptr,
                normal_ptr,
            )
        };
        Ok(status)
    }

    /// Total-variation-regularized Richardson-Lucy deconvolution.
    ///
    /// Same buffer contract as [`deconv3d`](Self::deconv3d), with a
    /// regularization weight controlling the TV term. Zero iterations is
    /// in-contract and leaves the estimate (near-)unchanged.
    pub fn deconv3d_tv(
        &self,
        iterations: i32,
        regularization: f32,
        image: ArrayView3<f32>,
        psf: ArrayView3<f32>,
        mut estimate: ArrayViewMut3<f32>,
        mut normal: ArrayViewMut3<f32>,
    ) -> Result<i32, Error> {
        let shape = image.dim();
        let [n0, n1, n2] = c_dims(shape)?;
        let image_ptr = input_ptr("image", &image, shape)?;
        let psf_ptr = input_ptr("psf", &psf, shape)?;
        let estimate_ptr = output_ptr("estimate", &mut estimate, shape)?;
        let normal_ptr = output_ptr("normal", &mut normal, shape)?;

        // Safety: as for deconv3d.
        let status = unsafe {
            (self.raw.deconv3d_32f_tv)(
                iterations,
                regularization,
                n0,
                n1,
                n2,
                image_ptr,
                psf_ptr,
                estimate_ptr,
                normal_ptr,
            )
        };
        Ok(status)
    }

    /// FFT convolution (`correlate = false`) or correlation
    /// (`correlate = true`) of `input` with `kernel`, written into
    /// `output`. The kernel buffer has the same shape as the input; a
    /// smaller kernel must be embedded by the caller.
    pub fn convcorr3d(
        &self,
        input: ArrayView3<f32>,
        kernel: ArrayView3<f32>,
        mut output: ArrayViewMut3<f32>,
        correlate: bool,
    ) -> Result<i32, Error> {
        let shape = input.dim();
        let [n0, n1, n2] = c_dims(shape)?;
        let input_p = input_ptr("input", &input, shape)?;
        let kernel_p = input_ptr("kernel", &kernel, shape)?;
        let output_p = output_ptr("output", &mut output, shape)?;

        // Safety: all three buffers are contiguous float32 volumes of
        // the declared shape.
        let status =
            unsafe { (self.raw.convcorr3d_32f)(n0, n1, n2, input_p, kernel_p, output_p, correlate) };
        Ok(status)
    }
}

/// Open the library with global symbol visibility so its own lookups
/// against the bundled clFFT dependency resolve. This is a deliberate
/// process-wide effect: symbols become visible to libraries loaded
/// later.
#[cfg(unix)]
fn open_global(location: &LibraryLocation) -> Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as PosixLibrary, RTLD_GLOBAL, RTLD_NOW};

    let flags = RTLD_NOW | RTLD_GLOBAL;
    let library = match location {
        LibraryLocation::Name(name) => unsafe { PosixLibrary::open(Some(*name), flags)? },
        LibraryLocation::Path(path) => unsafe { PosixLibrary::open(Some(path.as_os_str()), flags)? },
    };
    Ok(library.into())
}

/// Windows has no RTLD_GLOBAL equivalent; the default DLL search path
/// finds clFFT.dll next to clij2fft.dll.
#[cfg(not(unix))]
fn open_global(location: &LibraryLocation) -> Result<Library, libloading::Error> {
    match location {
        LibraryLocation::Name(name) => unsafe { Library::new(name) },
        LibraryLocation::Path(path) => unsafe { Library::new(path) },
    }
}

fn resolve<T: Copy>(
    library: &Library,
    location: &LibraryLocation,
    symbol: &'static str,
) -> Result<T, Error> {
    // Safety: the pointer type T is declared in `bindings` to match the
    // compiled export exactly.
    let sym: Symbol<'_, T> = unsafe {
        library.get(symbol.as_bytes()).map_err(|source| Error::MissingExport {
            symbol,
            library: location.to_string(),
            source,
        })?
    };
    Ok(*sym)
}

/// Map a row-major volume shape to the native dimension arguments,
/// fastest-varying first: (depth, height, width) -> [width, height, depth].
fn c_dims(shape: (usize, usize, usize)) -> Result<[c_int; 3], Error> {
    let (depth, height, width) = shape;
    Ok([
        dim_i32("width", width)?,
        dim_i32("height", height)?,
        dim_i32("depth", depth)?,
    ])
}

fn dim_i32(dim: &'static str, value: usize) -> Result<c_int, Error> {
    c_int::try_from(value).map_err(|_| Error::DimensionOverflow { dim, value })
}

fn input_ptr(
    name: &'static str,
    view: &ArrayView3<f32>,
    shape: (usize, usize, usize),
) -> Result<*const f32, Error> {
    if view.dim() != shape {
        return Err(shape_mismatch(name, shape, view.dim()));
    }
    view.as_slice()
        .map(<[f32]>::as_ptr)
        .ok_or(Error::NonContiguous { buffer: name })
}

fn output_ptr(
    name: &'static str,
    view: &mut ArrayViewMut3<f32>,
    shape: (usize, usize, usize),
) -> Result<*mut f32, Error> {
    if view.dim() != shape {
        return Err(shape_mismatch(name, shape, view.dim()));
    }
    view.as_slice_mut()
        .map(<[f32]>::as_mut_ptr)
        .ok_or(Error::NonContiguous { buffer: name })
}

fn shape_mismatch(
    buffer: &'static str,
    expected: (usize, usize, usize),
    got: (usize, usize, usize),
) -> Error {
    Error::ShapeMismatch {
        buffer,
        expected: [expected.0, expected.1, expected.2],
        got: [got.0, got.1, got.2],
    }
}
