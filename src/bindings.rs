//! Native signature declarations for the clij2fft entry points.
//!
//! Argument order, count, and primitive widths here must match the
//! compiled library exactly. A mismatch is not a catchable error: the
//! call goes through with a corrupted frame. Any signature drift in the
//! native library is a breaking change this module must track.
//!
//! `n0, n1, n2` are the volume dimensions fastest-varying first, i.e.
//! width, height, depth for a row-major volume. The checked surface in
//! [`crate::Clij2Fft`] derives them from the array views so callers
//! cannot get the order wrong; callers of the raw pointers must supply
//! them in this order themselves.

use std::fmt;
use std::os::raw::{c_float, c_int};

/// `int deconv3d_32f(int iterations, int n0, int n1, int n2,
/// const float *image, const float *psf, float *estimate, float *normal)`
pub type Deconv3dFn = unsafe extern "C" fn(
    c_int,
    c_int,
    c_int,
    c_int,
    *const f32,
    *const f32,
    *mut f32,
    *mut f32,
) -> c_int;

/// `int deconv3d_32f_tv(int iterations, float regularization, int n0,
/// int n1, int n2, const float *image, const float *psf,
/// float *estimate, float *normal)`
pub type Deconv3dTvFn = unsafe extern "C" fn(
    c_int,
    c_float,
    c_int,
    c_int,
    c_int,
    *const f32,
    *const f32,
    *mut f32,
    *mut f32,
) -> c_int;

/// `int convcorr3d_32f(int n0, int n1, int n2, const float *input,
/// const float *kernel, float *output, bool correlate)`
pub type ConvCorr3dFn = unsafe extern "C" fn(
    c_int,
    c_int,
    c_int,
    *const f32,
    *const f32,
    *mut f32,
    bool,
) -> c_int;

pub const DECONV3D_32F: &str = "deconv3d_32f";
pub const DECONV3D_32F_TV: &str = "deconv3d_32f_tv";
pub const CONVCORR3D_32F: &str = "convcorr3d_32f";

/// Parameter types appearing in the native signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// 32-bit signed integer
    I32,
    /// 32-bit floating point
    F32,
    /// Read-only contiguous float32 volume (`const float *`)
    ConstF32Ptr,
    /// Writable contiguous float32 volume (`float *`)
    MutF32Ptr,
    /// C `_Bool`
    Bool,
}

impl ParamType {
    /// Whether this parameter carries a buffer rather than a scalar.
    pub fn is_buffer(&self) -> bool {
        matches!(self, ParamType::ConstF32Ptr | ParamType::MutF32Ptr)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::I32 => write!(f, "i32"),
            ParamType::F32 => write!(f, "f32"),
            ParamType::ConstF32Ptr => write!(f, "*const f32"),
            ParamType::MutF32Ptr => write!(f, "*mut f32"),
            ParamType::Bool => write!(f, "bool"),
        }
    }
}

/// Declared signature of one native export, introspectable at runtime
/// for conformance checks.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDescriptor {
    /// Exported symbol name
    pub name: &'static str,
    /// Ordered parameter types
    pub params: &'static [ParamType],
}

impl FunctionDescriptor {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i32 {}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// The three exports, in the order they are resolved at load time.
pub const DESCRIPTORS: [FunctionDescriptor; 3] = [
    FunctionDescriptor {
        name: DECONV3D_32F,
        params: &[
            ParamType::I32,
            ParamType::I32,
            ParamType::I32,
            ParamType::I32,
            ParamType::ConstF32Ptr,
            ParamType::ConstF32Ptr,
            ParamType::MutF32Ptr,
            ParamType::MutF32Ptr,
        ],
    },
    FunctionDescriptor {
        name: DECONV3D_32F_TV,
        params: &[
            ParamType::I32,
            ParamType::F32,
            ParamType::I32,
            ParamType::I32,
            ParamType::I32,
            ParamType::ConstF32Ptr,
            ParamType::ConstF32Ptr,
            ParamType::MutF32Ptr,
            ParamType::MutF32Ptr,
        ],
    },
    FunctionDescriptor {
        name: CONVCORR3D_32F,
        params: &[
            ParamType::I32,
            ParamType::I32,
            ParamType::I32,
            ParamType::ConstF32Ptr,
            ParamType::ConstF32Ptr,
            ParamType::MutF32Ptr,
            ParamType::Bool,
        ],
    },
];

/// Look up the declared signature of an export by name.
pub fn descriptor(name: &str) -> Option<&'static FunctionDescriptor> {
    DESCRIPTORS.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_lookup() {
        assert!(descriptor("deconv3d_32f").is_some());
        assert!(descriptor("deconv3d_32f_tv").is_some());
        assert!(descriptor("convcorr3d_32f").is_some());
        assert!(descriptor("deconv2d_32f").is_none());
    }

    #[test]
    fn arities_match_the_native_exports() {
        assert_eq!(descriptor(DECONV3D_32F).unwrap().arity(), 8);
        assert_eq!(descriptor(DECONV3D_32F_TV).unwrap().arity(), 9);
        assert_eq!(descriptor(CONVCORR3D_32F).unwrap().arity(), 7);
    }

    #[test]
    fn descriptor_display() {
        let desc = descriptor(CONVCORR3D_32F).unwrap();
        assert_eq!(
            desc.to_string(),
            "i32 convcorr3d_32f(i32, i32, i32, *const f32, *const f32, *mut f32, bool)"
        );
    }

    #[test]
    fn buffer_params() {
        assert!(ParamType::ConstF32Ptr.is_buffer());
        assert!(ParamType::MutF32Ptr.is_buffer());
        assert!(!ParamType::I32.is_buffer());
        assert!(!ParamType::Bool.is_buffer());
    }
}
