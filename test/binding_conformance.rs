//! Conformance tests for the declared native signatures and the
//! platform resolution policy.
//!
//! These run everywhere; nothing here needs the native library.

use clij2fft::{descriptor, LibraryLocation, ParamType, Platform, DESCRIPTORS};

#[test]
fn exactly_three_exports_are_declared() {
    assert_eq!(DESCRIPTORS.len(), 3);
    let names: Vec<_> = DESCRIPTORS.iter().map(|d| d.name).collect();
    assert_eq!(names, ["deconv3d_32f", "deconv3d_32f_tv", "convcorr3d_32f"]);
}

#[test]
fn deconv3d_signature_order() {
    use ParamType::*;
    let desc = descriptor("deconv3d_32f").unwrap();
    assert_eq!(
        desc.params,
        &[I32, I32, I32, I32, ConstF32Ptr, ConstF32Ptr, MutF32Ptr, MutF32Ptr]
    );
}

#[test]
fn deconv3d_tv_signature_order() {
    use ParamType::*;
    let desc = descriptor("deconv3d_32f_tv").unwrap();
    assert_eq!(
        desc.params,
        &[I32, F32, I32, I32, I32, ConstF32Ptr, ConstF32Ptr, MutF32Ptr, MutF32Ptr]
    );
}

#[test]
fn convcorr3d_signature_order() {
    use ParamType::*;
    let desc = descriptor("convcorr3d_32f").unwrap();
    assert_eq!(
        desc.params,
        &[I32, I32, I32, ConstF32Ptr, ConstF32Ptr, MutF32Ptr, Bool]
    );
}

#[test]
fn every_export_carries_buffer_parameters() {
    for desc in &DESCRIPTORS {
        let buffers = desc.params.iter().filter(|p| p.is_buffer()).count();
        assert!(buffers >= 3, "{} declares too few buffers", desc.name);
    }
}

#[test]
fn platform_location_follows_the_naming_convention() {
    let location = Platform::current().location().unwrap();
    match Platform::current() {
        Platform::PosixStandard => {
            assert_eq!(location, LibraryLocation::Name("libclij2fft.so"));
        }
        Platform::WindowsDefault => {
            assert_eq!(location, LibraryLocation::Name("clij2fft.dll"));
        }
        Platform::PosixApple => match location {
            LibraryLocation::Path(path) => {
                assert!(path.to_string_lossy().ends_with("libclij2fft.dylib"));
                assert!(path.to_string_lossy().contains("lib/macosx"));
            }
            other => panic!("expected a bundled path on macOS, got {}", other),
        },
    }
}

#[test]
fn repeated_handle_creation_is_consistent() {
    // Whether or not the native binary is installed, a second get()
    // must behave exactly like the first: same handle on success, a
    // load error (never a partial handle) on failure.
    let first = clij2fft::get();
    let second = clij2fft::get();
    match (first, second) {
        (Ok(a), Ok(b)) => {
            assert!(std::ptr::eq(a, b));
            assert_eq!(a.location(), b.location());
        }
        (Err(a), Err(b)) => {
            assert_eq!(a.to_string(), b.to_string());
        }
        _ => panic!("get() changed outcome between calls"),
    }
}
