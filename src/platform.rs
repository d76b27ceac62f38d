//! Platform resolution for the native clij2fft binary.
//!
//! The policy is a closed set of three variants, decided from the
//! compile-time target and evaluated once at handle-creation time:
//!
//! - POSIX, non-Apple: `libclij2fft.so` by logical name from the
//!   system's standard library search path.
//! - POSIX, Apple: `libclij2fft.dylib` from a fixed path relative to
//!   the binding's own install directory (`../lib/macosx/`).
//! - Anything else (assumed Windows): `clij2fft.dll` by logical name
//!   via the standard DLL search path.

use std::env;
use std::io;
use std::path::PathBuf;

use crate::error::Error;

/// The closed set of platform variants the loader distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// POSIX, non-Apple: `.so` by logical name.
    PosixStandard,
    /// macOS: `.dylib` bundled relative to the install directory.
    PosixApple,
    /// Everything else: `.dll` by logical name.
    WindowsDefault,
}

impl Platform {
    /// The variant for the current compile target.
    pub fn current() -> Self {
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            Platform::PosixStandard
        }
        #[cfg(target_os = "macos")]
        {
            Platform::PosixApple
        }
        #[cfg(not(unix))]
        {
            Platform::WindowsDefault
        }
    }

    /// Resolve where the native library is expected for this variant.
    pub fn location(&self) -> Result<LibraryLocation, Error> {
        match self {
            Platform::PosixStandard => Ok(LibraryLocation::Name("libclij2fft.so")),
            Platform::PosixApple => Ok(LibraryLocation::Path(bundled_dylib_path()?)),
            Platform::WindowsDefault => Ok(LibraryLocation::Name("clij2fft.dll")),
        }
    }
}

/// Where to load the library from: a logical name resolved by the
/// platform's own search path, or a concrete file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLocation {
    Name(&'static str),
    Path(PathBuf),
}

impl std::fmt::Display for LibraryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryLocation::Name(name) => write!(f, "{}", name),
            LibraryLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The macOS dylib ships under `../lib/macosx/` relative to the
/// directory containing the running executable.
fn bundled_dylib_path() -> Result<PathBuf, Error> {
    let exe = env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        Error::InstallDir(io::Error::new(
            io::ErrorKind::NotFound,
            "executable has no parent directory",
        ))
    })?;
    Ok(dir.join("../lib/macosx/libclij2fft.dylib"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_matches_compile_target() {
        let platform = Platform::current();
        #[cfg(all(unix, not(target_os = "macos")))]
        assert_eq!(platform, Platform::PosixStandard);
        #[cfg(target_os = "macos")]
        assert_eq!(platform, Platform::PosixApple);
        #[cfg(not(unix))]
        assert_eq!(platform, Platform::WindowsDefault);
    }

    #[test]
    fn posix_standard_uses_logical_so_name() {
        let location = Platform::PosixStandard.location().unwrap();
        assert_eq!(location, LibraryLocation::Name("libclij2fft.so"));
    }

    #[test]
    fn windows_uses_logical_dll_name() {
        let location = Platform::WindowsDefault.location().unwrap();
        assert_eq!(location, LibraryLocation::Name("clij2fft.dll"));
    }

    #[test]
    fn apple_resolves_under_the_install_directory() {
        let location = Platform::PosixApple.location().unwrap();
        match location {
            LibraryLocation::Path(path) => {
                assert!(path.ends_with("../lib/macosx/libclij2fft.dylib"));
            }
            other => panic!("expected a concrete path, got {}", other),
        }
    }
}
