//! Blur a synthetic bead volume with the FFT convolution primitive,
//! then restore it with total-variation-regularized Richardson-Lucy
//! deconvolution.
//!
//! Needs the native clij2fft binary installed for the current platform
//! and a working OpenCL device.

use anyhow::{ensure, Context, Result};
use ndarray::Array3;
use rand::{Rng, SeedableRng};

const SHAPE: (usize, usize, usize) = (32, 64, 64);
const ITERATIONS: i32 = 100;
const REGULARIZATION: f32 = 0.002;

fn main() -> Result<()> {
    let lib = clij2fft::get().context("loading the native clij2fft library")?;
    println!("loaded {}", lib.location());

    let truth = bead_volume();
    let psf = gaussian_psf(1.5);

    // Forward model: blur the ground truth with the PSF.
    let mut blurred = Array3::<f32>::zeros(SHAPE);
    let status = lib.convcorr3d(truth.view(), psf.view(), blurred.view_mut(), false)?;
    ensure!(status == 0, "convolution failed with status {status}");

    // Deconvolve, starting from the blurred image itself.
    let mut estimate = blurred.clone();
    let mut normal = Array3::<f32>::zeros(SHAPE);
    let status = lib.deconv3d_tv(
        ITERATIONS,
        REGULARIZATION,
        blurred.view(),
        psf.view(),
        estimate.view_mut(),
        normal.view_mut(),
    )?;
    ensure!(status == 0, "deconvolution failed with status {status}");

    println!(
        "blurred error {:.4}, restored error {:.4}",
        mean_abs_error(&blurred, &truth),
        mean_abs_error(&estimate, &truth),
    );
    Ok(())
}

/// A handful of bright beads on a dark background.
fn bead_volume() -> Array3<f32> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let mut volume = Array3::<f32>::zeros(SHAPE);
    for _ in 0..20 {
        let z = rng.gen_range(4..SHAPE.0 - 4);
        let y = rng.gen_range(4..SHAPE.1 - 4);
        let x = rng.gen_range(4..SHAPE.2 - 4);
        volume[[z, y, x]] = rng.gen_range(100.0..255.0);
    }
    volume
}

/// An isotropic Gaussian PSF centered in a volume-sized buffer.
fn gaussian_psf(sigma: f32) -> Array3<f32> {
    let center = (
        SHAPE.0 as f32 / 2.0,
        SHAPE.1 as f32 / 2.0,
        SHAPE.2 as f32 / 2.0,
    );
    let mut psf = Array3::from_shape_fn(SHAPE, |(z, y, x)| {
        let dz = z as f32 - center.0;
        let dy = y as f32 - center.1;
        let dx = x as f32 - center.2;
        (-(dz * dz + dy * dy + dx * dx) / (2.0 * sigma * sigma)).exp()
    });
    let sum = psf.sum();
    psf.mapv_inplace(|v| v / sum);
    psf
}

fn mean_abs_error(a: &Array3<f32>, b: &Array3<f32>) -> f32 {
    let n = a.len() as f32;
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum::<f32>() / n
}
