//! Time-domain tapers.
//!
//! Tapers are applied to a whole block before the forward transform to
//! reduce edge discontinuities. Two flavours are provided: the symmetric
//! window (first and last samples equal) and the periodic window used for
//! spectral work, which is the symmetric window of length `N + 1` with its
//! last sample dropped.

use lib_types::WindowType;
use std::f64::consts::PI;

/// Compute the zeroth-order modified Bessel function of the first kind, I_0(x).
///
/// Uses the polynomial approximation for efficiency.
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();

    if ax < 3.75 {
        // Polynomial approximation for small arguments
        let t = (x / 3.75).powi(2);
        1.0 + t * (3.5156229
            + t * (3.0899424
                + t * (1.2067492
                    + t * (0.2659732
                        + t * (0.0360768 + t * 0.0045813)))))
    } else {
        // Asymptotic expansion for large arguments
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706
                                    + t * (0.02635537
                                        + t * (-0.01647633 + t * 0.00392377))))))))
    }
}

/// Generate symmetric window coefficients for a given window type and length.
///
/// # Arguments
///
/// * `window_type` - Type of window function to generate
/// * `length` - Number of points in the window
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let n = length as f64;
    let mut window = Vec::with_capacity(length);

    match window_type {
        WindowType::Boxcar => {
            window.resize(length, 1.0);
        }

        WindowType::Hann => {
            for i in 0..length {
                let x = i as f64 / (n - 1.0);
                window.push(0.5 * (1.0 - (2.0 * PI * x).cos()));
            }
        }

        WindowType::Hamming => {
            for i in 0..length {
                let x = i as f64 / (n - 1.0);
                window.push(0.54 - 0.46 * (2.0 * PI * x).cos());
            }
        }

        WindowType::Blackman => {
            for i in 0..length {
                let x = i as f64 / (n - 1.0);
                window.push(
                    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos(),
                );
            }
        }

        WindowType::Kaiser { beta } => {
            let denom = bessel_i0(beta);
            for i in 0..length {
                let x = 2.0 * i as f64 / (n - 1.0) - 1.0; // Range [-1, 1]
                let arg = beta * (1.0 - x * x).max(0.0).sqrt();
                window.push(bessel_i0(arg) / denom);
            }
        }
    }

    window
}

/// Periodic taper of `length` samples for FFT-based filtering.
pub fn taper(window_type: WindowType, length: usize) -> Vec<f64> {
    if length <= 1 {
        return generate_window(window_type, length);
    }
    let mut window = generate_window(window_type, length + 1);
    window.truncate(length);
    window
}
