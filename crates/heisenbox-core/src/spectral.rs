//! Complex arithmetic and the discrete spectral transform.
//!
//! The frequency-space variance needs a DFT; none of our dependencies carry
//! one, so this module implements an iterative radix-2 FFT (with a direct
//! DFT fallback for non-power-of-two lengths) and the centered-bin reordering.

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A complex sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Unit complex number e^{i theta}.
    pub fn from_angle(theta: f64) -> Self {
        Self {
            re: theta.cos(),
            im: theta.sin(),
        }
    }

    /// Squared magnitude |z|^2.
    pub fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn abs(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    pub fn scale(&self, s: f64) -> Self {
        Self {
            re: self.re * s,
            im: self.im * s,
        }
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Self { re, im: 0.0 }
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl AddAssign for Complex {
    fn add_assign(&mut self, rhs: Complex) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// Forward DFT: X_k = sum_n x_n e^{-2 pi i k n / N}.
///
/// Radix-2 Cooley-Tukey when the length is a power of two, direct evaluation
/// otherwise. Output length equals input length.
pub fn dft(input: &[Complex]) -> Vec<Complex> {
    let n = input.len();
    if n == 0 {
        return Vec::new();
    }
    if n.is_power_of_two() {
        let mut buf = input.to_vec();
        fft_in_place(&mut buf);
        buf
    } else {
        dft_direct(input)
    }
}

fn dft_direct(input: &[Complex]) -> Vec<Complex> {
    let n = input.len();
    let mut out = vec![Complex::ZERO; n];
    for (k, out_k) in out.iter_mut().enumerate() {
        let mut acc = Complex::ZERO;
        for (j, x) in input.iter().enumerate() {
            let theta = -2.0 * std::f64::consts::PI * (k as f64) * (j as f64) / (n as f64);
            acc += *x * Complex::from_angle(theta);
        }
        *out_k = acc;
    }
    out
}

/// In-place iterative radix-2 FFT. Length must be a power of two.
fn fft_in_place(buf: &mut [Complex]) {
    let n = buf.len();
    debug_assert!(n.is_power_of_two());
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = (i.reverse_bits() >> (usize::BITS - bits)) as usize;
        if j > i {
            buf.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let angle = -2.0 * std::f64::consts::PI / (len as f64);
        let wlen = Complex::from_angle(angle);
        for start in (0..n).step_by(len) {
            let mut w = Complex::new(1.0, 0.0);
            for k in 0..len / 2 {
                let even = buf[start + k];
                let odd = buf[start + k + len / 2] * w;
                buf[start + k] = even + odd;
                buf[start + k + len / 2] = even - odd;
                w = w * wlen;
            }
        }
        len <<= 1;
    }
}

/// Reorder DFT bins so the zero-frequency bin sits in the middle.
///
/// Matches the centered frequency ordering produced by
/// [`crate::grid::EvaluationGrid`]: bin j of the output corresponds to the
/// signed frequency index j - floor(N/2).
pub fn fftshift<T: Copy>(bins: &[T]) -> Vec<T> {
    let n = bins.len();
    if n == 0 {
        return Vec::new();
    }
    let split = n.div_ceil(2);
    let mut out = Vec::with_capacity(n);
    out.extend_from_slice(&bins[split..]);
    out.extend_from_slice(&bins[..split]);
    out
}
