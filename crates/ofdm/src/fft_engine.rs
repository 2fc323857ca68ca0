use std::sync::Arc;
use num::complex::Complex32;
use rustfft::{FftPlanner, Fft};

/// Forward and inverse FFT of a fixed size.
///
/// Planning is expensive so cloning an engine shares the plans instead of creating new ones.
/// The plans are released when the last clone is dropped.
#[derive(Clone)]
pub struct FftEngine {
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl FftEngine {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be non-zero");
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);
        let scratch_length = fft.get_inplace_scratch_len().max(ifft.get_inplace_scratch_len());
        Self {
            fft,
            ifft,
            scratch: vec![Complex32::default(); scratch_length],
        }
    }

    pub fn size(&self) -> usize {
        self.fft.len()
    }

    /// y[k] = sum x[n]*e^(-2*pi*i*k*n/N)
    pub fn forward(&mut self, x: &[Complex32], y: &mut [Complex32]) {
        let size = self.size();
        assert!(x.len() >= size, "Input buffer has {} samples but FFT requires {}", x.len(), size);
        assert!(y.len() >= size, "Output buffer has {} samples but FFT requires {}", y.len(), size);
        y[..size].copy_from_slice(&x[..size]);
        self.forward_in_place(&mut y[..size]);
    }

    /// y[n] = 1/N * sum x[k]*e^(+2*pi*i*k*n/N)
    pub fn inverse(&mut self, x: &[Complex32], y: &mut [Complex32]) {
        let size = self.size();
        assert!(x.len() >= size, "Input buffer has {} samples but IFFT requires {}", x.len(), size);
        assert!(y.len() >= size, "Output buffer has {} samples but IFFT requires {}", y.len(), size);
        y[..size].copy_from_slice(&x[..size]);
        self.inverse_in_place(&mut y[..size]);
    }

    pub fn forward_in_place(&mut self, buf: &mut [Complex32]) {
        let size = self.size();
        assert!(buf.len() == size, "Buffer has {} samples but FFT requires {}", buf.len(), size);
        self.fft.process_with_scratch(buf, &mut self.scratch);
    }

    /// Only the inverse transform is normalised so that forward followed by inverse is the identity.
    pub fn inverse_in_place(&mut self, buf: &mut [Complex32]) {
        let size = self.size();
        assert!(buf.len() == size, "Buffer has {} samples but IFFT requires {}", buf.len(), size);
        self.ifft.process_with_scratch(buf, &mut self.scratch);
        let scale = 1.0 / (size as f32);
        for value in buf.iter_mut() {
            *value *= scale;
        }
    }
}
