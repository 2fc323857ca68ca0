use crate::fft_engine::FftEngine;
use crate::ofdm_parameters::OfdmParameters;
use num::complex::Complex32;
use itertools::izip;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameSyncError {
    /// The strongest correlation peak belongs to a PRS that started before the window.
    /// The caller should resynchronise with more samples.
    #[error("correlation peak at {peak_index} is before the end of the first PRS ({min_peak_index})")]
    PeakBeforeWindowStart { peak_index: usize, min_peak_index: usize },
}

/// Finds the start of the phase reference symbol (PRS) in a window of samples.
///
/// The window is correlated against the PRS using the convolution theorem.
/// A convolution with the time reversed conjugate of the PRS is the cross correlation.
pub struct FrameSynchronizer {
    params: OfdmParameters,
    fft: FftEngine,
    correlation_prs_fft_data: Vec<Complex32>,
    correlation_buffer: Vec<Complex32>,
    /// The index of the largest peak in the last correlation.
    pub last_peak_index: usize,
    /// The squared magnitude of the largest peak in the last correlation.
    pub last_peak_value: f32,
}

impl FrameSynchronizer {
    /// The window must be long enough to fit an entire frame and one symbol so that
    /// at least one complete PRS is present regardless of where the window starts.
    pub fn new(params: &OfdmParameters, prs_time: &[Complex32], nb_window: usize) -> Self {
        assert!(prs_time.len() == params.nb_symbol_period, "PRS must have {} samples but got {}", params.nb_symbol_period, prs_time.len());
        assert!(nb_window >= params.nb_frame_samples + params.nb_symbol_period, "Window of {} samples cannot fit a frame and a symbol", nb_window);

        let mut fft = FftEngine::new(nb_window);
        let mut correlation_prs_fft_data = vec![Complex32::default(); nb_window];
        for (x, y) in izip!(prs_time.iter().rev(), correlation_prs_fft_data.iter_mut()) {
            *y = x.conj();
        }
        fft.forward_in_place(&mut correlation_prs_fft_data);

        Self {
            params: *params,
            fft,
            correlation_prs_fft_data,
            correlation_buffer: vec![Complex32::default(); nb_window],
            last_peak_index: 0,
            last_peak_value: 0.0,
        }
    }

    pub fn window_length(&self) -> usize {
        self.correlation_buffer.len()
    }

    /// Returns the offset of the first PRS sample in the window.
    pub fn locate(&mut self, window: &[Complex32]) -> Result<usize, FrameSyncError> {
        assert!(window.len() == self.window_length(), "Window must have {} samples but got {}", self.window_length(), window.len());

        self.fft.forward(window, &mut self.correlation_buffer);
        for (x, y) in izip!(self.correlation_prs_fft_data.iter(), self.correlation_buffer.iter_mut()) {
            *y *= *x;
        }
        self.fft.inverse_in_place(&mut self.correlation_buffer);

        // NOTE: Ties go to the earliest peak
        let mut peak_index: usize = 0;
        let mut peak_value: f32 = 0.0;
        for (i, x) in self.correlation_buffer.iter().enumerate() {
            let value = x.norm_sqr();
            if value > peak_value {
                peak_index = i;
                peak_value = value;
            }
        }
        self.last_peak_index = peak_index;
        self.last_peak_value = peak_value;
        trace!(peak_index, peak_value, "PRS correlation peak");

        // The peak occurs once the entire PRS has been convolved with the reference
        let min_peak_index = self.params.nb_symbol_period - 1;
        if peak_index < min_peak_index {
            return Err(FrameSyncError::PeakBeforeWindowStart { peak_index, min_peak_index });
        }

        let prs_start_index = peak_index - min_peak_index;
        if prs_start_index > self.params.nb_frame_period {
            Ok(prs_start_index - self.params.nb_frame_period)
        } else {
            Ok(prs_start_index)
        }
    }
}
