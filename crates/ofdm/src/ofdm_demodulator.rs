use crate::fft_engine::FftEngine;
use crate::ofdm_parameters::OfdmParameters;
use num::complex::Complex32;
use itertools::izip;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct OfdmDemodulatorSettings {
    /// Whether we estimate and remove the fractional frequency offset of each symbol using its cyclic prefix.
    /// Fine frequency offsets are smaller than the frequency spacing of one FFT bin.
    pub frequency_correction_is_enabled: bool,
}

impl Default for OfdmDemodulatorSettings {
    fn default() -> Self {
        Self {
            frequency_correction_is_enabled: true,
        }
    }
}

/// Converts a time aligned OFDM frame into hard decision bits.
///
/// The first sample of the frame must be the first sample of the phase reference symbol (PRS).
/// Output bits are laid out as a row per DQPSK symbol with the real decisions of all carriers
/// followed by the imaginary decisions of all carriers.
pub struct OfdmDemodulator {
    pub settings: OfdmDemodulatorSettings,
    pub params: OfdmParameters,
    /// The number of OFDM frames demodulated.
    pub total_frames_read: u32,
    /// Average fractional frequency offset of the last frame in units of FFT bins.
    pub average_frequency_offset: f32,
    fft: FftEngine,
    fft_buffer: Vec<Complex32>,
    carrier_mapper_data: Vec<usize>,
    /// Carriers in natural frequency order for each symbol.
    data_carrier_buffer: Vec<Complex32>,
    /// Phase difference between consecutive symbols.
    data_dqpsk_buffer: Vec<Complex32>,
    /// DQPSK symbols after frequency deinterleaving.
    data_deinterleaved_buffer: Vec<Complex32>,
}

impl OfdmDemodulator {
    pub fn new(params: &OfdmParameters, carrier_mapper: &[usize]) -> Self {
        assert!(params.nb_fft_data_carriers == carrier_mapper.len(), "Mismatching number of data carriers between params {} and lookup table {}", params.nb_fft_data_carriers, carrier_mapper.len());
        assert!(carrier_mapper.iter().all(|&i| i < params.nb_fft_data_carriers), "Carrier map points outside of the data carriers");

        Self {
            settings: OfdmDemodulatorSettings::default(),
            params: *params,
            total_frames_read: 0,
            average_frequency_offset: 0.0,
            fft: FftEngine::new(params.nb_fft),
            fft_buffer: vec![Complex32::default(); params.nb_fft],
            carrier_mapper_data: carrier_mapper.to_vec(),
            data_carrier_buffer: vec![Complex32::default(); params.nb_symbols*params.nb_fft_data_carriers],
            data_dqpsk_buffer: vec![Complex32::default(); params.nb_dqpsk_symbols*params.nb_fft_data_carriers],
            data_deinterleaved_buffer: vec![Complex32::default(); params.nb_dqpsk_symbols*params.nb_fft_data_carriers],
        }
    }

    /// Demodulates one frame. The frame is modified in place by the frequency correction.
    pub fn process(&mut self, frame: &mut [Complex32], bits_out: &mut [u8]) {
        assert!(frame.len() == self.params.nb_frame_samples, "Frame must have {} samples but got {}", self.params.nb_frame_samples, frame.len());
        assert!(bits_out.len() == self.params.nb_output_bits, "Output must have {} bits but got {}", self.params.nb_output_bits, bits_out.len());

        if self.settings.frequency_correction_is_enabled {
            self.correct_frequency_offset(frame);
        }

        let nb_carriers = self.params.nb_fft_data_carriers;

        // Clause 3.14.2 - FFT
        for i in 0..self.params.nb_symbols {
            let symbol_in = &frame[chunk_slice(i, self.params.nb_symbol_period)];
            let fft_in = &symbol_in[self.params.nb_cyclic_prefix..];
            self.fft.forward(fft_in, &mut self.fft_buffer);
            let carriers_out = &mut self.data_carrier_buffer[chunk_slice(i, nb_carriers)];
            calculate_carriers(&self.fft_buffer, carriers_out);
        }

        // Clause 3.15 - Differential demodulator
        for i in 0..self.params.nb_dqpsk_symbols {
            let x0 = &self.data_carrier_buffer[chunk_slice(i,   nb_carriers)];
            let x1 = &self.data_carrier_buffer[chunk_slice(i+1, nb_carriers)];
            let y = &mut self.data_dqpsk_buffer[chunk_slice(i, nb_carriers)];
            calculate_dqpsk(x0, x1, y);
        }

        // Clause 14.6 - Frequency interleaving
        for i in 0..self.params.nb_dqpsk_symbols {
            let x = &self.data_dqpsk_buffer[chunk_slice(i, nb_carriers)];
            let y = &mut self.data_deinterleaved_buffer[chunk_slice(i, nb_carriers)];
            calculate_frequency_deinterleave(&self.carrier_mapper_data, x, y);
        }

        // Clause 3.16 - Data demapper
        for i in 0..self.params.nb_dqpsk_symbols {
            let x = &self.data_deinterleaved_buffer[chunk_slice(i, nb_carriers)];
            let y = &mut bits_out[chunk_slice(i, nb_carriers*2)];
            calculate_hard_bits(x, y);
        }

        self.total_frames_read += 1;
        debug!(
            frame = self.total_frames_read,
            frequency_offset = self.average_frequency_offset,
            "Demodulated OFDM frame",
        );
    }

    fn correct_frequency_offset(&mut self, frame: &mut [Complex32]) {
        // Clause 3.13.1 - Fraction frequency offset estimation
        // A frequency offset of beta FFT bins rotates the end of the symbol by 2*pi*beta relative to its cyclic prefix
        use std::f32::consts::PI;
        let nb_symbol_period = self.params.nb_symbol_period;
        let mut total_offset: f32 = 0.0;
        for (i, symbol) in frame.chunks_exact_mut(nb_symbol_period).enumerate() {
            let phase_error = calculate_cyclic_phase_error(symbol, self.params.nb_cyclic_prefix);
            let beta = phase_error / (2.0*PI);
            let frequency_offset_normalised = -beta / (self.params.nb_fft as f32);
            apply_pll(symbol, frequency_offset_normalised, i*nb_symbol_period);
            total_offset += beta;
        }
        self.average_frequency_offset = total_offset / (self.params.nb_symbols as f32);
    }
}

/// Moves the data carriers of an FFT into natural frequency order [-F,0) then (0,F].
/// The DC bin and the bins outside of the data carriers are discarded.
pub fn calculate_carriers(x: &[Complex32], y: &mut [Complex32]) {
    let nb_fft = x.len();
    let nb_data = y.len();
    let nb_data_half = nb_data/2;
    assert!(nb_fft > nb_data, "length of fft ({}) is less than number of required data carriers ({})", nb_fft, nb_data);
    assert!(nb_data % 2 == 0, "number of data carriers must be even ({})", nb_data);

    // x is an FFT where [0,N) => [0,2Fs)
    // [-Fa,0) => [2Fs-Fa,2Fs) and (0,Fa] => (0,Fa]
    y[..nb_data_half].copy_from_slice(&x[nb_fft-nb_data_half..]);
    y[nb_data_half..].copy_from_slice(&x[1..=nb_data_half]);
}

/// y = conj(x0) * x1
pub fn calculate_dqpsk(x0: &[Complex32], x1: &[Complex32], y: &mut [Complex32]) {
    assert!(x0.len() == y.len() && x1.len() == y.len(), "DQPSK inputs and output have mismatching lengths");
    for (a, b, c) in izip!(x0, x1, y.iter_mut()) {
        *c = a.conj() * b;
    }
}

/// Undoes the frequency interleaver where carrier n was transmitted on carrier k = carrier_mapper[n].
pub fn calculate_frequency_deinterleave(carrier_mapper: &[usize], x: &[Complex32], y: &mut [Complex32]) {
    assert!(carrier_mapper.len() == x.len(), "Carrier map and input symbols have mismatching lengths {} != {}", carrier_mapper.len(), x.len());
    assert!(x.len() == y.len(), "Input and output symbols have mismatching lengths {} != {}", x.len(), y.len());
    for (&k, y) in carrier_mapper.iter().zip(y.iter_mut()) {
        *y = x[k];
    }
}

/// QPSK demapper where a non-negative component is a 0 bit.
pub fn calculate_hard_bits(x: &[Complex32], y: &mut [u8]) {
    assert!(x.len()*2 == y.len(), "Requires 2 bits for each input symbol but arrays are of lengths {} and {}", x.len(), y.len());
    let length = x.len();

    // Clause 3.4.2 - QPSK symbol mapper
    // phi = (1-2*b0) + (1-2*b1)*1j
    for (i, vec) in x.iter().enumerate() {
        y[i]        = quantise_to_hard_bit(vec.re);
        y[i+length] = quantise_to_hard_bit(vec.im);
    }
}

#[inline(always)]
fn quantise_to_hard_bit(x: f32) -> u8 {
    if x >= 0.0 { 0 } else { 1 }
}

// SOURCE: https://mooooo.ooo/chebyshev-sine-approximation
//         Chebyshev polynomial that approximates f(x) = sin(2*pi*x) accurately within [-0.75,+0.75]
fn fast_sine(x: f32) -> f32 {
    const A0: f32 = -25.1327419281005859375;
    const A1: f32 =  64.83582305908203125;
    const A2: f32 = -67.076629638671875;
    const A3: f32 =  38.495880126953125;
    const A4: f32 = -14.049663543701171875;
    const A5: f32 =  3.161602020263671875;

    // g(x) = a5*x^10 + a4*x^8 + a3*x^6 + a2*x^4 + a1*x^2 + a0
    let z = x*x;
    let b5 = A5;
    let b4 = b5*z + A4;
    let b3 = b4*z + A3;
    let b2 = b3*z + A2;
    let b1 = b2*z + A1;
    let b0 = b1*z + A0;

    // f(x) = g(x) * (x^2 - 0.25) * x
    b0 * (z-0.25) * x
}

/// Multiplies x[i] by e^(2*pi*j*f*(i+start_index)).
/// The start index keeps the phase continuous when a frame is processed a symbol at a time.
fn apply_pll(x: &mut [Complex32], freq_offset_normalised: f32, start_index: usize) {
    x.iter_mut().enumerate().for_each(|(i, x)| {
        let dt = ((i+start_index) as f32)*freq_offset_normalised;
        // NOTE: Faster version of f32::round() to translate to [-0.5,+0.5]
        let dt_offset = dt.abs() - 0.5;
        let dt_offset = dt_offset.ceil();
        let dt_offset = dt_offset*dt.signum();
        let dt = dt - dt_offset;
        let sin = fast_sine(dt);        // occupies [-0.5,+0.5]
        let cos = fast_sine(dt + 0.25); // occupies [-0.25,+0.75]
        let pll = Complex32::new(cos, sin);
        *x *= pll;
    });
}

/// Phase of the correlation between the cyclic prefix and the end of the symbol it was copied from.
fn calculate_cyclic_phase_error(x: &[Complex32], prefix_length: usize) -> f32 {
    let length = x.len();
    assert!(length >= prefix_length);

    let prefix = &x[0..prefix_length];
    let suffix = &x[span_slice(length-prefix_length, prefix_length)];

    let conjugate_sum: Complex32 = izip!(prefix, suffix)
        .map(|(p, s)| p.conj() * s)
        .sum();

    conjugate_sum.im.atan2(conjugate_sum.re)
}

#[inline(always)]
fn span_slice(start: usize, length: usize) -> std::ops::Range<usize> {
    start..start+length
}

#[inline(always)]
fn chunk_slice(index: usize, length: usize) -> std::ops::Range<usize> {
    let start_index = index*length;
    span_slice(start_index, length)
}
