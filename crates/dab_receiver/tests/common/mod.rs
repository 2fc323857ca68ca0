#![allow(dead_code)]

use num::complex::Complex32;
use rand::Rng;
use rand::rngs::StdRng;
use ofdm::fft_engine::FftEngine;
use dab_core::dab_constants::{
    N_CARRIERS, N_CIFS, N_DATA_SYMBOLS, N_FIB_BITS, N_RAW_SYMBOL_BITS, N_TAPS, N_CONV_OUTPUT,
    T_F, T_G, T_NULL, T_S, T_U,
};
use dab_ofdm::dab_ofdm_carrier_map::DAB_OFDM_CARRIER_MAP;
use dab_ofdm::dab_ofdm_phase_reference_symbol::get_dab_ofdm_phase_reference_symbol_fft;
use dab_radio::convolutional_code::ConvolutionalCode;
use dab_radio::fic::fic_puncture::FIC_PUNCTURING_MASK;

/// Gain applied to the unit carriers so that the signal uses most of the 8bit range.
pub const SIGNAL_AMPLITUDE: f32 = 10.0;

/// Random contents of the fast information blocks for each CIF of a frame.
pub fn create_fib_bits(rng: &mut StdRng) -> Vec<Vec<u8>> {
    (0..N_CIFS)
        .map(|_| (0..N_FIB_BITS).map(|_| rng.random::<bool>() as u8).collect())
        .collect()
}

/// Hard decision bits of a frame with an encoded FIC followed by a random MSC.
pub fn create_frame_bits(code: &ConvolutionalCode, fib_bits: &[Vec<u8>], rng: &mut StdRng) -> Vec<u8> {
    let mut fic_bits = Vec::new();
    for bits in fib_bits {
        let mut bits = bits.clone();
        bits.extend(std::iter::repeat(0).take(N_TAPS));
        let mut codeword = vec![0u8; bits.len()*N_CONV_OUTPUT];
        code.encode(&bits, &mut codeword);
        fic_bits.extend(
            codeword.iter()
                .zip(FIC_PUNCTURING_MASK.iter())
                .filter(|(_, &m)| m == 1)
                .map(|(&x, _)| x)
        );
    }

    let mut frame_bits: Vec<u8> = (0..N_DATA_SYMBOLS*N_RAW_SYMBOL_BITS).map(|_| rng.random::<bool>() as u8).collect();
    frame_bits[..fic_bits.len()].copy_from_slice(&fic_bits);
    frame_bits
}

fn carrier_to_fft_bin(carrier_index: usize) -> usize {
    let nb_half = N_CARRIERS/2;
    if carrier_index < nb_half {
        T_U - nb_half + carrier_index
    } else {
        carrier_index - nb_half + 1
    }
}

fn write_symbol(fft: &mut FftEngine, carriers: &[Complex32], symbol: &mut [Complex32]) {
    fft.inverse(carriers, &mut symbol[T_G..]);
    symbol.copy_within(T_U.., 0);
}

/// Creates the baseband samples of a full transmission frame starting with the NULL symbol.
pub fn modulate_frame(fft: &mut FftEngine, frame_bits: &[u8]) -> Vec<Complex32> {
    assert_eq!(frame_bits.len(), N_DATA_SYMBOLS*N_RAW_SYMBOL_BITS);
    let mut frame = vec![Complex32::default(); T_F];
    let mut carriers = vec![Complex32::default(); T_U];
    get_dab_ofdm_phase_reference_symbol_fft(&mut carriers);
    write_symbol(fft, &carriers, &mut frame[T_NULL..T_NULL+T_S]);

    let scale = std::f32::consts::FRAC_1_SQRT_2;
    for (i, bits) in frame_bits.chunks_exact(N_RAW_SYMBOL_BITS).enumerate() {
        let (real_bits, imag_bits) = bits.split_at(N_CARRIERS);
        for (n, (&b_re, &b_im)) in real_bits.iter().zip(imag_bits.iter()).enumerate() {
            let symbol = Complex32::new(1.0 - 2.0*(b_re as f32), 1.0 - 2.0*(b_im as f32)) * scale;
            carriers[carrier_to_fft_bin(DAB_OFDM_CARRIER_MAP[n])] *= symbol;
        }
        let start = T_NULL + (i+1)*T_S;
        write_symbol(fft, &carriers, &mut frame[start..start+T_S]);
    }

    for x in frame.iter_mut() {
        *x *= SIGNAL_AMPLITUDE;
    }
    frame
}

/// Rotates the signal by a frequency offset in units of FFT bins.
pub fn apply_frequency_offset(samples: &mut [Complex32], offset: f32) {
    let step = 2.0 * std::f64::consts::PI * (offset as f64) / (T_U as f64);
    for (t, x) in samples.iter_mut().enumerate() {
        let phase = (step * (t as f64)) % (2.0 * std::f64::consts::PI);
        *x *= Complex32::from_polar(1.0, phase as f32);
    }
}

/// Converts samples into interleaved unsigned 8bit I/Q pairs.
pub fn quantize(samples: &[Complex32]) -> Vec<u8> {
    let convert = |x: f32| (128.0 + 128.0*x).round().clamp(0.0, 255.0) as u8;
    samples.iter().flat_map(|x| [convert(x.re), convert(x.im)]).collect()
}

/// Transmission made of silence, a number of frames and more silence.
pub struct Transmission {
    pub samples: Vec<Complex32>,
    pub fib_bits_per_frame: Vec<Vec<Vec<u8>>>,
    /// Index of the first PRS sample of each frame.
    pub prs_start_indices: Vec<usize>,
}

pub fn create_transmission(rng: &mut StdRng, nb_leading: usize, nb_frames: usize, nb_trailing: usize) -> Transmission {
    let code = ConvolutionalCode::dab();
    let mut fft = FftEngine::new(T_U);
    let mut samples = vec![Complex32::default(); nb_leading];
    let mut fib_bits_per_frame = Vec::with_capacity(nb_frames);
    let mut prs_start_indices = Vec::with_capacity(nb_frames);
    for _ in 0..nb_frames {
        let fib_bits = create_fib_bits(rng);
        let frame_bits = create_frame_bits(&code, &fib_bits, rng);
        prs_start_indices.push(samples.len() + T_NULL);
        samples.extend(modulate_frame(&mut fft, &frame_bits));
        fib_bits_per_frame.push(fib_bits);
    }
    samples.extend(std::iter::repeat(Complex32::default()).take(nb_trailing));
    Transmission { samples, fib_bits_per_frame, prs_start_indices }
}
