mod common;

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use num::complex::Complex32;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ofdm::fft_engine::FftEngine;
use ofdm::frame_synchronizer::FrameSynchronizer;
use ofdm::ofdm_demodulator::{OfdmDemodulator, OfdmDemodulatorSettings};
use dab_core::dab_constants::{T_F, T_F_FFT, T_F_U, T_NULL, T_U};
use dab_ofdm::dab_ofdm_carrier_map::DAB_OFDM_CARRIER_MAP;
use dab_ofdm::dab_ofdm_parameters::get_dab_ofdm_parameters;
use dab_ofdm::dab_ofdm_phase_reference_symbol::create_dab_ofdm_phase_reference_symbol;
use dab_radio::convolutional_code::ConvolutionalCode;
use dab_receiver::dab_receiver::{DabReceiver, DabReceiverError, DabReceiverSettings, DabReceiverStats, FrameReport};
use common::*;

#[derive(Debug, Clone)]
struct DecodedFrame {
    prs_start_index: usize,
    nb_error_bits: Vec<usize>,
    fib_bits: Vec<Vec<u8>>,
}

fn run_receiver<R: std::io::Read>(mut receiver: DabReceiver<R>) -> (DabReceiverStats, Vec<DecodedFrame>) {
    let frames = Arc::new(Mutex::new(Vec::new()));
    receiver.subscribe_frame({
        let frames = frames.clone();
        move |report: &FrameReport<'_>| {
            frames.lock().unwrap().push(DecodedFrame {
                prs_start_index: report.prs_start_index,
                nb_error_bits: report.fic_block_errors().collect(),
                fib_bits: report.fic_blocks.iter().map(|block| block.bits.clone()).collect(),
            });
        }
    });
    let stats = receiver.run();
    assert_eq!(receiver.stats(), stats);
    let frames = frames.lock().unwrap().clone();
    (stats, frames)
}

#[test]
fn decodes_every_frame_of_clean_transmission() {
    let mut rng = StdRng::seed_from_u64(100);
    let transmission = create_transmission(&mut rng, 1000, 3, 70_000);
    let receiver = DabReceiver::new(Cursor::new(quantize(&transmission.samples)), DabReceiverSettings::default());
    let (stats, frames) = run_receiver(receiver);

    assert_eq!(stats, DabReceiverStats { total_frames_decoded: 3, total_frames_desync: 0 });
    assert_eq!(frames.len(), 3);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.prs_start_index, transmission.prs_start_indices[i]);
        assert_eq!(frame.prs_start_index, 1000 + 2656 + i*T_F);
        assert_eq!(frame.nb_error_bits, vec![0; 4]);
        assert_eq!(frame.fib_bits, transmission.fib_bits_per_frame[i]);
    }
}

#[test]
fn reference_aligned_window_recovers_every_bit() {
    let mut rng = StdRng::seed_from_u64(106);
    let code = ConvolutionalCode::dab();
    let mut fft = FftEngine::new(T_U);
    let fib_bits = create_fib_bits(&mut rng);
    let frame_bits = create_frame_bits(&code, &fib_bits, &mut rng);
    let frame = modulate_frame(&mut fft, &frame_bits);

    // Window begins exactly on the reference symbol
    let mut window = vec![Complex32::default(); T_F_FFT];
    window[..T_F_U].copy_from_slice(&frame[T_NULL..]);

    let params = get_dab_ofdm_parameters();
    let prs = create_dab_ofdm_phase_reference_symbol(&mut fft);
    let mut sync = FrameSynchronizer::new(&params, &prs, T_F_FFT);
    assert_eq!(sync.locate(&window), Ok(0));

    let mut demodulator = OfdmDemodulator::new(&params, &DAB_OFDM_CARRIER_MAP);
    let mut samples = window[..T_F_U].to_vec();
    let mut bits = vec![0u8; params.nb_output_bits];
    demodulator.process(&mut samples, &mut bits);
    assert_eq!(bits.len(), frame_bits.len());
    assert!(bits == frame_bits, "Demodulated bits differ from the transmitted frame");
}

#[test]
fn frame_crossing_window_end_is_read_from_input() {
    // Each frame starts close enough to the end of its window that the rest must come from the input
    let mut rng = StdRng::seed_from_u64(107);
    let transmission = create_transmission(&mut rng, 100_000, 3, 70_000);
    let receiver = DabReceiver::new(Cursor::new(quantize(&transmission.samples)), DabReceiverSettings::default());
    let (stats, frames) = run_receiver(receiver);

    assert_eq!(stats, DabReceiverStats { total_frames_decoded: 3, total_frames_desync: 0 });
    let prs_start_indices: Vec<usize> = frames.iter().map(|frame| frame.prs_start_index).collect();
    assert_eq!(prs_start_indices, vec![102_656, 299_264, 495_872]);
    assert_eq!(prs_start_indices, transmission.prs_start_indices);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.nb_error_bits, vec![0; 4]);
        assert_eq!(frame.fib_bits, transmission.fib_bits_per_frame[i]);
    }
}

#[test]
fn frame_limit_stops_receiver() {
    let mut rng = StdRng::seed_from_u64(101);
    let transmission = create_transmission(&mut rng, 1000, 3, 70_000);
    let settings = DabReceiverSettings {
        max_frames: Some(1),
        ..Default::default()
    };
    let receiver = DabReceiver::new(Cursor::new(quantize(&transmission.samples)), settings);
    let (stats, frames) = run_receiver(receiver);

    assert_eq!(stats.total_frames_decoded, 1);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].fib_bits, transmission.fib_bits_per_frame[0]);
}

#[test]
fn incomplete_last_frame_is_not_decoded() {
    let mut rng = StdRng::seed_from_u64(102);
    // The input ends while the window after the second frame is being filled
    let transmission = create_transmission(&mut rng, 1000, 3, 0);
    let receiver = DabReceiver::new(Cursor::new(quantize(&transmission.samples)), DabReceiverSettings::default());
    let (stats, frames) = run_receiver(receiver);

    assert_eq!(stats.total_frames_decoded, 2);
    assert!(frames.iter().all(|frame| frame.nb_error_bits == vec![0; 4]));
}

#[test]
fn fine_frequency_offset_is_corrected() {
    let mut rng = StdRng::seed_from_u64(103);
    let mut transmission = create_transmission(&mut rng, 1000, 1, 70_000);
    apply_frequency_offset(&mut transmission.samples, 0.2);
    let receiver = DabReceiver::new(Cursor::new(quantize(&transmission.samples)), DabReceiverSettings::default());
    let (stats, frames) = run_receiver(receiver);

    assert_eq!(stats.total_frames_decoded, 1);
    assert_eq!(frames[0].prs_start_index, transmission.prs_start_indices[0]);
    assert_eq!(frames[0].nb_error_bits, vec![0; 4]);
    assert_eq!(frames[0].fib_bits, transmission.fib_bits_per_frame[0]);
}

#[test]
fn uncorrected_frequency_offset_causes_errors() {
    let mut rng = StdRng::seed_from_u64(104);
    let mut transmission = create_transmission(&mut rng, 1000, 1, 70_000);
    apply_frequency_offset(&mut transmission.samples, 0.2);
    let settings = DabReceiverSettings {
        demodulator: OfdmDemodulatorSettings { frequency_correction_is_enabled: false },
        ..Default::default()
    };
    let receiver = DabReceiver::new(Cursor::new(quantize(&transmission.samples)), settings);
    let (stats, frames) = run_receiver(receiver);

    assert_eq!(stats.total_frames_decoded, 1);
    assert!(frames[0].nb_error_bits.iter().any(|&n| n > 0));
}

#[test]
fn short_input_decodes_nothing() {
    let receiver = DabReceiver::new(Cursor::new(vec![128u8; 1000]), DabReceiverSettings::default());
    let (stats, frames) = run_receiver(receiver);
    assert_eq!(stats, DabReceiverStats::default());
    assert!(frames.is_empty());
}

#[test]
fn truncated_reference_symbol_is_a_desync() {
    // Window starts part way through the only reference symbol
    let mut fft = FftEngine::new(T_U);
    let prs = create_dab_ofdm_phase_reference_symbol(&mut fft);
    let mut samples: Vec<Complex32> = prs[100..].iter().map(|x| *x * SIGNAL_AMPLITUDE).collect();
    samples.extend(std::iter::repeat(Complex32::default()).take(300_000));

    let receiver = DabReceiver::new(Cursor::new(quantize(&samples)), DabReceiverSettings::default());
    let (stats, frames) = run_receiver(receiver);
    assert_eq!(stats, DabReceiverStats { total_frames_decoded: 0, total_frames_desync: 1 });
    assert!(frames.is_empty());
}

#[test]
fn reads_transmission_from_file() {
    let mut rng = StdRng::seed_from_u64(105);
    let transmission = create_transmission(&mut rng, 500, 1, 70_000);
    let filepath = std::env::temp_dir().join(format!("dab_receiver_test_{}.raw", std::process::id()));
    std::fs::write(&filepath, quantize(&transmission.samples)).unwrap();

    let receiver = DabReceiver::open_file(&filepath, DabReceiverSettings::default()).unwrap();
    let (stats, frames) = run_receiver(receiver);
    std::fs::remove_file(&filepath).unwrap();

    assert_eq!(stats.total_frames_decoded, 1);
    assert_eq!(frames[0].prs_start_index, 500 + 2656);
    assert_eq!(frames[0].fib_bits, transmission.fib_bits_per_frame[0]);
}

#[test]
fn missing_file_is_an_error() {
    let filepath = std::env::temp_dir().join("dab_receiver_test_missing_file.raw");
    let result = DabReceiver::open_file(&filepath, DabReceiverSettings::default());
    assert!(matches!(result, Err(DabReceiverError::OpenFile { .. })));
}
