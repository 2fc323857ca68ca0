use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use num::complex::Complex32;
use thiserror::Error;
use tracing::{debug, info, warn};
use ofdm::fft_engine::FftEngine;
use ofdm::frame_synchronizer::FrameSynchronizer;
use ofdm::ofdm_demodulator::{OfdmDemodulator, OfdmDemodulatorSettings};
use dab_core::dab_constants::{T_F_FFT, T_F_U, T_U};
use dab_ofdm::dab_ofdm_carrier_map::DAB_OFDM_CARRIER_MAP;
use dab_ofdm::dab_ofdm_parameters::get_dab_ofdm_parameters;
use dab_ofdm::dab_ofdm_phase_reference_symbol::create_dab_ofdm_phase_reference_symbol;
use dab_radio::convolutional_code::ConvolutionalCode;
use dab_radio::fic::fic_decoder::{FicBlock, FicDecoder};
use crate::raw_iq_reader::RawIqReader;

#[derive(Error, Debug)]
pub enum DabReceiverError {
    #[error("failed to open input file {path}: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DabReceiverSettings {
    /// Stop after this many frames have been decoded.
    pub max_frames: Option<usize>,
    pub demodulator: OfdmDemodulatorSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DabReceiverStats {
    pub total_frames_decoded: usize,
    /// Number of times the synchroniser failed to find a usable frame start.
    pub total_frames_desync: usize,
}

/// Results of a single decoded transmission frame.
#[derive(Debug, Clone)]
pub struct FrameReport<'a> {
    pub frame_index: usize,
    /// Sample index of the start of the phase reference symbol since the start of the stream.
    pub prs_start_index: usize,
    /// Sample index of the start of the phase reference symbol in the search window.
    pub prs_offset: usize,
    /// Average fractional frequency offset in units of FFT bins.
    pub frequency_offset: f32,
    pub fic_blocks: &'a [FicBlock],
}

impl FrameReport<'_> {
    pub fn fic_block_errors(&self) -> impl Iterator<Item = usize> + '_ {
        self.fic_blocks.iter().map(|block| block.nb_error_bits)
    }
}

/// Receives DAB transmission frames from a stream of raw I/Q samples and decodes the FIC.
///
/// # Diagram
/// ```text
/// | Window (T_F_FFT)                            |
/// | ... | PRS | SYM*75 (frame T_F_U) | leftover |
/// ```
/// After each frame the leftover samples are moved to the start of the window and the rest is refilled.
pub struct DabReceiver<R: Read> {
    pub settings: DabReceiverSettings,
    reader: RawIqReader<R>,
    frame_synchronizer: FrameSynchronizer,
    ofdm_demodulator: OfdmDemodulator,
    fic_decoder: FicDecoder,
    window_buffer: Vec<Complex32>,
    /// Sample index of the start of the window since the start of the stream.
    window_start_index: usize,
    frame_buffer: Vec<Complex32>,
    hard_bits_buffer: Vec<u8>,
    stats: DabReceiverStats,
    frame_callbacks: Vec<Box<dyn FnMut(&FrameReport<'_>) + Send + Sync + 'static>>,
}

impl DabReceiver<File> {
    pub fn open_file(filepath: impl AsRef<Path>, settings: DabReceiverSettings) -> Result<Self, DabReceiverError> {
        let filepath = filepath.as_ref();
        let file = File::open(filepath).map_err(|source| DabReceiverError::OpenFile {
            path: filepath.display().to_string(),
            source,
        })?;
        Ok(Self::new(file, settings))
    }
}

impl<R: Read> DabReceiver<R> {
    pub fn new(reader: R, settings: DabReceiverSettings) -> Self {
        let params = get_dab_ofdm_parameters();
        let mut fft = FftEngine::new(T_U);
        let prs = create_dab_ofdm_phase_reference_symbol(&mut fft);
        let frame_synchronizer = FrameSynchronizer::new(&params, &prs, T_F_FFT);
        let mut ofdm_demodulator = OfdmDemodulator::new(&params, &DAB_OFDM_CARRIER_MAP);
        ofdm_demodulator.settings = settings.demodulator.clone();
        let fic_decoder = FicDecoder::new(Arc::new(ConvolutionalCode::dab()));

        Self {
            settings,
            reader: RawIqReader::new(reader),
            frame_synchronizer,
            ofdm_demodulator,
            fic_decoder,
            window_buffer: vec![Complex32::default(); T_F_FFT],
            window_start_index: 0,
            frame_buffer: vec![Complex32::default(); T_F_U],
            hard_bits_buffer: vec![0u8; params.nb_output_bits],
            stats: DabReceiverStats::default(),
            frame_callbacks: vec![],
        }
    }

    /// Registers a callback for every successfully decoded frame.
    pub fn subscribe_frame(&mut self, callback: impl FnMut(&FrameReport<'_>) + Send + Sync + 'static) {
        self.frame_callbacks.push(Box::new(callback));
    }

    pub fn stats(&self) -> DabReceiverStats {
        self.stats
    }

    /// Decodes frames until the input ends or the frame limit is reached.
    pub fn run(&mut self) -> DabReceiverStats {
        let nb_window = self.window_buffer.len();
        self.reader.read(&mut self.window_buffer, 0, nb_window);
        if self.reader.is_end_reached() {
            warn!(nb_window, "Input doesn't contain enough data for a single search window");
            return self.stats;
        }

        while !self.is_frame_limit_reached() {
            let prs_offset = match self.frame_synchronizer.locate(&self.window_buffer) {
                Ok(prs_offset) => prs_offset,
                Err(err) => {
                    self.stats.total_frames_desync += 1;
                    warn!(%err, window_start_index = self.window_start_index, "Failed to synchronise to frame");
                    self.advance_window(T_F_U);
                    if self.reader.is_end_reached() {
                        break;
                    }
                    continue;
                },
            };

            self.read_frame(prs_offset);
            if self.reader.is_end_reached() {
                break;
            }
            self.process_frame(prs_offset);

            self.advance_window(prs_offset + T_F_U);
            if self.reader.is_end_reached() {
                break;
            }
        }

        info!(
            total_frames_decoded = self.stats.total_frames_decoded,
            total_frames_desync = self.stats.total_frames_desync,
            "Finished receiving",
        );
        self.stats
    }

    fn is_frame_limit_reached(&self) -> bool {
        match self.settings.max_frames {
            Some(max_frames) => self.stats.total_frames_decoded >= max_frames,
            None => false,
        }
    }

    /// Copies the frame out of the window and continues from the input if it crosses the end of the window.
    fn read_frame(&mut self, prs_offset: usize) {
        let nb_frame = self.frame_buffer.len();
        let nb_from_window = nb_frame.min(self.window_buffer.len() - prs_offset);
        self.frame_buffer[..nb_from_window].copy_from_slice(&self.window_buffer[prs_offset..prs_offset+nb_from_window]);
        if nb_from_window < nb_frame {
            self.reader.read(&mut self.frame_buffer, nb_from_window, nb_frame);
        }
    }

    fn process_frame(&mut self, prs_offset: usize) {
        let prs_start_index = self.window_start_index + prs_offset;
        self.ofdm_demodulator.process(&mut self.frame_buffer, &mut self.hard_bits_buffer);
        let fic_blocks = self.fic_decoder.decode(&self.hard_bits_buffer);

        let report = FrameReport {
            frame_index: self.stats.total_frames_decoded,
            prs_start_index,
            prs_offset,
            frequency_offset: self.ofdm_demodulator.average_frequency_offset,
            fic_blocks,
        };
        debug!(
            frame = report.frame_index,
            prs_start_index,
            prs_offset,
            peak_index = self.frame_synchronizer.last_peak_index,
            peak_value = self.frame_synchronizer.last_peak_value,
            "Decoded frame",
        );
        for callback in &mut self.frame_callbacks {
            callback(&report);
        }
        self.stats.total_frames_decoded += 1;
    }

    /// Moves the window forward by the number of consumed samples.
    /// Consumed samples past the end of the window must have been read already.
    fn advance_window(&mut self, nb_consumed: usize) {
        let nb_window = self.window_buffer.len();
        if nb_consumed < nb_window {
            let nb_leftover = nb_window - nb_consumed;
            self.window_buffer.copy_within(nb_consumed.., 0);
            self.reader.read(&mut self.window_buffer, nb_leftover, nb_window);
        } else {
            self.reader.read(&mut self.window_buffer, 0, nb_window);
        }
        self.window_start_index += nb_consumed;
    }
}
