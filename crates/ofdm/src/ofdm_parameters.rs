/// OFDM is orthogonal frequency division multiplexing.
/// Describes the structure of an OFDM frame.
/// Frame consists of one NULL symbol and N data symbols.
/// The phase reference symbol (PRS) is the first data symbol.
///
/// # Diagram
/// ```text
/// | Frame                  |
/// | NULL | SYM*N           |
/// | NULL | PRS | SYM*(N-1) |
/// ```
///
/// The demodulator only ever sees the N symbols starting at the PRS.
/// After demodulation using differential quadrature phase shift keying, we end up with N-1 data symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfdmParameters {
    /// Number of OFDM symbols in a transmission frame, including the PRS.
    pub nb_symbols: usize,
    /// Duration of NULL symbol.
    pub nb_null_period: usize,
    /// Duration of OFDM symbol.
    pub nb_symbol_period: usize,
    /// Duration of cyclic prefix in OFDM symbol.
    pub nb_cyclic_prefix: usize,
    /// Duration of FFT in OFDM symbol.
    pub nb_fft: usize,
    /// Number of FFT bins that are data carriers centered around DC.
    pub nb_fft_data_carriers: usize,
    /// Number of differential QPSK (quadrature phase shift key) symbols.
    pub nb_dqpsk_symbols: usize,
    /// Duration of the entire transmission frame including the NULL symbol.
    pub nb_frame_period: usize,
    /// Number of complex samples from the start of the PRS to the end of the frame.
    pub nb_frame_samples: usize,
    /// Number of output hard decision bits.
    pub nb_output_bits: usize,
}

impl OfdmParameters {
    /// Creates all derived parameters for OFDM from a required subset.
    pub fn new(
        nb_symbols: usize,
        nb_null_period: usize,
        nb_symbol_period: usize,
        nb_fft: usize,
        nb_fft_data_carriers: usize,
    ) -> Self
    {
        assert!(nb_symbols >= 2, "Number of symbols must be at least 2 due to differential QPSK encoding");
        assert!(nb_symbol_period >= nb_fft, "Number of samples in symbol is less than FFT resolution");
        assert!(nb_fft > nb_fft_data_carriers, "Number of data carriers is limited to FFT resolution excluding DC");
        assert!(nb_fft_data_carriers % 2 == 0, "Data carriers must be evenly split around DC");

        let nb_cyclic_prefix = nb_symbol_period - nb_fft;
        let nb_frame_samples = nb_symbol_period*nb_symbols;
        let nb_frame_period = nb_null_period + nb_frame_samples;
        let nb_dqpsk_symbols = nb_symbols-1;
        let nb_output_bits = nb_dqpsk_symbols*nb_fft_data_carriers*2;

        Self {
            nb_symbols,
            nb_null_period,
            nb_symbol_period,
            nb_cyclic_prefix,
            nb_fft,
            nb_fft_data_carriers,
            nb_dqpsk_symbols,
            nb_frame_period,
            nb_frame_samples,
            nb_output_bits,
        }
    }

    /// Number of hard decision bits produced for each DQPSK symbol.
    pub fn nb_bits_per_symbol(&self) -> usize {
        self.nb_fft_data_carriers*2
    }
}
