use dab_core::dab_constants::{
    N_DATA_SYMBOLS, N_FIC_SYMBOLS, N_MSC_SYMBOLS, N_FIBS_IN_FIC, N_CIFS, N_RAW_SYMBOL_BITS,
    N_BITS_PER_FIB, N_FIB_BITS, N_RAW_FIC_BLOCK_BITS, L_CONV_CODEWORD,
};

/// Parameters describing the digital audio broadcast (DAB) ensemble
///
/// # Common acronyms
/// | Acronym | Phrase | Description |
/// | ------- | ------ | ----------- |
/// | SYM | Orthogonal Frequency Division Multiplexing Symbol | An OFDM symbol consists of multiple complex symbols transmitted at different subcarrier frequencies at the same time. |
/// | FIC | Fast Information Channel | Carries metadata about the ensemble's structure including channel descriptons. |
/// | MSC | Main Service Channel | Carries radio data for the ensemble. This includes audio data for each channel and slideshows. |
/// | CIF | Common Interleaved Frame | The main service channel is transmitted as a series of interleaved frames that need to be deinterleaved. |
/// | FIB | Fast Information Block | The fast information channel is transmitted as groups of consecutive blocks. |
///
/// # Diagram of DAB frame
/// This is the frame of a mode I transmission after DQPSK demodulation.
/// ```text
/// | Frame              |
/// | SYM*75             |
/// | SYM*3     | SYM*72 |
/// | FIC       | MSC    |
/// | [FIB*3]*4 | CIF*4  |
/// ```
/// Each group of 3 FIBs is convolutionally encoded and punctured into one FIC block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DabRadioParameters {
    /// Number of data symbols for each frame.
    pub nb_symbols: usize,
    /// Number of symbols for the fast information channel (FIC).
    pub nb_fic_symbols: usize,
    /// Number of symbols for the main service channel (MSC).
    pub nb_msc_symbols: usize,
    /// Number of fast information blocks (FIB) in the FIC
    pub nb_fibs_in_fic: usize,
    /// Number of common interleaved frames (CIF) in the MSC.
    pub nb_cifs_in_msc: usize,
    /// Number of bits per symbol
    pub nb_bits_per_symbol: usize,
    /// Number of bits in each frame.
    pub nb_bits_per_frame: usize,
    /// Number of bits in FIC.
    pub nb_bits_in_fic: usize,
    /// Number of bits per FIB
    pub nb_bits_per_fib: usize,
    /// Number of punctured bits in each FIC block.
    pub nb_bits_per_fic_block: usize,
    /// Number of bits in each FIC block after depuncturing.
    pub nb_bits_per_fic_codeword: usize,
    /// Number of FIB bits carried by each FIC block.
    pub nb_decoded_bits_per_fic_block: usize,
}

/// Returns useful parameters used in DAB digital decoding for transmission mode I
pub fn get_dab_radio_parameters() -> DabRadioParameters {
    let nb_symbols = N_DATA_SYMBOLS;
    let nb_fic_symbols = N_FIC_SYMBOLS;
    let nb_msc_symbols = N_MSC_SYMBOLS;
    let nb_fibs_in_fic = N_FIBS_IN_FIC;
    let nb_cifs_in_msc = N_CIFS;
    let nb_bits_per_symbol = N_RAW_SYMBOL_BITS;
    let nb_bits_per_frame = nb_bits_per_symbol*nb_symbols;
    let nb_bits_in_fic = nb_fic_symbols*nb_bits_per_symbol;
    let nb_bits_per_fib = N_BITS_PER_FIB;
    let nb_bits_per_fic_block = nb_bits_in_fic/nb_cifs_in_msc;
    let nb_bits_per_fic_codeword = L_CONV_CODEWORD;
    let nb_decoded_bits_per_fic_block = N_FIB_BITS;

    assert!(nb_symbols == (nb_fic_symbols + nb_msc_symbols), "Number of data symbols in frame doesn't match number of FIC and MSC symbols");
    assert!(nb_fibs_in_fic % nb_cifs_in_msc == 0, "The number of FIBs in the FIC must be a multiple of the number of CIFs in the MSC.");
    assert!(nb_bits_per_fic_block == N_RAW_FIC_BLOCK_BITS);
    assert!(nb_decoded_bits_per_fic_block == (nb_fibs_in_fic/nb_cifs_in_msc)*nb_bits_per_fib);

    DabRadioParameters {
        nb_symbols,
        nb_fic_symbols,
        nb_msc_symbols,
        nb_fibs_in_fic,
        nb_cifs_in_msc,
        nb_bits_per_symbol,
        nb_bits_per_frame,
        nb_bits_in_fic,
        nb_bits_per_fib,
        nb_bits_per_fic_block,
        nb_bits_per_fic_codeword,
        nb_decoded_bits_per_fic_block,
    }
}
