//! Constants of a DAB transmission mode I signal sampled at 2.048MHz.
//!
//! # Diagram of DAB frame
//! ```text
//! | Frame (T_F)                                |
//! | NULL (T_NULL) | SYM*76 (T_F_U)             |
//! | NULL          | PRS | SYM*3 FIC | SYM*72 MSC |
//! ```
//!
//! Each OFDM symbol is `T_S = T_G + T_U` samples, a cyclic prefix followed by the useful part.

// DOC: ETSI EN 300 401
// Referring to clause 14.2 - Transmission frame
// Table 38 lists the parameters for each transmission mode

/// Number of useful carriers of an OFDM symbol.
pub const N_CARRIERS: usize = 1_536;

/// Minimum discrete frequency.
pub const K_MIN: i32 = -768;

/// Maximum discrete frequency.
pub const K_MAX: i32 = 768;

/// Number of OFDM symbols after the NULL symbol.
pub const N_OFDM_SYMBOLS: usize = 76;

/// The phase reference symbol carries no data so there is one less symbol after DQPSK.
pub const N_DATA_SYMBOLS: usize = N_OFDM_SYMBOLS - 1;

/// Length of a transmission frame including the NULL symbol.
pub const T_F: usize = 196_608;

/// Length of the NULL symbol.
pub const T_NULL: usize = 2_656;

/// Length of a transmission frame without the NULL symbol.
pub const T_F_U: usize = T_F - T_NULL;

/// Useful length of an OFDM symbol. This is also the FFT size.
pub const T_U: usize = 2_048;

/// Length of the guard interval (cyclic prefix).
pub const T_G: usize = 504;

/// Length of one OFDM symbol.
pub const T_S: usize = T_U + T_G;

/// Smallest power of two that fits one frame and one symbol.
/// This is the FFT size used to correlate the received signal against the phase reference symbol.
pub const T_F_FFT: usize = 262_144;

/// Number of symbols for the fast information channel (FIC).
pub const N_FIC_SYMBOLS: usize = 3;

/// Number of symbols for the main service channel (MSC).
pub const N_MSC_SYMBOLS: usize = 72;

/// Each QPSK carrier holds two bits.
pub const N_BITS_PER_CARRIER: usize = 2;

/// Number of raw bits per OFDM data symbol.
pub const N_RAW_SYMBOL_BITS: usize = N_CARRIERS * N_BITS_PER_CARRIER;

/// Number of common interleaved frames (CIF) per transmission frame.
pub const N_CIFS: usize = 4;

/// Number of raw bits in the FIC associated with one CIF.
pub const N_RAW_FIC_BLOCK_BITS: usize = (N_FIC_SYMBOLS * N_RAW_SYMBOL_BITS) / N_CIFS;

/// Number of fast information blocks (FIB) in the FIC.
pub const N_FIBS_IN_FIC: usize = 12;

/// Number of bits in a single FIB.
pub const N_BITS_PER_FIB: usize = 256;

/// Number of delay elements of the convolutional encoder.
pub const N_TAPS: usize = 6;

/// Number of states the convolutional encoder can be in.
pub const N_STATES: usize = 1 << N_TAPS;

/// Number of bits the convolutional encoder produces for every input bit.
pub const N_CONV_OUTPUT: usize = 4;

/// Number of data bits of the FIC associated with one CIF before convolutional encoding.
pub const N_FIB_BITS: usize = (N_FIBS_IN_FIC / N_CIFS) * N_BITS_PER_FIB;

/// Length of the mother codeword. The encoder is flushed with `N_TAPS` zero bits.
pub const L_CONV_CODEWORD: usize = N_CONV_OUTPUT * (N_FIB_BITS + N_TAPS);

const _: () = assert!(T_F_U == N_OFDM_SYMBOLS * T_S, "Frame length doesn't match number of symbols");
const _: () = assert!(T_F_FFT >= T_F_U + T_S, "Correlation FFT cannot fit a frame and a symbol");
const _: () = assert!(T_F_FFT.is_power_of_two());
const _: () = assert!(N_DATA_SYMBOLS == N_FIC_SYMBOLS + N_MSC_SYMBOLS, "Number of data symbols doesn't match number of FIC and MSC symbols");
const _: () = assert!(N_CARRIERS == (K_MAX - K_MIN) as usize, "Carriers are centered around an unused DC bin");
const _: () = assert!(N_FIBS_IN_FIC % N_CIFS == 0, "The number of FIBs in the FIC must be a multiple of the number of CIFs");
