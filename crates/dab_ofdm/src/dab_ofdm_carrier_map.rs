use lazy_static::lazy_static;
use dab_core::dab_constants::{N_CARRIERS, T_U};

lazy_static! {
    /// Frequency deinterleaving table for mode I where carrier n was transmitted on carrier k_by_n[n].
    pub static ref DAB_OFDM_CARRIER_MAP: Vec<usize> = {
        let mut carrier_map = vec![0usize; N_CARRIERS];
        get_dab_ofdm_carrier_map(&mut carrier_map, T_U);
        carrier_map
    };
}

/// Creates the frequency interleaving lookup table of a DAB transmission used in OFDM.
///
/// Carriers are indexed in natural frequency order, i.e. `-F..-1` followed by `1..F`
/// which is the order produced by the OFDM demodulator.
pub fn get_dab_ofdm_carrier_map(carrier_map: &mut [usize], total_fft: usize) {
    // DOC: ETSI EN 300 401
    // Referring to clause 14.6 - Frequency interleaving
    // Before the OFDM symbol is sent for packing, the order of the carriers are scrambled
    // This is done so that selective fading doesn't destroy contiguous parts of the OFDM symbol bits
    let total_carriers = carrier_map.len();
    assert!(total_carriers > 0);
    assert!(total_fft % 4 == 0, "FFT length must be a multiple of 4");
    assert!(total_carriers % 2 == 0, "Carriers must be evenly split around DC");
    assert!(total_carriers < total_fft, "Number of requested carriers must be less than the total fft bins");

    let fft_index_dc = total_fft/2;
    let fft_index_start = fft_index_dc - total_carriers/2;
    let fft_index_end   = fft_index_dc + total_carriers/2;

    // Referring to clause 14.6.1
    // PI(i) = (13*PI(i-1) + K/4 - 1) mod K, where PI(0) = 0 and K is the FFT size
    // This is a 1 to 1 mapping over the FFT bins with the DC bin at K/2
    let k_quarter = total_fft/4;
    let mut n: usize = 0;
    let mut pi_value: usize = 0;
    for _ in 0..total_fft {
        pi_value = (13*pi_value + k_quarter - 1) % total_fft;

        // We are only interested in the FFT bins that we transmit in the OFDM symbol
        // -F <= k <= F where k =/= 0
        if pi_value < fft_index_start || pi_value > fft_index_end || pi_value == fft_index_dc {
            continue;
        }

        // NOTE: We ignore the DC bin so we shift the bins above DC down by one
        let carrier_index = if pi_value < fft_index_dc {
            pi_value - fft_index_start
        } else {
            pi_value - fft_index_start - 1
        };
        carrier_map[n] = carrier_index;
        n += 1;
    }
    assert!(n == total_carriers, "Interleaver produced {} carriers but expected {}", n, total_carriers);
}
