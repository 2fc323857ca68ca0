use ofdm::ofdm_parameters::OfdmParameters;
use dab_core::dab_constants::{N_OFDM_SYMBOLS, T_NULL, T_S, T_U, N_CARRIERS, T_F, T_F_U};

/// The OFDM parameters of a DAB transmission mode I signal.
pub fn get_dab_ofdm_parameters() -> OfdmParameters {
    let params = OfdmParameters::new(
        N_OFDM_SYMBOLS,
        T_NULL,
        T_S,
        T_U,
        N_CARRIERS,
    );
    assert!(params.nb_frame_period == T_F, "Frame period doesn't match the transmission frame");
    assert!(params.nb_frame_samples == T_F_U, "Frame samples don't match the frame without the NULL symbol");
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use dab_core::dab_constants::{T_G, N_DATA_SYMBOLS, N_RAW_SYMBOL_BITS};

    #[test]
    fn derived_parameters_match_standard() {
        let params = get_dab_ofdm_parameters();
        assert_eq!(params.nb_cyclic_prefix, T_G);
        assert_eq!(params.nb_dqpsk_symbols, N_DATA_SYMBOLS);
        assert_eq!(params.nb_bits_per_symbol(), N_RAW_SYMBOL_BITS);
        assert_eq!(params.nb_output_bits, N_DATA_SYMBOLS*N_RAW_SYMBOL_BITS);
    }
}
