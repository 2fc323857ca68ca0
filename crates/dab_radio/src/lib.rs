pub mod convolutional_code;
pub mod dab_radio_parameters;
pub mod fic;
pub mod viterbi_decoder;
