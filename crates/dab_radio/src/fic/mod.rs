pub mod fic_decoder;
pub mod fic_puncture;
