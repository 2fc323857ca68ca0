pub mod fft_engine;
pub mod frame_synchronizer;
pub mod ofdm_demodulator;
pub mod ofdm_parameters;
