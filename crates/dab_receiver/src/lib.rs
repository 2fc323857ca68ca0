pub mod dab_receiver;
pub mod raw_iq_reader;
