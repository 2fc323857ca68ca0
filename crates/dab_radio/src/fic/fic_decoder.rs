use std::sync::Arc;
use tracing::debug;
use crate::convolutional_code::ConvolutionalCode;
use crate::dab_radio_parameters::{DabRadioParameters, get_dab_radio_parameters};
use crate::viterbi_decoder::ViterbiDecoder;
use super::fic_puncture::{depuncture, FIC_PUNCTURING_MASK};

/// Decoded contents of the FIC that belong to one common interleaved frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FicBlock {
    /// Concatenated bits of the fast information blocks.
    pub bits: Vec<u8>,
    /// Number of received bits that disagree with the decoded path.
    pub nb_error_bits: usize,
}

/// Channel decoder for the fast information channel (FIC).
pub struct FicDecoder {
    params: DabRadioParameters,
    viterbi: ViterbiDecoder,
    depunctured_buffer: Vec<u8>,
    decoded_buffer: Vec<u8>,
    blocks: Vec<FicBlock>,
}

impl FicDecoder {
    pub fn new(code: Arc<ConvolutionalCode>) -> Self {
        let params = get_dab_radio_parameters();
        let viterbi = ViterbiDecoder::new(code, params.nb_bits_per_fic_codeword);
        let decoded_buffer = vec![0u8; viterbi.nb_decoded_bits()];
        let blocks = (0..params.nb_cifs_in_msc)
            .map(|_| FicBlock {
                bits: vec![0u8; params.nb_decoded_bits_per_fic_block],
                nb_error_bits: 0,
            })
            .collect();

        Self {
            params,
            viterbi,
            depunctured_buffer: vec![0u8; params.nb_bits_per_fic_codeword],
            decoded_buffer,
            blocks,
        }
    }

    /// Decodes the FIC from the hard decision bits of all data symbols in a frame.
    ///
    /// The bits of the FIC symbols are read as one stream and split evenly into a block per CIF.
    pub fn decode(&mut self, hard_bits: &[u8]) -> &[FicBlock] {
        assert!(hard_bits.len() == self.params.nb_bits_per_frame, "Frame must have {} bits but got {}", self.params.nb_bits_per_frame, hard_bits.len());

        let fic_bits = &hard_bits[..self.params.nb_bits_in_fic];
        let nb_fib_bits = self.params.nb_decoded_bits_per_fic_block;
        for (index, (raw, block)) in fic_bits.chunks_exact(self.params.nb_bits_per_fic_block).zip(self.blocks.iter_mut()).enumerate() {
            depuncture(raw, &mut self.depunctured_buffer);
            let nb_error_bits = self.viterbi.run(&self.depunctured_buffer, &FIC_PUNCTURING_MASK, &mut self.decoded_buffer);
            // The remaining decoded bits are the zero tail that flushes the encoder
            block.bits.copy_from_slice(&self.decoded_buffer[..nb_fib_bits]);
            block.nb_error_bits = nb_error_bits;
            debug!(block = index, nb_error_bits, "Decoded FIC block");
        }
        &self.blocks
    }

    pub fn blocks(&self) -> &[FicBlock] {
        &self.blocks
    }
}
