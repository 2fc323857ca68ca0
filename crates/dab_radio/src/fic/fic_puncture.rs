use lazy_static::lazy_static;
use dab_core::dab_constants::{L_CONV_CODEWORD, N_RAW_FIC_BLOCK_BITS};

// DOC: ETSI EN 300 401
// Referring to clause 11.1.2 - Puncturing procedure
// Each puncturing vector covers 8 steps of the 4 output mother code
const PI_16: [u8; 32] = [
    1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0,
];
const PI_15: [u8; 32] = [
    1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,1,0, 1,1,0,0,
];
/// Applied to the 24 bits produced by the 6 tail bits.
const PI_X: [u8; 24] = [
    1,1,0,0, 1,1,0,0, 1,1,0,0, 1,1,0,0, 1,1,0,0, 1,1,0,0,
];

/// Each block is made of 4 consecutive puncturing vectors.
const NB_VECTORS_PER_BLOCK: usize = 4;

// Referring to clause 11.2.1 - Fast Information Channel
// The first 21 blocks use PI=16 and the remaining 3 blocks use PI=15
const FIC_PUNCTURING_SCHEDULE: [(usize, &[u8]); 3] = [
    (21*NB_VECTORS_PER_BLOCK, &PI_16),
    (3*NB_VECTORS_PER_BLOCK, &PI_15),
    (1, &PI_X),
];

lazy_static! {
    /// Marks the bits of the FIC mother codeword that are transmitted with a 1.
    pub static ref FIC_PUNCTURING_MASK: Vec<u8> = create_fic_puncturing_mask();
}

/// Expands the punctured bits of a FIC block back into its mother codeword.
/// Punctured positions are set to 0.
pub fn depuncture(raw: &[u8], depunctured: &mut [u8]) {
    assert!(raw.len() == N_RAW_FIC_BLOCK_BITS, "Punctured FIC block has {} bits but expected {}", raw.len(), N_RAW_FIC_BLOCK_BITS);
    assert!(depunctured.len() == L_CONV_CODEWORD, "Depunctured FIC block has {} bits but expected {}", depunctured.len(), L_CONV_CODEWORD);

    let mut raw_bits = raw.iter();
    let mut output_bits = depunctured.iter_mut();
    for (nb_repeats, vector) in FIC_PUNCTURING_SCHEDULE {
        for _ in 0..nb_repeats {
            for (&keep, y) in vector.iter().zip(output_bits.by_ref()) {
                *y = match keep {
                    1 => raw_bits.next().copied().unwrap_or(0),
                    _ => 0,
                };
            }
        }
    }
}

pub fn create_fic_puncturing_mask() -> Vec<u8> {
    let ones = vec![1u8; N_RAW_FIC_BLOCK_BITS];
    let mut mask = vec![0u8; L_CONV_CODEWORD];
    depuncture(&ones, &mut mask);
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_covers_codeword() {
        let total_bits: usize = FIC_PUNCTURING_SCHEDULE.iter().map(|(n, v)| n*v.len()).sum();
        let total_kept: usize = FIC_PUNCTURING_SCHEDULE.iter()
            .map(|(n, v)| n*v.iter().filter(|&&b| b == 1).count())
            .sum();
        assert_eq!(total_bits, L_CONV_CODEWORD);
        assert_eq!(total_kept, N_RAW_FIC_BLOCK_BITS);
    }

    #[test]
    fn mask_is_depunctured_ones() {
        let mask = &*FIC_PUNCTURING_MASK;
        assert_eq!(mask.len(), L_CONV_CODEWORD);
        assert_eq!(mask.iter().filter(|&&b| b == 1).count(), N_RAW_FIC_BLOCK_BITS);
        assert_eq!(&mask[..8], &[1,1,1,0,1,1,1,0]);
        // Last vector of the PI=15 blocks
        let pi_15_end = 24*NB_VECTORS_PER_BLOCK*32;
        assert_eq!(&mask[pi_15_end-4..pi_15_end], &[1,1,0,0]);
        assert_eq!(&mask[pi_15_end..], &PI_X);
    }

    #[test]
    fn depuncture_places_bits_in_order() {
        let raw: Vec<u8> = (0..N_RAW_FIC_BLOCK_BITS).map(|i| (i % 2) as u8).collect();
        let mut depunctured = vec![1u8; L_CONV_CODEWORD];
        depuncture(&raw, &mut depunctured);

        let kept: Vec<u8> = depunctured.iter()
            .zip(FIC_PUNCTURING_MASK.iter())
            .filter(|(_, &m)| m == 1)
            .map(|(&x, _)| x)
            .collect();
        assert_eq!(kept, raw);
        assert!(depunctured.iter().zip(FIC_PUNCTURING_MASK.iter()).filter(|(_, &m)| m == 0).all(|(&x, _)| x == 0));
    }
}
