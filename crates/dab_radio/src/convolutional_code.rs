use dab_core::dab_constants::{N_TAPS, N_STATES, N_CONV_OUTPUT};

/// Number of possible input bits.
const N_INPUTS: usize = 2;

// DOC: ETSI EN 300 401
// Referring to clause 11.1.1 - Convolutional code
// The mother code has the octal generator polynomials 133, 171, 145 and 133
// Each row lists the delay taps that are xored with the input bit
const GENERATOR_TAPS: [&[usize]; N_CONV_OUTPUT] = [
    &[1, 2, 4, 5],
    &[0, 1, 2, 5],
    &[0, 3, 5],
    &[1, 2, 4, 5],
];

/// A single edge in the trellis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateTransition {
    pub next_state: usize,
    pub input: u8,
    pub output: [u8; N_CONV_OUTPUT],
}

/// The state machine of the convolutional encoder.
///
/// A state holds the last `N_TAPS` input bits where the most recent bit is the most significant bit.
/// This table is built once and shared read only between decoders.
#[derive(Debug, Clone)]
pub struct ConvolutionalCode {
    pub n_states: usize,
    pub n_conv_output: usize,
    /// Tap j of a state is the input bit from j+1 steps ago.
    bits_per_state: Vec<[u8; N_TAPS]>,
    /// Every state can be entered from exactly two states.
    previous_states_by_state: Vec<[usize; N_INPUTS]>,
    /// Indexed by (state, input bit).
    transitions: Vec<[StateTransition; N_INPUTS]>,
    /// Indexed by (state, next state). Only valid for pairs that share an edge.
    output_by_state_transition: Vec<[u8; N_CONV_OUTPUT]>,
    /// Indexed by (state, next state). Only valid for pairs that share an edge.
    input_by_state_transition: Vec<u8>,
}

impl ConvolutionalCode {
    /// The rate 1/4 mother code with a constraint length of 7 used by DAB.
    pub fn dab() -> Self {
        let mut bits_per_state = vec![[0u8; N_TAPS]; N_STATES];
        for (state, bits) in bits_per_state.iter_mut().enumerate() {
            for (tap, bit) in bits.iter_mut().enumerate() {
                *bit = ((state >> (N_TAPS-1-tap)) & 1) as u8;
            }
        }

        let mut previous_states_by_state = vec![[0usize; N_INPUTS]; N_STATES];
        let mut total_previous_states = vec![0usize; N_STATES];
        let mut transitions = vec![[StateTransition::default(); N_INPUTS]; N_STATES];
        let mut output_by_state_transition = vec![[0u8; N_CONV_OUTPUT]; N_STATES*N_STATES];
        let mut input_by_state_transition = vec![0u8; N_STATES*N_STATES];

        for state in 0..N_STATES {
            for input in 0..N_INPUTS {
                // The input bit is shifted into the most significant end of the register
                let next_state = input*(N_STATES/2) + (state >> 1);
                let input = input as u8;
                let taps = &bits_per_state[state];
                let mut output = [0u8; N_CONV_OUTPUT];
                for (y, generator) in output.iter_mut().zip(GENERATOR_TAPS.iter()) {
                    *y = generator.iter().fold(input, |acc, &tap| acc ^ taps[tap]);
                }

                let slot = &mut total_previous_states[next_state];
                previous_states_by_state[next_state][*slot] = state;
                *slot += 1;

                transitions[state][input as usize] = StateTransition { next_state, input, output };
                output_by_state_transition[state*N_STATES + next_state] = output;
                input_by_state_transition[state*N_STATES + next_state] = input;
            }
        }
        assert!(total_previous_states.iter().all(|&n| n == N_INPUTS), "Every state must have exactly two predecessors");

        Self {
            n_states: N_STATES,
            n_conv_output: N_CONV_OUTPUT,
            bits_per_state,
            previous_states_by_state,
            transitions,
            output_by_state_transition,
            input_by_state_transition,
        }
    }

    pub fn bits_per_state(&self, state: usize) -> &[u8; N_TAPS] {
        &self.bits_per_state[state]
    }

    /// States that can transition into this state, in ascending order.
    pub fn previous_states(&self, state: usize) -> &[usize; N_INPUTS] {
        &self.previous_states_by_state[state]
    }

    pub fn transition(&self, state: usize, input: u8) -> &StateTransition {
        &self.transitions[state][input as usize]
    }

    pub fn next_state(&self, state: usize, input: u8) -> usize {
        self.transition(state, input).next_state
    }

    pub fn output_by_state_transition(&self, state: usize, next_state: usize) -> &[u8; N_CONV_OUTPUT] {
        &self.output_by_state_transition[state*self.n_states + next_state]
    }

    pub fn input_by_state_transition(&self, state: usize, next_state: usize) -> u8 {
        self.input_by_state_transition[state*self.n_states + next_state]
    }

    /// Runs the encoder from the zero state. The caller appends the zero tail bits if needed.
    pub fn encode(&self, bits: &[u8], codeword: &mut [u8]) {
        assert!(codeword.len() == bits.len()*self.n_conv_output, "Codeword must have {} bits but got {}", bits.len()*self.n_conv_output, codeword.len());
        let mut state = 0;
        for (&bit, y) in bits.iter().zip(codeword.chunks_exact_mut(self.n_conv_output)) {
            let transition = self.transition(state, bit & 1);
            y.copy_from_slice(&transition.output);
            state = transition.next_state;
        }
    }
}
