use std::sync::Arc;
use crate::convolutional_code::ConvolutionalCode;

/// Accumulated error metric of a state that cannot be reached.
const METRIC_UNREACHABLE: u32 = u32::MAX;

/// Hard decision maximum likelihood decoder for a terminated convolutional codeword.
///
/// The encoder is assumed to start in state 0.
/// The path metric is the number of received bits that differ from the bits the path would have produced.
/// Bits removed by puncturing are skipped.
pub struct ViterbiDecoder {
    code: Arc<ConvolutionalCode>,
    nb_codeword_bits: usize,
    /// Number of trellis columns including the initial state.
    nb_time_steps: usize,
    /// Accumulated metric indexed by (time, state).
    path_metrics: Vec<u32>,
    best_states: Vec<usize>,
}

impl ViterbiDecoder {
    pub fn new(code: Arc<ConvolutionalCode>, nb_codeword_bits: usize) -> Self {
        assert!(nb_codeword_bits % code.n_conv_output == 0, "Codeword length {} must be a multiple of {}", nb_codeword_bits, code.n_conv_output);
        let nb_time_steps = nb_codeword_bits/code.n_conv_output + 1;
        let path_metrics = vec![METRIC_UNREACHABLE; code.n_states*nb_time_steps];
        Self {
            code,
            nb_codeword_bits,
            nb_time_steps,
            path_metrics,
            best_states: vec![0; nb_time_steps],
        }
    }

    /// Number of bits the decoder writes for each codeword.
    pub fn nb_decoded_bits(&self) -> usize {
        self.nb_time_steps-1
    }

    /// Decodes the depunctured codeword and returns the number of error bits on the chosen path.
    ///
    /// A 1 in the puncturing mask marks a transmitted bit.
    pub fn run(&mut self, received: &[u8], puncturing_mask: &[u8], decoded: &mut [u8]) -> usize {
        assert!(received.len() == self.nb_codeword_bits, "Received codeword has {} bits but expected {}", received.len(), self.nb_codeword_bits);
        assert!(puncturing_mask.len() == self.nb_codeword_bits, "Puncturing mask has {} bits but expected {}", puncturing_mask.len(), self.nb_codeword_bits);
        assert!(decoded.len() == self.nb_decoded_bits(), "Decoded buffer has {} bits but expected {}", decoded.len(), self.nb_decoded_bits());

        self.update_path_metrics(received, puncturing_mask);
        let metric = self.traceback();

        for (time, bit) in decoded.iter_mut().enumerate() {
            *bit = self.code.input_by_state_transition(self.best_states[time], self.best_states[time+1]);
        }
        metric as usize
    }

    fn update_path_metrics(&mut self, received: &[u8], puncturing_mask: &[u8]) {
        let code = &self.code;
        let n_states = code.n_states;
        let n_output = code.n_conv_output;

        self.path_metrics.fill(METRIC_UNREACHABLE);
        self.path_metrics[0] = 0;

        for time in 1..self.nb_time_steps {
            let symbol = &received[(time-1)*n_output..time*n_output];
            let mask = &puncturing_mask[(time-1)*n_output..time*n_output];
            let (previous, current) = self.path_metrics.split_at_mut(time*n_states);
            let previous = &previous[(time-1)*n_states..];
            let current = &mut current[..n_states];

            for (state, metric) in current.iter_mut().enumerate() {
                let mut best = METRIC_UNREACHABLE;
                for &previous_state in code.previous_states(state) {
                    let previous_metric = previous[previous_state];
                    if previous_metric == METRIC_UNREACHABLE {
                        continue;
                    }
                    let output = code.output_by_state_transition(previous_state, state);
                    let distance = symbol.iter()
                        .zip(output.iter())
                        .zip(mask.iter())
                        .filter(|((&x, &y), &m)| m == 1 && x != y)
                        .count() as u32;
                    best = best.min(previous_metric + distance);
                }
                *metric = best;
            }
        }
    }

    /// Selects the best path backwards in time and returns its metric.
    fn traceback(&mut self) -> u32 {
        let n_states = self.code.n_states;
        let end_time = self.nb_time_steps-1;

        // NOTE: The lowest state wins ties
        let last_metrics = &self.path_metrics[end_time*n_states..];
        let mut best_state = 0;
        for (state, &metric) in last_metrics.iter().enumerate() {
            if metric < last_metrics[best_state] {
                best_state = state;
            }
        }
        let best_metric = last_metrics[best_state];
        self.best_states[end_time] = best_state;

        for time in (1..=end_time).rev() {
            let metrics = &self.path_metrics[(time-1)*n_states..time*n_states];
            let [first, second] = *self.code.previous_states(self.best_states[time]);
            self.best_states[time-1] = if metrics[second] < metrics[first] { second } else { first };
        }
        best_metric
    }
}
