use std::io::{ErrorKind, Read};
use num::complex::Complex32;
use tracing::{debug, error};

/// Size of the intermediate byte buffer.
const BUFFER_SIZE: usize = 65_536;
/// Interleaved 8bit in-phase and quadrature components.
const BYTES_PER_SAMPLE: usize = 2;
const DC_OFFSET: f32 = 128.0;
const SCALE: f32 = 1.0 / 128.0;

/// Sequential reader of raw I/Q samples with unsigned 8bit components.
///
/// Once the stream runs out of data the reader stays at the end and further reads do nothing.
pub struct RawIqReader<R: Read> {
    reader: R,
    byte_buffer: Vec<u8>,
    total_samples_read: usize,
    is_end_reached: bool,
}

impl<R: Read> RawIqReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            byte_buffer: vec![0u8; BUFFER_SIZE],
            total_samples_read: 0,
            is_end_reached: false,
        }
    }

    pub fn is_end_reached(&self) -> bool {
        self.is_end_reached
    }

    pub fn total_samples_read(&self) -> usize {
        self.total_samples_read
    }

    /// Fills `buf[start_index..stop_index]` with samples from the stream.
    ///
    /// If the stream ends part way through, the samples before the end are still written.
    pub fn read(&mut self, buf: &mut [Complex32], start_index: usize, stop_index: usize) {
        assert!(start_index <= stop_index, "Start index {} is after stop index {}", start_index, stop_index);
        assert!(stop_index <= buf.len(), "Stop index {} is outside of buffer with {} samples", stop_index, buf.len());

        if self.is_end_reached {
            return;
        }

        let samples_per_chunk = self.byte_buffer.len() / BYTES_PER_SAMPLE;
        for samples in buf[start_index..stop_index].chunks_mut(samples_per_chunk) {
            let nb_requested = samples.len()*BYTES_PER_SAMPLE;
            let nb_read = self.fill_byte_buffer(nb_requested);
            let bytes = &self.byte_buffer[..nb_read];
            for (x, y) in bytes.chunks_exact(BYTES_PER_SAMPLE).zip(samples.iter_mut()) {
                y.re = (x[0] as f32 - DC_OFFSET) * SCALE;
                y.im = (x[1] as f32 - DC_OFFSET) * SCALE;
            }
            self.total_samples_read += nb_read / BYTES_PER_SAMPLE;

            if nb_read < nb_requested {
                self.is_end_reached = true;
                debug!(total_samples_read = self.total_samples_read, "Reached end of samples");
                return;
            }
        }
    }

    /// Returns the number of bytes read which is less than requested only at the end of the stream.
    fn fill_byte_buffer(&mut self, nb_bytes: usize) -> usize {
        let mut total_read = 0;
        while total_read < nb_bytes {
            match self.reader.read(&mut self.byte_buffer[total_read..nb_bytes]) {
                Ok(0) => break,
                Ok(length) => total_read += length,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    error!(%err, "Error while reading samples from input");
                    break;
                },
            }
        }
        total_read
    }
}
