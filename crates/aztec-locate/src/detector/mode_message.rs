//! Mode-message sampling, orientation, and parameter extraction.
//!
//! The mode message is a one-module-wide ring just outside the bull's-eye:
//! 28 bits for compact codes, 40 for full ones, Reed-Solomon protected over
//! GF(16). Its corners carry the orientation marks, and its payload encodes
//! the layer and data-word counts the rest of the pipeline depends on.

use aztec_locate_core::{GaloisField, ReedSolomonDecoder};

use super::pipeline::{round_pixel, AztecDetector, MODULE};
use super::DetectError;

impl AztecDetector<'_> {
    /// Sample the four mode-message lines, orient them, and decode the
    /// corrected parameters into layer/data-word counts and the matrix
    /// geometry.
    pub fn decode_mode_message(&mut self) -> Result<(), DetectError> {
        let r = if self.compact { 5usize } else { 7 };
        let values = self.sample_mode_lines(r)?;

        self.top_line_index = find_top_line(&values, self.compact)?;
        log::debug!("top line index = {}", self.top_line_index);

        let mut parameter_data: u64 = 0;
        for i in 0..4 {
            let side = values[(self.top_line_index + i) % 4] as u64;
            if self.compact {
                // Each side is ..XXXXXXX. with the Xs carrying parameters.
                parameter_data <<= 7;
                parameter_data += (side >> 1) & 0x7F;
            } else {
                // Each side is ..XXXXX.XXXXX. where the middle bit belongs to
                // the reference grid, not the parameters.
                parameter_data <<= 10;
                parameter_data += ((side >> 2) & (0x1F << 5)) + ((side >> 1) & 0x1F);
            }
        }

        let data = corrected_parameter_data(parameter_data, self.compact)?;
        if self.compact {
            // 8 bits: 2 bits layers, 6 bits data words.
            self.num_layers = (data >> 6) + 1;
            self.num_data_words = (data & 0x3F) + 1;
            self.matrix_size = 11 + 4 * self.num_layers as i32;
            self.num_reference_lines = 0;
        } else {
            // 16 bits: 5 bits layers, 11 bits data words.
            self.num_layers = (data >> 11) + 1;
            self.num_data_words = (data & 0x7FF) + 1;
            // Width without the reference grid lines woven in.
            let base_matrix_size = 14 + 4 * self.num_layers as i32;
            self.num_reference_lines = ((base_matrix_size / 2 - 1) / 15) as u32;
            self.matrix_size = base_matrix_size + 1 + 2 * self.num_reference_lines as i32;
        }
        log::debug!(
            "layers = {}, data words = {}, matrix size = {}",
            self.num_layers,
            self.num_data_words,
            self.matrix_size
        );
        Ok(())
    }

    /// Read the four `2r`-sample lines along the sides of the mode-message
    /// ring, assembling one MSB-first word per side. A sample landing
    /// outside the image fails the detection.
    fn sample_mode_lines(&self, r: usize) -> Result<[u32; 4], DetectError> {
        let q = (r as i32 * MODULE) as f32;
        let m = MODULE as f32;
        // Side start corners NW, NE, SE, SW and their walk directions.
        let corners = [(-q, -q), (q, -q), (q, q), (-q, q)];
        let directions = [(m, 0.0), (0.0, m), (-m, 0.0), (0.0, -m)];

        let transform = self.transform()?;
        let mut values = [0u32; 4];
        let mut line = vec![0.0f32; 2 * 2 * r];
        for i in 0..4 {
            let (mut x, mut y) = corners[i];
            let (dx, dy) = directions[i];
            for j in 0..2 * r {
                line[2 * j] = x;
                line[2 * j + 1] = y;
                x += dx;
                y += dy;
            }
            transform.transform_points(&mut line);

            let mut value = 0u32;
            for j in 0..2 * r {
                let tx = round_pixel(line[2 * j]);
                let ty = round_pixel(line[2 * j + 1]);
                let bit = self
                    .matrix
                    .get_checked(tx, ty)
                    .ok_or(DetectError::NotFound)?;
                if bit {
                    value |= 1 << (2 * r - 1 - j);
                }
            }
            values[i] = value;
        }
        Ok(values)
    }
}

/// Find the index of the line that should be on top, from the orientation
/// marks at the line corners: the side whose first two and last samples are
/// all black immediately follows the top line.
fn find_top_line(line_values: &[u32; 4], compact: bool) -> Result<usize, DetectError> {
    for (index, &value) in line_values.iter().enumerate() {
        let bits = if compact {
            (value & (3 << 8)) >> 7 | (value & 1)
        } else {
            (value & (3 << 12)) >> 11 | (value & 1)
        };
        if bits == 7 {
            return Ok((index + 3) % 4);
        }
    }
    Err(DetectError::NotFound)
}

/// Split the parameter word into 4-bit codewords, correct them over the
/// Aztec GF(16), and return the data bits as one integer.
fn corrected_parameter_data(mut parameter_data: u64, compact: bool) -> Result<u32, DetectError> {
    let (num_codewords, num_data_codewords) = if compact { (7, 2) } else { (10, 4) };
    let num_ec_codewords = num_codewords - num_data_codewords;

    let mut parameter_words = vec![0u32; num_codewords];
    for i in (0..num_codewords).rev() {
        parameter_words[i] = (parameter_data & 0xF) as u32;
        parameter_data >>= 4;
    }

    ReedSolomonDecoder::new(GaloisField::aztec_param())
        .decode(&mut parameter_words, num_ec_codewords)?;

    let mut result = 0u32;
    for &word in &parameter_words[..num_data_codewords] {
        result = (result << 4) + word;
    }
    Ok(result)
}
