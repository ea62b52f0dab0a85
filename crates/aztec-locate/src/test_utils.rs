//! Synthetic Aztec codes for tests.
//!
//! Renders upright codes with a correct finder pattern, orientation marks,
//! Reed-Solomon-encoded mode message, and (for full codes) the alternating
//! reference grid: everything the detector samples. The data area is
//! filled with a fixed pseudo-pattern; the detector never interprets it.

use std::collections::HashMap;

use aztec_locate_core::{BitMatrix, GaloisField, ReedSolomonEncoder};

/// Builder for a rendered test code.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticAztec {
    pub compact: bool,
    pub layers: u32,
    pub data_words: u32,
    /// Pixels per module.
    pub module_px: usize,
    /// White border, in modules.
    pub quiet_modules: usize,
}

impl SyntheticAztec {
    pub fn compact(layers: u32, data_words: u32) -> Self {
        Self {
            compact: true,
            layers,
            data_words,
            module_px: 6,
            quiet_modules: 2,
        }
    }

    pub fn full(layers: u32, data_words: u32) -> Self {
        Self {
            compact: false,
            layers,
            data_words,
            module_px: 6,
            quiet_modules: 2,
        }
    }

    /// Module count per side, including reference grid lines.
    pub fn matrix_size(&self) -> i32 {
        if self.compact {
            11 + 4 * self.layers as i32
        } else {
            let base = 14 + 4 * self.layers as i32;
            base + 1 + 2 * ((base / 2 - 1) / 15)
        }
    }

    /// Pixel coordinates of the center module's center.
    pub fn center_pixel(&self) -> (i32, i32) {
        let m = self.matrix_size() / 2;
        let c = (self.quiet_modules as i32 + m) * self.module_px as i32
            + self.module_px as i32 / 2;
        (c, c)
    }

    /// Expected color of module `(i, j)`, coordinates centered on the
    /// bull's-eye.
    pub fn module_color(&self, i: i32, j: i32) -> bool {
        self.module_color_with(&self.mode_modules(), i, j)
    }

    /// Render the code into a bit matrix.
    pub fn render(&self) -> BitMatrix {
        let mode = self.mode_modules();
        let size = self.matrix_size();
        let m = size / 2;
        let p = self.module_px;
        let quiet = self.quiet_modules as i32;
        let side = (size as usize + 2 * self.quiet_modules) * p;

        let mut matrix = BitMatrix::new(side, side);
        for j in -m..=m {
            for i in -m..=m {
                if self.module_color_with(&mode, i, j) {
                    let x0 = (quiet + m + i) as usize * p;
                    let y0 = (quiet + m + j) as usize * p;
                    for dy in 0..p {
                        for dx in 0..p {
                            matrix.set(x0 + dx, y0 + dy);
                        }
                    }
                }
            }
        }
        matrix
    }

    fn module_color_with(&self, mode: &HashMap<(i32, i32), bool>, i: i32, j: i32) -> bool {
        let mode_ring = if self.compact { 5 } else { 7 };
        let r = i.abs().max(j.abs());
        if r < mode_ring {
            // Concentric finder rings, black center.
            return r % 2 == 0;
        }
        if r == mode_ring {
            return mode[&(i, j)];
        }
        if !self.compact && (i % 16 == 0 || j % 16 == 0) {
            // Reference grid: alternating, black on even parity.
            return (i + j) % 2 == 0;
        }
        // Data area filler.
        (i * 7 + j * 13).rem_euclid(5) == 0
    }

    /// Colors of the mode-message ring: payload bits laid out MSB-first
    /// over the four sides, orientation marks at the corners, reference
    /// grid crossings mid-side for full codes.
    fn mode_modules(&self) -> HashMap<(i32, i32), bool> {
        let r = if self.compact { 5i32 } else { 7 };
        let bits = self.parameter_bits();
        let mut map = HashMap::new();

        // Sides top, right, bottom, left; start corner and walk direction.
        let sides = [
            ((-r, -r), (1, 0)),
            ((r, -r), (0, 1)),
            ((r, r), (-1, 0)),
            ((-r, r), (0, -1)),
        ];
        let mut bit = bits.iter();
        for ((sx, sy), (dx, dy)) in sides {
            for j in 0..2 * r {
                let payload = if self.compact {
                    (2..=8).contains(&j)
                } else {
                    (2..=6).contains(&j) || (8..=12).contains(&j)
                };
                if payload {
                    map.insert((sx + j * dx, sy + j * dy), *bit.next().expect("bit count"));
                }
            }
        }

        // Orientation marks: three black modules at the NW corner, two at
        // NE, one at SE, none at SW.
        map.insert((-r, -r), true);
        map.insert((-r + 1, -r), true);
        map.insert((-r, -r + 1), true);
        map.insert((r, -r), true);
        map.insert((r, -r + 1), true);
        map.insert((r - 1, -r), false);
        map.insert((r, r - 1), true);
        map.insert((r, r), false);
        map.insert((r - 1, r), false);
        map.insert((-r, r), false);
        map.insert((-r, r - 1), false);
        map.insert((-r + 1, r), false);

        if !self.compact {
            // Central reference grid lines cross the ring mid-side.
            for crossing in [(0, -r), (r, 0), (0, r), (-r, 0)] {
                map.insert(crossing, false);
            }
        }
        map
    }

    /// The 28 or 40 mode-message bits: layer/data-word parameters plus
    /// their Reed-Solomon check words, MSB first.
    fn parameter_bits(&self) -> Vec<bool> {
        let (data, num_data, num_total) = if self.compact {
            let data = (self.layers - 1) << 6 | (self.data_words - 1);
            (data, 2usize, 7usize)
        } else {
            let data = (self.layers - 1) << 11 | (self.data_words - 1);
            (data, 4, 10)
        };

        let mut codewords: Vec<u32> = (0..num_data)
            .rev()
            .map(|k| (data >> (4 * k)) & 0xF)
            .collect();
        codewords.resize(num_total, 0);
        ReedSolomonEncoder::new(GaloisField::aztec_param())
            .encode(&mut codewords, num_total - num_data);

        codewords
            .iter()
            .flat_map(|&w| (0..4).rev().map(move |b| (w >> b) & 1 != 0))
            .collect()
    }
}

/// Concentric alternating rings only, a bull's-eye with nothing around it.
/// Rings out to `max_ring` (black on even indices), `quiet_modules` of white
/// beyond.
pub fn draw_centered_rings(max_ring: i32, module_px: usize, quiet_modules: usize) -> BitMatrix {
    let m = max_ring;
    let p = module_px;
    let quiet = quiet_modules as i32;
    let side = ((2 * m + 1) as usize + 2 * quiet_modules) * p;

    let mut matrix = BitMatrix::new(side, side);
    for j in -m..=m {
        for i in -m..=m {
            let r = i.abs().max(j.abs());
            if r % 2 == 0 {
                let x0 = (quiet + m + i) as usize * p;
                let y0 = (quiet + m + j) as usize * p;
                for dy in 0..p {
                    for dx in 0..p {
                        matrix.set(x0 + dx, y0 + dy);
                    }
                }
            }
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_geometry() {
        let code = SyntheticAztec::compact(2, 13);
        assert_eq!(code.matrix_size(), 19);
        // Center black, first ring white, mode ring at 5.
        assert!(code.module_color(0, 0));
        assert!(!code.module_color(1, 0));
        assert!(code.module_color(2, 2));
    }

    #[test]
    fn full_geometry_has_reference_grid() {
        let code = SyntheticAztec::full(5, 64);
        assert_eq!(code.matrix_size(), 37);
        // Grid line y = 0 alternates outside the finder.
        assert!(code.module_color(16, 0));
        assert!(!code.module_color(15, 0));
        assert!(code.module_color(18, 0));
        // Grid line x = 16.
        assert!(!code.module_color(16, 1));
        assert!(code.module_color(16, 2));
    }

    #[test]
    fn orientation_marks_sit_on_the_ring() {
        let code = SyntheticAztec::compact(1, 1);
        assert!(code.module_color(-5, -5));
        assert!(code.module_color(-4, -5));
        assert!(code.module_color(-5, -4));
        assert!(!code.module_color(4, -5));
        assert!(!code.module_color(-5, 5));
    }

    #[test]
    fn parameter_bit_count_matches_variant() {
        assert_eq!(SyntheticAztec::compact(2, 13).parameter_bits().len(), 28);
        assert_eq!(SyntheticAztec::full(5, 64).parameter_bits().len(), 40);
    }
}
