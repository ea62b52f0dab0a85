//! Connected-component labeling of a bit matrix.
//!
//! Two-pass union-find labeling. Pass 1 assigns provisional labels and links
//! touching labels through a parent table; pass 2 resolves every pixel to
//! its root label, counts pixels, and grows the per-component envelopes.
//!
//! Connectivity is 4-way. The bull's-eye test relies on this: under 4-way
//! connectivity the concentric rings of the finder pattern stay separate
//! components, while 8-way connectivity would merge diagonally touching
//! rings.

use std::collections::HashMap;

use aztec_locate_core::{BitMatrix, Envelope};

/// A maximal 4-connected region of same-colored pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectedComponent {
    /// Unique positive label.
    pub label: u32,
    /// Pixel count after pass 2.
    pub num_pixels: u32,
    /// Tight bounding envelope.
    pub envelope: Envelope,
    /// True for black (set) pixels.
    pub black: bool,
}

impl Ord for ConnectedComponent {
    /// Components order by pixel count; the bull's-eye scan wants the
    /// smallest candidates first. Labels are unique, so they break ties.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.num_pixels
            .cmp(&other.num_pixels)
            .then(self.label.cmp(&other.label))
    }
}

impl PartialOrd for ConnectedComponent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Labels the connected components of a borrowed bit matrix.
pub struct ConnectedComponentFinder<'a> {
    matrix: &'a BitMatrix,
    width: usize,
    height: usize,
    /// Root label per pixel, row-major.
    labels: Vec<u32>,
    components: HashMap<u32, ConnectedComponent>,
}

impl<'a> ConnectedComponentFinder<'a> {
    /// Label every pixel of the matrix. Total: the only failure mode is
    /// allocation.
    pub fn new(matrix: &'a BitMatrix) -> Self {
        let width = matrix.width();
        let height = matrix.height();
        let mut finder = Self {
            matrix,
            width,
            height,
            labels: vec![0; width * height],
            components: HashMap::new(),
        };
        finder.find_components();
        finder
    }

    /// The matrix being labeled.
    #[inline]
    pub fn bit_matrix(&self) -> &BitMatrix {
        self.matrix
    }

    /// Root label of pixel `(x, y)`; the pixel must be inside the matrix.
    #[inline]
    pub fn label(&self, x: i32, y: i32) -> u32 {
        self.labels[y as usize * self.width + x as usize]
    }

    /// Label-to-component map.
    #[inline]
    pub fn components(&self) -> &HashMap<u32, ConnectedComponent> {
        &self.components
    }

    fn find_components(&mut self) {
        // One provisional label per pixel in the worst case; index 0 unused.
        let mut parent = vec![0u32; self.width * self.height + 1];
        let mut next_label = 0u32;

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let bit = self.matrix.get(x as usize, y as usize);
                self.assign_provisional(x, y, bit, &mut parent, &mut next_label);
            }
        }
        log::debug!("pass 1 done, {} provisional labels", next_label);

        let mut counts = vec![0u32; next_label as usize + 1];
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let root = self.resolve_root(x, y, &mut parent);
                counts[root as usize] += 1;
                self.expand_component(x, y, root, counts[root as usize]);
            }
        }
        log::debug!("pass 2 done, {} components", self.components.len());
    }

    /// Pass 1 step: label `(x, y)` with the smallest same-colored neighbor
    /// label, or a fresh one, and parent the other neighbor labels to it.
    ///
    /// The neighbor probe is symmetric; the two forward neighbors are still
    /// unlabeled on a row-major scan and contribute nothing.
    fn assign_provisional(
        &mut self,
        x: i32,
        y: i32,
        bit: bool,
        parent: &mut [u32],
        next_label: &mut u32,
    ) {
        let mut neighbors = [0u32; 4];
        let mut count = 0;
        let mut min = u32::MAX;
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if let Some(label) = self.neighbor_label(nx, ny, bit) {
                neighbors[count] = label;
                count += 1;
                if label < min {
                    min = label;
                }
            }
        }

        if count == 0 {
            *next_label += 1;
            self.set_label(x, y, *next_label);
        } else {
            self.set_label(x, y, min);
            for &label in &neighbors[..count] {
                if label != min {
                    parent[label as usize] = min;
                }
            }
        }
    }

    /// Label of the neighbor at `(x, y)` if it is inside the matrix, has the
    /// same color, and is already labeled.
    fn neighbor_label(&self, x: i32, y: i32, bit: bool) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        if self.matrix.get(x as usize, y as usize) != bit {
            return None;
        }
        match self.label(x, y) {
            0 => None,
            label => Some(label),
        }
    }

    /// Pass 2 step: follow the parent chain to the root, path-compressing
    /// the chain, and rewrite the pixel's label.
    fn resolve_root(&mut self, x: i32, y: i32, parent: &mut [u32]) -> u32 {
        let start = self.label(x, y);
        let mut root = start;
        while parent[root as usize] != 0 {
            root = parent[root as usize];
        }
        if root != start {
            let mut node = start;
            while parent[node as usize] != root {
                let next = parent[node as usize];
                parent[node as usize] = root;
                node = next;
            }
            self.set_label(x, y, root);
        }
        root
    }

    fn expand_component(&mut self, x: i32, y: i32, label: u32, num_pixels: u32) {
        let black = self.matrix.get(x as usize, y as usize);
        let component = self
            .components
            .entry(label)
            .or_insert_with(|| ConnectedComponent {
                label,
                num_pixels: 0,
                envelope: Envelope::new(),
                black,
            });
        component.envelope.expand(x, y);
        component.num_pixels = num_pixels;
    }

    #[inline]
    fn set_label(&mut self, x: i32, y: i32, label: u32) {
        self.labels[y as usize * self.width + x as usize] = label;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_white_is_one_component() {
        let matrix = BitMatrix::new(7, 5);
        let finder = ConnectedComponentFinder::new(&matrix);

        assert_eq!(finder.components().len(), 1);
        let component = finder.components().values().next().unwrap();
        assert!(!component.black);
        assert_eq!(component.num_pixels, 35);
        assert_eq!(
            component.envelope,
            Envelope {
                min_x: 0,
                min_y: 0,
                max_x: 6,
                max_y: 4
            }
        );
    }

    #[test]
    fn single_black_pixel_splits_off() {
        let mut matrix = BitMatrix::new(7, 5);
        matrix.set(3, 2);
        let finder = ConnectedComponentFinder::new(&matrix);

        assert_eq!(finder.components().len(), 2);
        let black = finder
            .components()
            .values()
            .find(|c| c.black)
            .expect("black component");
        assert_eq!(black.num_pixels, 1);
        assert_eq!(black.envelope.center(), (3, 2));
        assert_eq!(black.label, finder.label(3, 2));
    }

    #[test]
    fn diagonal_pixels_stay_separate() {
        // 4-connectivity: diagonally touching black pixels are distinct
        // components.
        let mut matrix = BitMatrix::new(4, 4);
        matrix.set(1, 1);
        matrix.set(2, 2);
        let finder = ConnectedComponentFinder::new(&matrix);

        assert_ne!(finder.label(1, 1), finder.label(2, 2));
        assert_eq!(finder.components().len(), 3);
    }

    #[test]
    fn u_shape_merges_into_one_label() {
        // A U shape forces a label merge: the two arms get different
        // provisional labels that only meet at the bottom row.
        let mut matrix = BitMatrix::new(5, 3);
        for y in 0..3 {
            matrix.set(0, y);
            matrix.set(4, y);
        }
        for x in 0..5 {
            matrix.set(x, 2);
        }
        let finder = ConnectedComponentFinder::new(&matrix);

        assert_eq!(finder.label(0, 0), finder.label(4, 0));
        let black = finder
            .components()
            .get(&finder.label(0, 0))
            .expect("component record");
        assert_eq!(black.num_pixels, 9);
    }

    #[test]
    fn pixel_counts_sum_to_area_and_envelopes_are_tight() {
        let matrix = BitMatrix::parse_text(concat!(
            "6 6\n",
            "XX..XX\n",
            "XX..XX\n",
            "......\n",
            "..XX..\n",
            "..XX..\n",
            "......\n"
        ))
        .expect("fixture");
        let finder = ConnectedComponentFinder::new(&matrix);

        let total: u32 = finder.components().values().map(|c| c.num_pixels).sum();
        assert_eq!(total, 36);

        for y in 0..6 {
            for x in 0..6 {
                let label = finder.label(x, y);
                assert!(label > 0);
                let component = finder.components().get(&label).expect("record");
                assert!(component.envelope.contains(x, y));
                assert_eq!(component.black, matrix.get(x as usize, y as usize));
            }
        }
    }
}
