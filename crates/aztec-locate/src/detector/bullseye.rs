//! Topological bull's-eye search.
//!
//! The center of an Aztec finder pattern is a black module surrounded by
//! concentric rings of alternating color. Any ray leaving the center
//! therefore crosses the same sequence of connected components, whichever
//! direction it takes. The search walks all black components, smallest
//! first, and tests the four cardinal rays for that property.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::pipeline::AztecDetector;
use crate::components::ConnectedComponent;

impl AztecDetector<'_> {
    /// Search for the bull's-eye. On success the outer white finder square
    /// and the compact flag are recorded; first matching candidate wins.
    pub fn find_bulls_eye(&mut self) -> bool {
        let mut queue: BinaryHeap<Reverse<ConnectedComponent>> = self
            .finder
            .components()
            .values()
            .cloned()
            .map(Reverse)
            .collect();

        while let Some(Reverse(component)) = queue.pop() {
            log::debug!("checking component {component:?}");
            if self.is_black_center(&component) {
                return true;
            }
        }
        false
    }

    /// Test whether a component is the black module at the center of the
    /// bull's-eye.
    fn is_black_center(&mut self, component: &ConnectedComponent) -> bool {
        if !component.black {
            return false;
        }

        let (x, y) = component.envelope.center();

        let east = self.find_rings(x, y, 1, 0);
        let west = self.find_rings(x, y, -1, 0);

        let mut num_rings = common_prefix(&east, &west);
        if num_rings < 4 {
            return false;
        }

        num_rings = num_rings.min(6);
        if !distinct(&east[..num_rings]) {
            return false;
        }

        let south = self.find_rings(x, y, 0, 1);
        num_rings = num_rings.min(common_prefix(&east, &south));
        if num_rings < 4 {
            return false;
        }

        let north = self.find_rings(x, y, 0, -1);
        num_rings = num_rings.min(common_prefix(&east, &north));
        if num_rings < 4 {
            return false;
        }

        self.compact = num_rings < 6;
        log::debug!(
            "found black center {} with rings {:?}",
            component.label,
            &east[..num_rings]
        );

        let offset = if self.compact { 2 } else { 4 };
        let white_square_label = east[offset];
        match self.finder.components().get(&white_square_label) {
            Some(white_square) => {
                log::debug!("outer white square {white_square:?}");
                self.white_square = Some(white_square.clone());
                true
            }
            None => false,
        }
    }

    /// Labels of the components a ray from `(x0, y0)` in direction
    /// `(dx, dy)` crosses, in order, the starting component excluded.
    fn find_rings(&self, x0: i32, y0: i32, dx: i32, dy: i32) -> Vec<u32> {
        let mut rings = Vec::new();
        let mut current = self.finder.label(x0, y0);

        let mut x = x0 + dx;
        let mut y = y0 + dy;
        while self.image_env.contains(x, y) {
            let label = self.finder.label(x, y);
            if label != current {
                rings.push(label);
                current = label;
            }
            x += dx;
            y += dy;
        }
        rings
    }
}

/// Length of the longest common prefix of two label sequences.
fn common_prefix(left: &[u32], right: &[u32]) -> usize {
    left.iter()
        .zip(right.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

/// True if every label in the slice is distinct.
fn distinct(labels: &[u32]) -> bool {
    for (i, a) in labels.iter().enumerate() {
        if labels[..i].contains(a) {
            return false;
        }
    }
    true
}
