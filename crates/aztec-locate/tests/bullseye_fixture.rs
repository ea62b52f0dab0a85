//! Component-finder regression against the bull's-eye text fixture.

use std::fs;
use std::path::Path;

use aztec_locate::ConnectedComponentFinder;
use aztec_locate_core::BitMatrix;

fn load_fixture(name: &str) -> BitMatrix {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name);
    let text = fs::read_to_string(&path).expect("read fixture");
    BitMatrix::parse_text(&text).expect("parse fixture")
}

#[test]
fn bulls_eye_fixture_has_six_components() {
    let matrix = load_fixture("bulls_eye.txt");
    let finder = ConnectedComponentFinder::new(&matrix);

    // Outer white, two black rings, two white rings, black center.
    assert_eq!(finder.components().len(), 6);

    let black = finder.components().values().filter(|c| c.black).count();
    assert_eq!(black, 3);

    // The center pixel is its own single-pixel component.
    let center = finder
        .components()
        .get(&finder.label(6, 6))
        .expect("center component");
    assert!(center.black);
    assert_eq!(center.num_pixels, 1);
}

#[test]
fn fixture_labels_satisfy_component_invariants() {
    let matrix = load_fixture("bulls_eye.txt");
    let finder = ConnectedComponentFinder::new(&matrix);

    let total: u32 = finder.components().values().map(|c| c.num_pixels).sum();
    assert_eq!(total, 13 * 13);

    for y in 0..13 {
        for x in 0..13 {
            let label = finder.label(x, y);
            assert!(label > 0);
            let component = finder.components().get(&label).expect("record");
            assert!(component.envelope.contains(x, y));
        }
    }
}
