//! End-to-end detection against synthetic rendered codes.

use aztec_locate::test_utils::{draw_centered_rings, SyntheticAztec};
use aztec_locate::{
    decode_bit_matrix, renormalize_for_decoding, AztecDetector, ConnectedComponentFinder,
    DetectError,
};

#[test]
fn detects_compact_code() {
    let code = SyntheticAztec::compact(2, 13);
    let detection = decode_bit_matrix(&code.render()).expect("compact code detected");

    assert!(detection.compact);
    assert_eq!(detection.num_layers, 2);
    assert_eq!(detection.num_data_words, 13);
    assert_eq!(detection.bits.width(), 19);
    assert_eq!(detection.bits.height(), 19);

    // Every rectified module matches the rendered layout.
    let m = code.matrix_size() / 2;
    for j in -m..=m {
        for i in -m..=m {
            assert_eq!(
                detection.bits.get((i + m) as usize, (j + m) as usize),
                code.module_color(i, j),
                "module ({i}, {j})"
            );
        }
    }
}

#[test]
fn detects_full_code_with_reference_grid_refinement() {
    let code = SyntheticAztec::full(5, 64);
    let detection = decode_bit_matrix(&code.render()).expect("full code detected");

    assert!(!detection.compact);
    assert_eq!(detection.num_layers, 5);
    assert_eq!(detection.num_data_words, 64);
    assert_eq!(detection.bits.width(), 37);

    let m = code.matrix_size() / 2;
    for j in -m..=m {
        for i in -m..=m {
            assert_eq!(
                detection.bits.get((i + m) as usize, (j + m) as usize),
                code.module_color(i, j),
                "module ({i}, {j})"
            );
        }
    }
}

#[test]
fn full_code_geometry_invariants() {
    let code = SyntheticAztec::full(5, 64);
    let matrix = code.render();
    let finder = ConnectedComponentFinder::new(&matrix);
    let mut detector = AztecDetector::new(&finder);
    detector.detect().expect("detected");

    assert_eq!(detector.matrix_size() % 2, 1);
    assert!((1..=32).contains(&detector.num_layers()));
    // base = 14 + 4 * 5 = 34; (34/2 - 1) / 15 = 1 extra reference line pair.
    assert_eq!(detector.matrix_size(), 34 + 1 + 2);
}

#[test]
fn outer_corners_frame_the_code() {
    let code = SyntheticAztec::full(5, 64);
    let matrix = code.render();
    let detection = decode_bit_matrix(&matrix).expect("detected");

    let (cx, cy) = code.center_pixel();
    let (cx, cy) = (cx as f32, cy as f32);
    let half = 0.5 * (code.matrix_size() * code.module_px as i32) as f32;

    for (corner, sx, sy) in [
        (detection.nw, -1.0, -1.0),
        (detection.ne, 1.0, -1.0),
        (detection.sw, -1.0, 1.0),
        (detection.se, 1.0, 1.0),
    ] {
        let ex = cx + sx * half;
        let ey = cy + sy * half;
        assert!(
            (corner.x - ex).abs() < 4.0 && (corner.y - ey).abs() < 4.0,
            "corner {corner:?} expected near ({ex}, {ey})"
        );
    }
}

#[test]
fn mode_message_sampling_off_image_is_not_found() {
    // A bare bull's-eye cropped so tightly that the mode-message ring lies
    // outside the image: the bull's-eye passes, the sampling must not.
    let matrix = draw_centered_rings(4, 6, 0);
    assert!(matches!(
        decode_bit_matrix(&matrix),
        Err(DetectError::NotFound)
    ));
}

#[test]
fn full_code_with_broken_reference_line_is_not_found() {
    let code = SyntheticAztec::full(5, 64);
    let mut matrix = code.render();

    // Erase the black reference-grid modules east of the mode ring; the
    // refinement can no longer count enough color changes.
    let p = code.module_px;
    let m = code.matrix_size() / 2;
    let (_, cy) = code.center_pixel();
    let row0 = cy as usize - p / 2;
    for i in 8..=m {
        if i % 2 == 0 {
            let x0 = (code.quiet_modules as i32 + m + i) as usize * p;
            for dy in 0..p {
                for dx in 0..p {
                    if matrix.get(x0 + dx, row0 + dy) {
                        matrix.flip(x0 + dx, row0 + dy);
                    }
                }
            }
        }
    }

    assert!(matches!(
        decode_bit_matrix(&matrix),
        Err(DetectError::NotFound)
    ));
}

#[test]
fn pixel_counts_partition_the_synthetic_image() {
    let code = SyntheticAztec::compact(2, 13);
    let matrix = code.render();
    let finder = ConnectedComponentFinder::new(&matrix);

    let total: u32 = finder.components().values().map(|c| c.num_pixels).sum();
    assert_eq!(total as usize, matrix.width() * matrix.height());
}

#[test]
fn renormalized_matrix_survives_rebinarization() {
    let code = SyntheticAztec::compact(2, 13);
    let matrix = code.render();
    let finder = ConnectedComponentFinder::new(&matrix);
    let mut detector = AztecDetector::new(&finder);
    detector.detect().expect("detected");

    // Two pixels per module plus a four-pixel border, rendered to grayscale
    // and binarized again for a downstream symbol decoder.
    let rebinarized = renormalize_for_decoding(&detector).expect("renormalize");
    assert_eq!(rebinarized.width(), 19 * 2 + 8);
    assert_eq!(rebinarized, detector.normalize_matrix(2, 4).expect("magnified"));
}

#[test]
fn detection_result_serializes() {
    let code = SyntheticAztec::compact(2, 13);
    let detection = decode_bit_matrix(&code.render()).expect("detected");
    let json = serde_json::to_string(&detection).expect("serialize");
    assert!(json.contains("\"num_layers\":2"));
}
