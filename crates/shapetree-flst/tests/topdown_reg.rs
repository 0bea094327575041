//! Scenario regression tests for the top-down extractors
//!
//! Each scenario builds a literal raster, extracts with both variants and
//! verifies shape counts, areas and gray levels, plus the structural
//! invariants, exact reconstruction and pre/post equivalence.

use shapetree_core::{LevelSetType, NodeId, ShapeTree};
use shapetree_flst::{Algorithm, ExtractOptions, extract};
use shapetree_test::{
    GrayImage, check_equivalent, check_gray_monotone, check_reconstruction, check_structure,
};

/// Extract with both variants, run the common checks, return the
/// pre-order tree.
fn extract_checked(im: &GrayImage) -> ShapeTree {
    let pre = extract(im.data(), im.width(), im.height(), &ExtractOptions::new()).unwrap();
    let post = extract(
        im.data(),
        im.width(),
        im.height(),
        &ExtractOptions::new().with_algorithm(Algorithm::TdPost),
    )
    .unwrap();
    for (name, tree) in [("pre", &pre), ("post", &post)] {
        check_structure(tree, im.data()).unwrap_or_else(|e| panic!("{name}: {e}"));
        check_gray_monotone(tree).unwrap_or_else(|e| panic!("{name}: {e}"));
        check_reconstruction(tree, im.data()).unwrap_or_else(|e| panic!("{name}: {e}"));
    }
    check_equivalent(&pre, &post).unwrap();
    pre
}

/// `(area, gray, type)` of every non-root shape, largest first.
fn children_profile(tree: &ShapeTree) -> Vec<(usize, u8, LevelSetType)> {
    let mut v: Vec<_> = tree
        .shapes()
        .iter()
        .skip(1)
        .map(|s| (s.area, s.gray, s.level_set))
        .collect();
    v.sort_by(|a, b| b.0.cmp(&a.0));
    v
}

#[test]
fn constant_image_has_only_the_root() {
    let im = GrayImage::new(60, 50, 128);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 1);
    let root = tree.shape(ShapeTree::ROOT);
    assert_eq!(root.area, 3000);
    // The root records the frame's extreme value, here the constant.
    assert_eq!(root.gray, 128);
    assert!(root.boundary);
}

#[test]
fn rectangle_on_background() {
    let mut im = GrayImage::new(65, 60, 0);
    im.fill_rect(10, 10, 30, 30, 128);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.shape(ShapeTree::ROOT).gray, 0);
    assert_eq!(
        children_profile(&tree),
        vec![(900, 128, LevelSetType::Sup)]
    );
    let inner = tree.smallest_at(15, 15).unwrap();
    assert_eq!(tree.shape(inner).area, 900);
    assert!(!tree.shape(inner).boundary);
}

#[test]
fn two_disjoint_rectangles() {
    let mut im = GrayImage::new(65, 60, 0);
    im.fill_rect(3, 3, 30, 30, 128);
    im.fill_rect(38, 30, 25, 20, 200);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 3);
    assert_eq!(
        children_profile(&tree),
        vec![(900, 128, LevelSetType::Sup), (500, 200, LevelSetType::Sup)]
    );
    // Both are direct children of the root.
    for id in [tree.smallest_at(4, 4).unwrap(), tree.smallest_at(40, 32).unwrap()] {
        assert_eq!(tree.shape(id).parent, Some(ShapeTree::ROOT));
    }
}

#[test]
fn l_shaped_region() {
    let mut im = GrayImage::new(65, 60, 0);
    // 30x20 bar plus a 10x10 foot: 700 pixels, one 8-connected piece.
    im.fill_rect(3, 3, 30, 20, 128);
    im.fill_rect(3, 23, 10, 10, 128);
    im.fill_rect(38, 38, 25, 20, 200);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 3);
    assert_eq!(
        children_profile(&tree),
        vec![(700, 128, LevelSetType::Sup), (500, 200, LevelSetType::Sup)]
    );
}

#[test]
fn nested_rectangles_form_a_chain() {
    let mut im = GrayImage::new(65, 60, 0);
    im.fill_rect(5, 5, 40, 25, 128);
    im.fill_rect(10, 10, 20, 10, 200);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 3);
    let s1 = tree.smallest_at(6, 6).unwrap();
    let s2 = tree.smallest_at(12, 12).unwrap();
    assert_eq!(tree.shape(s1).area, 1000);
    assert_eq!(tree.shape(s2).area, 200);
    assert_eq!(tree.shape(s1).parent, Some(ShapeTree::ROOT));
    assert_eq!(tree.shape(s2).parent, Some(s1));
    assert_eq!(tree.shape(s1).child, Some(s2));
}

#[test]
fn diagonal_touch_is_one_sup_shape() {
    // Two bright squares sharing only a corner: upper shapes are
    // 8-connected, so they merge.
    let mut im = GrayImage::new(45, 45, 0);
    im.fill_rect(1, 1, 20, 20, 128);
    im.fill_rect(21, 21, 20, 20, 128);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 2);
    assert_eq!(
        children_profile(&tree),
        vec![(800, 128, LevelSetType::Sup)]
    );
}

#[test]
fn diagonal_touch_is_two_inf_shapes() {
    // The same geometry, dark on bright: lower shapes are 4-connected,
    // so the corner does not join them.
    let mut im = GrayImage::new(45, 45, 255);
    im.fill_rect(1, 1, 20, 20, 128);
    im.fill_rect(21, 21, 20, 20, 128);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 3);
    assert_eq!(
        children_profile(&tree),
        vec![(400, 128, LevelSetType::Inf), (400, 128, LevelSetType::Inf)]
    );
}

#[test]
fn nested_bands_form_a_depth_three_chain() {
    // Full-height bands shrinking by one pixel per side and per level.
    let mut im = GrayImage::new(60, 50, 0);
    im.fill_rect(5, 0, 50, 50, 64);
    im.fill_rect(6, 0, 48, 50, 128);
    im.fill_rect(7, 0, 46, 50, 192);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 4);
    let s1 = tree.smallest_at(5, 25).unwrap();
    let s2 = tree.smallest_at(6, 25).unwrap();
    let s3 = tree.smallest_at(7, 25).unwrap();
    assert_eq!(tree.shape(s1).area, 2500);
    assert_eq!(tree.shape(s2).area, 2400);
    assert_eq!(tree.shape(s3).area, 2300);
    assert_eq!(tree.shape(s2).parent, Some(s1));
    assert_eq!(tree.shape(s3).parent, Some(s2));
    // All three bands touch the top and bottom frame.
    assert!(tree.shape(s1).boundary && tree.shape(s2).boundary && tree.shape(s3).boundary);
}

#[test]
fn single_pixel_extremum() {
    let mut im = GrayImage::new(60, 50, 100);
    im.set(30, 25, 200);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.shape(ShapeTree::ROOT).area, 3000);
    assert_eq!(tree.shape(ShapeTree::ROOT).gray, 100);
    assert_eq!(children_profile(&tree), vec![(1, 200, LevelSetType::Sup)]);
}

#[test]
fn ring_hole_is_filled() {
    // A bright ring with an interior darker than the background: the
    // ring's shape includes its hole, and the hole content hangs below
    // it in the tree.
    let mut im = GrayImage::new(20, 20, 100);
    im.draw_ring(5, 5, 10, 10, 200);
    im.fill_rect(6, 6, 8, 8, 50);
    let tree = extract_checked(&im);
    assert_eq!(tree.len(), 3);
    let ring = tree.smallest_at(5, 5).unwrap();
    let hole = tree.smallest_at(10, 10).unwrap();
    assert_eq!(tree.shape(ring).area, 100);
    assert_eq!(tree.shape(ring).gray, 200);
    assert_eq!(tree.shape(ring).level_set, LevelSetType::Sup);
    assert_eq!(tree.shape(hole).area, 64);
    assert_eq!(tree.shape(hole).gray, 50);
    assert_eq!(tree.shape(hole).level_set, LevelSetType::Inf);
    assert_eq!(tree.shape(hole).parent, Some(ring));
    assert_eq!(tree.shape(ring).parent, Some(ShapeTree::ROOT));
}

#[test]
fn contours_are_recorded_on_request() {
    let mut im = GrayImage::new(12, 10, 0);
    im.fill_rect(4, 4, 3, 2, 128);
    let opts = ExtractOptions::new().with_contours(true);
    let tree = extract(im.data(), im.width(), im.height(), &opts).unwrap();
    assert_eq!(tree.len(), 2);
    // The rectangle's level line: 2 * (3 + 2) = 10 unit edges.
    let inner = tree.smallest_at(5, 5).unwrap();
    let contour = tree.shape(inner).contour.as_ref().unwrap();
    assert_eq!(contour.len(), 10);
    // Without the option no contour is stored.
    let plain = extract(im.data(), im.width(), im.height(), &ExtractOptions::new()).unwrap();
    assert!(plain.shapes().iter().all(|s| s.contour.is_none()));
}

#[test]
fn rejects_invalid_input() {
    let gray = vec![0u8; 12];
    assert!(extract(&gray, 0, 12, &ExtractOptions::new()).is_err());
    assert!(extract(&gray, 5, 3, &ExtractOptions::new()).is_err());
}

#[test]
fn index_and_boundary_recomputation_are_stable() {
    let mut im = GrayImage::new(30, 25, 10);
    im.fill_rect(4, 4, 10, 8, 90);
    im.fill_rect(6, 6, 4, 3, 170);
    im.fill_rect(20, 15, 6, 6, 200);
    for algorithm in [Algorithm::TdPre, Algorithm::TdPost] {
        let opts = ExtractOptions::new().with_algorithm(algorithm);
        let mut tree = extract(im.data(), im.width(), im.height(), &opts).unwrap();
        let index = tree.smallest_index().to_vec();
        let boundary: Vec<bool> = tree.shapes().iter().map(|s| s.boundary).collect();
        tree.index_smallest();
        assert_eq!(tree.smallest_index(), &index[..], "{algorithm:?}: index changed");
        tree.fill_boundary();
        let after: Vec<bool> = tree.shapes().iter().map(|s| s.boundary).collect();
        assert_eq!(after, boundary, "{algorithm:?}: boundary flags changed");
    }
}

#[test]
fn ignored_shape_simplifies_the_image() {
    let mut im = GrayImage::new(30, 25, 10);
    im.fill_rect(5, 5, 8, 6, 90);
    im.fill_rect(7, 7, 3, 2, 170);
    let mut tree = extract(im.data(), im.width(), im.height(), &ExtractOptions::new()).unwrap();
    let inner: Vec<NodeId> = (1..tree.len())
        .map(NodeId::new)
        .filter(|&id| tree.shape(id).gray == 170)
        .collect();
    assert_eq!(inner.len(), 1);
    tree.shape_mut(inner[0]).ignore = true;
    // The ignored speck disappears; its pixels take the parent's gray.
    let simplified = tree.build_image();
    let mut expected = GrayImage::new(30, 25, 10);
    expected.fill_rect(5, 5, 8, 6, 90);
    assert_eq!(simplified, expected.data());
    assert_eq!(tree.smallest_at(8, 8), tree.smallest_at(6, 6));
}
