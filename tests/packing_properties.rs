//! Property tests for the image packer.
//!
//! For arbitrary image lists the packer must:
//! 1. Never overlap two placements on the same page
//! 2. Keep every placement inside its page
//! 3. Never place more area on a page than the page holds
//! 4. Report every oversized image as a failure and place the rest
//! 5. Produce the same layout for the same input
//!
//! Sizes are drawn both from a small range and from the edges around the
//! page size, including `u32::MAX`.

use proptest::prelude::*;

use symbol_atlas::{pack_images, ExportConfig, FailureReason, PackImage, PackOutcome, Rect};

const PAGE: u32 = 128;

fn make_config() -> ExportConfig {
    ExportConfig {
        page_width: PAGE,
        page_height: PAGE,
        ..ExportConfig::default()
    }
}

fn make_images(sizes: &[(u32, u32)]) -> Vec<PackImage<usize>> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| PackImage::new(format!("img{i}"), i, f64::from(w), f64::from(h)))
        .collect()
}

fn pack(sizes: &[(u32, u32)]) -> PackOutcome<usize> {
    pack_images(make_images(sizes), &make_config()).unwrap()
}

fn side_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        3 => 1u32..=160,
        1 => Just(PAGE - 1),
        1 => Just(PAGE),
        1 => Just(PAGE + 1),
        1 => Just(u32::MAX),
    ]
}

fn sizes_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    proptest::collection::vec((side_strategy(), side_strategy()), 0..40)
}

proptest! {
    #[test]
    fn prop_placements_never_overlap(sizes in sizes_strategy()) {
        let outcome = pack(&sizes);
        for page in &outcome.pages {
            for (i, a) in page.placements.iter().enumerate() {
                for b in &page.placements[i + 1..] {
                    prop_assert!(!a.rect.overlaps(&b.rect), "{:?} overlaps {:?}", a.rect, b.rect);
                }
            }
        }
    }

    #[test]
    fn prop_placements_stay_on_page(sizes in sizes_strategy()) {
        let outcome = pack(&sizes);
        let page_rect = Rect::new(0, 0, PAGE, PAGE);
        for page in &outcome.pages {
            let used: u64 = page.placements.iter().map(|p| p.rect.area()).sum();
            prop_assert!(used <= page_rect.area());
            for placement in &page.placements {
                prop_assert!(page_rect.contains(&placement.rect));
                prop_assert_eq!(placement.rect.width, placement.image.width);
                prop_assert_eq!(placement.rect.height, placement.image.height);
            }
        }
    }

    #[test]
    fn prop_every_image_is_placed_or_failed(sizes in sizes_strategy()) {
        let outcome = pack(&sizes);
        prop_assert_eq!(outcome.placed_count() + outcome.failures.len(), sizes.len());

        let oversized: Vec<String> = sizes
            .iter()
            .enumerate()
            .filter(|(_, size)| size.0 > PAGE || size.1 > PAGE)
            .map(|(i, _)| format!("img{i}"))
            .collect();
        let failed: Vec<String> = outcome.failures.iter().map(|f| f.name.clone()).collect();
        prop_assert_eq!(failed, oversized);
        prop_assert!(outcome.failures.iter().all(|f| f.reason == FailureReason::Oversized));
    }

    #[test]
    fn prop_no_page_is_empty(sizes in sizes_strategy()) {
        let outcome = pack(&sizes);
        for (i, page) in outcome.pages.iter().enumerate() {
            prop_assert_eq!(page.index, i);
            prop_assert!(!page.placements.is_empty());
        }
    }

    #[test]
    fn prop_fractional_sizes_near_page_bound(
        sizes in proptest::collection::vec(
            (f64::from(PAGE) - 1.0..f64::from(PAGE) + 1.0, 0.5f64..f64::from(PAGE)),
            1..10,
        )
    ) {
        let images: Vec<PackImage<usize>> = sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| PackImage::new(format!("img{i}"), i, w, h))
            .collect();
        let outcome = pack_images(images, &make_config()).unwrap();

        let expected_failures = sizes.iter().filter(|size| size.0.ceil() > f64::from(PAGE)).count();
        prop_assert_eq!(outcome.failures.len(), expected_failures);
        prop_assert!(outcome.failures.iter().all(|f| f.reason == FailureReason::Oversized));

        let page_rect = Rect::new(0, 0, PAGE, PAGE);
        for page in &outcome.pages {
            for placement in &page.placements {
                prop_assert!(page_rect.contains(&placement.rect));
            }
        }
    }

    #[test]
    fn prop_packing_is_deterministic(sizes in sizes_strategy()) {
        prop_assert_eq!(pack(&sizes), pack(&sizes));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixed cases
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_exact_page_fill() {
    // Four quarters fill one page exactly.
    let outcome = pack(&[(64, 64), (64, 64), (64, 64), (64, 64)]);
    assert_eq!(outcome.pages.len(), 1);
    let rects: Vec<Rect> = outcome.pages[0].placements.iter().map(|p| p.rect).collect();
    assert_eq!(
        rects,
        vec![
            Rect::new(0, 0, 64, 64),
            Rect::new(64, 0, 64, 64),
            Rect::new(0, 64, 64, 64),
            Rect::new(64, 64, 64, 64),
        ]
    );
}

#[test]
fn test_huge_image_after_small_one_is_reported() {
    let images = vec![
        PackImage::new("small", 0usize, 10.0, 10.0),
        PackImage::new("huge", 1usize, 1e12, 1.0),
    ];
    let outcome = pack_images(images, &ExportConfig::default()).unwrap();

    assert_eq!(outcome.placed_count(), 1);
    assert_eq!(outcome.pages[0].placements[0].image.name, "small");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].name, "huge");
    assert_eq!(outcome.failures[0].reason, FailureReason::Oversized);
}

#[test]
fn test_empty_input() {
    let outcome = pack(&[]);
    assert!(outcome.pages.is_empty());
    assert!(outcome.failures.is_empty());
}
