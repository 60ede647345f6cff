use super::*;
use crate::aggregate::aggregator::{AggregationMode, AlbumSample, AlbumSet, aggregate};
use crate::tiering::{classify::assign_tiers, groups::group_by_tier};

/// `n` albums that all land in tier 1, with strictly decreasing popularity.
fn tier_one_albums(n: usize) -> AlbumSet {
    let samples = (0..n).map(|i| {
        AlbumSample::new(format!("album-{i}"), None, 99.0 - i as f64)
            .with_image_ref(Some(format!("cover-{i}.png")))
    });
    let mut set = aggregate(samples, 100, AggregationMode::MeanOfSamples).unwrap();
    assign_tiers(&mut set, &TierThresholdTable::new(&[0]).unwrap()).unwrap();
    set
}

fn assert_disjoint(slots: &[LayoutSlot<'_>]) {
    for (i, a) in slots.iter().enumerate() {
        for b in &slots[i + 1..] {
            let overlap = a.rect.intersect(b.rect).area();
            assert_eq!(
                overlap, 0.0,
                "slots {} and {} overlap: {:?} vs {:?}",
                a.index, b.index, a.rect, b.rect
            );
        }
    }
}

#[test]
fn five_albums_form_one_standard_row() {
    let set = tier_one_albums(5);
    let groups = group_by_tier(&set).unwrap();
    let slots = layout(&groups, &TierAnchors::default_for(1), &LayoutParams::default()).unwrap();

    assert_eq!(slots.len(), 5);
    for (i, slot) in slots.iter().enumerate() {
        assert_eq!(slot.index, i);
        assert_eq!(slot.size_px(), (200, 200));
        assert_eq!(slot.origin_px(), (30 + 250 * i as i64, 50));
    }
    assert_disjoint(&slots);
}

#[test]
fn eleven_albums_use_three_standard_and_eight_half_slots() {
    let set = tier_one_albums(11);
    let groups = group_by_tier(&set).unwrap();
    let slots = layout(&groups, &TierAnchors::default_for(1), &LayoutParams::default()).unwrap();

    assert_eq!(slots.len(), 11);
    let standard = slots.iter().filter(|s| s.size_px() == (200, 200)).count();
    let half = slots.iter().filter(|s| s.size_px() == (100, 100)).count();
    assert_eq!((standard, half), (3, 8));

    let origins: Vec<_> = slots.iter().map(|s| s.origin_px()).collect();
    assert_eq!(
        origins,
        [
            (30, 50),
            (280, 50),
            (530, 50),
            (780, 50),
            (890, 50),
            (780, 160),
            (890, 160),
            (1030, 50),
            (1140, 50),
            (1030, 160),
            (1140, 160),
        ]
    );
    assert_disjoint(&slots);
}

#[test]
fn albums_past_eleven_get_no_slot() {
    let set = tier_one_albums(14);
    let groups = group_by_tier(&set).unwrap();
    let slots = layout(&groups, &TierAnchors::default_for(1), &LayoutParams::default()).unwrap();
    assert_eq!(slots.len(), 11);
    assert!(slots.iter().all(|s| s.index < MAX_VISIBLE_PER_TIER));
    assert_eq!(slot_rect(11, 14, Point::ZERO, &LayoutParams::default()), None);
}

#[test]
fn six_albums_switch_to_dense_layout() {
    let params = LayoutParams::default();
    let anchor = Point::new(0.0, 0.0);
    let r5 = slot_rect(5, 6, anchor, &params).unwrap();
    assert_eq!(r5, Rect::new(750.0, 110.0, 850.0, 210.0));
    let r4 = slot_rect(4, 5, anchor, &params).unwrap();
    assert_eq!(r4, Rect::new(1000.0, 0.0, 1200.0, 200.0));
}

#[test]
fn empty_tier_yields_no_slots() {
    let set = AlbumSet::default();
    let groups = group_by_tier(&set).unwrap();
    let slots = layout(&groups, &TierAnchors::default_for(8), &LayoutParams::default()).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn missing_cover_keeps_index_but_draws_nothing() {
    let samples = vec![
        AlbumSample::new("a", None, 90.0).with_image_ref(Some("a.png".into())),
        AlbumSample::new("b", None, 80.0),
        AlbumSample::new("c", None, 70.0).with_image_ref(Some("c.png".into())),
    ];
    let mut set = aggregate(samples, 10, AggregationMode::MeanOfSamples).unwrap();
    assign_tiers(&mut set, &TierThresholdTable::new(&[0]).unwrap()).unwrap();
    let groups = group_by_tier(&set).unwrap();
    let slots = layout(&groups, &TierAnchors::default_for(1), &LayoutParams::default()).unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[1].album.name, "c");
    assert_eq!(slots[1].index, 2);
    assert_eq!(slots[1].origin_px(), (530, 50));
}

#[test]
fn tiers_use_their_own_anchor() {
    let samples = vec![
        AlbumSample::new("hot", None, 90.0).with_image_ref(Some("h.png".into())),
        AlbumSample::new("cold", None, 2.0).with_image_ref(Some("c.png".into())),
    ];
    let mut set = aggregate(samples, 10, AggregationMode::MeanOfSamples).unwrap();
    assign_tiers(&mut set, &TierThresholdTable::default()).unwrap();
    let groups = group_by_tier(&set).unwrap();
    let slots = layout(&groups, &TierAnchors::default_for(8), &LayoutParams::default()).unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!((slots[0].tier, slots[0].origin_px()), (1, (30, 50)));
    assert_eq!((slots[1].tier, slots[1].origin_px()), (8, (30, 2000)));
}

#[test]
fn missing_anchor_is_a_validation_error() {
    let samples = vec![AlbumSample::new("cold", None, 2.0).with_image_ref(Some("c.png".into()))];
    let mut set = aggregate(samples, 10, AggregationMode::MeanOfSamples).unwrap();
    assign_tiers(&mut set, &TierThresholdTable::default()).unwrap();
    let groups = group_by_tier(&set).unwrap();
    let err = layout(&groups, &TierAnchors::default_for(2), &LayoutParams::default()).unwrap_err();
    assert!(matches!(err, IcebergError::Validation(_)));
}

#[test]
fn default_anchors_extend_past_eight_tiers() {
    let anchors = TierAnchors::default_for(10);
    assert_eq!(anchors.len(), 10);
    assert_eq!(anchors.get(8), Some(Point::new(30.0, 2000.0)));
    assert_eq!(anchors.get(10), Some(Point::new(30.0, 2600.0)));
    assert_eq!(anchors.get(0), None);

    assert!(anchors.ensure_covers(&TierThresholdTable::default()).is_ok());
    assert!(
        TierAnchors::default_for(3)
            .ensure_covers(&TierThresholdTable::default())
            .is_err()
    );
}

#[test]
fn explicit_anchors_must_be_finite() {
    assert!(TierAnchors::new(vec![]).is_err());
    assert!(TierAnchors::new(vec![Point::new(f64::NAN, 0.0)]).is_err());
    assert_eq!(
        TierAnchors::new(vec![Point::new(1.0, 2.0)]).unwrap().points(),
        &[Point::new(1.0, 2.0)]
    );
}

#[test]
fn anchors_outside_pixel_range_are_rejected() {
    let err = TierAnchors::new(vec![Point::new(1e19, 0.0)]).unwrap_err();
    assert!(matches!(err, IcebergError::Validation(_)));
    assert!(TierAnchors::new(vec![Point::new(0.0, -2e6)]).is_err());
    assert!(TierAnchors::new(vec![Point::new(-MAX_COORDINATE, MAX_COORDINATE)]).is_ok());
}

#[test]
fn layout_params_are_bounded() {
    assert!(LayoutParams::default().validate().is_ok());

    let huge = LayoutParams {
        standard_size: 1e12,
        ..LayoutParams::default()
    };
    assert!(matches!(
        huge.validate().unwrap_err(),
        IcebergError::Validation(_)
    ));

    let zero_half = LayoutParams {
        half_size: 0.0,
        ..LayoutParams::default()
    };
    assert!(zero_half.validate().is_err());

    let nan_gap = LayoutParams {
        gap: f64::NAN,
        ..LayoutParams::default()
    };
    assert!(nan_gap.validate().is_err());
}
