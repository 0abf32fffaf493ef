use super::*;

#[test]
fn linear_maps_domain_to_range() {
    let x = LinearScale::new([0.0, 100.0], [140.0, 950.0]);
    assert_eq!(x.apply(0.0), 140.0);
    assert_eq!(x.apply(100.0), 950.0);
    assert_eq!(x.apply(50.0), 545.0);
}

#[test]
fn degenerate_domain_maps_to_range_midpoint() {
    let x = LinearScale::new([0.0, 0.0], [0.0, 100.0]);
    assert_eq!(x.apply(0.0), 50.0);
}

#[test]
fn ticks_pick_nice_steps() {
    assert_eq!(
        ticks(0.0, 1000.0, 6.0),
        vec![0.0, 200.0, 400.0, 600.0, 800.0, 1000.0]
    );
    assert_eq!(ticks(0.0, 10.0, 10.0).len(), 11);
    assert_eq!(ticks(0.0, 1.0, 5.0), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    assert_eq!(ticks(0.0, 1234.0, 6.0).last().copied(), Some(1200.0));
}

#[test]
fn ticks_edge_cases() {
    assert!(ticks(0.0, 10.0, 0.0).is_empty());
    assert_eq!(ticks(5.0, 5.0, 6.0), vec![5.0]);
    assert_eq!(ticks(10.0, 0.0, 2.0), vec![10.0, 5.0, 0.0]);
}

#[test]
fn tick_step_matches_tick_spacing() {
    let x = LinearScale::new([0.0, 1000.0], [0.0, 1.0]);
    assert_eq!(x.tick_step(6.0), 200.0);
    let x = LinearScale::new([0.0, 1.0], [0.0, 1.0]);
    assert!((x.tick_step(5.0) - 0.2).abs() < 1e-12);
}

#[test]
fn band_scale_matches_rounded_d3_layout() {
    let y = BandScale::new(10, [0.0, 1000.0], 0.1, true);
    assert_eq!(y.step(), 99.0);
    assert_eq!(y.bandwidth(), 89.0);
    assert_eq!(y.position(0), 10.0);
    assert_eq!(y.position(1), 109.0);
    assert_eq!(y.position(9), 10.0 + 99.0 * 9.0);
    assert_eq!(y.position(99), y.position(9));
}

#[test]
fn band_scale_without_rounding_keeps_fractions() {
    let y = BandScale::new(4, [0.0, 100.0], 0.0, false);
    assert_eq!(y.step(), 25.0);
    assert_eq!(y.bandwidth(), 25.0);
    assert_eq!(y.position(2), 50.0);
}
