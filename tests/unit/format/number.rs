use super::*;

#[test]
fn grouped_int_inserts_separators() {
    assert_eq!(format_grouped_int(0.0), "0");
    assert_eq!(format_grouped_int(999.0), "999");
    assert_eq!(format_grouped_int(1000.0), "1,000");
    assert_eq!(format_grouped_int(1234567.0), "1,234,567");
}

#[test]
fn grouped_int_rounds_half_up() {
    assert_eq!(format_grouped_int(1234.5), "1,235");
    assert_eq!(format_grouped_int(1234.49), "1,234");
    assert_eq!(format_grouped_int(-2.5), "-2");
    assert_eq!(format_grouped_int(-1500.7), "-1,501");
}

#[test]
fn tick_precision_follows_step() {
    assert_eq!(format_tick(1000.0, 200.0), "1,000");
    assert_eq!(format_tick(0.4, 0.2), "0.4");
    assert_eq!(format_tick(0.05, 0.05), "0.05");
    assert_eq!(format_tick(12500.0, 2500.0), "12,500");
}
