//! Version id ordering for report columns.

use std::cmp::Ordering;

/// Numeric value of a version component: its leading ASCII digits, or `None` when there are none.
///
/// Parsed as `f64`, so arbitrarily long digit runs still compare numerically (with rounding past 2^53).
fn component(part: &str) -> Option<f64> {
    let end = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
    part[..end].parse().ok()
}

/// Compare two dotted version ids, newest first.
///
/// `Ordering::Less` means `a` is listed before `b`.
///
/// ## Notes
/// - Only the first `a.split('.').count()` components are compared, so `"1.0"` and `"1.0.5"` compare equal.
/// - A component without a numeric value (or missing from `b`) never matches; `a` is then listed first. The relation
///   is therefore not a total order; use [`sort_newest_first`] rather than `slice::sort_by`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let b: Vec<Option<f64>> = b.split('.').map(component).collect();
    for (i, x) in a.split('.').map(component).enumerate() {
        match (x, b.get(i).copied().flatten()) {
            (Some(x), Some(y)) if x == y => {}
            (Some(x), Some(y)) if x < y => return Ordering::Greater,
            _ => return Ordering::Less,
        }
    }
    Ordering::Equal
}

/// Stable insertion sort by [`compare_versions`], newest first.
pub fn sort_newest_first<T>(items: &mut [T], version: impl Fn(&T) -> &str) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare_versions(version(&items[j]), version(&items[j - 1])) == Ordering::Less {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}
