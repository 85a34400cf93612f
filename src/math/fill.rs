//! Gap filling for evenly spaced series.
//!
//! A gap is a NaN entry. Infinite values are *not* gaps and are left for the
//! caller to handle.

/// Forward-fill, then back-fill, NaN entries in place.
///
/// An all-NaN slice is left untouched.
pub fn forward_back_fill(values: &mut [f64]) {
    let mut last = None;
    for v in values.iter_mut() {
        if v.is_nan() {
            if let Some(prev) = last {
                *v = prev;
            }
        } else {
            last = Some(*v);
        }
    }

    let mut next = None;
    for v in values.iter_mut().rev() {
        if v.is_nan() {
            if let Some(following) = next {
                *v = following;
            }
        } else {
            next = Some(*v);
        }
    }
}
