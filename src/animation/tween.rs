use crate::foundation::core::Vec2;
use crate::foundation::math::lerp_f64;

/// Interpolation contract for tweened attribute types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        lerp_f64(*a, *b, t)
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(lerp_f64(a.x, b.x, t), lerp_f64(a.y, b.y, t))
    }
}

/// A single attribute animating from `from` to `to`.
///
/// `t` is already eased by the owning transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Tween<T> {
    pub(crate) from: T,
    pub(crate) to: T,
}

impl<T: Lerp + Clone> Tween<T> {
    /// A tween that holds `value` for its whole duration.
    pub(crate) fn hold(value: T) -> Self {
        Self {
            from: value.clone(),
            to: value,
        }
    }

    pub(crate) fn new(from: T, to: T) -> Self {
        Self { from, to }
    }

    pub(crate) fn at(&self, t: f64) -> T {
        if t <= 0.0 {
            return self.from.clone();
        }
        if t >= 1.0 {
            return self.to.clone();
        }
        T::lerp(&self.from, &self.to, t)
    }

    /// Collapse onto the end value.
    pub(crate) fn settle(&mut self) {
        self.from = self.to.clone();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
