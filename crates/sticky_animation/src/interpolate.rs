//! Linear interpolation over a scalar domain
//!
//! The domain is usually a range of header heights and the range a property
//! value (alpha, a frame component). Evaluation outside the domain
//! extrapolates; callers clamp by choosing which regime they evaluate in.

use sticky_core::Rect;

/// Evaluate the affine function `f` with `f(domain_start) = range_start` and
/// `f(domain_end) = range_end` at `x`.
///
/// `domain_start` must differ from `domain_end`. This is a precondition, not a
/// checked error: a degenerate domain yields a non-finite result in release
/// builds.
#[inline]
pub fn interpolate(
    domain_start: f32,
    domain_end: f32,
    range_start: f32,
    range_end: f32,
    x: f32,
) -> f32 {
    debug_assert!(
        domain_start != domain_end,
        "interpolate called with an empty domain"
    );
    // Weighted form so both endpoints come out exact
    let t = (x - domain_start) / (domain_end - domain_start);
    range_start * (1.0 - t) + range_end * t
}

/// A reusable linear map from one scalar range to another
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearMap {
    pub domain: (f32, f32),
    pub range: (f32, f32),
}

impl LinearMap {
    pub const fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// True when the domain has zero length and `apply` is undefined
    pub fn is_degenerate(&self) -> bool {
        self.domain.0 == self.domain.1
    }

    pub fn apply(&self, x: f32) -> f32 {
        interpolate(self.domain.0, self.domain.1, self.range.0, self.range.1, x)
    }

    /// Same domain, different range
    pub fn with_range(self, start: f32, end: f32) -> Self {
        Self {
            domain: self.domain,
            range: (start, end),
        }
    }
}

/// Interpolate every component of a frame across `domain`, evaluated at `x`.
pub fn lerp_rect(start: Rect, end: Rect, domain: (f32, f32), x: f32) -> Rect {
    let map = |a: f32, b: f32| interpolate(domain.0, domain.1, a, b, x);
    Rect::new(
        map(start.x(), end.x()),
        map(start.y(), end.y()),
        map(start.width(), end.width()),
        map(start.height(), end.height()),
    )
}
