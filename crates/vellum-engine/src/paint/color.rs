/// Packs straight-alpha channels as `0xAARRGGBB`.
#[inline]
pub const fn color_set_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Straight-alpha ARGB8888 color, packed `0xAARRGGBB`.
///
/// This is the API-facing color: paints, gradient stops and clears use it.
/// Blending happens on [`Color4f`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const BLUE: Color = Color(0xFF00_00FF);
    pub const CYAN: Color = Color(0xFF00_FFFF);

    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(color_set_argb(a, r, g, b))
    }

    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// `[a, r, g, b]`.
    #[inline]
    pub const fn channels(self) -> [u8; 4] {
        [self.a(), self.r(), self.g(), self.b()]
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Color((self.0 & 0x00FF_FFFF) | ((a as u32) << 24))
    }

    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a() == 0xFF
    }
}

impl From<u32> for Color {
    #[inline]
    fn from(argb: u32) -> Self {
        Color(argb)
    }
}

/// Linear premultiplied RGBA color.
///
/// Invariant:
/// - `rgb` components are expected to be multiplied by `a` (premultiplied alpha).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color4f {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color4f {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    /// Premultiplies an 8-bit straight-alpha color.
    #[inline]
    pub fn from_color(c: Color) -> Self {
        Self::from_straight(
            c.r() as f32 / 255.0,
            c.g() as f32 / 255.0,
            c.b() as f32 / 255.0,
            c.a() as f32 / 255.0,
        )
    }

    /// Un-premultiplies and quantizes back to 8 bits.
    pub fn to_color(self) -> Color {
        let (r, g, b, a) = self.clamped().to_straight();
        let q = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Color::from_argb(q(a), q(r), q(g), q(b))
    }

    /// Debug-only validation: asserts that RGB channels do not exceed alpha,
    /// which would indicate a straight-alpha color was passed where premul was expected.
    ///
    /// No-op in release builds.
    #[inline]
    pub fn debug_assert_premul(self) {
        debug_assert!(
            self.r <= self.a + 1e-4 && self.g <= self.a + 1e-4 && self.b <= self.a + 1e-4,
            "Color4f::debug_assert_premul: {self:?} has rgb > a, looks like straight alpha"
        );
    }

    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: (r.clamp(0.0, 1.0)) * a,
            g: (g.clamp(0.0, 1.0)) * a,
            b: (b.clamp(0.0, 1.0)) * a,
            a,
        }
    }

    /// Returns a straight-alpha representation.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Clamps all channels to [0, 1] and enforces premultiplication.
    #[inline]
    pub fn clamped(self) -> Self {
        let a = self.a.clamp(0.0, 1.0);
        let r = self.r.clamp(0.0, a);
        let g = self.g.clamp(0.0, a);
        let b = self.b.clamp(0.0, a);
        Self { r, g, b, a }
    }

    #[inline]
    pub fn scale(self, k: f32) -> Self {
        Self { r: self.r * k, g: self.g * k, b: self.b * k, a: self.a * k }
    }

    /// `self + (other - self) * t`, channel-wise.
    #[inline]
    pub fn lerp(self, other: Color4f, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_packing() {
        assert_eq!(color_set_argb(0xFF, 0x42, 0x85, 0xF4), 0xFF42_85F4);
        let c = Color(0x80FF_4020);
        assert_eq!(c.channels(), [0x80, 0xFF, 0x40, 0x20]);
        assert_eq!(c.with_alpha(0xFF), Color(0xFFFF_4020));
    }

    #[test]
    fn premul_round_trip_is_exact_for_opaque() {
        let c = Color(0xFFDB_4437);
        assert_eq!(Color4f::from_color(c).to_color(), c);
    }

    #[test]
    fn half_alpha_premultiplies() {
        let p = Color4f::from_color(Color::from_argb(0xFF / 2 + 1, 0xFF, 0, 0));
        assert!((p.r - p.a).abs() < 1e-6);
        assert_eq!(p.g, 0.0);
        p.debug_assert_premul();
    }

    #[test]
    fn transparent_un_premultiplies_to_zero() {
        assert_eq!(Color4f::transparent().to_color(), Color::TRANSPARENT);
    }
}
