use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign};

/// An RGB triple.
///
/// Components are left unclamped while light is being accumulated; clamping
/// only happens when converting to display values.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Colour {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0.0, 0.0, 0.0);
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);

    /// Create a new colour.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Same value in all three channels.
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Linear interpolation, `t = 0` gives `self` and `t = 1` gives `other`.
    pub fn lerp(self, other: Colour, t: f64) -> Colour {
        (1.0 - t) * self + t * other
    }

    /// Square-root tone curve (gamma 2.0) followed by a clamp to `[0, 1]`.
    pub fn tonemapped(self) -> Colour {
        let curve = |c: f64| if c > 0.0 { c.sqrt().min(1.0) } else { 0.0 };
        Colour::new(curve(self.r), curve(self.g), curve(self.b))
    }

    /// Convert to 8-bit channels after [`Colour::tonemapped`].
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.tonemapped();
        [
            (255.0 * c.r) as u8,
            (255.0 * c.g) as u8,
            (255.0 * c.b) as u8,
        ]
    }
}

impl Add for Colour {
    type Output = Colour;

    fn add(self, rhs: Colour) -> Colour {
        Colour::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Colour {
    fn add_assign(&mut self, rhs: Colour) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

/// Componentwise product, used for attenuation.
impl Mul for Colour {
    type Output = Colour;

    fn mul(self, rhs: Colour) -> Colour {
        Colour::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl MulAssign for Colour {
    fn mul_assign(&mut self, rhs: Colour) {
        self.r *= rhs.r;
        self.g *= rhs.g;
        self.b *= rhs.b;
    }
}

impl Mul<Colour> for f64 {
    type Output = Colour;

    fn mul(self, rhs: Colour) -> Colour {
        Colour::new(self * rhs.r, self * rhs.g, self * rhs.b)
    }
}

impl Div<f64> for Colour {
    type Output = Colour;

    fn div(self, rhs: f64) -> Colour {
        Colour::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

impl DivAssign<f64> for Colour {
    fn div_assign(&mut self, rhs: f64) {
        self.r /= rhs;
        self.g /= rhs;
        self.b /= rhs;
    }
}
