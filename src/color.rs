//! Color values and channel-wise arithmetic (spec §4.4 "Arithmetic on
//! `HexColor`/`RGB`/`RGBA` with a number distributes the operation
//! channel-wise, clamping to `[0, 255]`").

/// An RGBA color. Hex literals (`#fff`, `#rrggbb`, `#rrggbbaa`), `rgb()`, and
/// `hsl()` all normalize into this representation; the original textual
/// form is not retained (spec's `HexColor`/`RGBColor`/`RGBAColor`/`HSLColor`
/// are distinct *expression* kinds, but they evaluate to one *value* kind).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
}

impl Color {
    pub const fn new_rgb(red: u8, green: u8, blue: u8) -> Self {
        Color {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    pub const fn new_rgba(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Color {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn from_hex(digits: &str) -> Option<Self> {
        let expand = |c: char| -> Option<u8> {
            let h = c.to_digit(16)? as u8;
            Some(h * 16 + h)
        };

        match digits.len() {
            3 => Some(Color::new_rgb(
                expand(digits.chars().nth(0)?)?,
                expand(digits.chars().nth(1)?)?,
                expand(digits.chars().nth(2)?)?,
            )),
            6 | 8 => {
                let byte = |i: usize| -> Option<u8> {
                    u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).ok()
                };
                let r = byte(0)?;
                let g = byte(1)?;
                let b = byte(2)?;
                let a = if digits.len() == 8 {
                    byte(3)? as f64 / 255.0
                } else {
                    1.0
                };
                Some(Color::new_rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let (r, g, b) = hsl_to_rgb(h, s, l);
        Color::new_rgb(r, g, b)
    }

    pub fn to_css_string(self) -> String {
        if (self.alpha - 1.0).abs() < f64::EPSILON {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }

    /// Channel-wise arithmetic against a bare number, clamped to `[0, 255]`.
    pub fn apply_channelwise<F: Fn(f64, f64) -> f64>(self, n: f64, f: F) -> Self {
        let clamp = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Color {
            red: clamp(f(self.red as f64, n)),
            green: clamp(f(self.green as f64, n)),
            blue: clamp(f(self.blue as f64, n)),
            alpha: self.alpha,
        }
    }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    let hue_to_rgb = |p: f64, q: f64, mut t: f64| -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    };

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}
