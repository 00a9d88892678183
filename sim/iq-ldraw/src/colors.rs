//! VEX IQ LDraw color palette.
//!
//! Codes and RGB values follow the LDConfig palette shipped with the VEX IQ
//! part library. Unknown codes resolve to medium gray.

/// (code, r, g, b, name)
type PaletteEntry = (i32, f64, f64, f64, &'static str);

#[rustfmt::skip]
static PALETTE: &[PaletteEntry] = &[
    // Special
    (16,  1.000, 1.000, 1.000, "Main Color"),
    (24,  0.500, 0.500, 0.500, "Edge Color"),

    // Solid colors
    (0,   0.145, 0.157, 0.165, "VEX Black"),
    (2,   0.000, 0.588, 0.224, "VEX Green"),
    (4,   0.824, 0.149, 0.188, "VEX Red"),
    (5,   0.898, 0.427, 0.694, "VEX Pink"),
    (7,   0.698, 0.706, 0.698, "VEX Light Gray"),
    (10,  0.263, 0.690, 0.165, "VEX Bright Green"),
    (11,  0.000, 0.698, 0.765, "VEX Teal"),
    (14,  1.000, 0.804, 0.000, "VEX Yellow"),
    (15,  1.000, 1.000, 1.000, "VEX Bright White"),
    (17,  0.761, 0.855, 0.722, "Light Green"),
    (22,  0.373, 0.145, 0.624, "VEX Purple"),
    (25,  1.000, 0.404, 0.122, "VEX Orange"),
    (26,  0.882, 0.000, 0.596, "VEX Magenta"),
    (27,  0.710, 0.741, 0.000, "VEX Chartreuse"),
    (71,  0.537, 0.553, 0.553, "VEX Medium Gray"),
    (72,  0.329, 0.345, 0.353, "VEX Dark Gray"),
    (73,  0.000, 0.467, 0.784, "VEX Blue"),
    (80,  0.816, 0.816, 0.816, "Metal"),
    (84,  0.796, 0.376, 0.082, "VEX Burnt Orange"),
    (89,  0.000, 0.200, 0.627, "VEX Navy Blue"),
    (112, 0.420, 0.357, 0.780, "VEX Lavender"),
    (115, 0.592, 0.843, 0.000, "VEX Lime Green"),
    (150, 0.733, 0.780, 0.839, "VEX Light Slate Gray"),
    (151, 0.851, 0.851, 0.839, "VEX White"),
    (191, 0.855, 0.667, 0.000, "VEX Gold"),
    (212, 0.384, 0.710, 0.898, "VEX Sky Blue"),
    (216, 0.463, 0.137, 0.184, "VEX Maroon"),
    (272, 0.000, 0.298, 0.592, "VEX Royal Blue"),
    (288, 0.125, 0.361, 0.251, "VEX Dark Green"),
    (320, 0.651, 0.098, 0.180, "VEX Crimson Red"),
    (321, 0.196, 0.384, 0.584, "VEX Denim Blue"),
    (462, 1.000, 0.596, 0.000, "VEX Citrus Orange"),
    (503, 0.780, 0.788, 0.780, "VEX Very Light Gray"),

    // Rubber
    (256, 0.129, 0.129, 0.129, "Rubber Black"),
    (504, 0.537, 0.529, 0.533, "Rubber Gray"),
];

/// Resolve an LDraw color code to RGB in `0.0..=1.0`.
///
/// Unknown codes fall back to medium gray (0.5, 0.5, 0.5).
#[must_use]
pub fn color_rgb(code: i32) -> [f64; 3] {
    PALETTE
        .iter()
        .find(|(c, ..)| *c == code)
        .map_or([0.5, 0.5, 0.5], |&(_, r, g, b, _)| [r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_colors() {
        assert_eq!(color_rgb(4), [0.824, 0.149, 0.188]);
        assert_eq!(color_rgb(72), [0.329, 0.345, 0.353]);
    }

    #[test]
    fn test_unknown_code_falls_back_to_gray() {
        assert_eq!(color_rgb(9999), [0.5, 0.5, 0.5]);
    }
}
