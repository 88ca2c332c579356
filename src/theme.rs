use crate::flowable::{BorderSpec, TextStyle};
use crate::model::ReadinessStatus;
use crate::rules::DtiStatus;
use crate::types::Color;

pub const PRIMARY: Color = Color::rgb8(0x25, 0x63, 0xeb);
pub const SUCCESS: Color = Color::rgb8(0x10, 0xb9, 0x81);
pub const WARNING: Color = Color::rgb8(0xf5, 0x9e, 0x0b);
pub const DANGER: Color = Color::rgb8(0xef, 0x44, 0x44);
pub const GRAY: Color = Color::rgb8(0x6b, 0x72, 0x80);
pub const LIGHT_GRAY: Color = Color::rgb8(0xf3, 0xf4, 0xf6);
pub const DARK_GRAY: Color = Color::rgb8(0x1f, 0x29, 0x37);
pub const GRID: Color = Color::rgb8(0xe5, 0xe7, 0xeb);
pub const DEBT_HEADER: Color = Color::rgb8(0x7c, 0x3a, 0xed);
pub const DEBT_TOTAL: Color = Color::rgb8(0xed, 0xe9, 0xfe);

/// Accent and tint used by the verdict banner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusTheme {
    pub accent: Color,
    pub background: Color,
}

pub fn status_theme(status: ReadinessStatus) -> StatusTheme {
    match status {
        ReadinessStatus::Ready => StatusTheme {
            accent: SUCCESS,
            background: Color::rgb8(0xd1, 0xfa, 0xe5),
        },
        ReadinessStatus::Almost => StatusTheme {
            accent: WARNING,
            background: Color::rgb8(0xfe, 0xf3, 0xc7),
        },
        ReadinessStatus::NotReady => StatusTheme {
            accent: DANGER,
            background: Color::rgb8(0xfe, 0xe2, 0xe2),
        },
    }
}

pub fn dti_color(status: DtiStatus) -> Color {
    match status {
        DtiStatus::Good => SUCCESS,
        DtiStatus::High => WARNING,
        DtiStatus::TooHigh => DANGER,
        DtiStatus::Unknown => GRAY,
    }
}

pub fn grid() -> BorderSpec {
    BorderSpec::new(1.0, GRID)
}

pub fn title() -> TextStyle {
    TextStyle::sized(28.0).with_color(PRIMARY).bold()
}

pub fn subtitle() -> TextStyle {
    TextStyle::sized(12.0).with_color(GRAY)
}

pub fn section_header() -> TextStyle {
    TextStyle::sized(16.0).with_color(DARK_GRAY).bold()
}

pub fn body() -> TextStyle {
    TextStyle::sized(11.0).with_color(DARK_GRAY)
}

pub fn note() -> TextStyle {
    TextStyle::sized(9.0).with_color(GRAY).italic()
}

pub fn footer() -> TextStyle {
    TextStyle::sized(9.0).with_color(GRAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_matches_hex_values() {
        assert_eq!(Color::hex("#2563eb"), Some(PRIMARY));
        assert_eq!(Color::hex("#7c3aed"), Some(DEBT_HEADER));
        assert_eq!(
            status_theme(ReadinessStatus::Almost).background,
            Color::hex("#fef3c7").expect("hex")
        );
    }

    #[test]
    fn unknown_dti_is_neutral() {
        assert_eq!(dti_color(DtiStatus::Unknown), GRAY);
        assert_eq!(dti_color(DtiStatus::TooHigh), DANGER);
    }
}
