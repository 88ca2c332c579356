use crate::types::Pt;

// Advance widths (1/1000 em) for printable ASCII 0x20..=0x7E, from the base-14 AFM files.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

/// The Helvetica members of the PDF base-14 set. These need no embedding, which
/// keeps the rendered report free of external font files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Base14Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl Base14Font {
    pub fn variant(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Base14Font::Helvetica,
            (true, false) => Base14Font::HelveticaBold,
            (false, true) => Base14Font::HelveticaOblique,
            (true, true) => Base14Font::HelveticaBoldOblique,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "helvetica" => Some(Base14Font::Helvetica),
            "helvetica-bold" => Some(Base14Font::HelveticaBold),
            "helvetica-oblique" => Some(Base14Font::HelveticaOblique),
            "helvetica-boldoblique" => Some(Base14Font::HelveticaBoldOblique),
            _ => None,
        }
    }

    pub fn pdf_name(self) -> &'static str {
        match self {
            Base14Font::Helvetica => "Helvetica",
            Base14Font::HelveticaBold => "Helvetica-Bold",
            Base14Font::HelveticaOblique => "Helvetica-Oblique",
            Base14Font::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    fn is_bold(self) -> bool {
        matches!(
            self,
            Base14Font::HelveticaBold | Base14Font::HelveticaBoldOblique
        )
    }

    // Obliques share the upright advances.
    fn advance(self, ch: char) -> u16 {
        let table = if self.is_bold() {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            table[(code - 0x20) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }

    pub fn measure_text_width(self, font_size: Pt, text: &str) -> Pt {
        let units: i64 = text.chars().map(|ch| self.advance(ch) as i64).sum();
        Pt::from_milli_i64(units * font_size.to_milli_i64() / 1000)
    }

    pub fn line_height(font_size: Pt) -> Pt {
        font_size.mul_ratio(6, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_known_advances() {
        let size = Pt::from_f32(10.0);
        // "$0" = 556 + 556 units.
        assert_eq!(
            Base14Font::Helvetica.measure_text_width(size, "$0"),
            Pt::from_f32(11.12)
        );
        assert_eq!(
            Base14Font::HelveticaBold.measure_text_width(size, "i"),
            Pt::from_f32(2.78)
        );
        assert_eq!(
            Base14Font::HelveticaOblique.measure_text_width(size, "i"),
            Pt::from_f32(2.22)
        );
    }

    #[test]
    fn non_ascii_uses_fallback_width() {
        let size = Pt::from_f32(1.0);
        assert_eq!(
            Base14Font::Helvetica.measure_text_width(size, "\u{2713}"),
            Pt::from_milli_i64(556)
        );
    }

    #[test]
    fn names_round_trip() {
        for font in [
            Base14Font::Helvetica,
            Base14Font::HelveticaBold,
            Base14Font::HelveticaOblique,
            Base14Font::HelveticaBoldOblique,
        ] {
            assert_eq!(Base14Font::from_name(font.pdf_name()), Some(font));
        }
        assert_eq!(Base14Font::from_name("Times-Roman"), None);
    }
}
