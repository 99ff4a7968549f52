//! The standard 14 Type1 fonts every PDF reader provides.

use folio_types::TextStyle;

const FAMILIES: [(&str, [&str; 4]); 3] = [
    (
        "Helvetica",
        ["Helvetica", "Helvetica-Bold", "Helvetica-Oblique", "Helvetica-BoldOblique"],
    ),
    (
        "Times-Roman",
        ["Times-Roman", "Times-Bold", "Times-Italic", "Times-BoldItalic"],
    ),
    (
        "Courier",
        ["Courier", "Courier-Bold", "Courier-Oblique", "Courier-BoldOblique"],
    ),
];

const SYMBOLIC: [&str; 2] = ["Symbol", "ZapfDingbats"];

/// Resolves a style to a standard base font name, applying weight and slant.
/// Returns `None` for fonts outside the standard set.
pub fn base_font(style: &TextStyle) -> Option<&'static str> {
    let requested = style.font.trim();
    let family = match requested {
        "Times" => "Times-Roman",
        "Arial" => "Helvetica",
        other => other,
    };

    if let Some(symbolic) = SYMBOLIC.into_iter().find(|s| *s == family) {
        return Some(symbolic);
    }
    for (name, variants) in FAMILIES {
        if name == family {
            let index = usize::from(style.bold) + 2 * usize::from(style.italic);
            return Some(match index {
                0 => variants[0],
                1 => variants[1],
                2 => variants[2],
                _ => variants[3],
            });
        }
        // An explicit variant name is honoured as-is.
        if let Some(variant) = variants.into_iter().find(|v| *v == family) {
            return Some(variant);
        }
    }
    None
}

pub fn is_symbolic(base: &str) -> bool {
    SYMBOLIC.contains(&base)
}

/// Rough advance width for alignment, in points. Standard fonts average
/// about half an em per glyph; Courier is exactly 0.6 em.
pub fn approximate_width(text: &str, base: &str, size: f32) -> f32 {
    let em = if base.starts_with("Courier") { 0.6 } else { 0.5 };
    text.chars().count() as f32 * size * em
}

// WinAnsi code points 0x80..=0x9F that differ from Latin-1.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('•', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Encodes text as WinAnsi. Characters the encoding lacks become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        0..=0x7F | 0xA0..=0xFF => c as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map_or(b'?', |(_, byte)| *byte),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(font: &str, bold: bool, italic: bool) -> TextStyle {
        TextStyle {
            font: font.to_string(),
            bold,
            italic,
            ..TextStyle::default()
        }
    }

    #[test]
    fn test_variants() {
        assert_eq!(base_font(&style("Helvetica", false, false)), Some("Helvetica"));
        assert_eq!(base_font(&style("Helvetica", true, true)), Some("Helvetica-BoldOblique"));
        assert_eq!(base_font(&style("Times", false, true)), Some("Times-Italic"));
        assert_eq!(base_font(&style("Courier-Bold", false, false)), Some("Courier-Bold"));
        assert_eq!(base_font(&style("Symbol", true, false)), Some("Symbol"));
    }

    #[test]
    fn test_unknown_font() {
        assert_eq!(base_font(&style("Comic Sans", false, false)), None);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(to_win_ansi("café €5"), vec![b'c', b'a', b'f', 0xE9, b' ', 0x80, b'5']);
        assert_eq!(to_win_ansi("\u{2018}a\u{2019} \u{2014} ™"), vec![0x91, b'a', 0x92, b' ', 0x97, b' ', 0x99]);
    }

    #[test]
    fn test_win_ansi_fallback() {
        // C1 controls and characters outside the code page.
        assert_eq!(to_win_ansi("\u{0081}\u{2192}中"), vec![b'?', b'?', b'?']);
    }
}
