//! Text normalization for inbound chat messages.
//!
//! Order templates arrive via copy-paste from phones and routinely carry
//! zero-width characters (inserted by chat apps around emoji and bullets),
//! non-breaking spaces, and mixed line endings. Downstream label regexes
//! assume none of these, so everything funnels through here first.

/// Normalize inbound free text: drop invisible code points, unify whitespace
/// variants to plain spaces, normalize line endings to `\n`, and trim trailing
/// whitespace per line. Idempotent.
pub fn normalize_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !is_invisible(*c))
        .map(|c| if is_space_variant(c) { ' ' } else { c })
        .collect();

    // Unify CRLF / lone CR, then trim line ends. Leading indentation is kept:
    // multi-line address blocks rely on it for readability.
    let unified = cleaned.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Zero-width and formatting code points that defeat line/label matching.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' // zero-width space
        | '\u{200C}' // zero-width non-joiner
        | '\u{200D}' // zero-width joiner
        | '\u{2060}' // word joiner
        | '\u{FEFF}' // BOM / zero-width no-break space
        | '\u{00AD}' // soft hyphen
        | '\u{180E}' // Mongolian vowel separator
    )
}

/// Space lookalikes that should compare equal to ASCII space.
fn is_space_variant(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' // no-break space
        | '\u{202F}' // narrow no-break space
        | '\u{2007}' // figure space
        | '\u{2009}' // thin space
        | '\t'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_zero_width_characters() {
        let raw = "Nama\u{200B} Pemesan: Budi\u{FEFF}";
        assert_eq!(normalize_text(raw), "Nama Pemesan: Budi");
    }

    #[test]
    fn zero_width_contaminated_bullet_is_cleaned() {
        let raw = "\u{200B}\u{2022}\u{200B} 80 x Dawet Kemayu Small";
        assert_eq!(normalize_text(raw), "\u{2022} 80 x Dawet Kemayu Small");
    }

    #[test]
    fn nbsp_becomes_plain_space() {
        let raw = "Jam\u{00A0}Pengiriman: 08.00";
        assert_eq!(normalize_text(raw), "Jam Pengiriman: 08.00");
    }

    #[test]
    fn crlf_and_cr_become_lf() {
        let raw = "Nama: A\r\nAlamat: B\rJam: 8";
        assert_eq!(normalize_text(raw), "Nama: A\nAlamat: B\nJam: 8");
    }

    #[test]
    fn trailing_whitespace_trimmed_per_line() {
        let raw = "Nama: A   \nAlamat: B\t";
        assert_eq!(normalize_text(raw), "Nama: A\nAlamat: B");
    }

    #[test]
    fn idempotent_on_arbitrary_input() {
        let samples = [
            "Nama\u{200B}: A \r\n\u{00A0}Alamat: B\u{200D}",
            "",
            "plain text",
            "\u{FEFF}\u{2022} 2 x Dawet\r",
        ];
        for s in samples {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "not idempotent for {s:?}");
        }
    }
}
