//! Slug generation
//!
//! Turns a note title into a URL slug the way pytils does: the text is
//! lowercased, `&` becomes `and`, runs of whitespace and hyphens become a
//! single `-`, characters that are neither Cyrillic nor `[a-z0-9_-]` are
//! dropped, and what is left is transliterated to Latin.
//!
//! ```ignore
//! use ya_sites::services::slug::slugify;
//!
//! assert_eq!(slugify("Название заметки"), "nazvanie-zametki");
//! ```

use crate::models::NOTE_FIELD_MAX_LENGTH;

/// Transliteration of a single Cyrillic letter, `None` for anything else.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c.to_lowercase().next().unwrap_or(c) {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Ukrainian
        'є' => "ye",
        'і' => "i",
        'ї' => "yi",
        'ґ' => "g",
        _ => return None,
    };
    Some(latin)
}

/// Transliterate `text` into Latin script, leaving other characters as-is.
pub fn translify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '—' | '–' => out.push('-'),
            _ => match transliterate(c) {
                Some(latin) => out.push_str(latin),
                None => out.push(c),
            },
        }
    }
    out
}

/// Build a slug from free text. The result only contains `[a-z0-9_-]`.
///
/// Separators are collapsed before unknown characters are dropped, so
/// `"Вопрос ?"` keeps its trailing hyphen (`vopros-`).
pub fn slugify(text: &str) -> String {
    let lowered = text
        .to_lowercase()
        .replace("&amp;", " and ")
        .replace('&', " and ");

    let mut kept = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for c in lowered.chars() {
        if c.is_whitespace() || c == '-' {
            if !in_separator {
                kept.push('-');
            }
            in_separator = true;
            continue;
        }
        in_separator = false;
        if is_slug_char(c) || matches!(c, '—' | '–') || transliterate(c).is_some() {
            kept.push(c);
        }
    }

    translify(&kept)
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

/// Slug for a note title, cut to the maximum slug length.
pub fn note_slug(title: &str) -> String {
    slugify(title).chars().take(NOTE_FIELD_MAX_LENGTH).collect()
}

/// Whether a user-supplied slug uses only Latin letters, digits, `_` and `-`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_cyrillic_title() {
        assert_eq!(slugify("Название заметки"), "nazvanie-zametki");
        assert_eq!(slugify("Щука и Ёж"), "schuka-i-yozh");
        assert_eq!(slugify("Подъезд, объявление!"), "podezd-obyavlenie");
    }

    #[test]
    fn test_slugify_latin_and_punctuation() {
        assert_eq!(slugify("Hello,   World"), "hello-world");
        assert_eq!(slugify("Tom & Jerry"), "tom-and-jerry");
        assert_eq!(slugify("Tom &amp; Jerry"), "tom-and-jerry");
        assert_eq!(slugify("just_slug"), "just_slug");
    }

    #[test]
    fn test_slugify_keeps_edge_separators() {
        assert_eq!(slugify("Вопрос ?"), "vopros-");
        assert_eq!(slugify("  -- spaced -- out --  "), "-spaced-out-");
        assert_eq!(slugify("a ? b"), "a--b");
    }

    #[test]
    fn test_slugify_nothing_left() {
        assert_eq!(slugify("!!!???"), "");
        assert_eq!(slugify("!!! ???"), "-");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_note_slug_is_truncated() {
        let title = "а".repeat(150);
        let slug = note_slug(&title);
        assert_eq!(slug.chars().count(), NOTE_FIELD_MAX_LENGTH);
        assert_eq!(slug, "a".repeat(NOTE_FIELD_MAX_LENGTH));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("note-slug_1"));
        assert!(!is_valid_slug("заметка"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(""));
    }

    proptest! {
        #[test]
        fn prop_slugify_output_is_a_valid_slug(text in "\\PC{0,60}") {
            let slug = slugify(&text);
            prop_assert!(slug.is_empty() || is_valid_slug(&slug));
            prop_assert!(slug.chars().all(is_slug_char));
        }

        #[test]
        fn prop_slugify_is_idempotent(text in "[а-щэ-яА-ЩЭ-Яa-zA-Z0-9 _-]{0,40}") {
            let once = slugify(&text);
            prop_assert_eq!(slugify(&once), once.clone());
        }

        #[test]
        fn prop_note_slug_fits_column(text in "[а-яa-z ]{0,300}") {
            prop_assert!(note_slug(&text).chars().count() <= NOTE_FIELD_MAX_LENGTH);
        }
    }
}
