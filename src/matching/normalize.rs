/// Accented Latin characters folded to their plain equivalents
const ACCENT_TABLE: &[(char, char)] = &[
    ('ç', 'c'),
    ('ã', 'a'),
    ('á', 'a'),
    ('à', 'a'),
    ('â', 'a'),
    ('ä', 'a'),
    ('é', 'e'),
    ('è', 'e'),
    ('ê', 'e'),
    ('ë', 'e'),
    ('í', 'i'),
    ('ì', 'i'),
    ('î', 'i'),
    ('ï', 'i'),
    ('ó', 'o'),
    ('ò', 'o'),
    ('ô', 'o'),
    ('õ', 'o'),
    ('ö', 'o'),
    ('ú', 'u'),
    ('ù', 'u'),
    ('û', 'u'),
    ('ü', 'u'),
];

fn fold_accent(c: char) -> char {
    ACCENT_TABLE
        .iter()
        .find(|(accented, _)| *accented == c)
        .map_or(c, |(_, plain)| *plain)
}

/// Canonicalize a column label for comparison.
///
/// Lower-cases, folds common accents, turns every character that is not an
/// ASCII lowercase letter, digit or whitespace into a space, and joins the
/// remaining words with single underscores. Empty input yields an empty
/// string.
///
/// # Examples
///
/// ```
/// use sheet_recon::matching::normalize::normalize_column_name;
///
/// assert_eq!(normalize_column_name("Código  Produto"), "codigo_produto");
/// assert_eq!(normalize_column_name(" Valor (R$) "), "valor_r");
/// assert_eq!(normalize_column_name(""), "");
/// ```
#[must_use]
pub fn normalize_column_name(label: &str) -> String {
    let cleaned: String = label
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("_")
}
