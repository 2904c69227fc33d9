//! URL slug generation for agencies and blog posts.

/// Fold common Portuguese accented letters to ASCII.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Build a lowercase ASCII slug: accents folded, runs of anything that is
/// not `[a-z0-9]` collapsed to a single `-`, no leading or trailing `-`.
///
/// # Examples
///
/// ```
/// use vurp_core::naming::slugify;
///
/// assert_eq!(slugify("Agência Tráfego & Cia"), "agencia-trafego-cia");
/// assert_eq!(slugify("  ROAS: o guia!  "), "roas-o-guia");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Append a numeric suffix to `base` (`acme`, `acme-2`, `acme-3`, ...).
pub fn with_suffix(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}
