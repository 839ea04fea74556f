//! camelCase / PascalCase conversion of a single identifier.
//!
//! Word boundaries are detected at separator runs (`_`, `.`, `-`, space), at
//! digit → letter transitions, and at letter-case transitions
//! (`fooBar` → `foo|Bar`, `XMLHttp` → `XML|Http`).

/// Options for a single [`camel_case`] conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CamelCaseOptions {
    /// Upper-case the first character: `foo-bar` → `FooBar`
    pub pascal_case: bool,
    /// Keep runs of uppercase characters: `foo-BAR` → `fooBAR`
    pub preserve_consecutive_uppercase: bool,
}

impl CamelCaseOptions {
    pub fn pascal() -> Self {
        Self {
            pascal_case: true,
            ..Self::default()
        }
    }
}

/// Characters treated as word separators.
pub fn is_separator(c: char) -> bool {
    matches!(c, '_' | '.' | '-' | ' ')
}

fn is_identifier(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric() || c == '_'
}

fn folds_to_itself(c: char, mut folded: impl Iterator<Item = char>) -> bool {
    folded.next() == Some(c) && folded.next().is_none()
}

/// A character that has an uppercase form distinct from itself.
fn is_cased_lower(c: char) -> bool {
    folds_to_itself(c, c.to_lowercase()) && !folds_to_itself(c, c.to_uppercase())
}

fn is_cased_upper(c: char) -> bool {
    folds_to_itself(c, c.to_uppercase()) && !folds_to_itself(c, c.to_lowercase())
}

/// Convert an identifier to camelCase (or PascalCase).
///
/// ```
/// use keycase_db::case::{camel_case, CamelCaseOptions};
///
/// assert_eq!(camel_case("foo_bar", CamelCaseOptions::default()), "fooBar");
/// assert_eq!(camel_case("foo-bar", CamelCaseOptions::pascal()), "FooBar");
/// ```
pub fn camel_case(input: &str, options: CamelCaseOptions) -> String {
    let input = input.trim();
    let mut chars: Vec<char> = input.chars().collect();

    match chars.as_slice() {
        [] => return String::new(),
        [c] if is_separator(*c) => return String::new(),
        [c] if options.pascal_case => return c.to_uppercase().collect(),
        [c] => return c.to_lowercase().collect(),
        _ => {}
    }

    if input.to_lowercase() != input {
        chars = mark_case_boundaries(chars, options.preserve_consecutive_uppercase);
    }

    let start = chars
        .iter()
        .position(|c| !is_separator(*c))
        .unwrap_or(chars.len());
    let trimmed: String = chars[start..].iter().collect();

    let mut cased: Vec<char> = if options.preserve_consecutive_uppercase {
        lower_leading_capital(trimmed.chars().collect())
    } else {
        trimmed.to_lowercase().chars().collect()
    };

    if options.pascal_case {
        if let Some(first) = cased.first().copied() {
            cased.splice(0..1, first.to_uppercase());
        }
    }

    join_words(&upper_after_digits(&cased))
}

/// Insert `-` at every case boundary so the later passes see explicit words.
fn mark_case_boundaries(mut chars: Vec<char>, preserve_consecutive_uppercase: bool) -> Vec<char> {
    let mut last_lower = false;
    let mut last_upper = false;
    let mut last_last_upper = false;

    let mut index = 0;
    while index < chars.len() {
        let c = chars[index];
        let last_last_preserved = if index > 2 {
            chars[index - 3] == '-'
        } else {
            true
        };

        if last_lower && c.is_uppercase() {
            // fooBar → foo-Bar
            chars.insert(index, '-');
            last_lower = false;
            last_last_upper = last_upper;
            last_upper = true;
            index += 1;
        } else if last_upper
            && last_last_upper
            && c.is_lowercase()
            && (!last_last_preserved || preserve_consecutive_uppercase)
        {
            // XMLHttp → XML-Http
            chars.insert(index - 1, '-');
            last_last_upper = last_upper;
            last_upper = false;
            last_lower = true;
        } else {
            last_lower = is_cased_lower(c);
            last_last_upper = last_upper;
            last_upper = is_cased_upper(c);
        }

        index += 1;
    }

    chars
}

/// Lower-case a leading capital unless it starts an uppercase run.
fn lower_leading_capital(mut chars: Vec<char>) -> Vec<char> {
    let leading_capital = match chars.as_slice() {
        [first, second, ..] => first.is_uppercase() && !second.is_uppercase(),
        [first] => first.is_uppercase(),
        [] => false,
    };

    if leading_capital {
        let first = chars[0];
        chars.splice(0..1, first.to_lowercase());
    }

    chars
}

/// Upper-case the identifier character after each digit run, unless it is
/// itself followed by `_` or `-`: `h2w` → `h2W`, `h2o_level` stays.
fn upper_after_digits(chars: &[char]) -> Vec<char> {
    let mut output = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            output.push(chars[i]);
            i += 1;
            continue;
        }

        let run_end = chars[i..]
            .iter()
            .position(|c| !c.is_ascii_digit())
            .map_or(chars.len(), |offset| i + offset);
        output.extend_from_slice(&chars[i..run_end]);

        match chars.get(run_end) {
            Some(&next) if is_identifier(next) => {
                if matches!(chars.get(run_end + 1), Some('_' | '-')) {
                    output.push(next);
                } else {
                    output.extend(next.to_uppercase());
                }
                i = run_end + 1;
            }
            _ => i = run_end,
        }
    }

    output
}

/// Drop separator runs, upper-casing the character that follows each run.
fn join_words(chars: &[char]) -> String {
    let mut joined = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if !is_separator(chars[i]) {
            joined.push(chars[i]);
            i += 1;
            continue;
        }

        let run_end = chars[i..]
            .iter()
            .position(|c| !is_separator(*c))
            .map_or(chars.len(), |offset| i + offset);

        // Trailing separators vanish.
        if run_end == chars.len() {
            break;
        }

        let next = chars[run_end];
        if is_identifier(next) {
            joined.extend(next.to_uppercase());
            i = run_end + 1;
            continue;
        }

        // An underscore inside the run can stand in for the identifier.
        if let Some(k) = (i + 1..run_end).rev().find(|&k| chars[k] == '_') {
            joined.push('_');
            i = k + 1;
            continue;
        }

        joined.push(chars[i]);
        i += 1;
    }

    joined
}
