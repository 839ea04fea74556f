//! camelCase → snake_case conversion, used for outgoing SQL identifiers.

/// Options for [`decamelize_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecamelizeOptions {
    /// Inserted between words. Defaults to `_`.
    pub separator: String,
    /// Keep uppercase runs: `dataForUSACounties` → `data_for_USA_counties`
    pub preserve_consecutive_uppercase: bool,
}

impl Default for DecamelizeOptions {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            preserve_consecutive_uppercase: false,
        }
    }
}

/// Convert a camelCase identifier to snake_case.
///
/// ```
/// use keycase_db::case::decamelize;
///
/// assert_eq!(decamelize("unicornRainbow"), "unicorn_rainbow");
/// assert_eq!(decamelize("dataForUSACounties"), "data_for_usa_counties");
/// ```
pub fn decamelize(text: &str) -> String {
    decamelize_with(text, &DecamelizeOptions::default())
}

pub fn decamelize_with(text: &str, options: &DecamelizeOptions) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return if options.preserve_consecutive_uppercase {
            text.to_string()
        } else {
            text.to_lowercase()
        };
    }

    let separator: Vec<char> = options.separator.chars().collect();

    // dataForUSACounties → data_For_USACounties
    let mut split = Vec::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            if prev.is_lowercase() || prev.is_ascii_digit() {
                split.extend_from_slice(&separator);
            }
        }
        split.push(c);
    }

    if options.preserve_consecutive_uppercase {
        return split_preserving_uppercase(&split, &separator);
    }

    // my_URLstring → my_UR_Lstring
    let mut result: Vec<char> = Vec::with_capacity(split.len() + 4);
    for (i, &c) in split.iter().enumerate() {
        result.push(c);
        let starts_word = c.is_uppercase()
            && split.get(i + 1).is_some_and(|n| n.is_uppercase())
            && split.get(i + 2).is_some_and(|n| n.is_lowercase());
        if starts_word {
            result.extend_from_slice(&separator);
        }
    }

    result.into_iter().collect::<String>().to_lowercase()
}

fn is_upper_or_digit(c: char) -> bool {
    c.is_uppercase() || c.is_ascii_digit()
}

fn split_preserving_uppercase(chars: &[char], separator: &[char]) -> String {
    // data_For_USACounties → data_for_USACounties
    let lowered: Vec<char> = chars
        .iter()
        .enumerate()
        .flat_map(|(i, &c)| {
            let isolated = is_upper_or_digit(c)
                && !(i > 0 && is_upper_or_digit(chars[i - 1]))
                && !chars.get(i + 1).is_some_and(|n| is_upper_or_digit(*n));
            let folded: Vec<char> = if isolated {
                c.to_lowercase().collect()
            } else {
                vec![c]
            };
            folded
        })
        .collect();

    // data_for_USACounties → data_for_USA_counties
    let mut result = String::with_capacity(lowered.len() + 4);
    let mut i = 0;
    while i < lowered.len() {
        if !lowered[i].is_uppercase() {
            result.push(lowered[i]);
            i += 1;
            continue;
        }

        let run_end = lowered[i..]
            .iter()
            .position(|c| !c.is_uppercase())
            .map_or(lowered.len(), |offset| i + offset);
        let followed_by_word = run_end - i >= 2
            && lowered.get(run_end).is_some_and(|c| c.is_lowercase());

        if !followed_by_word {
            result.extend(&lowered[i..run_end]);
            i = run_end;
            continue;
        }

        let word_end = lowered[run_end..]
            .iter()
            .position(|c| !c.is_lowercase())
            .map_or(lowered.len(), |offset| run_end + offset);

        result.extend(&lowered[i..run_end - 1]);
        result.extend(separator);
        let word: String = lowered[run_end - 1..word_end].iter().collect();
        result.push_str(&word.to_lowercase());
        i = word_end;
    }

    result
}
