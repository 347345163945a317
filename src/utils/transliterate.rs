// Є, ї, й, ю, я are spelled differently at the start of a word.
fn latin_for(c: char, word_start: bool) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' if word_start => "ye",
        'є' => "ie",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' if word_start => "yi",
        'ї' => "i",
        'й' if word_start => "y",
        'й' => "i",
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
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ь' | '\'' | 'ʼ' | '’' => "",
        'ю' if word_start => "yu",
        'ю' => "iu",
        'я' if word_start => "ya",
        'я' => "ia",
        _ => return None,
    };
    Some(mapped)
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | 'ʼ' | '’')
}

/// Converts a free-text city name to its canonical lower-case ASCII form,
/// following the national Ukrainian romanization table.
pub fn to_latin(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut previous: Option<char> = None;

    for c in lowered.chars() {
        let word_start = previous.map_or(true, |p| !p.is_alphabetic() && !is_apostrophe(p));
        // "зг" keeps an extra "g" so it does not read as "zh".
        if c == 'г' && previous == Some('з') {
            out.push_str("gh");
        } else {
            match latin_for(c, word_start) {
                Some(latin) => out.push_str(latin),
                None => out.push(c),
            }
        }
        previous = Some(c);
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
