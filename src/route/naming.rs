/// Split an identifier into words.
///
/// Any non-alphanumeric character separates words. Inside a run of
/// alphanumerics a new word starts at a lower-to-upper transition, at the
/// last capital of an acronym followed by a lower-case letter
/// (`HTTPServer` → `HTTP`, `Server`), and between letters and digits.
pub fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in s.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && starts_word(chars[i - 1], c, chars.get(i + 1).copied()) {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

fn starts_word(prev: char, c: char, next: Option<char>) -> bool {
    if prev.is_lowercase() && c.is_uppercase() {
        return true;
    }
    if prev.is_uppercase() && c.is_uppercase() && next.is_some_and(|n| n.is_lowercase()) {
        return true;
    }
    prev.is_numeric() != c.is_numeric()
}

/// Camel-case an action identifier into a function name.
///
/// `user/find` → `userFind`, `authorizers is-admin` → `authorizersIsAdmin`.
pub fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, word) in split_words(s).iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
