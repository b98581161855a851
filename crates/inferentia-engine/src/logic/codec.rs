//! Canonical text encoding for terms and index keys, used to round-trip
//! formulas through a [`crate::StorageBackend`] without that crate needing
//! to know anything about `Term`.
//!
//! This is deliberately not the same as `Term`'s `Display` impl: `Display` is
//! for humans (the CLI demo, test failure messages); this codec has to be
//! unambiguous to parse back, so constants and strings are tagged and
//! escaped rather than printed bare.

use super::index::Key;
use super::term::{constant, Language, Term, Wrapped};

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(text: &str) -> Vec<u8> {
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).unwrap_or(0))
        .collect()
}

/// Encodes `term` as a canonical s-expression text, suitable for storage and
/// for [`decode_term`] to parse back.
pub fn encode_term(term: &Term) -> String {
    let mut next_id = 0usize;
    let mut seen: Vec<(Term, usize)> = Vec::new();
    encode_into(term, &mut seen, &mut next_id)
}

fn encode_into(term: &Term, seen: &mut Vec<(Term, usize)>, next_id: &mut usize) -> String {
    if term.is_variable() {
        let id = match seen.iter().find(|(t, _)| t == term) {
            Some((_, id)) => *id,
            None => {
                let id = *next_id;
                *next_id += 1;
                seen.push((term.clone(), id));
                id
            }
        };
        return format!("_{id}");
    }
    if let Some(name) = term.as_constant_name() {
        return format!("c:{}", hex_encode(name.as_bytes()));
    }
    if let Some(wrapped) = term.as_wrapped() {
        return match wrapped {
            Wrapped::Int(i) => format!("i:{i}"),
            Wrapped::Bool(b) => format!("b:{b}"),
            Wrapped::Str(s) => format!("s:{}", hex_encode(s.as_bytes())),
        };
    }
    if let Some(children) = term.as_expression() {
        let parts: Vec<String> = children.iter().map(|c| encode_into(c, seen, next_id)).collect();
        return format!("({})", parts.join(" "));
    }
    unreachable!("term is one of variable, constant, wrapper or expression")
}

/// Parses text produced by [`encode_term`] back into a `Term`, minting fresh
/// variables in `language` for each distinct `_N` token encountered.
pub fn decode_term(text: &str, language: &Language) -> Term {
    let tokens = tokenize(text);
    let mut pos = 0;
    let mut variables: Vec<(usize, Term)> = Vec::new();
    parse(&tokens, &mut pos, language, &mut variables)
}

fn tokenize(input: &str) -> Vec<String> {
    input
        .replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn parse(tokens: &[String], pos: &mut usize, language: &Language, variables: &mut Vec<(usize, Term)>) -> Term {
    let token = &tokens[*pos];
    *pos += 1;
    if token == "(" {
        let mut children = Vec::new();
        while tokens[*pos] != ")" {
            children.push(parse(tokens, pos, language, variables));
        }
        *pos += 1;
        return Term::expression(children);
    }
    if let Some(rest) = token.strip_prefix('_') {
        let id: usize = rest.parse().expect("malformed variable token");
        if let Some((_, var)) = variables.iter().find(|(existing, _)| *existing == id) {
            return var.clone();
        }
        let var = language.fresh_variable();
        variables.push((id, var.clone()));
        return var;
    }
    if let Some(rest) = token.strip_prefix("c:") {
        let name = String::from_utf8(hex_decode(rest)).expect("malformed constant token");
        return constant(name);
    }
    if let Some(rest) = token.strip_prefix("i:") {
        return Term::int(rest.parse().expect("malformed int token"));
    }
    if let Some(rest) = token.strip_prefix("b:") {
        return Term::wrap(Wrapped::Bool(rest.parse().expect("malformed bool token")));
    }
    if let Some(rest) = token.strip_prefix("s:") {
        let s = String::from_utf8(hex_decode(rest)).expect("malformed string token");
        return Term::string(s);
    }
    panic!("malformed term token: {token}");
}

/// Encodes `key` the same way [`encode_term`] encodes a term, with
/// [`Key::Wildcard`] as `*`.
pub fn encode_key(key: &Key) -> String {
    match key {
        Key::Wildcard => "*".to_string(),
        Key::Constant(name) => format!("c:{}", hex_encode(name.as_bytes())),
        Key::Wrapped(Wrapped::Int(i)) => format!("i:{i}"),
        Key::Wrapped(Wrapped::Bool(b)) => format!("b:{b}"),
        Key::Wrapped(Wrapped::Str(s)) => format!("s:{}", hex_encode(s.as_bytes())),
        Key::Expr(children) => format!("({})", children.iter().map(encode_key).collect::<Vec<_>>().join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::index::make_key;

    #[test]
    fn round_trips_a_compound_term_with_shared_variables() {
        let lang = Language::new();
        let x = lang.fresh_variable();
        let term = Term::expression([lang.constant("f"), x.clone(), x, Term::int(42), Term::string("hi there")]);
        let encoded = encode_term(&term);
        let decoded = decode_term(&encoded, &lang);
        let children = decoded.as_expression().unwrap();
        assert_eq!(children[1], children[2], "shared variable decodes to the same term");
        assert_eq!(children[3], Term::int(42));
        assert_eq!(children[4], Term::string("hi there"));
    }

    #[test]
    fn key_text_uses_wildcard_for_variables() {
        let lang = Language::new();
        let term = Term::expression([lang.constant("is"), lang.fresh_variable(), lang.constant("cat")]);
        let key = make_key(&term, 2);
        assert_eq!(encode_key(&key), "(c:6973 * c:636174)");
    }
}
