//! Parses the tiny s-expression text encoding backends use for index keys
//! (`inferentia_engine::logic::index::Key`'s `Display` form) and checks
//! wildcard compatibility without needing to know anything about `Term`.

#[derive(Debug, PartialEq, Eq)]
enum Shape {
    Wildcard,
    Atom(String),
    List(Vec<Shape>),
}

fn tokenize(input: &str) -> Vec<String> {
    input
        .replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn parse(tokens: &[String], pos: &mut usize) -> Shape {
    let token = &tokens[*pos];
    *pos += 1;
    if token == "(" {
        let mut items = Vec::new();
        while tokens[*pos] != ")" {
            items.push(parse(tokens, pos));
        }
        *pos += 1;
        Shape::List(items)
    } else if token == "*" {
        Shape::Wildcard
    } else {
        Shape::Atom(token.clone())
    }
}

fn parse_shape(text: &str) -> Shape {
    let tokens = tokenize(text);
    let mut pos = 0;
    parse(&tokens, &mut pos)
}

fn compatible(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Wildcard, _) | (_, Shape::Wildcard) => true,
        (Shape::Atom(x), Shape::Atom(y)) => x == y,
        (Shape::List(xs), Shape::List(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| compatible(x, y)),
        _ => false,
    }
}

/// True if a term keyed by `a` could possibly unify with a term keyed by
/// `b`, per their canonical text encodings.
pub fn keys_compatible(a: &str, b: &str) -> bool {
    compatible(&parse_shape(a), &parse_shape(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_atom() {
        assert!(keys_compatible("*", "cat"));
    }

    #[test]
    fn lists_match_position_wise() {
        assert!(keys_compatible("(is * cat)", "(is dylan cat)"));
        assert!(!keys_compatible("(is * cat)", "(is dylan dog)"));
    }

    #[test]
    fn arity_mismatch_is_incompatible() {
        assert!(!keys_compatible("(f a)", "(f a b)"));
    }
}
