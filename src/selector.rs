use std::sync::LazyLock;

use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Clause {
    Class(String),
    Id(String),
    Element(String),
    Attribute(AttrClause),
    Pseudo(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttrClause {
    pub(crate) key: String,
    pub(crate) combinator: Option<AttrCombinator>,
    pub(crate) value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrCombinator {
    Exact,
    DashMatch,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NthExpr {
    Even,
    Odd,
    Exact(i64),
    AnPlusB(i64, i64),
}

pub(crate) fn compile_compound(selector: &str) -> Result<Vec<Clause>> {
    split_compound(selector)
        .iter()
        .map(|part| compile_clause(part))
        .collect()
}

// Splits a compound selector into one substring per clause. A leading `*`
// contributes no clause. Splitting is suppressed inside a quoted attribute
// value and inside a `:not(...)` argument; the `:not` tracking is a single
// flag, not a depth counter, so a `)` belonging to an inner pseudo-class
// closes it early. Malformed input never fails here, only at compile time.
pub(crate) fn split_compound(selector: &str) -> Vec<String> {
    let rest = selector.strip_prefix('*').unwrap_or(selector);
    let mut parts: Vec<String> = Vec::new();
    let mut attr_value_open = false;
    let mut not_arg_open = false;

    for ch in rest.chars() {
        let suppressed = attr_value_open || not_arg_open;
        if !suppressed && (matches!(ch, '.' | '#' | '[' | ':') || parts.is_empty()) {
            parts.push(ch.to_string());
            continue;
        }
        if (ch == '"' || ch == '\'') && parts.last().is_some_and(|part| part.starts_with('[')) {
            attr_value_open = !attr_value_open;
        }
        if ch == '(' && parts.last().is_some_and(|part| part == ":not") {
            not_arg_open = true;
        }
        if ch == ')' && not_arg_open {
            not_arg_open = false;
        }
        if let Some(last) = parts.last_mut() {
            last.push(ch);
        }
    }

    parts
}

pub(crate) fn compile_clause(part: &str) -> Result<Clause> {
    if let Some(rest) = part.strip_prefix('.') {
        Ok(Clause::Class(rest.to_string()))
    } else if let Some(rest) = part.strip_prefix('#') {
        Ok(Clause::Id(rest.to_string()))
    } else if part.starts_with('[') {
        Ok(Clause::Attribute(parse_attr_clause(part)?))
    } else if let Some(rest) = part.strip_prefix(':') {
        Ok(Clause::Pseudo(rest.to_string()))
    } else {
        Ok(Clause::Element(part.to_string()))
    }
}

// Grammar: `[` ident ws* (combinator ws* (quote? value quote?))? ws* `]`
// where ident is [_a-zA-Z][-_0-9a-zA-Z]*. A quoted value runs from the first
// quote to the last occurrence of the same quote character; an unquoted value
// is the remainder of the interior, taken verbatim. A combinator followed by
// neither a quote nor a value is rejected.
pub(crate) fn parse_attr_clause(src: &str) -> Result<AttrClause> {
    let invalid = || Error::InvalidSelector(src.to_string());
    let interior = src
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;
    let bytes = interior.as_bytes();

    if bytes.first().copied().is_none_or(|b| !is_ident_start(b)) {
        return Err(invalid());
    }
    let mut i = 1usize;
    while i < bytes.len() && is_ident_char(bytes[i]) {
        i += 1;
    }
    let key = interior[..i].to_string();

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i == bytes.len() {
        return Ok(AttrClause {
            key,
            combinator: None,
            value: String::new(),
        });
    }

    let combinator = match bytes[i] {
        b'=' => {
            i += 1;
            AttrCombinator::Exact
        }
        b'|' | b'~' | b'^' | b'$' | b'*' if bytes.get(i + 1) == Some(&b'=') => {
            let combinator = match bytes[i] {
                b'|' => AttrCombinator::DashMatch,
                b'~' => AttrCombinator::Includes,
                b'^' => AttrCombinator::Prefix,
                b'$' => AttrCombinator::Suffix,
                _ => AttrCombinator::Substring,
            };
            i += 2;
            combinator
        }
        _ => return Err(invalid()),
    };

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
        let quote = bytes[i] as char;
        let rest = &interior[i + 1..];
        let close = rest.rfind(quote).ok_or_else(invalid)?;
        if !rest[close + 1..].chars().all(|c| c.is_ascii_whitespace()) {
            return Err(invalid());
        }
        return Ok(AttrClause {
            key,
            combinator: Some(combinator),
            value: rest[..close].to_string(),
        });
    }

    let value = &interior[i..];
    if value.is_empty() {
        return Err(invalid());
    }
    Ok(AttrClause {
        key,
        combinator: Some(combinator),
        value: value.to_string(),
    })
}

// The coefficient digits are optional so that `n+2` and `-n+3` read as
// `1n+2` and `-1n+3`. Compiled once; nth arguments are parsed at match time,
// once per visited node.
static NTH_FORMULA: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    fancy_regex::Regex::new(r"^\s*(-)?([0-9]+)?n\s*(?:(\+|-)\s*([0-9]+)\s*)?$")
        .expect("nth formula pattern is valid")
});

pub(crate) fn parse_nth_expr(raw: &str) -> Result<NthExpr> {
    match raw {
        "even" => return Ok(NthExpr::Even),
        "odd" => return Ok(NthExpr::Odd),
        _ => {}
    }
    if let Ok(value) = raw.trim().parse::<i64>() {
        return Ok(NthExpr::Exact(value));
    }

    let invalid = || Error::InvalidSelector(raw.to_string());
    let captures = NTH_FORMULA
        .captures(raw)
        .map_err(|_| invalid())?
        .ok_or_else(invalid)?;

    let magnitude: i64 = match captures.get(2) {
        Some(digits) => digits.as_str().parse().map_err(|_| invalid())?,
        None => 1,
    };
    let step = if captures.get(1).is_some() {
        -magnitude
    } else {
        magnitude
    };

    let offset = match captures.get(3) {
        None => 0,
        Some(sign) => {
            let magnitude: i64 = captures
                .get(4)
                .ok_or_else(invalid)?
                .as_str()
                .parse()
                .map_err(|_| invalid())?;
            if sign.as_str() == "-" { -magnitude } else { magnitude }
        }
    };

    Ok(NthExpr::AnPlusB(step, offset))
}

pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

pub(crate) fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}
