use super::selector::{self, AttrClause, AttrCombinator, Clause, NthExpr};
use super::*;

pub(crate) fn matches_compound<D: Document>(
    doc: &D,
    node: D::NodeId,
    compiled: &[Clause],
) -> Result<bool> {
    for clause in compiled {
        let matched = match clause {
            Clause::Class(name) => doc.has_class(node, name),
            Clause::Id(name) => doc.id(node) == name.as_str(),
            Clause::Element(tag) => doc.tag_name(node).eq_ignore_ascii_case(tag),
            Clause::Attribute(attr) => matches_attr(doc, node, attr),
            Clause::Pseudo(raw) => matches_pseudo(doc, node, raw)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_attr<D: Document>(doc: &D, node: D::NodeId, attr: &AttrClause) -> bool {
    let Some(actual) = doc.attribute(node, &attr.key) else {
        return false;
    };
    let Some(combinator) = &attr.combinator else {
        return true;
    };
    let value = attr.value.as_str();
    match combinator {
        AttrCombinator::Exact => actual == value,
        AttrCombinator::DashMatch => {
            actual == value || actual.starts_with(&format!("{value}-"))
        }
        // Single-space token split, not general whitespace.
        AttrCombinator::Includes => actual.split(' ').any(|token| token == value),
        AttrCombinator::Prefix => actual.starts_with(value),
        AttrCombinator::Suffix => actual.ends_with(value),
        AttrCombinator::Substring => actual.contains(value),
    }
}

pub(crate) fn matches_pseudo<D: Document>(doc: &D, node: D::NodeId, raw: &str) -> Result<bool> {
    if raw.starts_with("not") {
        let inner = pseudo_argument(raw, "not")?;
        let compiled = selector::compile_compound(inner)?;
        return Ok(!matches_compound(doc, node, &compiled)?);
    }

    match raw {
        "checked" => return Ok(doc.checked(node)),
        "disabled" => return Ok(doc.disabled(node)),
        "root" => return Ok(doc.is_root(node)),
        "empty" => return Ok(doc.child_node_count(node) == 0),
        "first-child" => return check_position(doc, node, "1", false, false),
        "last-child" => return check_position(doc, node, "1", true, false),
        "only-child" => return Ok(sibling_sequence(doc, node, false).len() == 1),
        "first-of-type" => return check_position(doc, node, "1", false, true),
        "last-of-type" => return check_position(doc, node, "1", true, true),
        "only-of-type" => return Ok(sibling_sequence(doc, node, true).len() == 1),
        _ => {}
    }

    if raw.starts_with("nth-child") {
        let expr = pseudo_argument(raw, "nth-child")?;
        return check_position(doc, node, expr, false, false);
    }
    if raw.starts_with("nth-last-child") {
        let expr = pseudo_argument(raw, "nth-last-child")?;
        return check_position(doc, node, expr, true, false);
    }
    if raw.starts_with("nth-of-type") {
        let expr = pseudo_argument(raw, "nth-of-type")?;
        return check_position(doc, node, expr, false, true);
    }
    if raw.starts_with("nth-last-of-type") {
        let expr = pseudo_argument(raw, "nth-last-of-type")?;
        return check_position(doc, node, expr, true, true);
    }

    Err(Error::UnknownPseudoClass(raw.to_string()))
}

fn pseudo_argument<'a>(raw: &'a str, name: &str) -> Result<&'a str> {
    raw.strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .filter(|inner| !inner.is_empty())
        .ok_or_else(|| Error::InvalidSelector(format!(":{raw}")))
}

fn check_position<D: Document>(
    doc: &D,
    node: D::NodeId,
    expr: &str,
    from_end: bool,
    same_type_only: bool,
) -> Result<bool> {
    let expr = selector::parse_nth_expr(expr)?;
    let mut siblings = sibling_sequence(doc, node, same_type_only);
    if from_end {
        siblings.reverse();
    }
    let Some(index) = siblings.iter().position(|sibling| *sibling == node) else {
        return Ok(false);
    };
    Ok(nth_matches(expr, index as i64 + 1))
}

// A parentless node forms a single-element sibling sequence of itself.
fn sibling_sequence<D: Document>(doc: &D, node: D::NodeId, same_type_only: bool) -> Vec<D::NodeId> {
    let mut siblings = match doc.parent(node) {
        Some(parent) => doc.element_children(parent),
        None => vec![node],
    };
    if same_type_only {
        let tag = doc.tag_name(node);
        siblings.retain(|sibling| doc.tag_name(*sibling) == tag);
    }
    siblings
}

fn nth_matches(expr: NthExpr, pos: i64) -> bool {
    match expr {
        NthExpr::Even => pos % 2 == 0,
        NthExpr::Odd => pos % 2 == 1,
        NthExpr::Exact(expected) => pos == expected,
        NthExpr::AnPlusB(step, offset) => {
            // True iff some k >= 0 has step * k + offset == pos. Widened to
            // i128 so a near-i64::MAX offset cannot overflow the subtraction.
            let diff = i128::from(pos) - i128::from(offset);
            let step = i128::from(step);
            if step == 0 {
                return diff == 0;
            }
            diff % step == 0 && diff / step >= 0
        }
    }
}
