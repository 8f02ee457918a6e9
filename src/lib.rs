use std::error::Error as StdError;
use std::fmt;

mod matching;
mod selector;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    EmptySelector,
    InvalidSelector(String),
    UnknownPseudoClass(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySelector => write!(f, "empty selector"),
            Self::InvalidSelector(fragment) => write!(f, "invalid selector: {fragment}"),
            Self::UnknownPseudoClass(name) => write!(f, "unknown pseudo-class: {name}"),
        }
    }
}

impl StdError for Error {}

pub trait Document {
    type NodeId: Copy + PartialEq;

    fn parent(&self, node: Self::NodeId) -> Option<Self::NodeId>;
    fn element_children(&self, node: Self::NodeId) -> Vec<Self::NodeId>;
    fn tag_name(&self, node: Self::NodeId) -> &str;
    fn id(&self, node: Self::NodeId) -> &str;
    fn has_class(&self, node: Self::NodeId, class_name: &str) -> bool;
    fn attribute(&self, node: Self::NodeId, key: &str) -> Option<&str>;
    fn checked(&self, node: Self::NodeId) -> bool;
    fn disabled(&self, node: Self::NodeId) -> bool;
    // Counts every child node, not only element children. `:empty` depends
    // on text nodes being included here.
    fn child_node_count(&self, node: Self::NodeId) -> usize;
    fn is_root(&self, node: Self::NodeId) -> bool;
}

pub fn query_first<D: Document>(
    doc: &D,
    root: D::NodeId,
    selector: &str,
) -> Result<Option<D::NodeId>> {
    if selector.is_empty() {
        return Err(Error::EmptySelector);
    }
    let compiled = selector::compile_compound(selector)?;
    stacker::grow(32 * 1024 * 1024, || find_first(doc, root, &compiled))
}

fn find_first<D: Document>(
    doc: &D,
    node: D::NodeId,
    compiled: &[selector::Clause],
) -> Result<Option<D::NodeId>> {
    if matching::matches_compound(doc, node, compiled)? {
        return Ok(Some(node));
    }
    for child in doc.element_children(node) {
        if let Some(found) = find_first(doc, child, compiled)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
