use compound_selector::{Document, query_first};
use proptest::prelude::*;

// Flat fixture: node 0 is the root, nodes 1..=count are its <li> children.
struct RowDom {
    count: usize,
}

impl Document for RowDom {
    type NodeId = usize;

    fn parent(&self, node: usize) -> Option<usize> {
        if node == 0 { None } else { Some(0) }
    }

    fn element_children(&self, node: usize) -> Vec<usize> {
        if node == 0 {
            (1..=self.count).collect()
        } else {
            Vec::new()
        }
    }

    fn tag_name(&self, node: usize) -> &str {
        if node == 0 { "ul" } else { "li" }
    }

    fn id(&self, _node: usize) -> &str {
        ""
    }

    fn has_class(&self, _node: usize, _class_name: &str) -> bool {
        false
    }

    fn attribute(&self, _node: usize, _key: &str) -> Option<&str> {
        None
    }

    fn checked(&self, _node: usize) -> bool {
        false
    }

    fn disabled(&self, _node: usize) -> bool {
        false
    }

    fn child_node_count(&self, node: usize) -> usize {
        if node == 0 { self.count } else { 0 }
    }

    fn is_root(&self, node: usize) -> bool {
        node == 0
    }
}

// Single element carrying one class attribute and one plain attribute.
struct LeafDom {
    classes: Vec<String>,
    attr_value: Option<String>,
}

impl Document for LeafDom {
    type NodeId = usize;

    fn parent(&self, _node: usize) -> Option<usize> {
        None
    }

    fn element_children(&self, _node: usize) -> Vec<usize> {
        Vec::new()
    }

    fn tag_name(&self, _node: usize) -> &str {
        "div"
    }

    fn id(&self, _node: usize) -> &str {
        ""
    }

    fn has_class(&self, _node: usize, class_name: &str) -> bool {
        self.classes.iter().any(|class| class == class_name)
    }

    fn attribute(&self, _node: usize, key: &str) -> Option<&str> {
        if key == "data-x" {
            self.attr_value.as_deref()
        } else {
            None
        }
    }

    fn checked(&self, _node: usize) -> bool {
        false
    }

    fn disabled(&self, _node: usize) -> bool {
        false
    }

    fn child_node_count(&self, _node: usize) -> usize {
        0
    }

    fn is_root(&self, _node: usize) -> bool {
        true
    }
}

// k = 64 comfortably covers every reachable position for the generated
// step/offset/count ranges.
fn nth_oracle(step: i64, offset: i64, pos: i64) -> bool {
    (0..=64).any(|k| step * k + offset == pos)
}

fn class_name_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just("alpha"),
        Just("beta"),
        Just("gamma"),
        Just("delta"),
        Just("x"),
        Just("_tmp"),
    ]
    .prop_map(str::to_string)
    .boxed()
}

fn clause_fragment_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just("div".to_string()),
        Just("*".to_string()),
        Just(".a".to_string()),
        Just("#id".to_string()),
        Just("[href]".to_string()),
        Just("[href=x]".to_string()),
        Just("[href='a b']".to_string()),
        Just("[href~=t]".to_string()),
        Just(":first-child".to_string()),
        Just(":nth-child(2n+1)".to_string()),
        Just(":nth-last-of-type(odd)".to_string()),
        Just(":not(.a)".to_string()),
        Just(":not(".to_string()),
        Just(":nth-child(".to_string()),
        Just(":checked".to_string()),
        Just(":hover".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just("'".to_string()),
        Just("\"".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just(":".to_string()),
    ]
    .boxed()
}

proptest! {
    #[test]
    fn nth_child_formula_agrees_with_bruteforce_oracle(
        step in -4i64..=4,
        offset in -6i64..=9,
        count in 1usize..=12,
        pad_a in 0usize..=1,
        pad_b in 0usize..=1,
    ) {
        let dom = RowDom { count };
        let offset_part = if offset < 0 {
            format!("-{}{}", " ".repeat(pad_b), -offset)
        } else {
            format!("+{}{}", " ".repeat(pad_b), offset)
        };
        let selector = format!("li:nth-child({}{}n{}{})", " ".repeat(pad_a), step, offset_part, " ".repeat(pad_a));

        let found = query_first(&dom, 0, &selector).unwrap();
        let expected = (1..=count as i64).find(|pos| nth_oracle(step, offset, *pos));
        prop_assert_eq!(found, expected.map(|pos| pos as usize));
    }

    #[test]
    fn nth_last_child_mirrors_nth_child(
        step in 0i64..=4,
        offset in 0i64..=9,
        count in 1usize..=12,
    ) {
        let dom = RowDom { count };
        let selector = format!("li:nth-last-child({step}n+{offset})");

        let found = query_first(&dom, 0, &selector).unwrap();
        let expected = (1..=count as i64)
            .find(|pos| nth_oracle(step, offset, count as i64 + 1 - pos));
        prop_assert_eq!(found, expected.map(|pos| pos as usize));
    }

    #[test]
    fn not_complements_its_inner_selector(
        classes in proptest::collection::vec(class_name_strategy(), 0..4),
        target in class_name_strategy(),
    ) {
        let dom = LeafDom { classes, attr_value: None };
        let plain = query_first(&dom, 0, &format!(".{target}")).unwrap();
        let negated = query_first(&dom, 0, &format!(":not(.{target})")).unwrap();
        prop_assert!(plain.is_some() != negated.is_some());
    }

    #[test]
    fn includes_combinator_agrees_with_token_split(
        tokens in proptest::collection::vec(class_name_strategy(), 1..5),
        target in class_name_strategy(),
    ) {
        let value = tokens.join(" ");
        let dom = LeafDom { classes: Vec::new(), attr_value: Some(value.clone()) };
        let found = query_first(&dom, 0, &format!("[data-x~={target}]")).unwrap();
        prop_assert_eq!(found.is_some(), value.split(' ').any(|token| token == target));
    }

    #[test]
    fn arbitrary_clause_soup_never_panics(
        fragments in proptest::collection::vec(clause_fragment_strategy(), 1..6),
    ) {
        let dom = RowDom { count: 4 };
        let selector = fragments.concat();
        // Any outcome is fine as long as it is a Result, not a panic.
        let _ = query_first(&dom, 0, &selector);
    }
}
