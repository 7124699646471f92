// Property tests for the parser.

use piklisp::{parse, Tree};
use proptest::prelude::*;

/// A generated s-expression. Every list holds at least two items, so the
/// parser's single-child collapse only ever strips the synthetic root.
#[derive(Debug, Clone)]
enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl Sexp {
    fn render(&self) -> String {
        match self {
            Sexp::Atom(a) => a.clone(),
            Sexp::List(items) => {
                let inner: Vec<_> = items.iter().map(Sexp::render).collect();
                format!("({})", inner.join(" "))
            }
        }
    }

    /// Depth of every atom, counting the outermost list as depth 0.
    fn atom_depths(&self, depth: usize, out: &mut Vec<(String, usize)>) {
        match self {
            Sexp::Atom(a) => out.push((a.clone(), depth)),
            Sexp::List(items) => {
                for item in items {
                    item.atom_depths(depth + 1, out);
                }
            }
        }
    }
}

fn sexp() -> impl Strategy<Value = Sexp> {
    let atom = "[a-z][a-z0-9.*+-]{0,4}".prop_map(Sexp::Atom);
    atom.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 2..5).prop_map(Sexp::List)
    })
}

fn top_level_list() -> impl Strategy<Value = Sexp> {
    prop::collection::vec(sexp(), 2..5).prop_map(Sexp::List)
}

fn leaf_depths(tree: &Tree) -> Vec<(String, usize)> {
    fn walk(tree: &Tree, node: piklisp::NodeRef<'_>, out: &mut Vec<(String, usize)>) {
        match node.content() {
            Some(text) => out.push((text.to_string(), tree.depth(node.id()))),
            None => node.children().for_each(|child| walk(tree, child, out)),
        }
    }
    let mut out = Vec::new();
    walk(tree, tree.root_ref(), &mut out);
    out
}

proptest! {
    #[test]
    fn balanced_classic_input_round_trips(expr in top_level_list()) {
        let src = expr.render();
        let tree = parse(&src).unwrap();
        prop_assert_eq!(tree.to_string(), src);
    }

    #[test]
    fn leaf_depth_tracks_unmatched_parens(expr in top_level_list()) {
        let tree = parse(&expr.render()).unwrap();
        let mut expected = Vec::new();
        expr.atom_depths(0, &mut expected);
        prop_assert_eq!(leaf_depths(&tree), expected);
    }

    #[test]
    fn newlines_inside_classic_block_are_insignificant(expr in top_level_list()) {
        let src = expr.render();
        let spread = src.replace(' ', "\n  ");
        prop_assert_eq!(parse(&spread).unwrap(), parse(&src).unwrap());
    }

    #[test]
    fn comment_lines_between_indented_siblings_are_transparent(
        lines in prop::collection::vec("[a-z]{1,6}( [a-z]{1,6}){0,2}", 2..6),
        at in any::<prop::sample::Index>(),
    ) {
        let body: Vec<String> = lines.iter().map(|l| format!("\t{l}")).collect();
        let plain = format!("head\n{}", body.join("\n"));
        let mut with_comment = body.clone();
        with_comment.insert(at.index(body.len() + 1).max(1), "\t; remark".to_string());
        let commented = format!("head\n{}", with_comment.join("\n"));
        prop_assert_eq!(parse(&commented).unwrap(), parse(&plain).unwrap());
    }
}
