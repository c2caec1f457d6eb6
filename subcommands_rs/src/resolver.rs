//! Qualified name resolution against the host's group tree.
//!
//! Resolution is a pure walk: start from the root groups, descend one
//! segment at a time through nested groups. Nothing here mutates the host.

use strsim::levenshtein;

use crate::host::GroupTree;
use crate::name::QualifiedName;

/// Maximum edit distance for a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Resolve `target` to a group node. Among same-named siblings the first in
/// host order wins.
pub fn resolve<T: GroupTree + ?Sized>(tree: &T, target: &QualifiedName) -> Option<T::Group> {
    resolve_where(tree, target, |_| true)
}

/// Resolve `target`, accepting only a final node for which `accept` holds.
///
/// Same-named siblings are tried in host order, so a prefix group and a slash
/// group that share a path are told apart by the predicate.
pub fn resolve_where<T, F>(tree: &T, target: &QualifiedName, accept: F) -> Option<T::Group>
where
    T: GroupTree + ?Sized,
    F: Fn(&T::Group) -> bool,
{
    descend(tree, tree.root_groups(), target.segments(), &accept)
}

fn descend<T, F>(
    tree: &T,
    frontier: Vec<T::Group>,
    segments: &[String],
    accept: &F,
) -> Option<T::Group>
where
    T: GroupTree + ?Sized,
    F: Fn(&T::Group) -> bool,
{
    let (head, rest) = segments.split_first()?;
    for node in frontier {
        if tree.group_name(&node) != *head {
            continue;
        }
        if rest.is_empty() {
            if accept(&node) {
                return Some(node);
            }
            continue;
        }
        if let Some(found) = descend(tree, tree.nested_groups(&node), rest, accept) {
            return Some(found);
        }
    }
    None
}

/// Every reachable group with its qualified path, parents before children.
pub fn qualified_groups<T: GroupTree + ?Sized>(tree: &T) -> Vec<(QualifiedName, T::Group)> {
    let mut out = Vec::new();
    let mut stack: Vec<(Option<QualifiedName>, T::Group)> = tree
        .root_groups()
        .into_iter()
        .rev()
        .map(|group| (None, group))
        .collect();

    while let Some((parent, group)) = stack.pop() {
        let own = tree.group_name(&group);
        let path = match parent {
            Some(parent) => parent.child(&own),
            None => match QualifiedName::parse(&own) {
                Ok(path) => path,
                Err(_) => continue,
            },
        };
        for nested in tree.nested_groups(&group).into_iter().rev() {
            stack.push((Some(path.clone()), nested));
        }
        out.push((path, group));
    }
    out
}

/// Closest candidate path to `target`, if within a small edit distance.
pub fn suggest<'a, I>(target: &QualifiedName, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a QualifiedName>,
{
    let wanted = target.to_string().to_lowercase();
    let mut best: Option<(String, usize)> = None;

    for candidate in candidates {
        let text = candidate.to_string();
        let distance = levenshtein(&wanted, &text.to_lowercase());
        if distance == 0 || distance > MAX_SUGGESTION_DISTANCE {
            continue;
        }
        match &best {
            Some((_, best_distance)) if *best_distance <= distance => {}
            _ => best = Some((text, distance)),
        }
    }
    best.map(|(text, _)| text)
}
