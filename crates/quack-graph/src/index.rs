//! In-memory adjacency for the follow graph.

use std::collections::{BTreeSet, HashMap};

use quack_codec::{decode_lines, FollowLineCodec};
use quack_types::{FollowEdge, ParseWarning, Username};
use tracing::warn;

/// Forward (follower → followees) and reverse (followee → followers) maps
/// over the distinct edge set of one load.
#[derive(Debug, Default)]
pub struct GraphIndex {
    forward: HashMap<Username, BTreeSet<Username>>,
    reverse: HashMap<Username, BTreeSet<Username>>,
    warnings: Vec<ParseWarning>,
}

impl GraphIndex {
    /// Build the index from the text of a graph file.
    ///
    /// Malformed lines are skipped whole. Self-edges are dropped one at a
    /// time, keeping the rest of their line. Both produce warnings.
    pub fn parse(text: &str) -> Self {
        let decoded = decode_lines::<FollowLineCodec>(text);
        let raw: Vec<&str> = text.lines().collect();
        let mut index = Self {
            warnings: decoded.warnings,
            ..Self::default()
        };

        for (line_number, line) in decoded.records {
            for followee in line.followees {
                match FollowEdge::new(line.follower.clone(), followee) {
                    Ok(edge) => index.insert(edge),
                    Err(e) => {
                        warn!(line_number, error = %e, "skipping self-edge");
                        let text = raw.get(line_number - 1).copied().unwrap_or_default();
                        index.warnings.push(ParseWarning::new(line_number, text, e));
                    }
                }
            }
        }
        index.warnings.sort_by_key(|w| w.line_number);
        index
    }

    /// Build the index from an edge list.
    pub fn from_edges(edges: impl IntoIterator<Item = FollowEdge>) -> Self {
        let mut index = Self::default();
        for edge in edges {
            index.insert(edge);
        }
        index
    }

    fn insert(&mut self, edge: FollowEdge) {
        self.forward
            .entry(edge.follower().clone())
            .or_default()
            .insert(edge.followee().clone());
        self.reverse
            .entry(edge.followee().clone())
            .or_default()
            .insert(edge.follower().clone());
    }

    /// Number of distinct users `user` follows.
    pub fn following_count(&self, user: &Username) -> usize {
        self.forward.get(user).map_or(0, BTreeSet::len)
    }

    /// Number of distinct users following `user`.
    pub fn follower_count(&self, user: &Username) -> usize {
        self.reverse.get(user).map_or(0, BTreeSet::len)
    }

    /// Users `user` follows, sorted.
    pub fn following_of(&self, user: &Username) -> Vec<Username> {
        self.forward
            .get(user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Users following `user`, sorted.
    pub fn followers_of(&self, user: &Username) -> Vec<Username> {
        self.reverse
            .get(user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, follower: &Username, followee: &Username) -> bool {
        self.forward
            .get(follower)
            .is_some_and(|set| set.contains(followee))
    }

    /// Total number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// All edges, sorted by follower then followee.
    pub fn edges(&self) -> Vec<FollowEdge> {
        let mut edges: Vec<FollowEdge> = self
            .forward
            .iter()
            .flat_map(|(follower, followees)| {
                followees.iter().filter_map(move |followee| {
                    FollowEdge::new(follower.clone(), followee.clone()).ok()
                })
            })
            .collect();
        edges.sort();
        edges
    }

    /// Lines skipped or trimmed during the load that built this index.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn u(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    #[test]
    fn counts_are_per_edge() {
        let g = GraphIndex::parse("a:b;c\nd:c\n");
        assert_eq!(g.follower_count(&u("c")), 2);
        assert_eq!(g.following_count(&u("a")), 2);
        assert_eq!(g.follower_count(&u("b")), 1);
        assert_eq!(g.following_count(&u("d")), 1);
        assert_eq!(g.follower_count(&u("a")), 0);
        assert_eq!(g.following_count(&u("c")), 0);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn follower_count_ignores_length_of_followers_line() {
        // `a` follows three users; that must not add three followers to `b`.
        let g = GraphIndex::parse("a:b;c;d\n");
        assert_eq!(g.follower_count(&u("b")), 1);
        assert_eq!(g.following_count(&u("a")), 3);
    }

    #[test]
    fn duplicates_and_repeated_lines_count_once() {
        let g = GraphIndex::parse("a:b;b\na:b;c\n");
        assert_eq!(g.following_count(&u("a")), 2);
        assert_eq!(g.follower_count(&u("b")), 1);
        assert_eq!(g.following_of(&u("a")), vec![u("b"), u("c")]);
    }

    #[test]
    fn malformed_line_does_not_spoil_others() {
        let g = GraphIndex::parse("a:b;c\nthis line is broken\nd:c\ne:f:g\n");
        assert_eq!(g.follower_count(&u("c")), 2);
        assert_eq!(g.following_count(&u("a")), 2);
        assert_eq!(g.follower_count(&u("b")), 1);

        let lines: Vec<usize> = g.warnings().iter().map(|w| w.line_number).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn self_edges_are_dropped_individually() {
        let g = GraphIndex::parse("a:a;b\n");
        assert_eq!(g.following_count(&u("a")), 1);
        assert!(!g.contains(&u("a"), &u("a")));
        assert!(g.contains(&u("a"), &u("b")));
        assert_eq!(g.warnings().len(), 1);
        assert_eq!(g.warnings()[0].line, "a:a;b");
    }

    #[test]
    fn followers_listing() {
        let g = GraphIndex::parse("a:c\nb:c\nd:c\n");
        assert_eq!(g.followers_of(&u("c")), vec![u("a"), u("b"), u("d")]);
        assert!(g.followers_of(&u("zed")).is_empty());
    }

    fn edge_strategy() -> impl Strategy<Value = (u8, u8)> {
        (0u8..6, 0u8..6)
    }

    proptest! {
        #[test]
        fn counts_match_distinct_edge_set(pairs in proptest::collection::vec(edge_strategy(), 0..40)) {
            let mut text = String::new();
            for (f, t) in &pairs {
                text.push_str(&format!("u{f}:u{t}\n"));
            }
            let g = GraphIndex::parse(&text);

            let distinct: BTreeSet<(u8, u8)> = pairs.iter().copied().filter(|(f, t)| f != t).collect();
            for n in 0u8..6 {
                let name = u(&format!("u{n}"));
                let out = distinct.iter().filter(|(f, _)| *f == n).count();
                let inc = distinct.iter().filter(|(_, t)| *t == n).count();
                prop_assert_eq!(g.following_count(&name), out);
                prop_assert_eq!(g.follower_count(&name), inc);
            }
            prop_assert_eq!(g.edge_count(), distinct.len());
        }
    }
}
