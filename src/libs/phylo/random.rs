use super::unrooted::{CornerId, UnrootedTree};
use rand::Rng;

/// Random unrooted gene tree by sequential attachment: `len` random
/// subtrees are chained onto a growing backbone. Each subtree branches
/// with probability `pint`, decayed by `dec` at every recursion, and
/// draws leaf labels uniformly from `labels`.
pub fn random_sequential<R: Rng>(
    len: usize,
    pint: f64,
    dec: f64,
    labels: &[String],
    rng: &mut R,
) -> UnrootedTree {
    let mut ut = UnrootedTree::new();
    let mut cur = random_subtree(&mut ut, pint, dec, labels, rng);
    let mut next = random_subtree(&mut ut, pint, dec, labels, rng);
    for _ in 0..len.saturating_sub(2) {
        cur = ut.add_vertex(cur, next, None);
        next = random_subtree(&mut ut, pint, dec, labels, rng);
    }
    ut.join(cur, next);
    ut
}

fn random_subtree<R: Rng>(
    ut: &mut UnrootedTree,
    pint: f64,
    dec: f64,
    labels: &[String],
    rng: &mut R,
) -> CornerId {
    if rng.gen::<f64>() < pint {
        let a = random_subtree(ut, pint * dec, dec, labels, rng);
        let b = random_subtree(ut, pint * dec, dec, labels, rng);
        ut.add_vertex(a, b, None)
    } else {
        let label = &labels[rng.gen_range(0..labels.len())];
        ut.add_leaf(label)
    }
}

/// Uniform random unrooted binary tree on `num_leaves` labels drawn
/// from `labels` (all of them at most once when `unique`): leaves are
/// joined by repeated random pairing until two subtrees remain, which
/// become the start edge. With no count given, a unique draw picks a
/// random number of leaves.
pub fn random_uniform<R: Rng>(
    num_leaves: Option<usize>,
    unique: bool,
    labels: &[String],
    rng: &mut R,
) -> UnrootedTree {
    let n = labels.len();
    let lf = match num_leaves {
        Some(k) if unique => k.min(n).max(1),
        Some(k) => k.max(1),
        None => {
            if n > 1 {
                rng.gen_range(1..=n)
            } else {
                1
            }
        }
    };

    let mut chosen = Vec::with_capacity(lf);
    if unique {
        let mut used = vec![false; n];
        for _ in 0..lf {
            loop {
                let pos = rng.gen_range(0..n);
                if !used[pos] {
                    used[pos] = true;
                    chosen.push(pos);
                    break;
                }
            }
        }
    } else {
        for _ in 0..lf {
            chosen.push(rng.gen_range(0..n));
        }
    }

    let mut ut = UnrootedTree::new();
    let mut subtrees: Vec<CornerId> = chosen
        .into_iter()
        .map(|pos| ut.add_leaf(&labels[pos]))
        .collect();

    if lf == 1 {
        let only = subtrees[0];
        ut.set_start(only);
        return ut;
    }

    while subtrees.len() > 2 {
        let p = rng.gen_range(0..subtrees.len());
        let q = loop {
            let q = rng.gen_range(0..subtrees.len());
            if q != p {
                break q;
            }
        };
        subtrees[p] = ut.add_vertex(subtrees[p], subtrees[q], None);
        subtrees.remove(q);
    }
    ut.join(subtrees[0], subtrees[1]);
    ut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::writer;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn labels() -> Vec<String> {
        ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn assert_wired(ut: &UnrootedTree) {
        for corner in ut.corners() {
            let p = corner.parent.expect("fully wired tree");
            assert_eq!(ut.corner(p).parent, Some(corner.id));
        }
    }

    #[test]
    fn test_random_sequential() {
        let labels = labels();
        let mut rng = SmallRng::seed_from_u64(42);
        for len in [2, 4, 8] {
            let ut = random_sequential(len, 0.5, 0.75, &labels, &mut rng);
            assert!(ut.leaf_count() >= len);
            assert_wired(&ut);
            for corner in ut.corners().filter(|c| c.is_leaf()) {
                assert!(labels.contains(corner.species.as_ref().unwrap()));
            }
        }
    }

    #[test]
    fn test_random_uniform_counts() {
        let labels = labels();
        let mut rng = SmallRng::seed_from_u64(7);

        let ut = random_uniform(Some(4), false, &labels, &mut rng);
        assert_eq!(ut.leaf_count(), 4);
        assert_wired(&ut);

        // requests beyond the pool are clamped when unique
        let ut = random_uniform(Some(10), true, &labels, &mut rng);
        assert_eq!(ut.leaf_count(), 6);

        let single = random_uniform(Some(1), true, &labels, &mut rng);
        assert_eq!(single.len(), 1);
        assert!(single.start().is_some());
    }

    #[test]
    fn test_random_uniform_unique_labels() {
        let labels = labels();
        let mut rng = SmallRng::seed_from_u64(11);
        let ut = random_uniform(Some(6), true, &labels, &mut rng);

        let mut seen: Vec<String> = ut
            .corners()
            .filter(|c| c.is_leaf())
            .map(|c| c.species.clone().unwrap())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_random_trees_parse_back() {
        let labels = labels();
        let mut rng = SmallRng::seed_from_u64(13);
        for _ in 0..5 {
            let ut = random_uniform(Some(5), false, &labels, &mut rng);
            let newick = writer::write_newick(&ut.rooted_at(ut.start().unwrap()));
            let reparsed = UnrootedTree::from_newick(&newick).unwrap();
            assert_eq!(reparsed.leaf_count(), 5);
        }
    }
}
