//! Partition-then-pack engine shared by both auto-assigners.
//!
//! Callers split candidates into buckets (gender, patrol, dietary signature)
//! and hand them to a [`Packer`], which cuts each age-sorted bucket into
//! groups within `[min, max]`. Members a bucket cannot place are pooled with
//! the leftovers of sibling buckets and packed again. [`Packer::finish`]
//! places whatever is still left without breaking the spread, except for a
//! single stray member, which joins the closest existing group.
//! Nobody handed to the packer is ever dropped.

use std::iter;

use super::age_spread;

/// Attributes the packer needs from a member.
pub trait Packable {
    /// Age used for the spread constraint and for sorting. Unknown ages sort
    /// last and never count towards a spread.
    fn age(&self) -> Option<i32>;

    /// Soft affinity used to pick a home for leftovers (same patrol, same
    /// diet). Preferred, never required.
    fn shares_affinity(&self, other: &Self) -> bool;
}

/// Size and spread bounds for the groups being formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packer {
    pub min: usize,
    pub max: usize,
    /// Maximum allowed age spread inside a group. `None` disables the check.
    pub max_spread: Option<i32>,
}

/// Groups formed so far plus the members that did not fit.
#[derive(Debug)]
pub struct Packed<T> {
    pub groups: Vec<Vec<T>>,
    pub leftovers: Vec<T>,
}

impl<T> Default for Packed<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            leftovers: Vec::new(),
        }
    }
}

impl<T> Packed<T> {
    /// Append another result's groups and leftovers to this one.
    pub fn absorb(&mut self, other: Packed<T>) {
        self.groups.extend(other.groups);
        self.leftovers.extend(other.leftovers);
    }
}

impl Packer {
    /// Pack a single bucket.
    ///
    /// Members are sorted by age and cut greedily into `min`-sized groups.
    /// When the tail after a group would be smaller than `min`, the group is
    /// enlarged (up to `max`) to absorb it, provided the spread still holds.
    /// A member that cannot share a group with the next `min - 1` members
    /// within the spread is set aside as a leftover.
    pub fn pack<T: Packable>(&self, mut bucket: Vec<T>) -> Packed<T> {
        sort_by_age(&mut bucket);
        let ages: Vec<Option<i32>> = bucket.iter().map(Packable::age).collect();
        let n = ages.len();

        let within = |start: usize, end: usize| match self.max_spread {
            None => true,
            Some(limit) => {
                age_spread(ages[start..end].iter().copied()).map_or(true, |s| s <= limit)
            }
        };

        let mut ranges = Vec::new();
        let mut skipped = Vec::new();
        let mut i = 0;
        while n - i >= self.min {
            if !within(i, i + self.min) {
                skipped.push(i);
                i += 1;
                continue;
            }

            let mut end = i + self.min;
            let tail = n - end;
            if tail > 0 && tail < self.min {
                let room = (self.max - self.min).min(tail);
                if let Some(extra) = (1..=room).rev().find(|k| within(i, end + k)) {
                    end += extra;
                }
            }
            ranges.push(i..end);
            i = end;
        }
        skipped.extend(i..n);

        let mut slots: Vec<Option<T>> = bucket.into_iter().map(Some).collect();
        let groups: Vec<Vec<T>> = ranges
            .into_iter()
            .map(|range| slots[range].iter_mut().filter_map(Option::take).collect())
            .collect();
        let leftovers: Vec<T> = skipped
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect();

        Packed { groups, leftovers }
    }

    /// Pack each bucket on its own, then pool all of their leftovers and pack
    /// the pool. Whatever the pool cannot place stays in `leftovers`.
    pub fn pack_buckets<T: Packable>(&self, buckets: Vec<Vec<T>>) -> Packed<T> {
        let mut packed = Packed::default();
        for bucket in buckets {
            packed.absorb(self.pack(bucket));
        }
        let pool = std::mem::take(&mut packed.leftovers);
        packed.absorb(self.pack(pool));
        packed
    }

    /// Place every remaining leftover and return the final groups.
    ///
    /// 1. A leftover joins an existing group that has room and keeps the
    ///    spread.
    /// 2. If at least `min` are still unplaced they are packed together,
    ///    spread still enforced.
    /// 3. A single remaining member joins the nearest group even past `max`
    ///    or the spread. This is the only place the spread can break.
    /// 4. Any other remainder forms undersized groups that keep the spread.
    pub fn finish<T: Packable>(&self, packed: Packed<T>) -> Vec<Vec<T>> {
        let Packed {
            mut groups,
            leftovers,
        } = packed;

        let mut unplaced = Vec::new();
        for member in leftovers {
            match self.best_fit(&groups, &member, false) {
                Some(idx) => groups[idx].push(member),
                None => unplaced.push(member),
            }
        }

        if unplaced.len() >= self.min {
            let packed = self.pack(unplaced);
            groups.extend(packed.groups);
            unplaced = packed.leftovers;
        }

        if unplaced.len() == 1 && !groups.is_empty() {
            for member in unplaced {
                match self.best_fit(&groups, &member, true) {
                    Some(idx) => groups[idx].push(member),
                    None => groups.push(vec![member]),
                }
            }
            return groups;
        }

        groups.extend(self.undersized(unplaced));
        groups
    }

    /// Cut members that cannot reach `min` together into age-ordered groups
    /// that still keep the spread and `max`.
    fn undersized<T: Packable>(&self, mut members: Vec<T>) -> Vec<Vec<T>> {
        sort_by_age(&mut members);
        let mut groups: Vec<Vec<T>> = Vec::new();
        for member in members {
            let fits = groups.last().is_some_and(|group| {
                let spread = age_spread(
                    group
                        .iter()
                        .map(Packable::age)
                        .chain(iter::once(member.age())),
                );
                let spread_ok = match (self.max_spread, spread) {
                    (Some(limit), Some(spread)) => spread <= limit,
                    _ => true,
                };
                group.len() < self.max && spread_ok
            });
            match groups.last_mut() {
                Some(group) if fits => group.push(member),
                _ => groups.push(vec![member]),
            }
        }
        groups
    }

    /// Index of the best group for `member`.
    ///
    /// Without `force`, only groups with room that keep the spread qualify.
    /// Ranking: below capacity first, then shared affinity, then the smallest
    /// spread increase, then the smallest group.
    fn best_fit<T: Packable>(&self, groups: &[Vec<T>], member: &T, force: bool) -> Option<usize> {
        groups
            .iter()
            .enumerate()
            .filter_map(|(idx, group)| {
                let before = age_spread(group.iter().map(Packable::age));
                let after = age_spread(
                    group
                        .iter()
                        .map(Packable::age)
                        .chain(iter::once(member.age())),
                );
                let has_room = group.len() < self.max;
                let spread_ok = match (self.max_spread, after) {
                    (Some(limit), Some(spread)) => spread <= limit,
                    _ => true,
                };
                if !force && !(has_room && spread_ok) {
                    return None;
                }
                let affinity = group.iter().all(|m| m.shares_affinity(member));
                let increase = after.unwrap_or(0).saturating_sub(before.unwrap_or(0));
                Some(((!has_room, !affinity, increase, group.len(), idx), idx))
            })
            .min_by_key(|(key, _)| *key)
            .map(|(_, idx)| idx)
    }
}

/// Stable sort by age with unknown ages last.
fn sort_by_age<T: Packable>(members: &mut [T]) {
    members.sort_by_key(|m| (m.age().is_none(), m.age()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Kid {
        id: i64,
        age: Option<i32>,
        patrol: &'static str,
    }

    impl Packable for Kid {
        fn age(&self) -> Option<i32> {
            self.age
        }

        fn shares_affinity(&self, other: &Self) -> bool {
            self.patrol == other.patrol
        }
    }

    fn kids(ages: &[i32]) -> Vec<Kid> {
        ages.iter()
            .enumerate()
            .map(|(i, &age)| Kid {
                id: i as i64 + 1,
                age: Some(age),
                patrol: "eagles",
            })
            .collect()
    }

    fn tent_packer() -> Packer {
        Packer {
            min: 2,
            max: 3,
            max_spread: Some(2),
        }
    }

    fn sizes<T>(groups: &[Vec<T>]) -> Vec<usize> {
        groups.iter().map(Vec::len).collect()
    }

    fn spreads(groups: &[Vec<Kid>]) -> Vec<i32> {
        groups
            .iter()
            .map(|g| age_spread(g.iter().map(|k| k.age)).unwrap_or(0))
            .collect()
    }

    #[test]
    fn even_bucket_forms_min_sized_groups() {
        let packed = tent_packer().pack(kids(&[12, 11, 13, 12]));
        assert_eq!(sizes(&packed.groups), vec![2, 2]);
        assert!(packed.leftovers.is_empty());
    }

    #[test]
    fn odd_tail_is_absorbed_into_last_group() {
        let packed = tent_packer().pack(kids(&[11, 11, 12, 13, 13, 14, 14]));
        assert_eq!(sizes(&packed.groups), vec![2, 2, 3]);
        assert!(packed.leftovers.is_empty());
        assert!(spreads(&packed.groups).iter().all(|&s| s <= 2));
    }

    #[test]
    fn tail_is_not_absorbed_when_spread_would_break() {
        let packed = tent_packer().pack(kids(&[11, 12, 16]));
        assert_eq!(sizes(&packed.groups), vec![2]);
        assert_eq!(packed.leftovers.len(), 1);
        assert_eq!(packed.leftovers[0].age, Some(16));
    }

    #[test]
    fn outlier_is_skipped_not_forced() {
        let packed = tent_packer().pack(kids(&[8, 12, 13]));
        assert_eq!(packed.groups.len(), 1);
        let ages: Vec<_> = packed.groups[0].iter().map(|k| k.age).collect();
        assert_eq!(ages, vec![Some(12), Some(13)]);
        assert_eq!(packed.leftovers[0].age, Some(8));
    }

    #[test]
    fn unknown_ages_do_not_count_towards_spread() {
        let mut bucket = kids(&[12]);
        bucket.push(Kid {
            id: 9,
            age: None,
            patrol: "eagles",
        });
        let packed = tent_packer().pack(bucket);
        assert_eq!(sizes(&packed.groups), vec![2]);
    }

    #[test]
    fn empty_bucket_packs_to_nothing() {
        let packed = tent_packer().pack(Vec::<Kid>::new());
        assert!(packed.groups.is_empty());
        assert!(packed.leftovers.is_empty());
        assert!(tent_packer().finish(packed).is_empty());
    }

    #[test]
    fn bucket_leftovers_are_pooled_across_buckets() {
        let packer = tent_packer();
        let packed = packer.pack_buckets(vec![kids(&[12]), kids(&[13])]);
        assert_eq!(sizes(&packed.groups), vec![2]);
        assert!(packed.leftovers.is_empty());
    }

    #[test]
    fn single_leftover_joins_group_with_room() {
        let packer = Packer {
            min: 2,
            max: 4,
            max_spread: Some(2),
        };
        let packed = Packed {
            groups: vec![kids(&[12, 13])],
            leftovers: kids(&[14]),
        };
        let groups = packer.finish(packed);
        assert_eq!(sizes(&groups), vec![3]);
    }

    #[test]
    fn single_leftover_overflows_nearest_group() {
        let packer = tent_packer();
        let packed = Packed {
            groups: vec![kids(&[11, 11, 12]), kids(&[14, 14, 15])],
            leftovers: kids(&[16]),
        };
        let groups = packer.finish(packed);
        assert_eq!(sizes(&groups), vec![3, 4]);
    }

    #[test]
    fn lone_member_becomes_undersized_group() {
        let groups = tent_packer().finish(tent_packer().pack(kids(&[12])));
        assert_eq!(sizes(&groups), vec![1]);
    }

    #[test]
    fn unpairable_members_become_undersized_groups_within_spread() {
        let packer = tent_packer();
        let groups = packer.finish(packer.pack_buckets(vec![kids(&[8, 12, 16, 20])]));
        let placed: usize = sizes(&groups).iter().sum();
        assert_eq!(placed, 4);
        assert_eq!(sizes(&groups), vec![1, 1, 1, 1]);
        assert!(spreads(&groups).iter().all(|&s| s <= 2));
    }

    #[test]
    fn several_leftovers_never_form_a_group_beyond_the_spread() {
        let packer = tent_packer();
        let packed = Packed {
            groups: vec![kids(&[12, 12, 13])],
            leftovers: kids(&[8, 9, 16, 20]),
        };
        let groups = packer.finish(packed);
        let placed: usize = sizes(&groups).iter().sum();
        assert_eq!(placed, 7);
        for group in groups.iter().filter(|g| g.len() >= 2) {
            let spread = age_spread(group.iter().map(|k| k.age)).unwrap();
            assert!(spread <= 2, "spread {spread} in {group:?}");
        }
    }

    #[test]
    fn remainder_without_spread_limit_forms_one_undersized_group() {
        let packer = Packer {
            min: 4,
            max: 4,
            max_spread: None,
        };
        let groups = packer.finish(packer.pack(kids(&[10, 11, 12, 13, 14, 15, 16])));
        assert_eq!(sizes(&groups), vec![4, 3]);
    }

    #[test]
    fn leftovers_prefer_groups_sharing_affinity() {
        let packer = Packer {
            min: 2,
            max: 4,
            max_spread: None,
        };
        let mut hawks = kids(&[12, 12]);
        for k in &mut hawks {
            k.patrol = "hawks";
        }
        let mut stray = kids(&[12]);
        stray[0].patrol = "hawks";
        let packed = Packed {
            groups: vec![kids(&[12, 12]), hawks],
            leftovers: stray,
        };
        let groups = packer.finish(packed);
        assert_eq!(sizes(&groups), vec![2, 3]);
        assert!(groups[1].iter().all(|k| k.patrol == "hawks"));
    }
}
