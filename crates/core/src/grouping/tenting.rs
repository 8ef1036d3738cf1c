//! Tenting groups: validator and auto-assignment heuristic.
//!
//! Tents hold scouts only. Gender separation is a hard constraint that is
//! never relaxed. Patrol cohesion is a preference. The age spread only gives
//! way for a single stray scout, who joins the nearest tent; otherwise scouts
//! who cannot pair get undersized tents.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::naming::next_group_names;
use super::packing::{Packable, Packer};
use super::{
    age_spread, normalize_gender, normalize_patrol, validate_size_bounds, Candidate, GroupKind,
    GroupSnapshot, IssueType, PlannedGroup, PlannedMember, Severity, ValidationIssue,
};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_TENT_SIZE_MIN: usize = 2;
pub const DEFAULT_TENT_SIZE_MAX: usize = 3;
pub const DEFAULT_MAX_AGE_DIFFERENCE: i32 = 2;

/// Largest tent the validator accepts without a size warning.
pub const DEFAULT_POLICY_MAX_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Tunables for [`plan_tenting`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TentingParams {
    pub tent_size_min: usize,
    pub tent_size_max: usize,
    pub keep_patrols_together: bool,
    pub max_age_difference: i32,
}

impl Default for TentingParams {
    fn default() -> Self {
        Self {
            tent_size_min: DEFAULT_TENT_SIZE_MIN,
            tent_size_max: DEFAULT_TENT_SIZE_MAX,
            keep_patrols_together: true,
            max_age_difference: DEFAULT_MAX_AGE_DIFFERENCE,
        }
    }
}

impl TentingParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_size_bounds(self.tent_size_min, self.tent_size_max, "Tent")?;
        if self.max_age_difference < 0 {
            return Err(CoreError::Validation(
                "max_age_difference cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Policy checked by [`validate_tenting_groups`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TentingPolicy {
    pub max_age_difference: i32,
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for TentingPolicy {
    fn default() -> Self {
        Self {
            max_age_difference: DEFAULT_MAX_AGE_DIFFERENCE,
            min_size: DEFAULT_TENT_SIZE_MIN,
            max_size: DEFAULT_POLICY_MAX_SIZE,
        }
    }
}

impl TentingPolicy {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_size_bounds(self.min_size, self.max_size, "Tent")?;
        if self.max_age_difference < 0 {
            return Err(CoreError::Validation(
                "max_age_difference cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Check every tent against the policy.
///
/// Issues come out in group order, and within a group in rule order:
/// age gap, then gender, then size. Members with unknown age or gender are
/// left out of the rule that needs that attribute.
pub fn validate_tenting_groups(
    groups: &[GroupSnapshot],
    policy: &TentingPolicy,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for group in groups {
        if group.member_count() >= 2 {
            if let Some(spread) = age_spread(group.members.iter().map(|m| m.age)) {
                if spread > policy.max_age_difference {
                    issues.push(ValidationIssue::new(
                        group,
                        IssueType::AgeGap,
                        Severity::Error,
                        format!(
                            "Age gap of {spread} years exceeds the maximum of {}",
                            policy.max_age_difference
                        ),
                    ));
                }
            }
        }

        let genders: BTreeSet<String> = group
            .members
            .iter()
            .filter_map(|m| normalize_gender(m.gender.as_deref()))
            .collect();
        if genders.len() > 1 {
            issues.push(ValidationIssue::new(
                group,
                IssueType::GenderMismatch,
                Severity::Error,
                format!(
                    "Tent mixes genders: {}",
                    genders.into_iter().collect::<Vec<_>>().join(", ")
                ),
            ));
        }

        let count = group.member_count();
        if count < policy.min_size {
            issues.push(ValidationIssue::new(
                group,
                IssueType::GroupSize,
                Severity::Warning,
                format!(
                    "Tent has {count} member(s), fewer than the minimum of {}",
                    policy.min_size
                ),
            ));
        } else if count > policy.max_size {
            issues.push(ValidationIssue::new(
                group,
                IssueType::GroupSize,
                Severity::Warning,
                format!(
                    "Tent has {count} members, more than the maximum of {}",
                    policy.max_size
                ),
            ));
        }
    }

    issues
}

// ---------------------------------------------------------------------------
// Auto-assignment
// ---------------------------------------------------------------------------

struct Scout<'a> {
    candidate: &'a Candidate,
    patrol: Option<String>,
}

impl Packable for Scout<'_> {
    fn age(&self) -> Option<i32> {
        self.candidate.age
    }

    fn shares_affinity(&self, other: &Self) -> bool {
        self.patrol == other.patrol
    }
}

/// Partition unassigned scouts into new tents.
///
/// Adults are ignored. Candidates are split by gender (unknown gender is a
/// partition of its own), optionally sub-split by patrol, and each partition
/// is packed independently so two genders can never meet in a tent. Names
/// continue the "Tent N" sequence after `existing_names`.
pub fn plan_tenting(
    candidates: &[Candidate],
    params: &TentingParams,
    existing_names: &[String],
) -> Result<Vec<PlannedGroup>, CoreError> {
    params.validate()?;

    let packer = Packer {
        min: params.tent_size_min,
        max: params.tent_size_max,
        max_spread: Some(params.max_age_difference),
    };

    let mut scouts: Vec<&Candidate> = candidates.iter().filter(|c| !c.is_adult).collect();
    scouts.sort_by_key(|c| c.participant_id);

    let mut by_gender: BTreeMap<Option<String>, Vec<Scout>> = BTreeMap::new();
    for candidate in scouts {
        by_gender
            .entry(normalize_gender(candidate.gender.as_deref()))
            .or_default()
            .push(Scout {
                candidate,
                patrol: normalize_patrol(candidate.patrol_name.as_deref()),
            });
    }

    let mut tents: Vec<Vec<Scout>> = Vec::new();
    for (_, partition) in by_gender {
        let buckets = if params.keep_patrols_together {
            let mut by_patrol: BTreeMap<Option<String>, Vec<Scout>> = BTreeMap::new();
            for scout in partition {
                by_patrol.entry(scout.patrol.clone()).or_default().push(scout);
            }
            by_patrol.into_values().collect()
        } else {
            vec![partition]
        };
        tents.extend(packer.finish(packer.pack_buckets(buckets)));
    }

    let names = next_group_names(existing_names, GroupKind::Tenting.name_prefix(), tents.len());
    Ok(names
        .into_iter()
        .zip(tents)
        .map(|(name, tent)| PlannedGroup {
            name,
            members: tent
                .iter()
                .map(|s| PlannedMember {
                    participant_id: s.candidate.participant_id,
                    is_grubmaster: false,
                })
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::grouping::MemberSnapshot;
    use crate::types::DbId;
    use assert_matches::assert_matches;

    fn scout(id: DbId, age: i32, gender: &str, patrol: Option<&str>) -> Candidate {
        Candidate {
            participant_id: id,
            name: format!("Scout {id}"),
            age: Some(age),
            gender: Some(gender.to_string()),
            patrol_name: patrol.map(str::to_string),
            is_adult: false,
            dietary_restrictions: Vec::new(),
            grubmaster_interest: false,
            grubmaster_reason: None,
        }
    }

    fn member(id: DbId, age: Option<i32>, gender: Option<&str>) -> MemberSnapshot {
        MemberSnapshot {
            participant_id: id,
            name: format!("Scout {id}"),
            age,
            gender: gender.map(str::to_string),
            patrol_name: None,
            dietary_restrictions: Vec::new(),
            is_grubmaster: false,
        }
    }

    fn group(id: DbId, members: Vec<MemberSnapshot>) -> GroupSnapshot {
        GroupSnapshot {
            group_id: id,
            name: format!("Tent {id}"),
            members,
        }
    }

    /// Resolve planned groups back to candidates for assertions.
    fn resolve<'a>(plan: &[PlannedGroup], pool: &'a [Candidate]) -> Vec<Vec<&'a Candidate>> {
        let by_id: HashMap<DbId, &Candidate> =
            pool.iter().map(|c| (c.participant_id, c)).collect();
        plan.iter()
            .map(|g| g.members.iter().map(|m| by_id[&m.participant_id]).collect())
            .collect()
    }

    fn assert_covers_exactly_once(plan: &[PlannedGroup], expected: &[DbId]) {
        let placed: Vec<DbId> = plan
            .iter()
            .flat_map(|g| g.members.iter().map(|m| m.participant_id))
            .collect();
        let unique: HashSet<DbId> = placed.iter().copied().collect();
        assert_eq!(placed.len(), unique.len(), "a scout was placed twice");
        assert_eq!(unique, expected.iter().copied().collect::<HashSet<_>>());
    }

    // -- validator ----------------------------------------------------------

    #[test]
    fn age_gap_is_an_error() {
        let groups = vec![group(
            1,
            vec![member(1, Some(11), Some("male")), member(2, Some(14), Some("male"))],
        )];
        let issues = validate_tenting_groups(&groups, &TentingPolicy::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::AgeGap);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].message.contains('3'));
    }

    #[test]
    fn gender_mismatch_is_an_error_and_unknown_gender_is_not() {
        let mixed = group(
            1,
            vec![
                member(1, Some(12), Some("male")),
                member(2, Some(12), Some("Female")),
                member(3, Some(12), None),
            ],
        );
        let unknown = group(
            2,
            vec![member(4, Some(12), Some("male")), member(5, Some(12), None)],
        );
        let issues = validate_tenting_groups(&[mixed, unknown], &TentingPolicy::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].group_id, 1);
        assert_eq!(issues[0].issue_type, IssueType::GenderMismatch);
    }

    #[test]
    fn size_issues_are_warnings() {
        let groups = vec![
            group(1, vec![]),
            group(2, vec![member(1, Some(12), Some("male"))]),
            group(
                3,
                (10..15).map(|id| member(id, Some(12), Some("male"))).collect(),
            ),
        ];
        let issues = validate_tenting_groups(&groups, &TentingPolicy::default());
        assert_eq!(issues.len(), 3);
        assert!(issues
            .iter()
            .all(|i| i.issue_type == IssueType::GroupSize && i.severity == Severity::Warning));
    }

    #[test]
    fn missing_ages_are_tolerated() {
        let groups = vec![group(
            1,
            vec![member(1, None, None), member(2, Some(17), None)],
        )];
        assert!(validate_tenting_groups(&groups, &TentingPolicy::default()).is_empty());
    }

    #[test]
    fn issues_are_ordered_by_group_then_rule() {
        let groups = vec![
            group(1, vec![member(1, Some(12), Some("male"))]),
            group(
                2,
                vec![
                    member(2, Some(10), Some("male")),
                    member(3, Some(15), Some("female")),
                ],
            ),
        ];
        let issues = validate_tenting_groups(&groups, &TentingPolicy::default());
        let order: Vec<(DbId, IssueType)> =
            issues.iter().map(|i| (i.group_id, i.issue_type)).collect();
        assert_eq!(
            order,
            vec![
                (1, IssueType::GroupSize),
                (2, IssueType::AgeGap),
                (2, IssueType::GenderMismatch),
            ]
        );
        assert_eq!(
            issues,
            validate_tenting_groups(&groups, &TentingPolicy::default())
        );
    }

    // -- auto-assignment ----------------------------------------------------

    #[test]
    fn seven_boys_scenario() {
        let pool: Vec<Candidate> = [11, 11, 12, 13, 13, 14, 14]
            .iter()
            .enumerate()
            .map(|(i, &age)| scout(i as DbId + 1, age, "male", None))
            .collect();
        let params = TentingParams {
            tent_size_min: 2,
            tent_size_max: 3,
            keep_patrols_together: true,
            max_age_difference: 2,
        };

        let plan = plan_tenting(&pool, &params, &[]).unwrap();

        assert_covers_exactly_once(&plan, &[1, 2, 3, 4, 5, 6, 7]);
        for tent in resolve(&plan, &pool) {
            assert!((2..=3).contains(&tent.len()));
            let spread = age_spread(tent.iter().map(|c| c.age)).unwrap();
            assert!(spread <= 2, "spread {spread} too large");
        }
    }

    #[test]
    fn mixed_gender_pool_is_never_mixed() {
        let pool = vec![
            scout(1, 12, "male", None),
            scout(2, 12, "female", None),
            scout(3, 12, "male", None),
            scout(4, 12, "female", None),
        ];
        let plan = plan_tenting(&pool, &TentingParams::default(), &[]).unwrap();
        assert!(plan.len() >= 2);
        for tent in resolve(&plan, &pool) {
            let genders: HashSet<_> = tent.iter().map(|c| c.gender.clone()).collect();
            assert_eq!(genders.len(), 1);
        }
    }

    #[test]
    fn lone_girl_gets_her_own_tent_rather_than_joining_boys() {
        let pool = vec![
            scout(1, 12, "male", None),
            scout(2, 12, "male", None),
            scout(3, 12, "female", None),
        ];
        let plan = plan_tenting(&pool, &TentingParams::default(), &[]).unwrap();
        let tents = resolve(&plan, &pool);
        assert_eq!(tents.len(), 2);
        assert!(tents
            .iter()
            .any(|t| t.len() == 1 && t[0].gender.as_deref() == Some("female")));
    }

    #[test]
    fn unknown_gender_is_kept_apart() {
        let mut unknown = scout(3, 12, "male", None);
        unknown.gender = None;
        let pool = vec![scout(1, 12, "male", None), scout(2, 12, "male", None), unknown];
        let plan = plan_tenting(&pool, &TentingParams::default(), &[]).unwrap();
        let tents = resolve(&plan, &pool);
        let with_unknown = tents
            .iter()
            .find(|t| t.iter().any(|c| c.gender.is_none()))
            .unwrap();
        assert_eq!(with_unknown.len(), 1);
    }

    #[test]
    fn adults_are_excluded() {
        let mut adult = scout(3, 40, "male", None);
        adult.is_adult = true;
        let pool = vec![scout(1, 12, "male", None), scout(2, 12, "male", None), adult];
        let plan = plan_tenting(&pool, &TentingParams::default(), &[]).unwrap();
        assert_covers_exactly_once(&plan, &[1, 2]);
    }

    #[test]
    fn patrols_stay_together_when_they_divide_evenly() {
        let pool = vec![
            scout(1, 12, "male", Some("Eagles")),
            scout(2, 12, "male", Some("Hawks")),
            scout(3, 12, "male", Some("Eagles")),
            scout(4, 12, "male", Some("Hawks")),
        ];
        let plan = plan_tenting(&pool, &TentingParams::default(), &[]).unwrap();
        for tent in resolve(&plan, &pool) {
            let patrols: HashSet<_> = tent.iter().map(|c| c.patrol_name.clone()).collect();
            assert_eq!(patrols.len(), 1);
        }
    }

    #[test]
    fn patrol_overflow_merges_across_patrols() {
        let pool = vec![
            scout(1, 12, "male", Some("Eagles")),
            scout(2, 12, "male", Some("Hawks")),
        ];
        let plan = plan_tenting(&pool, &TentingParams::default(), &[]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].members.len(), 2);
    }

    #[test]
    fn outlier_age_is_still_assigned_and_flagged() {
        let pool = vec![
            scout(1, 11, "male", None),
            scout(2, 12, "male", None),
            scout(3, 12, "male", None),
            scout(4, 17, "male", None),
        ];
        let plan = plan_tenting(&pool, &TentingParams::default(), &[]).unwrap();
        assert_covers_exactly_once(&plan, &[1, 2, 3, 4]);

        let snapshots: Vec<GroupSnapshot> = resolve(&plan, &pool)
            .into_iter()
            .enumerate()
            .map(|(i, tent)| {
                group(
                    i as DbId + 1,
                    tent.iter()
                        .map(|c| member(c.participant_id, c.age, c.gender.as_deref()))
                        .collect(),
                )
            })
            .collect();
        let issues = validate_tenting_groups(&snapshots, &TentingPolicy::default());
        assert!(issues.iter().any(|i| i.issue_type == IssueType::AgeGap));
    }

    #[test]
    fn distant_ages_are_not_forced_into_shared_tents() {
        let pool = vec![
            scout(1, 8, "male", None),
            scout(2, 12, "male", None),
            scout(3, 16, "male", None),
            scout(4, 20, "male", None),
        ];
        let params = TentingParams::default();
        let plan = plan_tenting(&pool, &params, &[]).unwrap();
        assert_covers_exactly_once(&plan, &[1, 2, 3, 4]);

        for tent in resolve(&plan, &pool) {
            if tent.len() < 2 {
                continue;
            }
            let spread = age_spread(tent.iter().map(|c| c.age)).unwrap();
            assert!(
                spread <= params.max_age_difference,
                "tent {:?} spans {spread} years",
                tent.iter().map(|c| c.participant_id).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn names_continue_after_existing_tents() {
        let pool = vec![scout(1, 12, "male", None), scout(2, 12, "male", None)];
        let existing = vec!["Tent 1".to_string(), "Tent 2".to_string()];
        let plan = plan_tenting(&pool, &TentingParams::default(), &existing).unwrap();
        assert_eq!(plan[0].name, "Tent 3");
    }

    #[test]
    fn empty_pool_is_a_noop() {
        let plan = plan_tenting(&[], &TentingParams::default(), &[]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let params = TentingParams {
            tent_size_min: 4,
            tent_size_max: 2,
            ..TentingParams::default()
        };
        assert_matches!(
            plan_tenting(&[], &params, &[]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn planning_is_deterministic() {
        let pool: Vec<Candidate> = (1..=9)
            .map(|id| scout(id, 10 + (id as i32 % 5), "male", Some(["A", "B"][id as usize % 2])))
            .collect();
        let first = plan_tenting(&pool, &TentingParams::default(), &[]).unwrap();
        let mut reversed = pool.clone();
        reversed.reverse();
        let second = plan_tenting(&reversed, &TentingParams::default(), &[]).unwrap();
        assert_eq!(first, second);
    }
}
