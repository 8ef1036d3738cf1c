//! Eating (grubmaster) groups: validator and auto-assignment heuristic.
//!
//! Eating groups take adults and scouts alike. Dietary cohesion drives the
//! partitioning because it governs shopping and cooking, patrol cohesion is
//! secondary, and volunteers for the grubmaster role are spread so that every
//! group gets one when the pool allows it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::naming::next_group_names;
use super::packing::{Packable, Packed, Packer};
use super::{
    dietary_signature, normalize_patrol, validate_size_bounds, Candidate, GroupKind,
    GroupSnapshot, GrubmasterReason, IssueType, PlannedGroup, PlannedMember, Severity,
    ValidationIssue,
};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_GROUP_SIZE_MIN: usize = 4;
pub const DEFAULT_GROUP_SIZE_MAX: usize = 6;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Tunables for [`plan_eating_groups`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrubmasterParams {
    pub group_size_min: usize,
    pub group_size_max: usize,
    pub group_by_dietary: bool,
    pub keep_patrols_together: bool,
}

impl Default for GrubmasterParams {
    fn default() -> Self {
        Self {
            group_size_min: DEFAULT_GROUP_SIZE_MIN,
            group_size_max: DEFAULT_GROUP_SIZE_MAX,
            group_by_dietary: true,
            keep_patrols_together: false,
        }
    }
}

impl GrubmasterParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_size_bounds(self.group_size_min, self.group_size_max, "Eating group")
    }
}

/// Policy checked by [`validate_eating_groups`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrubmasterPolicy {
    pub min_size: usize,
    pub max_size: usize,
    pub require_grubmaster: bool,
    pub flag_dietary_mix: bool,
}

impl Default for GrubmasterPolicy {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_GROUP_SIZE_MIN,
            max_size: DEFAULT_GROUP_SIZE_MAX,
            require_grubmaster: true,
            flag_dietary_mix: true,
        }
    }
}

impl GrubmasterPolicy {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_size_bounds(self.min_size, self.max_size, "Eating group")
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Check every eating group against the policy.
///
/// Rule order within a group: size, missing grubmaster, dietary mix. All
/// findings are warnings; nothing about an eating group is a hard violation.
pub fn validate_eating_groups(
    groups: &[GroupSnapshot],
    policy: &GrubmasterPolicy,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for group in groups {
        let count = group.member_count();
        if count < policy.min_size || count > policy.max_size {
            issues.push(ValidationIssue::new(
                group,
                IssueType::GroupSize,
                Severity::Warning,
                format!(
                    "Eating group has {count} member(s), expected {} to {}",
                    policy.min_size, policy.max_size
                ),
            ));
        }

        if policy.require_grubmaster && count > 0 && !group.members.iter().any(|m| m.is_grubmaster)
        {
            issues.push(ValidationIssue::new(
                group,
                IssueType::NoGrubmaster,
                Severity::Warning,
                "No grubmaster assigned".to_string(),
            ));
        }

        if policy.flag_dietary_mix {
            let signatures: BTreeSet<String> = group
                .members
                .iter()
                .map(|m| dietary_signature(&m.dietary_restrictions))
                .filter(|s| !s.is_empty())
                .collect();
            if signatures.len() > 1 {
                issues.push(ValidationIssue::new(
                    group,
                    IssueType::DietaryMix,
                    Severity::Warning,
                    format!(
                        "Group mixes dietary restrictions: {}",
                        signatures.into_iter().collect::<Vec<_>>().join(" | ")
                    ),
                ));
            }
        }
    }

    issues
}

// ---------------------------------------------------------------------------
// Auto-assignment
// ---------------------------------------------------------------------------

struct Eater<'a> {
    candidate: &'a Candidate,
    signature: String,
}

impl Eater<'_> {
    fn volunteers(&self) -> bool {
        self.candidate.grubmaster_interest
    }

    fn rank(&self) -> (u8, i64) {
        (
            GrubmasterReason::priority(self.candidate.grubmaster_reason),
            self.candidate.participant_id,
        )
    }
}

impl Packable for Eater<'_> {
    fn age(&self) -> Option<i32> {
        self.candidate.age
    }

    fn shares_affinity(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

/// Partition unassigned participants into new eating groups.
///
/// Candidates are bucketed by dietary signature (when `group_by_dietary`),
/// then by patrol within each diet (when `keep_patrols_together`). Each
/// level's leftovers are pooled with their siblings before anyone is forced
/// into an ill-fitting group. Finally, volunteers are swapped between groups
/// so that as many groups as possible contain one, and the best-ranked
/// volunteer in each group is created as its grubmaster.
pub fn plan_eating_groups(
    candidates: &[Candidate],
    params: &GrubmasterParams,
    existing_names: &[String],
) -> Result<Vec<PlannedGroup>, CoreError> {
    params.validate()?;

    let packer = Packer {
        min: params.group_size_min,
        max: params.group_size_max,
        max_spread: None,
    };

    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by_key(|c| c.participant_id);

    let mut by_diet: BTreeMap<String, Vec<Eater>> = BTreeMap::new();
    for candidate in sorted {
        let signature = if params.group_by_dietary {
            dietary_signature(&candidate.dietary_restrictions)
        } else {
            String::new()
        };
        by_diet.entry(signature.clone()).or_default().push(Eater {
            candidate,
            signature,
        });
    }

    let mut packed = Packed::default();
    for (_, diet) in by_diet {
        let buckets = if params.keep_patrols_together {
            let mut by_patrol: BTreeMap<Option<String>, Vec<Eater>> = BTreeMap::new();
            for eater in diet {
                by_patrol
                    .entry(normalize_patrol(eater.candidate.patrol_name.as_deref()))
                    .or_default()
                    .push(eater);
            }
            by_patrol.into_values().collect()
        } else {
            vec![diet]
        };
        packed.absorb(packer.pack_buckets(buckets));
    }
    let pool = std::mem::take(&mut packed.leftovers);
    packed.absorb(packer.pack(pool));

    let mut groups = packer.finish(packed);
    spread_volunteers(&mut groups);

    let names = next_group_names(existing_names, GroupKind::Eating.name_prefix(), groups.len());
    Ok(names
        .into_iter()
        .zip(groups)
        .map(|(name, group)| {
            let grubmaster = group
                .iter()
                .filter(|e| e.volunteers())
                .min_by_key(|e| e.rank())
                .map(|e| e.candidate.participant_id);
            PlannedGroup {
                name,
                members: group
                    .iter()
                    .map(|e| PlannedMember {
                        participant_id: e.candidate.participant_id,
                        is_grubmaster: Some(e.candidate.participant_id) == grubmaster,
                    })
                    .collect(),
            }
        })
        .collect())
}

/// Move volunteers from groups holding several into groups holding none.
///
/// Each move is a swap with a non-volunteer, preferring one on the same diet
/// as the volunteer, so group sizes never change. The donor keeps its
/// best-ranked volunteer.
fn spread_volunteers(groups: &mut [Vec<Eater>]) {
    for needy in 0..groups.len() {
        if groups[needy].is_empty() || groups[needy].iter().any(Eater::volunteers) {
            continue;
        }

        let donor = groups
            .iter()
            .position(|g| g.iter().filter(|e| e.volunteers()).count() >= 2);
        let Some(donor) = donor else {
            break;
        };

        let Some(give) = groups[donor]
            .iter()
            .enumerate()
            .filter(|(_, e)| e.volunteers())
            .max_by_key(|(_, e)| e.rank())
            .map(|(idx, _)| idx)
        else {
            continue;
        };

        let signature = groups[donor][give].signature.clone();
        let take = groups[needy]
            .iter()
            .position(|e| e.signature == signature)
            .unwrap_or(0);

        let volunteer = groups[donor].swap_remove(give);
        let replacement = groups[needy].swap_remove(take);
        groups[needy].push(volunteer);
        groups[donor].push(replacement);
    }
}
