//! Repository for tenting and eating groups and their memberships.
//!
//! Both kinds live in parallel tables (`tenting_groups` /
//! `tenting_group_members` and `eating_groups` / `eating_group_members`).
//! Every method takes the [`GroupKind`] to operate on and resolves the table
//! names from it, so the SQL is written once.

use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};
use trailhead_core::error::CoreError;
use trailhead_core::grouping::{Candidate, GroupKind, PlannedGroup};
use trailhead_core::types::DbId;

use crate::models::group::{
    CreateGroup, Group, GroupMember, GroupWithMembers, GroupingParticipant, UpdateGroup,
};

/// Column list for group queries.
const COLUMNS: &str = "id, outing_id, name, notes, created_at, updated_at";

/// Participant columns shared by the member and grouping-participant queries.
const PARTICIPANT_COLUMNS: &str =
    "p.name, p.age, p.gender, p.patrol_name, p.troop_number, p.is_adult, p.dietary_restrictions";

/// Advisory lock namespaces for auto-assignment, one per group kind. The
/// second lock key is the outing.
pub const TENTING_ASSIGN_LOCK_NAMESPACE: i32 = 7_301;
pub const EATING_ASSIGN_LOCK_NAMESPACE: i32 = 7_302;

/// Table names and kind-specific fragments.
struct Tables {
    groups: &'static str,
    members: &'static str,
    group_fk: &'static str,
    /// Expression selecting `is_grubmaster` from the members alias `m`.
    grubmaster_expr: &'static str,
    lock_namespace: i32,
}

fn tables(kind: GroupKind) -> Tables {
    match kind {
        GroupKind::Tenting => Tables {
            groups: "tenting_groups",
            members: "tenting_group_members",
            group_fk: "tenting_group_id",
            grubmaster_expr: "NULL::boolean",
            lock_namespace: TENTING_ASSIGN_LOCK_NAMESPACE,
        },
        GroupKind::Eating => Tables {
            groups: "eating_groups",
            members: "eating_group_members",
            group_fk: "eating_group_id",
            grubmaster_expr: "m.is_grubmaster",
            lock_namespace: EATING_ASSIGN_LOCK_NAMESPACE,
        },
    }
}

/// Failure of [`GroupRepo::auto_assign`].
#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// The planner rejected its parameters, or the snapshot went stale
    /// before commit.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Provides group CRUD, membership changes and auto-assignment for both
/// group kinds.
pub struct GroupRepo;

impl GroupRepo {
    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// List the groups of an outing, ordered by creation.
    pub async fn list(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
    ) -> Result<Vec<Group>, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "SELECT {COLUMNS} FROM {groups} WHERE outing_id = $1 ORDER BY id",
            groups = t.groups
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(outing_id)
            .fetch_all(pool)
            .await
    }

    /// List the groups of an outing with their members.
    pub async fn list_with_members(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
    ) -> Result<Vec<GroupWithMembers>, sqlx::Error> {
        let groups = Self::list(pool, kind, outing_id).await?;
        Self::attach_members(pool, kind, groups).await
    }

    /// Find a group by ID within an outing.
    pub async fn find(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
        id: DbId,
    ) -> Result<Option<Group>, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "SELECT {COLUMNS} FROM {groups} WHERE id = $1 AND outing_id = $2",
            groups = t.groups
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .bind(outing_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a group by ID within an outing, enriched with its members.
    pub async fn find_with_members(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
        id: DbId,
    ) -> Result<Option<GroupWithMembers>, sqlx::Error> {
        match Self::find(pool, kind, outing_id, id).await? {
            Some(group) => {
                let mut found = Self::attach_members(pool, kind, vec![group]).await?;
                Ok(found.pop())
            }
            None => Ok(None),
        }
    }

    /// Names of every group of this kind in the outing.
    pub async fn group_names<'e, E>(
        executor: E,
        kind: GroupKind,
        outing_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let t = tables(kind);
        let query = format!(
            "SELECT name FROM {groups} WHERE outing_id = $1 ORDER BY id",
            groups = t.groups
        );
        sqlx::query_scalar::<_, String>(&query)
            .bind(outing_id)
            .fetch_all(executor)
            .await
    }

    /// Create a group, inserting any seed members in the same transaction.
    ///
    /// `input.name` is stored as given; callers normalise it first.
    pub async fn create(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
        input: &CreateGroup,
    ) -> Result<Group, sqlx::Error> {
        let t = tables(kind);
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO {groups} (outing_id, name, notes) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}",
            groups = t.groups
        );
        let group = sqlx::query_as::<_, Group>(&insert_query)
            .bind(outing_id)
            .bind(&input.name)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let member_query = format!(
            "INSERT INTO {members} ({fk}, participant_id) VALUES ($1, $2)",
            members = t.members,
            fk = t.group_fk
        );
        for &participant_id in &input.member_ids {
            sqlx::query(&member_query)
                .bind(group.id)
                .bind(participant_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(group)
    }

    /// Rename a group or change its notes. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
        id: DbId,
        input: &UpdateGroup,
    ) -> Result<Option<Group>, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "UPDATE {groups} SET
                name = COALESCE($3, name),
                notes = COALESCE($4, notes)
             WHERE id = $1 AND outing_id = $2
             RETURNING {COLUMNS}",
            groups = t.groups
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .bind(outing_id)
            .bind(&input.name)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a group. Its member rows cascade, returning those participants
    /// to the unassigned pool. Returns `true` if a row was deleted.
    pub async fn delete(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "DELETE FROM {groups} WHERE id = $1 AND outing_id = $2",
            groups = t.groups
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(outing_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Add a participant to a group.
    ///
    /// Fails with the `uq_*_participant` unique violation if the participant
    /// is already in a group of this kind. `is_grubmaster` is ignored for
    /// tenting groups.
    pub async fn add_member(
        pool: &PgPool,
        kind: GroupKind,
        group_id: DbId,
        participant_id: DbId,
        is_grubmaster: bool,
    ) -> Result<(), sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert_member(&mut *conn, kind, group_id, participant_id, is_grubmaster).await?;
        Ok(())
    }

    /// Remove a participant from a group. Returns `true` if they were in it.
    pub async fn remove_member(
        pool: &PgPool,
        kind: GroupKind,
        group_id: DbId,
        participant_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "DELETE FROM {members} WHERE {fk} = $1 AND participant_id = $2",
            members = t.members,
            fk = t.group_fk
        );
        let result = sqlx::query(&query)
            .bind(group_id)
            .bind(participant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a participant to `target`, or out of every group of this kind
    /// when `target` is `None`.
    ///
    /// Returns `false` without touching anything when the participant is
    /// already where they are being moved to, so repeating a move is a no-op.
    /// Moving into an eating group clears the grubmaster flag.
    pub async fn move_participant(
        pool: &PgPool,
        kind: GroupKind,
        participant_id: DbId,
        target: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let t = tables(kind);
        let mut tx = pool.begin().await?;

        let current_query = format!(
            "SELECT {fk} FROM {members} WHERE participant_id = $1 FOR UPDATE",
            members = t.members,
            fk = t.group_fk
        );
        let current = sqlx::query_scalar::<_, DbId>(&current_query)
            .bind(participant_id)
            .fetch_optional(&mut *tx)
            .await?;

        if current == target {
            tx.commit().await?;
            return Ok(false);
        }

        if current.is_some() {
            let delete_query = format!(
                "DELETE FROM {members} WHERE participant_id = $1",
                members = t.members
            );
            sqlx::query(&delete_query)
                .bind(participant_id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(group_id) = target {
            Self::insert_member(&mut *tx, kind, group_id, participant_id, false).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Flip the grubmaster flag on an eating-group membership.
    ///
    /// Returns the new value, or `None` if the participant is not a member of
    /// the group.
    pub async fn toggle_grubmaster(
        pool: &PgPool,
        group_id: DbId,
        participant_id: DbId,
    ) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE eating_group_members SET is_grubmaster = NOT is_grubmaster \
             WHERE eating_group_id = $1 AND participant_id = $2 \
             RETURNING is_grubmaster",
        )
        .bind(group_id)
        .bind(participant_id)
        .fetch_optional(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Participants as seen by grouping
    // -----------------------------------------------------------------------

    /// Every participant of the outing with their current group of this kind.
    pub async fn list_participants<'e, E>(
        executor: E,
        kind: GroupKind,
        outing_id: DbId,
    ) -> Result<Vec<GroupingParticipant>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let t = tables(kind);
        let query = format!(
            "SELECT p.id, {PARTICIPANT_COLUMNS}, p.allergies, p.grubmaster_interest, \
                    p.grubmaster_reason, m.{fk} AS group_id \
             FROM participants p \
             LEFT JOIN {members} m ON m.participant_id = p.id \
             WHERE p.outing_id = $1 \
             ORDER BY p.name, p.id",
            members = t.members,
            fk = t.group_fk
        );
        sqlx::query_as::<_, GroupingParticipant>(&query)
            .bind(outing_id)
            .fetch_all(executor)
            .await
    }

    /// One participant of the outing with their current group of this kind.
    pub async fn find_participant(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
        participant_id: DbId,
    ) -> Result<Option<GroupingParticipant>, sqlx::Error> {
        let t = tables(kind);
        let query = format!(
            "SELECT p.id, {PARTICIPANT_COLUMNS}, p.allergies, p.grubmaster_interest, \
                    p.grubmaster_reason, m.{fk} AS group_id \
             FROM participants p \
             LEFT JOIN {members} m ON m.participant_id = p.id \
             WHERE p.id = $1 AND p.outing_id = $2",
            members = t.members,
            fk = t.group_fk
        );
        sqlx::query_as::<_, GroupingParticipant>(&query)
            .bind(participant_id)
            .bind(outing_id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Auto-assignment
    // -----------------------------------------------------------------------

    /// Group every unassigned participant of the outing using `plan`.
    ///
    /// Runs in one transaction under a per-outing advisory lock, so two
    /// concurrent calls for the same outing and kind run one after the other
    /// and the second sees the first one's groups. The unassigned snapshot is
    /// read under the lock; each membership insert skips a participant who
    /// was grouped in the meantime, and if any planned participant is
    /// skipped the whole transaction rolls back with a conflict.
    ///
    /// Returns the newly created groups with their members.
    pub async fn auto_assign<F>(
        pool: &PgPool,
        kind: GroupKind,
        outing_id: DbId,
        plan: F,
    ) -> Result<Vec<GroupWithMembers>, AssignError>
    where
        F: FnOnce(&[Candidate], &[String]) -> Result<Vec<PlannedGroup>, CoreError>,
    {
        let t = tables(kind);
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, ($2 % 2147483647)::int4)")
            .bind(t.lock_namespace)
            .bind(outing_id)
            .execute(&mut *tx)
            .await?;

        let candidates: Vec<Candidate> = Self::list_participants(&mut *tx, kind, outing_id)
            .await?
            .iter()
            .filter(|p| p.is_unassigned())
            .map(GroupingParticipant::to_candidate)
            .collect();
        let existing_names = Self::group_names(&mut *tx, kind, outing_id).await?;

        let planned = plan(&candidates, &existing_names)?;
        if planned.is_empty() {
            tx.commit().await?;
            return Ok(Vec::new());
        }

        let insert_group = format!(
            "INSERT INTO {groups} (outing_id, name) VALUES ($1, $2) RETURNING {COLUMNS}",
            groups = t.groups
        );
        let mut expected = 0usize;
        let mut inserted = 0u64;
        let mut created = Vec::with_capacity(planned.len());
        for group in &planned {
            let row = sqlx::query_as::<_, Group>(&insert_group)
                .bind(outing_id)
                .bind(&group.name)
                .fetch_one(&mut *tx)
                .await?;

            for member in &group.members {
                expected += 1;
                inserted += Self::insert_member_if_unassigned(
                    &mut *tx,
                    kind,
                    row.id,
                    member.participant_id,
                    member.is_grubmaster,
                )
                .await?;
            }
            created.push(row);
        }

        if inserted != expected as u64 {
            tx.rollback().await?;
            tracing::warn!(
                outing_id,
                kind = kind.label(),
                expected,
                inserted,
                "Auto-assign snapshot went stale, rolled back"
            );
            return Err(CoreError::Conflict(format!(
                "{} participant(s) were assigned to a {} group by another request; \
                 run auto-assign again",
                expected as u64 - inserted,
                kind.label()
            ))
            .into());
        }

        tx.commit().await?;
        Ok(Self::attach_members(pool, kind, created).await?)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn insert_member<'e, E>(
        executor: E,
        kind: GroupKind,
        group_id: DbId,
        participant_id: DbId,
        is_grubmaster: bool,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = match kind {
            GroupKind::Tenting => sqlx::query(
                "INSERT INTO tenting_group_members (tenting_group_id, participant_id) \
                 VALUES ($1, $2)",
            )
            .bind(group_id)
            .bind(participant_id),
            GroupKind::Eating => sqlx::query(
                "INSERT INTO eating_group_members (eating_group_id, participant_id, is_grubmaster) \
                 VALUES ($1, $2, $3)",
            )
            .bind(group_id)
            .bind(participant_id)
            .bind(is_grubmaster),
        };
        query.execute(executor).await?;
        Ok(())
    }

    /// Insert a membership unless the participant already has one of this
    /// kind. Returns the number of rows inserted (0 or 1).
    async fn insert_member_if_unassigned<'e, E>(
        executor: E,
        kind: GroupKind,
        group_id: DbId,
        participant_id: DbId,
        is_grubmaster: bool,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = match kind {
            GroupKind::Tenting => sqlx::query(
                "INSERT INTO tenting_group_members (tenting_group_id, participant_id) \
                 VALUES ($1, $2) \
                 ON CONFLICT (participant_id) DO NOTHING",
            )
            .bind(group_id)
            .bind(participant_id),
            GroupKind::Eating => sqlx::query(
                "INSERT INTO eating_group_members (eating_group_id, participant_id, is_grubmaster) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (participant_id) DO NOTHING",
            )
            .bind(group_id)
            .bind(participant_id)
            .bind(is_grubmaster),
        };
        let result = query.execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Load members for `groups` in one query and pair them up.
    async fn attach_members(
        pool: &PgPool,
        kind: GroupKind,
        groups: Vec<Group>,
    ) -> Result<Vec<GroupWithMembers>, sqlx::Error> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        let t = tables(kind);
        let ids: Vec<DbId> = groups.iter().map(|g| g.id).collect();
        let query = format!(
            "SELECT m.id, m.{fk} AS group_id, m.participant_id, {PARTICIPANT_COLUMNS}, \
                    {grubmaster} AS is_grubmaster \
             FROM {members} m \
             JOIN participants p ON p.id = m.participant_id \
             WHERE m.{fk} = ANY($1) \
             ORDER BY m.id",
            fk = t.group_fk,
            grubmaster = t.grubmaster_expr,
            members = t.members
        );
        let rows = sqlx::query_as::<_, GroupMember>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut by_group: HashMap<DbId, Vec<GroupMember>> = HashMap::new();
        for member in rows {
            by_group.entry(member.group_id).or_default().push(member);
        }

        Ok(groups
            .into_iter()
            .map(|group| {
                let members = by_group.remove(&group.id).unwrap_or_default();
                GroupWithMembers::new(group, members)
            })
            .collect())
    }
}
