//! Permission resolver: folds direct and group grants into a summary.
//!
//! - No IO
//! - No panics
//! - Grants only ever add; nothing removes an entry placed by another grant

use std::collections::{BTreeSet, HashMap};

use newsroom_core::{GroupId, UserId};

use crate::authorize::AuthzError;
use crate::grant::{AccessKind, Grant, GroupGrants, Subject, Target};
use crate::summary::{OriginAccess, UserPermissionSummary};

/// Resolve a user's permission summary from already-fetched inputs.
///
/// `memberships` lists the user's groups; every one of them must have an entry
/// in `grants_by_group` (an empty slice when the group has no grants). A
/// missing entry means the group could not be resolved and fails with
/// [`AuthzError::UnknownSubject`].
///
/// The output is not normalised; run it through
/// [`normalize`](crate::normalize::normalize) before answering questions.
pub fn resolve(
    user_id: UserId,
    direct_grants: &[Grant],
    memberships: &[GroupId],
    grants_by_group: &HashMap<GroupId, GroupGrants>,
) -> Result<UserPermissionSummary, AuthzError> {
    let mut user = OriginAccess::default();
    let mut group = OriginAccess::default();
    let mut memberships_seen = BTreeSet::new();
    let mut group_provenance = BTreeSet::new();

    fold_grants(&mut user, None, Subject::User(user_id), direct_grants);

    for group_id in memberships {
        let grants = grants_by_group
            .get(group_id)
            .ok_or(AuthzError::UnknownSubject(Subject::Group(*group_id)))?;
        fold_grants(
            &mut group,
            Some(&mut group_provenance),
            Subject::Group(*group_id),
            grants,
        );
        memberships_seen.insert(*group_id);
    }

    tracing::debug!(
        user_id = %user_id,
        groups = memberships_seen.len(),
        user_read_stages = user.read_stages.len(),
        user_write_stages = user.write_stages.len(),
        group_read_stages = group.read_stages.len(),
        group_write_stages = group.write_stages.len(),
        "resolved permission summary"
    );

    Ok(UserPermissionSummary {
        user_id,
        user,
        group,
        memberships: memberships_seen,
        group_provenance,
    })
}

fn fold_grants(
    sets: &mut OriginAccess,
    mut provenance: Option<&mut BTreeSet<Grant>>,
    expected: Subject,
    grants: &[Grant],
) {
    for grant in grants {
        if grant.subject != expected {
            tracing::warn!(
                expected = %expected,
                actual = %grant.subject,
                target = %grant.target,
                "skipping grant supplied for a different subject"
            );
            continue;
        }
        add_grant(sets, grant.target, grant.access);
        if let Some(provenance) = provenance.as_deref_mut() {
            provenance.insert(*grant);
        }
    }
}

fn add_grant(sets: &mut OriginAccess, target: Target, access: AccessKind) {
    match (target, access) {
        (Target::Workflow(id), AccessKind::Read) => {
            sets.read_workflows.insert(id);
        }
        (Target::Workflow(id), AccessKind::Write) => {
            sets.write_workflows.insert(id);
        }
        (Target::Stage(id), AccessKind::Read) => {
            sets.read_stages.insert(id);
        }
        (Target::Stage(id), AccessKind::Write) => {
            sets.write_stages.insert(id);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
