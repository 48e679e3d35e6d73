//! Permission service: the entry point request handlers call.
//!
//! Fetches one user's grant data from a [`GrantStore`], resolves and
//! normalises it, and optionally caches the result. Store failures are
//! returned as-is; nothing here retries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use newsroom_auth::{
    AccessKind, AuthzError, GroupGrants, Subject, Target, UserPermissionSummary, authorize,
    normalize, require_write, resolve,
};
use newsroom_core::UserId;

use crate::cache::SummaryCache;
use crate::config::PermissionConfig;
use crate::grant_store::{GrantStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for PermissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownUser(id) => Self::Authz(AuthzError::UnknownSubject(Subject::User(id))),
            StoreError::UnknownGroup(id) => Self::Authz(AuthzError::UnknownSubject(Subject::Group(id))),
            other => Self::Store(other),
        }
    }
}

pub struct PermissionService<S> {
    store: S,
    cache: Option<SummaryCache>,
}

impl<S> PermissionService<S>
where
    S: GrantStore,
{
    /// Service that resolves fresh on every call.
    pub fn new(store: S) -> Self {
        Self { store, cache: None }
    }

    pub fn with_cache(store: S, cache: SummaryCache) -> Self {
        Self {
            store,
            cache: Some(cache),
        }
    }

    pub fn from_config(store: S, config: &PermissionConfig) -> Self {
        if config.cache.enabled {
            Self::with_cache(store, SummaryCache::from_secs(config.cache.ttl_secs))
        } else {
            Self::new(store)
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve and normalise the summary for `user_id`.
    ///
    /// Fails with [`AuthzError::UnknownSubject`] when the user, or one of
    /// their groups, is unknown to the store.
    pub fn get_user_permission_summary(
        &self,
        user_id: UserId,
    ) -> Result<Arc<UserPermissionSummary>, PermissionError> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(self.load(user_id)?));
        };

        // Read the version before loading: a concurrent change then at worst
        // stores a newer summary under an older key, which only costs a miss.
        let version = self.store.version()?;
        if let Some(summary) = cache.get(user_id, version, Utc::now()) {
            tracing::debug!(user_id = %user_id, version, "permission summary cache hit");
            return Ok(summary);
        }

        let summary = Arc::new(self.load(user_id)?);
        cache.insert(version, Arc::clone(&summary), Utc::now());
        Ok(summary)
    }

    pub fn authorize(
        &self,
        user_id: UserId,
        access: AccessKind,
        target: Target,
    ) -> Result<bool, PermissionError> {
        let summary = self.get_user_permission_summary(user_id)?;
        Ok(authorize(&summary, access, target))
    }

    pub fn require_write(&self, user_id: UserId, target: Target) -> Result<(), PermissionError> {
        let summary = self.get_user_permission_summary(user_id)?;
        require_write(&summary, target).map_err(|err| {
            tracing::info!(user_id = %user_id, target = %target, "write denied");
            PermissionError::from(err)
        })
    }

    pub fn invalidate_user(&self, user_id: UserId) {
        if let Some(cache) = &self.cache {
            cache.invalidate_user(user_id);
        }
    }

    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    fn load(&self, user_id: UserId) -> Result<UserPermissionSummary, PermissionError> {
        let direct = self.store.get_direct_grants(user_id)?;
        let memberships = self.store.get_groups_for_user(user_id)?;

        let mut grants_by_group: HashMap<_, GroupGrants> = HashMap::with_capacity(memberships.len());
        for group_id in &memberships {
            grants_by_group.insert(*group_id, self.store.get_grants_for_group(*group_id)?);
        }

        let index = self.store.get_stage_parent_index()?;
        let summary = resolve(user_id, &direct, &memberships, &grants_by_group)?;
        Ok(normalize(summary, &index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant_store::InMemoryGrantStore;
    use newsroom_auth::Grant;
    use newsroom_core::{GroupId, WorkflowId};
    use newsroom_workflows::Workflow;

    /// Store whose backend is down.
    struct DownStore;

    impl GrantStore for DownStore {
        fn get_direct_grants(&self, _: UserId) -> Result<Vec<Grant>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn get_groups_for_user(&self, _: UserId) -> Result<Vec<GroupId>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn get_grants_for_group(&self, _: GroupId) -> Result<GroupGrants, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn get_stage_parent_index(&self) -> Result<newsroom_auth::StageParentIndex, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn version(&self) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    /// Store whose membership list names a group it no longer has.
    struct DanglingMembershipStore {
        group_id: GroupId,
    }

    impl GrantStore for DanglingMembershipStore {
        fn get_direct_grants(&self, _: UserId) -> Result<Vec<Grant>, StoreError> {
            Ok(Vec::new())
        }

        fn get_groups_for_user(&self, _: UserId) -> Result<Vec<GroupId>, StoreError> {
            Ok(vec![self.group_id])
        }

        fn get_grants_for_group(&self, group_id: GroupId) -> Result<GroupGrants, StoreError> {
            Err(StoreError::UnknownGroup(group_id))
        }

        fn get_stage_parent_index(&self) -> Result<newsroom_auth::StageParentIndex, StoreError> {
            Ok(newsroom_auth::StageParentIndex::new())
        }

        fn version(&self) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    #[test]
    fn store_failures_pass_through_unchanged() {
        let service = PermissionService::new(DownStore);
        let err = service.get_user_permission_summary(UserId::new()).unwrap_err();
        assert_eq!(
            err,
            PermissionError::Store(StoreError::Unavailable("connection refused".to_string()))
        );
        assert_eq!(err.to_string(), "grant store unavailable: connection refused");
    }

    #[test]
    fn unknown_user_maps_to_unknown_subject() {
        let service = PermissionService::new(InMemoryGrantStore::new());
        let user_id = UserId::new();

        let err = service.get_user_permission_summary(user_id).unwrap_err();
        assert_eq!(
            err,
            PermissionError::Authz(AuthzError::UnknownSubject(Subject::User(user_id)))
        );
    }

    #[test]
    fn unknown_group_maps_to_unknown_subject() {
        let group_id = GroupId::new();
        let service = PermissionService::new(DanglingMembershipStore { group_id });

        let err = service.get_user_permission_summary(UserId::new()).unwrap_err();
        assert_eq!(
            err,
            PermissionError::Authz(AuthzError::UnknownSubject(Subject::Group(group_id)))
        );
        assert_eq!(err.to_string(), format!("unknown subject: group {group_id}"));
    }

    #[test]
    fn cached_summary_is_reused_until_grants_change() {
        let store = Arc::new(InMemoryGrantStore::new());
        let service = PermissionService::with_cache(Arc::clone(&store), SummaryCache::from_secs(300));
        let user_id = UserId::new();
        let wf = WorkflowId::new();
        store.add_user(user_id).unwrap();
        store.add_workflow(Workflow::new(wf, "News").unwrap()).unwrap();

        let first = service.get_user_permission_summary(user_id).unwrap();
        let second = service.get_user_permission_summary(user_id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        store
            .grant(Grant::user(user_id, Target::Workflow(wf), AccessKind::Read))
            .unwrap();
        let third = service.get_user_permission_summary(user_id).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert!(service.authorize(user_id, AccessKind::Read, Target::Workflow(wf)).unwrap());
    }

    #[test]
    fn config_decides_caching() {
        let mut config = PermissionConfig::default();
        assert!(PermissionService::from_config(InMemoryGrantStore::new(), &config).cache.is_none());

        config.cache.enabled = true;
        assert!(PermissionService::from_config(InMemoryGrantStore::new(), &config).cache.is_some());
    }
}
