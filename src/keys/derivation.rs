// Deterministic per-entity key derivation with membership authorization

use crate::core::errors::ServiceError;
use crate::core::models::{AuthContext, DerivedKey, GroupRecord};
use crate::core::secret::MasterSecret;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Which entity kind a key is derived for.
///
/// The prefix is part of the HMAC message, so a user and a group sharing an
/// id can never collide on the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    User,
    Group,
}

impl KeyScope {
    pub fn prefix(&self) -> &'static str {
        match self {
            KeyScope::User => "user",
            KeyScope::Group => "group",
        }
    }
}

/// Membership lookup against the external document store.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Fetch a group record by id. `Ok(None)` means the group does not exist.
    async fn fetch_group(&self, group_id: &str) -> Result<Option<GroupRecord>, ServiceError>;
}

/// Derives per-entity symmetric keys under the process master secret.
///
/// Stateless across calls: keys are recomputed on every request and never
/// stored. Group keys require the caller to be a member of the group.
pub struct KeyDerivationService {
    master: Option<MasterSecret>,
    groups: Arc<dyn GroupStore>,
}

impl KeyDerivationService {
    pub fn new(master: Option<MasterSecret>, groups: Arc<dyn GroupStore>) -> Self {
        Self { master, groups }
    }

    /// Derive the calling user's own key.
    ///
    /// The entity id is always the authenticated principal's id; callers
    /// cannot request another user's key.
    pub fn derive_user_key(&self, ctx: &AuthContext) -> Result<DerivedKey, ServiceError> {
        let principal = ctx.principal()?;
        let master = self.master()?;
        let key = derive(master, KeyScope::User, &principal.uid)?;
        info!(uid = %principal.uid, "Derived user key");
        Ok(key)
    }

    /// Derive a group's key for an authenticated member.
    pub async fn derive_group_key(
        &self,
        ctx: &AuthContext,
        group_id: &str,
    ) -> Result<DerivedKey, ServiceError> {
        let principal = ctx.principal()?;

        let group_id = group_id.trim();
        if group_id.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "groupId is required.".to_string(),
            ));
        }

        let record = self
            .groups
            .fetch_group(group_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Group not found.".to_string()))?;

        if !record.is_member(&principal.uid) {
            warn!(
                uid = %principal.uid,
                group_id = %group_id,
                "Group key refused: caller is not a member"
            );
            return Err(ServiceError::PermissionDenied(
                "Not a group member.".to_string(),
            ));
        }

        let master = self.master()?;
        let key = derive(master, KeyScope::Group, group_id)?;
        info!(uid = %principal.uid, group_id = %group_id, "Derived group key");
        Ok(key)
    }

    fn master(&self) -> Result<&MasterSecret, ServiceError> {
        self.master.as_ref().ok_or_else(|| {
            ServiceError::PreconditionFailed("Data encryption not configured.".to_string())
        })
    }
}

/// The KDF itself: `base64(HMAC-SHA256(master, "{prefix}:{id}"))`.
///
/// Bit-reproducible for identical `(prefix, id, master)` inputs; nothing is
/// cached, so the contract holds across process restarts.
pub fn derive(
    master: &MasterSecret,
    scope: KeyScope,
    id: &str,
) -> Result<DerivedKey, ServiceError> {
    let mut mac = HmacSha256::new_from_slice(master.key_bytes())
        .map_err(|e| ServiceError::Internal(format!("HMAC init failed: {}", e)))?;
    mac.update(scope.prefix().as_bytes());
    mac.update(b":");
    mac.update(id.as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(DerivedKey::new(STANDARD.encode(digest)))
}
