//! Authorization policy: who may perform which action against which account.
//!
//! A pure function of the actor, the action, and the target account id. No
//! store access happens here; the caller supplies the actor's manager flag
//! from the session and the target id from the route. Media ownership
//! mismatches are not this module's concern: handlers report those as
//! not-found so existence is never leaked.

/// The requesting party, as established by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Account { id: i32, is_manager: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewDirectory,
    ViewPerformer,
    ViewOwnProfile,
    EditOwnProfile,
    DeleteOwnProfile,
    UploadOwnMedia,
    DeleteOwnMediaItem,
    ManagerEditAnyProfile,
    ManagerDeleteAnyAccount,
    ManagerToggleManagerFlag,
    ManagerDeleteAnyMediaItem,
}

impl Action {
    /// Public reads require no session at all.
    const fn is_public(self) -> bool {
        matches!(self, Self::ViewDirectory | Self::ViewPerformer)
    }

    const fn is_manager_only(self) -> bool {
        matches!(
            self,
            Self::ManagerEditAnyProfile
                | Self::ManagerDeleteAnyAccount
                | Self::ManagerToggleManagerFlag
                | Self::ManagerDeleteAnyMediaItem
        )
    }
}

/// Decide whether `actor` may perform `action` against `target` (an account
/// id, where the action has one).
///
/// Managers pass every check, including toggling their own manager flag;
/// there is no last-manager floor.
#[must_use]
pub fn can_act(actor: Actor, action: Action, target: Option<i32>) -> bool {
    match actor {
        Actor::Anonymous => action.is_public(),
        Actor::Account {
            is_manager: true, ..
        } => true,
        Actor::Account { id, .. } => {
            if action.is_public() {
                return true;
            }
            if action.is_manager_only() {
                return false;
            }
            // Remaining actions are all own-resource: the target must be the
            // actor themselves.
            target == Some(id)
        }
    }
}
