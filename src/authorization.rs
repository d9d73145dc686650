//! Who may do what to which row.
//!
//! Every decision is a pure function of the acting [`Subject`] and the
//! ownership/visibility fields of the target. Rows a subject cannot see
//! yield [`Decision::NotFound`] so that their existence is not revealed;
//! visible rows the subject may not change yield [`Decision::Forbidden`].

use crate::error::{AppError, AppResult};
use crate::playlist::PlaylistScope;
use crate::user::{Permission, User, UserRole};

/// The authenticated identity an operation runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub user_id: i64,
    pub role: UserRole,
}

impl Subject {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    fn can(&self, permission: Permission) -> bool {
        self.role.has(permission)
    }
}

impl From<&User> for Subject {
    fn from(user: &User) -> Self {
        Subject::new(user.id, user.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Forbidden,
    NotFound,
}

impl Decision {
    pub fn into_result(self, not_found: &str, forbidden: &str) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Forbidden => Err(AppError::forbidden(forbidden)),
            Decision::NotFound => Err(AppError::not_found(not_found)),
        }
    }
}

fn allow_if(condition: bool, otherwise: Decision) -> Decision {
    if condition {
        Decision::Allow
    } else {
        otherwise
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongAction {
    Read,
    Create,
    Update,
    Delete,
}

pub fn song(subject: &Subject, action: SongAction) -> Decision {
    match action {
        SongAction::Read => allow_if(subject.can(Permission::AccessCatalog), Decision::Forbidden),
        SongAction::Create | SongAction::Update | SongAction::Delete => {
            allow_if(subject.can(Permission::EditCatalog), Decision::Forbidden)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistAction {
    Read,
    Update,
    Delete,
    AddSong,
    RemoveSong,
}

/// Ownership and visibility of a playlist row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistTarget {
    pub created_by: i64,
    pub is_public: bool,
}

pub fn playlist(subject: &Subject, action: PlaylistAction, target: PlaylistTarget) -> Decision {
    let is_owner = target.created_by == subject.user_id;
    let manages_all = subject.can(Permission::ManageAllPlaylists);
    if !(target.is_public || is_owner || manages_all) {
        return Decision::NotFound;
    }
    match action {
        PlaylistAction::Read => Decision::Allow,
        PlaylistAction::Update
        | PlaylistAction::Delete
        | PlaylistAction::AddSong
        | PlaylistAction::RemoveSong => allow_if(is_owner || manages_all, Decision::Forbidden),
    }
}

/// Which playlists a listing by `subject` may contain.
pub fn playlist_scope(subject: &Subject) -> PlaylistScope {
    if subject.can(Permission::ManageAllPlaylists) {
        PlaylistScope::All
    } else {
        PlaylistScope::VisibleTo(subject.user_id)
    }
}

/// The visibility a playlist owned by `owner_role` actually gets. Owners
/// that cannot keep private playlists always publish.
pub fn effective_playlist_visibility(owner_role: UserRole, requested_public: bool) -> bool {
    requested_public || !owner_role.has(Permission::OwnPrivatePlaylists)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayLogAction {
    /// Log a play attributed to `on_behalf_of`.
    Create { on_behalf_of: i64 },
    /// Read an entry owned by `owner`.
    Read { owner: i64 },
    ReadGlobalStats,
}

pub fn play_log(subject: &Subject, action: PlayLogAction) -> Decision {
    match action {
        PlayLogAction::Create { on_behalf_of } => allow_if(
            subject.can(Permission::LogPlays) && on_behalf_of == subject.user_id,
            Decision::Forbidden,
        ),
        PlayLogAction::Read { owner } => allow_if(
            owner == subject.user_id || subject.can(Permission::ViewAllPlayLogs),
            Decision::NotFound,
        ),
        PlayLogAction::ReadGlobalStats => {
            allow_if(subject.can(Permission::ViewAllPlayLogs), Decision::Forbidden)
        }
    }
}

/// Listing filter for play logs: `None` means every user's entries.
pub fn play_log_owner_filter(subject: &Subject) -> Option<i64> {
    if subject.can(Permission::ViewAllPlayLogs) {
        None
    } else {
        Some(subject.user_id)
    }
}

/// The landing page rollups are open to anyone who may browse the catalog.
/// Playlist rows inside them are narrowed with [`playlist_scope`].
pub fn dashboard(subject: &Subject) -> Decision {
    allow_if(subject.can(Permission::AccessCatalog), Decision::Forbidden)
}

/// Notifications are private to their recipient, admins included.
pub fn notification(subject: &Subject, recipient: i64) -> Decision {
    allow_if(recipient == subject.user_id, Decision::NotFound)
}
