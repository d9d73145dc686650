use super::models::{
    AddSongOutcome, NewPlaylist, Playlist, PlaylistQuery, PlaylistSongEntry, PlaylistUpdate,
};
use crate::authorization::{self, PlaylistAction, PlaylistTarget, Subject};
use crate::error::{AppError, AppResult};
use crate::store::{FullStore, PageRequest, Paged};
use crate::tasks::{TaskIntent, TaskQueue};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

const NOT_FOUND: &str = "Playlist not found";
const NOT_OWNER: &str = "You do not have permission to modify this playlist";

#[derive(Debug, Clone, Default)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// A playlist with its songs.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub songs: Vec<PlaylistSongEntry>,
}

fn check_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_field("name", "This field may not be blank."));
    }
    Ok(name.to_string())
}

pub struct PlaylistManager {
    store: Arc<dyn FullStore>,
    tasks: TaskQueue,
}

impl PlaylistManager {
    pub fn new(store: Arc<dyn FullStore>, tasks: TaskQueue) -> Self {
        Self { store, tasks }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Loads the playlist and checks `action` against it. Invisible
    /// playlists are reported as missing.
    fn load_for(&self, subject: &Subject, playlist_id: i64, action: PlaylistAction) -> AppResult<Playlist> {
        let playlist = self
            .store
            .get_playlist(playlist_id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        let target = PlaylistTarget {
            created_by: playlist.created_by,
            is_public: playlist.is_public,
        };
        authorization::playlist(subject, action, target).into_result(NOT_FOUND, NOT_OWNER)?;
        Ok(playlist)
    }

    pub fn create(&self, subject: &Subject, draft: PlaylistDraft) -> AppResult<Playlist> {
        let name = check_name(&draft.name)?;
        let is_public = authorization::effective_playlist_visibility(
            subject.role,
            draft.is_public.unwrap_or(false),
        );
        let id = self.store.create_playlist(
            &NewPlaylist {
                name,
                description: draft.description,
                created_by: subject.user_id,
                is_public,
            },
            Self::now(),
        )?;
        info!("User {} created playlist {}", subject.user_id, id);
        self.store
            .get_playlist(id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    pub fn get(&self, subject: &Subject, playlist_id: i64) -> AppResult<PlaylistDetail> {
        let playlist = self.load_for(subject, playlist_id, PlaylistAction::Read)?;
        let songs = self.store.get_playlist_songs(playlist_id)?;
        Ok(PlaylistDetail { playlist, songs })
    }

    /// The listing scope always comes from `subject`, whatever the query says.
    pub fn list(&self, subject: &Subject, query: PlaylistQuery, page: PageRequest) -> AppResult<Paged<Playlist>> {
        let query = PlaylistQuery {
            scope: authorization::playlist_scope(subject),
            ..query
        };
        Ok(self.store.list_playlists(&query, page)?)
    }

    pub fn update(&self, subject: &Subject, playlist_id: i64, update: PlaylistUpdate) -> AppResult<Playlist> {
        let playlist = self.load_for(subject, playlist_id, PlaylistAction::Update)?;
        let name = update.name.as_deref().map(check_name).transpose()?;

        let owner_role = self
            .store
            .get_user(playlist.created_by)?
            .map(|owner| owner.role)
            .unwrap_or_default();
        let requested_public = update.is_public.unwrap_or(playlist.is_public);
        let is_public = authorization::effective_playlist_visibility(owner_role, requested_public);

        let update = PlaylistUpdate {
            name,
            description: update.description,
            is_public: Some(is_public),
        };
        if !self.store.update_playlist(playlist_id, &update, Self::now())? {
            return Err(AppError::not_found(NOT_FOUND));
        }
        self.store
            .get_playlist(playlist_id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    pub fn delete(&self, subject: &Subject, playlist_id: i64) -> AppResult<()> {
        self.load_for(subject, playlist_id, PlaylistAction::Delete)?;
        if !self.store.delete_playlist(playlist_id)? {
            return Err(AppError::not_found(NOT_FOUND));
        }
        info!("User {} deleted playlist {}", subject.user_id, playlist_id);
        Ok(())
    }

    /// Adding a song that is already present succeeds with `created == false`
    /// and does not notify anyone.
    pub fn add_song(
        &self,
        subject: &Subject,
        playlist_id: i64,
        song_id: i64,
        order: i64,
    ) -> AppResult<AddSongOutcome> {
        self.load_for(subject, playlist_id, PlaylistAction::AddSong)?;
        let song = self
            .store
            .get_song(song_id)?
            .ok_or_else(|| AppError::invalid_field("song_id", "Song does not exist"))?;

        let created = self
            .store
            .add_playlist_song(playlist_id, song_id, order, Self::now())?;
        if created {
            self.tasks.submit(TaskIntent::PlaylistUpdateFanOut {
                playlist_id,
                song_id,
            });
        } else {
            debug!("Song {} already in playlist {}", song_id, playlist_id);
        }
        Ok(AddSongOutcome {
            created,
            song_title: song.title,
        })
    }

    pub fn remove_song(&self, subject: &Subject, playlist_id: i64, song_id: i64) -> AppResult<()> {
        self.load_for(subject, playlist_id, PlaylistAction::RemoveSong)?;
        if !self.store.remove_playlist_song(playlist_id, song_id)? {
            return Err(AppError::not_found("Song is not in this playlist"));
        }
        Ok(())
    }

    pub fn songs(&self, subject: &Subject, playlist_id: i64) -> AppResult<Vec<PlaylistSongEntry>> {
        self.load_for(subject, playlist_id, PlaylistAction::Read)?;
        Ok(self.store.get_playlist_songs(playlist_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Genre;
    use crate::playlist::PlaylistScope;
    use crate::store::test_support::{add_song, add_user, new_store};
    use crate::user::UserRole;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Fixture {
        manager: PlaylistManager,
        admin: Subject,
        alice: Subject,
        bob: Subject,
        song: i64,
        intents: UnboundedReceiver<TaskIntent>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let (store, dir) = new_store();
        let admin = Subject::new(add_user(&store, "admin", UserRole::Admin), UserRole::Admin);
        let alice = Subject::new(add_user(&store, "alice", UserRole::Regular), UserRole::Regular);
        let bob = Subject::new(add_user(&store, "bob", UserRole::Regular), UserRole::Regular);
        let song = add_song(&store, "Song A", "Band", Genre::Pop, admin.user_id, 1);
        let (tasks, intents) = TaskQueue::new();
        Fixture {
            manager: PlaylistManager::new(Arc::new(store), tasks),
            admin,
            alice,
            bob,
            song,
            intents,
            _dir: dir,
        }
    }

    fn draft(name: &str, is_public: Option<bool>) -> PlaylistDraft {
        PlaylistDraft {
            name: name.to_string(),
            description: None,
            is_public,
        }
    }

    #[test]
    fn admin_playlists_are_always_public() {
        let f = fixture();
        let created = f.manager.create(&f.admin, draft("Hits", Some(false))).unwrap();
        assert!(created.is_public);

        let updated = f
            .manager
            .update(
                &f.admin,
                created.id,
                PlaylistUpdate {
                    is_public: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.is_public);
    }

    #[test]
    fn update_can_clear_the_description() {
        let f = fixture();
        let created = f
            .manager
            .create(
                &f.alice,
                PlaylistDraft {
                    name: "Mix".to_string(),
                    description: Some("For the road".to_string()),
                    is_public: None,
                },
            )
            .unwrap();
        assert_eq!(created.description.as_deref(), Some("For the road"));

        let renamed = f
            .manager
            .update(
                &f.alice,
                created.id,
                PlaylistUpdate {
                    name: Some("Road Mix".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.description.as_deref(), Some("For the road"));

        let cleared = f
            .manager
            .update(
                &f.alice,
                created.id,
                PlaylistUpdate {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.name, "Road Mix");
    }

    #[test]
    fn regular_playlists_default_to_private() {
        let f = fixture();
        let created = f.manager.create(&f.alice, draft("Mix", None)).unwrap();
        assert!(!created.is_public);
        assert_eq!(created.created_by_name, "alice");
    }

    #[test]
    fn admin_editing_a_regular_playlist_keeps_it_private() {
        let f = fixture();
        let created = f.manager.create(&f.alice, draft("Mix", Some(false))).unwrap();
        let updated = f
            .manager
            .update(
                &f.admin,
                created.id,
                PlaylistUpdate {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert!(!updated.is_public);
    }

    #[test]
    fn private_playlist_is_not_found_for_others() {
        let f = fixture();
        let mix = f.manager.create(&f.alice, draft("Mix", Some(false))).unwrap();

        assert_eq!(f.manager.get(&f.bob, mix.id).unwrap_err().kind(), "not_found");
        assert_eq!(
            f.manager.add_song(&f.bob, mix.id, f.song, 0).unwrap_err().kind(),
            "not_found"
        );
        assert!(f.manager.get(&f.admin, mix.id).is_ok());
    }

    #[test]
    fn public_playlist_is_read_only_for_others() {
        let f = fixture();
        let mix = f.manager.create(&f.alice, draft("Mix", Some(true))).unwrap();

        assert!(f.manager.get(&f.bob, mix.id).is_ok());
        assert_eq!(f.manager.delete(&f.bob, mix.id).unwrap_err().kind(), "forbidden");
    }

    #[test]
    fn listing_is_scoped_to_visible_playlists() {
        let f = fixture();
        f.manager.create(&f.alice, draft("Alice private", Some(false))).unwrap();
        f.manager.create(&f.bob, draft("Bob private", Some(false))).unwrap();
        f.manager.create(&f.admin, draft("Admin public", None)).unwrap();

        let names = |subject: &Subject| -> Vec<String> {
            f.manager
                .list(subject, PlaylistQuery::new(PlaylistScope::All), PageRequest::default())
                .unwrap()
                .results
                .into_iter()
                .map(|p| p.name)
                .collect()
        };

        let for_bob = names(&f.bob);
        assert_eq!(for_bob.len(), 2);
        assert!(!for_bob.contains(&"Alice private".to_string()));
        assert_eq!(names(&f.admin).len(), 3);
    }

    #[test]
    fn add_song_is_idempotent_and_notifies_once() {
        let mut f = fixture();
        let mix = f.manager.create(&f.alice, draft("Mix", None)).unwrap();

        let first = f.manager.add_song(&f.alice, mix.id, f.song, 0).unwrap();
        let second = f.manager.add_song(&f.alice, mix.id, f.song, 0).unwrap();
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(second.song_title, "Song A");

        assert_eq!(
            f.intents.try_recv().unwrap(),
            TaskIntent::PlaylistUpdateFanOut {
                playlist_id: mix.id,
                song_id: f.song
            }
        );
        assert!(f.intents.try_recv().is_err());
        assert_eq!(f.manager.songs(&f.alice, mix.id).unwrap().len(), 1);
    }

    #[test]
    fn add_unknown_song_is_a_validation_error() {
        let f = fixture();
        let mix = f.manager.create(&f.alice, draft("Mix", None)).unwrap();
        let err = f.manager.add_song(&f.alice, mix.id, 9999, 0).unwrap_err();
        assert_eq!(err.to_string(), "Song does not exist");
    }

    #[test]
    fn remove_absent_song_is_not_found() {
        let f = fixture();
        let mix = f.manager.create(&f.alice, draft("Mix", None)).unwrap();
        let err = f.manager.remove_song(&f.alice, mix.id, f.song).unwrap_err();
        assert_eq!(err.to_string(), "Song is not in this playlist");

        f.manager.add_song(&f.alice, mix.id, f.song, 0).unwrap();
        f.manager.remove_song(&f.alice, mix.id, f.song).unwrap();
        assert!(f.manager.songs(&f.alice, mix.id).unwrap().is_empty());
    }
}
