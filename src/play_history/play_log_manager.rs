use super::client_context::ClientContext;
use super::models::{GlobalPlayStats, NewPlayLog, PlayLogEntry, PlayLogQuery, PlayWindow, UserPlayStats};
use crate::authorization::{self, PlayLogAction, Subject};
use crate::error::{AppError, AppResult};
use crate::store::{FullStore, PageRequest, Paged};
use std::sync::Arc;
use tracing::debug;

const NOT_FOUND: &str = "Play log not found";
const WEEK_SECONDS: i64 = 7 * 24 * 3600;

const MY_TOP_SONGS: usize = 10;
const MY_TOP_GENRES: usize = 5;
const GLOBAL_TOP_SONGS: usize = 20;
const GLOBAL_TOP_LISTENERS: usize = 10;

pub struct PlayLogManager {
    store: Arc<dyn FullStore>,
}

impl PlayLogManager {
    pub fn new(store: Arc<dyn FullStore>) -> Self {
        Self { store }
    }

    /// Always records the play for `subject` itself.
    pub fn log_play(&self, subject: &Subject, song_id: i64, client: ClientContext) -> AppResult<PlayLogEntry> {
        authorization::play_log(
            subject,
            PlayLogAction::Create {
                on_behalf_of: subject.user_id,
            },
        )
        .into_result(NOT_FOUND, "You are not allowed to log plays")?;
        if self.store.get_song(song_id)?.is_none() {
            return Err(AppError::invalid_field("song", "Song does not exist"));
        }

        let id = self.store.insert_play_log(&NewPlayLog {
            user_id: subject.user_id,
            song_id,
            played_at: chrono::Utc::now().timestamp(),
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        })?;
        debug!("User {} played song {}", subject.user_id, song_id);
        self.store
            .get_play_log(id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    /// Regular users only ever see their own entries, whatever `query.user_id` says.
    pub fn list(&self, subject: &Subject, query: PlayLogQuery, page: PageRequest) -> AppResult<Paged<PlayLogEntry>> {
        let query = match authorization::play_log_owner_filter(subject) {
            Some(owner) => PlayLogQuery {
                user_id: Some(owner),
                ..query
            },
            None => query,
        };
        Ok(self.store.list_play_logs(&query, page)?)
    }

    pub fn get(&self, subject: &Subject, play_log_id: i64) -> AppResult<PlayLogEntry> {
        let entry = self
            .store
            .get_play_log(play_log_id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        authorization::play_log(subject, PlayLogAction::Read { owner: entry.user_id })
            .into_result(NOT_FOUND, NOT_FOUND)?;
        Ok(entry)
    }

    pub fn my_stats(&self, subject: &Subject) -> AppResult<UserPlayStats> {
        let now = chrono::Utc::now().timestamp();
        let user_id = Some(subject.user_id);
        Ok(UserPlayStats {
            total_plays: self.store.count_plays(PlayWindow {
                user_id,
                ..Default::default()
            })?,
            weekly_plays: self.store.count_plays(PlayWindow {
                user_id,
                since: Some(now - WEEK_SECONDS),
                until: Some(now),
            })?,
            most_played_songs: self.store.top_songs(user_id, MY_TOP_SONGS)?,
            genre_preferences: self.store.top_genres(user_id, MY_TOP_GENRES)?,
        })
    }

    pub fn global_stats(&self, subject: &Subject) -> AppResult<GlobalPlayStats> {
        authorization::play_log(subject, PlayLogAction::ReadGlobalStats)
            .into_result(NOT_FOUND, "Admin access required")?;
        Ok(GlobalPlayStats {
            total_plays: self.store.count_plays(PlayWindow::default())?,
            unique_users: self.store.count_distinct_listeners()?,
            most_played_songs: self.store.top_songs(None, GLOBAL_TOP_SONGS)?,
            most_active_users: self.store.top_listeners(GLOBAL_TOP_LISTENERS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Genre;
    use crate::store::test_support::{add_song, add_user, new_store};
    use crate::user::UserRole;

    struct Fixture {
        manager: PlayLogManager,
        admin: Subject,
        alice: Subject,
        bob: Subject,
        rock: i64,
        jazz: i64,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let (store, dir) = new_store();
        let admin = Subject::new(add_user(&store, "admin", UserRole::Admin), UserRole::Admin);
        let alice = Subject::new(add_user(&store, "alice", UserRole::Regular), UserRole::Regular);
        let bob = Subject::new(add_user(&store, "bob", UserRole::Regular), UserRole::Regular);
        let rock = add_song(&store, "Rocker", "Band", Genre::Rock, admin.user_id, 1);
        let jazz = add_song(&store, "Smooth", "Trio", Genre::Jazz, admin.user_id, 1);
        Fixture {
            manager: PlayLogManager::new(Arc::new(store)),
            admin,
            alice,
            bob,
            rock,
            jazz,
            _dir: dir,
        }
    }

    fn ctx() -> ClientContext {
        ClientContext::new(Some("198.51.100.4"), None, Some("test-agent"))
    }

    #[test]
    fn plays_are_recorded_for_the_caller() {
        let f = fixture();
        let entry = f.manager.log_play(&f.alice, f.rock, ctx()).unwrap();
        assert_eq!(entry.user_id, f.alice.user_id);
        assert_eq!(entry.song_title, "Rocker");
        assert_eq!(entry.ip_address.as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn repeated_plays_are_not_deduplicated() {
        let f = fixture();
        let a = f.manager.log_play(&f.alice, f.rock, ctx()).unwrap();
        let b = f.manager.log_play(&f.alice, f.rock, ctx()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(f.manager.my_stats(&f.alice).unwrap().total_plays, 2);
    }

    #[test]
    fn unknown_song_is_a_validation_error() {
        let f = fixture();
        assert_eq!(
            f.manager.log_play(&f.alice, 999, ctx()).unwrap_err().kind(),
            "validation"
        );
    }

    #[test]
    fn regular_users_only_see_their_own_entries() {
        let f = fixture();
        let mine = f.manager.log_play(&f.alice, f.rock, ctx()).unwrap();
        let theirs = f.manager.log_play(&f.bob, f.jazz, ctx()).unwrap();

        let listed = f
            .manager
            .list(
                &f.alice,
                PlayLogQuery {
                    user_id: Some(f.bob.user_id),
                    song_id: None,
                },
                PageRequest::default(),
            )
            .unwrap();
        assert_eq!(listed.count, 1);
        assert_eq!(listed.results[0].id, mine.id);

        assert_eq!(f.manager.get(&f.alice, theirs.id).unwrap_err().kind(), "not_found");
        assert!(f.manager.get(&f.admin, theirs.id).is_ok());
        let all = f
            .manager
            .list(&f.admin, PlayLogQuery::default(), PageRequest::default())
            .unwrap();
        assert_eq!(all.count, 2);
    }

    #[test]
    fn my_stats_rank_songs_and_genres() {
        let f = fixture();
        f.manager.log_play(&f.alice, f.jazz, ctx()).unwrap();
        f.manager.log_play(&f.alice, f.jazz, ctx()).unwrap();
        f.manager.log_play(&f.alice, f.rock, ctx()).unwrap();
        f.manager.log_play(&f.bob, f.rock, ctx()).unwrap();

        let stats = f.manager.my_stats(&f.alice).unwrap();
        assert_eq!(stats.total_plays, 3);
        assert_eq!(stats.weekly_plays, 3);
        assert_eq!(stats.most_played_songs[0].title, "Smooth");
        assert_eq!(stats.most_played_songs[0].play_count, 2);
        assert_eq!(stats.genre_preferences[0].genre, "jazz");
    }

    #[test]
    fn global_stats_are_admin_only() {
        let f = fixture();
        f.manager.log_play(&f.alice, f.rock, ctx()).unwrap();
        f.manager.log_play(&f.bob, f.rock, ctx()).unwrap();

        let err = f.manager.global_stats(&f.alice).unwrap_err();
        assert_eq!(err.kind(), "forbidden");
        assert_eq!(err.to_string(), "Admin access required");

        let stats = f.manager.global_stats(&f.admin).unwrap();
        assert_eq!(stats.total_plays, 2);
        assert_eq!(stats.unique_users, 2);
        assert_eq!(stats.most_played_songs[0].play_count, 2);
        assert_eq!(stats.most_active_users.len(), 2);
    }
}
