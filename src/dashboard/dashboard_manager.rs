use super::activity::{merge_recent_activity, ACTIVITY_PLAYLISTS, ACTIVITY_PLAYS, ACTIVITY_USERS};
use super::models::{DashboardStats, GenreCount, GenreStat, RecentPlay};
use crate::authorization::{self, Subject};
use crate::error::AppResult;
use crate::play_history::PlayWindow;
use crate::playlist::PlaylistScope;
use crate::store::FullStore;
use std::sync::Arc;

const RECENT_PLAYS: usize = 5;
const TOP_PLAYLISTS: usize = 5;
const DAY_SECONDS: i64 = 24 * 3600;

/// Start of the UTC calendar day containing `now`.
fn start_of_day(now: i64) -> i64 {
    now - now.rem_euclid(DAY_SECONDS)
}

fn genre_stats(counts: Vec<GenreCount>, total_songs: i64) -> Vec<GenreStat> {
    counts
        .into_iter()
        .map(|c| {
            let percentage = if total_songs > 0 {
                (c.count as f64 * 1000.0 / total_songs as f64).round() / 10.0
            } else {
                0.0
            };
            GenreStat {
                genre: c.genre,
                count: c.count,
                percentage,
            }
        })
        .collect()
}

pub struct DashboardManager {
    store: Arc<dyn FullStore>,
}

impl DashboardManager {
    pub fn new(store: Arc<dyn FullStore>) -> Self {
        Self { store }
    }

    pub fn stats(&self, subject: &Subject) -> AppResult<DashboardStats> {
        authorization::dashboard(subject)
            .into_result("Not found", "You do not have access to the dashboard")?;
        self.stats_at(
            authorization::playlist_scope(subject),
            chrono::Utc::now().timestamp(),
        )
    }

    /// Counts are global; playlist rows are limited to `scope`.
    fn stats_at(&self, scope: PlaylistScope, now: i64) -> AppResult<DashboardStats> {
        let total_songs = self.store.count_songs()?;
        let plays_today = self.store.count_plays(PlayWindow {
            user_id: None,
            since: Some(start_of_day(now)),
            until: Some(now),
        })?;

        let latest_plays = self.store.recent_play_logs(RECENT_PLAYS.max(ACTIVITY_PLAYS))?;
        let recent_activity = merge_recent_activity(
            &latest_plays,
            &self.store.latest_playlists(scope, ACTIVITY_PLAYLISTS)?,
            &self.store.newest_users(ACTIVITY_USERS)?,
        );
        let recent_plays = latest_plays
            .into_iter()
            .take(RECENT_PLAYS)
            .map(|entry| RecentPlay {
                id: entry.id,
                user_name: entry.user_name,
                song_title: entry.song_title,
                song_artist: entry.song_artist,
                played_at: entry.played_at,
            })
            .collect();

        Ok(DashboardStats {
            total_songs,
            total_playlists: self.store.count_playlists()?,
            total_users: self.store.count_users()?,
            plays_today,
            recent_plays,
            top_playlists: self
                .store
                .top_playlists_by_song_count(scope, TOP_PLAYLISTS)?,
            genre_stats: genre_stats(self.store.genre_song_counts()?, total_songs),
            recent_activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Genre;
    use crate::play_history::{NewPlayLog, PlayLogStore};
    use crate::playlist::{NewPlaylist, PlaylistStore};
    use crate::store::test_support::{add_song, add_user, new_store};
    use crate::user::UserRole;

    #[test]
    fn start_of_day_is_utc_midnight() {
        assert_eq!(start_of_day(0), 0);
        assert_eq!(start_of_day(DAY_SECONDS + 5), DAY_SECONDS);
        assert_eq!(start_of_day(3 * DAY_SECONDS - 1), 2 * DAY_SECONDS);
    }

    #[test]
    fn percentages_are_rounded_to_one_decimal() {
        let stats = genre_stats(
            vec![
                GenreCount {
                    genre: "rock".to_string(),
                    count: 2,
                },
                GenreCount {
                    genre: "jazz".to_string(),
                    count: 1,
                },
            ],
            3,
        );
        assert_eq!(stats[0].percentage, 66.7);
        assert_eq!(stats[1].percentage, 33.3);
        assert!(genre_stats(vec![], 0).is_empty());
    }

    #[test]
    fn stats_aggregate_the_catalog() {
        let (store, _dir) = new_store();
        let admin = add_user(&store, "admin", UserRole::Admin);
        let alice = add_user(&store, "alice", UserRole::Regular);
        let rock = add_song(&store, "Rocker", "Band", Genre::Rock, admin, 100);
        add_song(&store, "Other rock", "Band", Genre::Rock, admin, 100);
        add_song(&store, "Smooth", "Trio", Genre::Jazz, admin, 100);
        let playlist = store
            .create_playlist(
                &NewPlaylist {
                    name: "Mix".to_string(),
                    description: None,
                    created_by: alice,
                    is_public: false,
                },
                200,
            )
            .unwrap();
        store.add_playlist_song(playlist, rock, 0, 210).unwrap();

        let now = 10 * DAY_SECONDS + 600;
        for played_at in [now - DAY_SECONDS, now - 60, now - 30] {
            store
                .insert_play_log(&NewPlayLog {
                    user_id: alice,
                    song_id: rock,
                    played_at,
                    ip_address: None,
                    user_agent: String::new(),
                })
                .unwrap();
        }

        let stats = DashboardManager::new(Arc::new(store))
            .stats_at(PlaylistScope::All, now)
            .unwrap();
        assert_eq!(stats.total_songs, 3);
        assert_eq!(stats.total_playlists, 1);
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.plays_today, 2);
        assert_eq!(stats.recent_plays.len(), 3);
        assert_eq!(stats.recent_plays[0].played_at, now - 30);
        assert_eq!(stats.top_playlists[0].song_count, 1);
        assert_eq!(stats.genre_stats[0].genre, "rock");
        assert_eq!(stats.genre_stats[0].percentage, 66.7);
        assert_eq!(stats.recent_activity.len(), 5);
        // Users are stamped with the wall clock, far later than `now`.
        assert_eq!(stats.recent_activity[0].message, "alice joined");
        assert_eq!(stats.recent_activity[1].message, "alice played Rocker");
    }

    #[test]
    fn regular_users_only_see_visible_playlists() {
        let (store, _dir) = new_store();
        let admin = add_user(&store, "admin", UserRole::Admin);
        let alice = add_user(&store, "alice", UserRole::Regular);
        let bob = add_user(&store, "bob", UserRole::Regular);
        let song = add_song(&store, "Rocker", "Band", Genre::Rock, admin, 100);
        let secret = store
            .create_playlist(
                &NewPlaylist {
                    name: "Alice Secret Mix".to_string(),
                    description: None,
                    created_by: alice,
                    is_public: false,
                },
                200,
            )
            .unwrap();
        store.add_playlist_song(secret, song, 0, 210).unwrap();

        let manager = DashboardManager::new(Arc::new(store));
        let for_bob = manager
            .stats(&Subject::new(bob, UserRole::Regular))
            .unwrap();
        assert_eq!(for_bob.total_playlists, 1);
        assert!(for_bob.top_playlists.is_empty());
        assert!(for_bob
            .recent_activity
            .iter()
            .all(|item| !item.message.contains("Alice Secret Mix")));

        let for_alice = manager
            .stats(&Subject::new(alice, UserRole::Regular))
            .unwrap();
        assert_eq!(for_alice.top_playlists[0].id, secret);
        assert!(for_alice
            .recent_activity
            .iter()
            .any(|item| item.message == "alice created playlist Alice Secret Mix"));

        let for_admin = manager
            .stats(&Subject::new(admin, UserRole::Admin))
            .unwrap();
        assert_eq!(for_admin.top_playlists.len(), 1);
    }
}
