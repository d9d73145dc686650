//! Texts of system generated notifications.

use super::models::{NewNotification, NotificationType};
use crate::catalog::Song;
use crate::playlist::Playlist;
use crate::user::User;

const ADMIN_WELCOME_BLURB: &str =
    "As an admin, you can upload songs, create public playlists, and view all play logs.";
const REGULAR_WELCOME_BLURB: &str =
    "Start exploring songs, create your own playlists, and enjoy your musical journey!";

pub fn welcome(user: &User) -> NewNotification {
    let blurb = if user.role.is_admin() {
        ADMIN_WELCOME_BLURB
    } else {
        REGULAR_WELCOME_BLURB
    };
    NewNotification {
        user_id: user.id,
        title: "Welcome to Music App!".to_string(),
        message: format!(
            "Welcome to Music Management App, {}! {}",
            user.display_name(),
            blurb
        ),
        notification_type: NotificationType::Welcome,
        related_playlist: None,
        related_song: None,
    }
}

pub fn new_song(recipient: i64, song: &Song) -> NewNotification {
    NewNotification {
        user_id: recipient,
        title: "New Song Available".to_string(),
        message: format!(
            "New song '{}' by {} has been added to the library!",
            song.title, song.artist
        ),
        notification_type: NotificationType::NewSong,
        related_playlist: None,
        related_song: Some(song.id),
    }
}

pub fn playlist_update(recipient: i64, playlist: &Playlist, song_title: &str) -> NewNotification {
    let title = if playlist.is_public {
        "Playlist Updated"
    } else {
        "Your Playlist Updated"
    };
    NewNotification {
        user_id: recipient,
        title: title.to_string(),
        message: format!("New song '{}' added to playlist '{}'", song_title, playlist.name),
        notification_type: NotificationType::PlaylistUpdate,
        related_playlist: Some(playlist.id),
        related_song: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserRole;

    fn user(first_name: &str, role: UserRole) -> User {
        User {
            id: 5,
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            first_name: first_name.to_string(),
            last_name: String::new(),
            role,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn welcome_text_depends_on_role() {
        let admin = welcome(&user("Jane", UserRole::Admin));
        assert_eq!(
            admin.message,
            "Welcome to Music Management App, Jane! As an admin, you can upload songs, create public playlists, and view all play logs."
        );
        assert_eq!(admin.notification_type, NotificationType::Welcome);

        let regular = welcome(&user("", UserRole::Regular));
        assert_eq!(
            regular.message,
            "Welcome to Music Management App, jdoe! Start exploring songs, create your own playlists, and enjoy your musical journey!"
        );
    }

    #[test]
    fn playlist_update_title_depends_on_visibility() {
        let mut playlist = Playlist {
            id: 9,
            name: "Mix".to_string(),
            description: None,
            created_by: 1,
            created_by_name: "u".to_string(),
            is_public: true,
            song_count: 1,
            created_at: 0,
            updated_at: 0,
        };
        let public = playlist_update(2, &playlist, "Song A");
        assert_eq!(public.title, "Playlist Updated");
        assert_eq!(public.message, "New song 'Song A' added to playlist 'Mix'");
        assert_eq!(public.related_playlist, Some(9));

        playlist.is_public = false;
        assert_eq!(playlist_update(1, &playlist, "Song A").title, "Your Playlist Updated");
    }
}
