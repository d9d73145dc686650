use crate::user::User;
use anyhow::Result;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email transport.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &Email) -> Result<()>;
}

/// Writes emails to the log instead of delivering them.
pub struct LoggingMailer;

impl Mailer for LoggingMailer {
    fn send(&self, email: &Email) -> Result<()> {
        info!(
            "Email to {} with subject \"{}\":\n{}",
            email.to, email.subject, email.body
        );
        Ok(())
    }
}

pub fn welcome_email(user: &User) -> Email {
    let (role, capabilities) = if user.role.is_admin() {
        (
            "Admin",
            "As an admin, you can upload songs, create public playlists, and view all play logs.",
        )
    } else {
        (
            "Regular",
            "As a regular user, you can create personal playlists, play songs, and view your play history.",
        )
    };
    let body = format!(
        "Hi {},\n\n\
         Welcome to our Music Management App!\n\n\
         You have successfully registered as a {} user.\n\n\
         {}\n\n\
         Start exploring and enjoy your musical journey!\n\n\
         Best regards,\n\
         Music Management Team\n",
        user.display_name(),
        role,
        capabilities
    );
    Email {
        to: user.email.clone(),
        subject: "Welcome to Music Management App!".to_string(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserRole;

    #[test]
    fn welcome_email_for_admin() {
        let user = User {
            id: 1,
            username: "boss".to_string(),
            email: "boss@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Admin,
            created_at: 0,
            updated_at: 0,
        };
        let email = welcome_email(&user);
        assert_eq!(email.to, "boss@example.com");
        assert_eq!(email.subject, "Welcome to Music Management App!");
        assert!(email.body.starts_with("Hi boss,"));
        assert!(email.body.contains("registered as a Admin user"));
        assert!(email.body.contains("upload songs"));
    }
}
