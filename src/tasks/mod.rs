//! Deferred work: request handlers submit a [`TaskIntent`] and move on, the
//! [`TaskWorker`] executes it out of band. Outcomes are only logged.

mod intent;
mod mailer;
mod queue;
mod worker;

pub use intent::TaskIntent;
pub use mailer::{welcome_email, Email, LoggingMailer, Mailer};
pub use queue::TaskQueue;
pub use worker::{execute, TaskWorker};
