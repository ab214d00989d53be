pub mod event;
pub mod notification;
pub mod submission;
pub mod user;

pub use event::{EventRecord, NewEvent};
pub use notification::{NewNotification, NotificationRecord};
pub use submission::{NewSubmission, SubmissionRecord};
pub use user::User;
