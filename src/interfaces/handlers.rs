pub mod complaints;
pub mod docs;
pub mod fallback;
pub mod home;
pub mod news;
pub mod newsletter;
pub mod projects;
pub mod subscribers;
pub mod system;
pub mod uploads;
