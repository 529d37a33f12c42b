pub mod complaint;
pub mod health;
pub mod news;
pub mod newsletter;
pub mod project;
pub mod sqlx_repo;
pub mod subscriber;
