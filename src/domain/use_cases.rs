pub mod complaint;
pub mod extractors;
pub mod news;
pub mod newsletter;
pub mod project;
pub mod subscriber;
pub mod upload;
