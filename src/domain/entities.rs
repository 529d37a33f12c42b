pub mod complaint;
pub mod envelope;
pub mod news;
pub mod newsletter;
pub mod option_fields;
pub mod pagination;
pub mod project;
pub mod subscriber;
pub mod validation;
