pub mod bucket;

pub use bucket::{object_path, ObjectStorage, RestObjectStorage};
