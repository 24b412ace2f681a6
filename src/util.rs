pub mod id;
pub mod pretty_format;
