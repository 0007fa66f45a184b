pub mod events;
pub mod timeline;
