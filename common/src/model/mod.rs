pub mod chat;
pub mod content;
pub mod course;
pub mod resource;
