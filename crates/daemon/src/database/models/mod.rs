mod content;
mod owner;

pub use content::{ContentItem, ContentPatch, DeletedContent, NewContent};
pub use owner::Owner;
