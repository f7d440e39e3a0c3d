pub mod entry;
pub mod section;

pub use entry::Entry;
pub use section::Section;
