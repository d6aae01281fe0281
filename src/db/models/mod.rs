pub mod entry;

pub use entry::HourEntry;
