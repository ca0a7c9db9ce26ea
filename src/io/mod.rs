pub mod file;

pub use file::Storage;
