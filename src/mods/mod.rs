pub mod download;
pub mod scan;

pub use download::{DownloadError, DownloadManager, DownloadOptions};
