//! Effect layer: network, filesystem and blocking parse work.

mod fetcher;
mod http;
mod scan;

pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient};
pub use scan::scan_file;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
