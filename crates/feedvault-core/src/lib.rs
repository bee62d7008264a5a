pub mod config;
pub mod logging;

// Capture side
pub mod capture;
pub mod decode;
pub mod model;
pub mod session;

// Persistence and downloads
pub mod archive;
pub mod fetch;
pub mod hls;
pub mod media;
pub mod naming;
pub mod storage;

pub mod error;
pub mod pipeline;
pub mod pool;
