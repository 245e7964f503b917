mod http;

pub use http::HttpIngestor;
