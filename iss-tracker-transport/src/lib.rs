mod endpoint;
mod fetcher;
mod response;

pub use endpoint::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, FetcherConfig, ISS_NOW_PATH, endpoint_url};
pub use fetcher::OpenNotifyFetcher;
pub use response::{IssNowResponse, IssPosition, decode_fix};
