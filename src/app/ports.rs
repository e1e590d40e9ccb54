use async_trait::async_trait;
use std::io::Write;

#[async_trait]
pub trait HttpClientPort: Send + Sync {
    /// Buffered GET, for small documents such as API listings.
    async fn get(&self, url: &str) -> Result<HttpGetResult, String>;

    /// GET that streams the body into `sink` as it arrives.
    ///
    /// Returns the response status. The body is only written when the status
    /// is 200; any other status leaves `sink` untouched.
    async fn download(&self, url: &str, sink: &mut (dyn Write + Send)) -> Result<u16, String>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}
