use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream of response body chunks.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// The protocol only ever issues plain GETs and streams the body to disk, so
/// this is the whole surface it needs. Implementations follow redirects and
/// turn non-success statuses into errors.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - scripted clients in tests
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a GET for `url` and return the response body as a stream.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and on any non-2xx status.
    fn stream(
        &self,
        url: &str,
    ) -> impl Future<
        Output = Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error>,
    > + Send;

    /// Whether `error` means the resource does not exist (yet).
    ///
    /// The deferred-result poll retries these and nothing else.
    fn is_not_found(error: &Self::Error) -> bool;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use reqwest::StatusCode;
    use std::time::Duration;

    const USER_AGENT: &str = concat!("sdmx-fetch/", env!("CARGO_PKG_VERSION"));

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .connect_timeout(Duration::from_secs(30))
                .build()?;
            Ok(Self { client })
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(
            &self,
            url: &str,
        ) -> Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error> {
            let response = self.client.get(url).send().await?.error_for_status()?;
            Ok(Box::pin(response.bytes_stream()))
        }

        fn is_not_found(error: &Self::Error) -> bool {
            matches!(
                error.status(),
                Some(StatusCode::NOT_FOUND | StatusCode::GONE)
            )
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
