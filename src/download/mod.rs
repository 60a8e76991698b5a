use std::time::Duration;

use image::DynamicImage;
use log::{debug, info};
use rayon::prelude::*;
use reqwest::Url;
use reqwest::blocking::Client;

use crate::{MapStitchError, StatusOr};

/// Anything that can turn a provider URL into a decoded tile
pub trait TileFetcher: Sync {
    fn fetch(&self, url: &Url) -> StatusOr<DynamicImage>;
}

/// Fetches tiles over HTTP
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

impl TileFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> StatusOr<DynamicImage> {
        let failed = |reason: String| MapStitchError::FetchError {
            url: url.to_string(),
            reason,
        };

        debug!("Requesting {}", url);
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }
        let data = response.bytes().map_err(|e| failed(e.to_string()))?;

        image::load_from_memory(&data).map_err(|e| failed(format!("undecodable image: {}", e)))
    }
}

/// Fetch every URL in parallel, returning the tiles in the same order.
///
/// Nothing is returned until all fetches succeed. The first failure stops
/// further fetches from being started and becomes the result.
pub fn fetch_all<F: TileFetcher>(fetcher: &F, urls: &[Url]) -> StatusOr<Vec<DynamicImage>> {
    info!("Fetching {} tiles", urls.len());
    let tiles = urls
        .par_iter()
        .map(|url| fetcher.fetch(url))
        .collect::<StatusOr<Vec<_>>>()?;
    info!("Fetched {} tiles", tiles.len());
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Paints each tile with the index carried in its URL
    struct IndexedFetcher {
        calls: AtomicUsize,
        fail_on: Option<usize>,
        delay: Duration,
    }

    impl IndexedFetcher {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
                delay: Duration::ZERO,
            }
        }
    }

    impl TileFetcher for IndexedFetcher {
        fn fetch(&self, url: &Url) -> StatusOr<DynamicImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let index: usize = url
                .query_pairs()
                .find(|(k, _)| k == "i")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap();

            if self.fail_on == Some(index) {
                return Err(MapStitchError::FetchError {
                    url: url.to_string(),
                    reason: "HTTP 500 Internal Server Error".to_string(),
                });
            }
            thread::sleep(self.delay);
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([index as u8, 0, 0, 255]))))
        }
    }

    fn urls(count: usize) -> Vec<Url> {
        (0..count)
            .map(|i| Url::parse(&format!("https://tiles.example.com/?i={}", i)).unwrap())
            .collect()
    }

    #[test]
    fn test_results_keep_request_order() {
        let fetcher = IndexedFetcher::new(None);
        let tiles = fetch_all(&fetcher, &urls(40)).unwrap();

        assert_eq!(tiles.len(), 40);
        for (i, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.get_pixel(0, 0), Rgba([i as u8, 0, 0, 255]));
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 40);
    }

    #[test]
    fn test_one_failure_fails_everything() {
        let fetcher = IndexedFetcher::new(Some(7));
        let err = fetch_all(&fetcher, &urls(20)).unwrap_err();

        match err {
            MapStitchError::FetchError { url, reason } => {
                assert!(url.ends_with("i=7"));
                assert!(reason.contains("500"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_failure_stops_remaining_fetches() {
        let fetcher = IndexedFetcher {
            delay: Duration::from_millis(20),
            ..IndexedFetcher::new(Some(0))
        };
        let urls = urls(400);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();

        let err = pool.install(|| fetch_all(&fetcher, &urls)).unwrap_err();
        assert!(matches!(err, MapStitchError::FetchError { .. }));

        let calls = fetcher.calls.load(Ordering::SeqCst);
        assert!(calls < urls.len(), "all {} fetches ran after the first failure", calls);
    }

    #[test]
    fn test_no_urls_is_empty() {
        let fetcher = IndexedFetcher::new(None);
        assert!(fetch_all(&fetcher, &[]).unwrap().is_empty());
    }
}
