use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::FetchSettings;
use crate::error::{FetchError, PageError};
use crate::parser::extract::{Extractor, SectionResults};
use crate::parser::extract_page;
use crate::parser::labels::SectionKind;

const BASE_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 60_000;

/// Pages scraped when `scrape` is given no URLs.
pub const SAMPLE_URLS: &[&str] = &[
    "https://www.budgetbytes.com/creamy-garlic-chicken/",
    "https://www.allrecipes.com/recipe/269500/creamy-garlic-pasta/",
    "https://thecozycook.com/easy-lasagna-recipe/",
    "https://www.allrecipes.com/chef-johns-jollof-rice-recipe-7499757",
    "https://sweetandsavorymeals.com/jerk-chicken-recipe/",
    "https://simplehomeedit.com/recipe/baked-garlic-chicken-breast/",
];

/// Result for one page of a batch.
pub struct PageOutcome {
    pub url: String,
    pub result: Result<SectionResults, PageError>,
    pub latency_ms: u64,
}

pub fn build_client(settings: &FetchSettings) -> Result<Client> {
    let client = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch and extract every URL with bounded concurrency. One page failing
/// never stops the batch. Outcomes come back in input order.
pub async fn scrape_pages(
    client: &Client,
    settings: &FetchSettings,
    extractor: Arc<Extractor>,
    kinds: &[SectionKind],
    urls: Vec<String>,
) -> Result<Vec<PageOutcome>> {
    let semaphore = Arc::new(Semaphore::new(settings.concurrency));
    let kinds: Arc<[SectionKind]> = kinds.into();
    let total = urls.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Workers send (index, outcome); the loop below restores input order.
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, PageOutcome)>(settings.concurrency * 2);

    for (idx, url) in urls.into_iter().enumerate() {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let extractor = Arc::clone(&extractor);
        let kinds = Arc::clone(&kinds);
        let max_retries = settings.max_retries;
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let start = Instant::now();
            let result = match fetch_with_retry(&client, &url, max_retries, BASE_BACKOFF_MS).await {
                // CPU-bound, runs on the blocking pool
                Ok(body) => tokio::task::spawn_blocking(move || extract_page(&body, &extractor, &kinds))
                    .await
                    .map_err(|source| PageError::Task {
                        url: url.clone(),
                        source,
                    }),
                Err(e) => Err(e.into()),
            };
            if let Err(e) = &result {
                warn!("{}", e);
            }
            let outcome = PageOutcome {
                url,
                result,
                latency_ms: start.elapsed().as_millis() as u64,
            };
            let _ = tx.send((idx, outcome)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut outcomes = Vec::with_capacity(total);
    let mut errors = 0usize;
    while let Some((idx, outcome)) = rx.recv().await {
        if outcome.result.is_err() {
            errors += 1;
        }
        outcomes.push((idx, outcome));
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Scraped {} pages ({} ok, {} errors)", total, total - errors, errors);

    outcomes.sort_by_key(|(idx, _)| *idx);
    Ok(outcomes.into_iter().map(|(_, o)| o).collect())
}

async fn fetch_with_retry(
    client: &Client,
    url: &str,
    max_retries: u32,
    base_backoff_ms: u64,
) -> Result<String, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_page(client, url).await {
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let backoff = backoff_delay(base_backoff_ms, attempt);
                warn!(
                    "{} (attempt {}/{}), backing off {:.1}s",
                    e,
                    attempt + 1,
                    max_retries,
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Exponential delay before retry number `attempt + 1`, capped at one minute.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let ms = base_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(ms.min(MAX_BACKOFF_MS))
}

/// GET a page body. Any non-2xx status is an error.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }
    response.text().await.map_err(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const PAGE: &str = "<div><h2>Ingredients</h2><ul><li>1 cup flour</li></ul></div>";

    /// Serve one response per connection with the given statuses, in order.
    /// Returns the page URL and a count of requests received.
    async fn serve(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            for status in statuses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    PAGE.len(),
                    PAGE
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{}/recipe", addr), hits)
    }

    #[test]
    fn sample_urls_are_https() {
        assert!(SAMPLE_URLS.iter().all(|u| u.starts_with("https://")));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let client = build_client(&FetchSettings::default()).unwrap();
        let err = fetch_page(&client, "http://127.0.0.1:9/recipe").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { ref url, .. } if url == "http://127.0.0.1:9/recipe"));
    }

    #[tokio::test]
    async fn batch_continues_past_failures() {
        let settings = FetchSettings {
            max_retries: 0,
            ..FetchSettings::default()
        };
        let client = build_client(&settings).unwrap();
        let urls = vec![
            "http://127.0.0.1:9/a".to_string(),
            "http://127.0.0.1:9/b".to_string(),
        ];
        let outcomes = scrape_pages(
            &client,
            &settings,
            Arc::new(Extractor::default()),
            &SectionKind::ALL,
            urls,
        )
        .await
        .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].url, "http://127.0.0.1:9/a");
        assert_eq!(outcomes[1].url, "http://127.0.0.1:9/b");
        assert!(outcomes.iter().all(|o| o.result.is_err()));
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let (url, hits) = serve(vec![404, 200]).await;
        let client = build_client(&FetchSettings::default()).unwrap();
        let err = fetch_with_retry(&client, &url, 2, 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 404));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_error_retried_until_success() {
        let (url, hits) = serve(vec![503, 503, 200]).await;
        let client = build_client(&FetchSettings::default()).unwrap();
        let body = fetch_with_retry(&client, &url, 2, 1).await.unwrap();
        assert_eq!(body, PAGE);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_exhausted_returns_last_status() {
        let (url, hits) = serve(vec![429, 429]).await;
        let client = build_client(&FetchSettings::default()).unwrap();
        let err = fetch_with_retry(&client, &url, 1, 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 429));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn scraped_page_is_extracted() {
        let (url, _) = serve(vec![200]).await;
        let settings = FetchSettings::default();
        let client = build_client(&settings).unwrap();
        let outcomes = scrape_pages(
            &client,
            &settings,
            Arc::new(Extractor::default()),
            &[SectionKind::Ingredients],
            vec![url],
        )
        .await
        .unwrap();
        let sections = outcomes[0].result.as_ref().unwrap();
        assert_eq!(
            sections[&SectionKind::Ingredients],
            Ok(vec![vec!["1 cup flour".to_string()]])
        );
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        assert_eq!(backoff_delay(1000, 0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1000, 2), Duration::from_secs(4));
        assert_eq!(backoff_delay(1000, 60), Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(backoff_delay(1000, u32::MAX), Duration::from_millis(MAX_BACKOFF_MS));
    }
}
