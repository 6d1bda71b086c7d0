//! End-to-end runs of the fetch protocol against a scripted client.

use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;

use sdmx_fetch::mock::{Reply, ScriptedClient};
use sdmx_fetch::{Error, Fetcher, PollPolicy};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const DATA_URL: &str = "http://ec.europa.eu/eurostat/SDMX/diss-web/rest/data/une_rt_m";
const POLL_URL: &str = "http://ec.europa.eu/eurostat/SDMX/diss-web/file/aBc123";

const PAYLOAD: &[u8] = br#"<message:GenericData xmlns:message="urn:m"><message:DataSet/></message:GenericData>"#;

fn deferred_notice(code: &str, url: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<message:GenericData xmlns:message="urn:m" xmlns:footer="urn:f" xmlns:common="urn:c">
  <message:Header><message:ID>x</message:ID></message:Header>
  <footer:Footer>
    <footer:Message code="{code}" severity="Infomational">
      <common:Text xml:lang="en">Due to the large query the response will be written to a file</common:Text>
      <common:Text xml:lang="en">{url}</common:Text>
      <common:Text xml:lang="en">Please check the URL regularly</common:Text>
    </footer:Message>
  </footer:Footer>
</message:GenericData>"#
    )
    .into_bytes()
}

fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn fast_policy() -> PollPolicy {
    PollPolicy::default().interval(Duration::ZERO)
}

fn staged_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn synchronous_payload_is_returned_as_is() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new().route(DATA_URL, [Reply::Chunks(vec![
        PAYLOAD[..10].to_vec(),
        PAYLOAD[10..].to_vec(),
    ])]);
    let fetcher = Fetcher::new(client, staging_dir.path());

    let staged = fetcher
        .fetch(DATA_URL, "une_rt_m", "_data.sdmx.xml")
        .await
        .unwrap();

    assert_eq!(std::fs::read(staged.path()).unwrap(), PAYLOAD);
    assert_eq!(fetcher.client().requests(), vec![DATA_URL.to_owned()]);
}

#[tokio::test]
async fn non_deferred_footer_is_final_payload() {
    let staging_dir = TempDir::new().unwrap();
    let notice = deferred_notice("200", POLL_URL);
    let client = ScriptedClient::new().route(DATA_URL, [Reply::Body(notice.clone())]);
    let fetcher = Fetcher::new(client, staging_dir.path());

    let staged = fetcher
        .fetch(DATA_URL, "une_rt_m", "_data.sdmx.xml")
        .await
        .unwrap();

    assert_eq!(std::fs::read(staged.path()).unwrap(), notice);
    assert_eq!(fetcher.client().requests_for(POLL_URL), 0);
}

#[tokio::test]
async fn deferred_result_is_polled_and_unwrapped() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new()
        .route(DATA_URL, [Reply::Body(deferred_notice("413", POLL_URL))])
        .route(
            POLL_URL,
            [
                Reply::NotFound,
                Reply::NotFound,
                Reply::Body(zip_of(&[("une_rt_m.sdmx.xml", PAYLOAD)])),
            ],
        );
    let fetcher = Fetcher::new(client, staging_dir.path()).with_policy(fast_policy());

    let staged = fetcher
        .fetch(DATA_URL, "une_rt_m", "_data.sdmx.xml")
        .await
        .unwrap();

    assert_eq!(std::fs::read(staged.path()).unwrap(), PAYLOAD);
    assert_eq!(fetcher.client().requests_for(POLL_URL), 3);
    // The archive is gone; only the payload remains staged.
    assert_eq!(staged_files(staging_dir.path()), 1);
}

#[tokio::test(start_paused = true)]
async fn poll_gives_up_after_sixty_attempts() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new().route(POLL_URL, [Reply::NotFound]);
    let fetcher = Fetcher::new(client, staging_dir.path());

    let started = tokio::time::Instant::now();
    let err = fetcher.poll(POLL_URL, "une_rt_m").await.unwrap_err();
    let waited = started.elapsed();

    assert!(
        matches!(err, Error::PollExhausted { attempts: 60, .. }),
        "{err}"
    );
    assert_eq!(fetcher.client().requests_for(POLL_URL), 60);
    assert!(waited >= Duration::from_secs(59 * 5), "{waited:?}");
    assert!(waited < Duration::from_secs(60 * 5), "{waited:?}");
    assert_eq!(staged_files(staging_dir.path()), 0);
}

#[tokio::test]
async fn poll_stops_on_other_failures() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new().route(
        POLL_URL,
        [Reply::NotFound, Reply::Fail("500 Internal Server Error".into())],
    );
    let fetcher = Fetcher::new(client, staging_dir.path()).with_policy(fast_policy());

    let err = fetcher.poll(POLL_URL, "une_rt_m").await.unwrap_err();

    assert!(matches!(err, Error::Network { .. }), "{err}");
    assert_eq!(fetcher.client().requests_for(POLL_URL), 2);
}

#[tokio::test]
async fn zero_attempts_fails_without_requests() {
    let staging_dir = TempDir::new().unwrap();
    let fetcher = Fetcher::new(ScriptedClient::new(), staging_dir.path())
        .with_policy(PollPolicy::default().max_attempts(0));

    let err = fetcher.poll(POLL_URL, "x").await.unwrap_err();

    assert!(matches!(err, Error::PollExhausted { attempts: 0, .. }));
    assert_eq!(fetcher.client().request_count(), 0);
}

#[tokio::test]
async fn initial_download_failure_is_fatal() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new().route(DATA_URL, [Reply::Fail("connection refused".into())]);
    let fetcher = Fetcher::new(client, staging_dir.path()).with_policy(fast_policy());

    let err = fetcher
        .fetch(DATA_URL, "une_rt_m", "_data.sdmx.xml")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network { .. }), "{err}");
    assert_eq!(fetcher.client().request_count(), 1);
    assert_eq!(staged_files(staging_dir.path()), 0);
}

#[tokio::test]
async fn truncated_body_is_fatal() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new().route(DATA_URL, [Reply::Truncated(PAYLOAD[..20].to_vec())]);
    let fetcher = Fetcher::new(client, staging_dir.path());

    let err = fetcher
        .fetch(DATA_URL, "une_rt_m", "_data.sdmx.xml")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network { .. }), "{err}");
    assert_eq!(staged_files(staging_dir.path()), 0);
}

#[tokio::test]
async fn empty_archive_is_corruption() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new()
        .route(DATA_URL, [Reply::Body(deferred_notice("413", POLL_URL))])
        .route(POLL_URL, [Reply::Body(zip_of(&[]))]);
    let fetcher = Fetcher::new(client, staging_dir.path()).with_policy(fast_policy());

    let err = fetcher
        .fetch(DATA_URL, "une_rt_m", "_data.sdmx.xml")
        .await
        .unwrap_err();

    assert!(err.is_malformed(), "{err}");
    assert_eq!(staged_files(staging_dir.path()), 0);
}

#[tokio::test]
async fn invalid_poll_url_is_malformed() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new()
        .route(DATA_URL, [Reply::Body(deferred_notice("413", "not a url"))]);
    let fetcher = Fetcher::new(client, staging_dir.path());

    let err = fetcher
        .fetch(DATA_URL, "une_rt_m", "_data.sdmx.xml")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Malformed { .. }), "{err}");
    assert_eq!(fetcher.client().request_count(), 1);
}

#[tokio::test]
async fn unparseable_response_is_malformed() {
    let staging_dir = TempDir::new().unwrap();
    let client = ScriptedClient::new()
        .route(DATA_URL, [Reply::Body(b"<message:Error><open></message:Error>".to_vec())]);
    let fetcher = Fetcher::new(client, staging_dir.path());

    let err = fetcher
        .fetch(DATA_URL, "une_rt_m", "_data.sdmx.xml")
        .await
        .unwrap_err();

    assert!(err.is_malformed(), "{err}");
}
