//! Command implementations.

use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use kennel_client::{
    Debouncer, FROM_PARAM, FetchOutcome, GALLERY_PARAMS, Gallery, History, IMAGE_PARAM, MemoryHistory, QueryState,
    SEARCH_PARAM, filter_breeds, selected_image,
};
use kennel_core::{CacheDb, ExpiringStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

const GALLERY_ROOT: &str = "kennel://gallery/";

/// Open the cache at `path`, degrading to an in-memory cache if it cannot be opened.
pub async fn open_store(path: &Path) -> Result<ExpiringStore> {
    let db = match CacheDb::open(path).await {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cache unavailable, using an in-memory cache");
            CacheDb::open_in_memory().await?
        }
    };
    Ok(ExpiringStore::new(db))
}

pub async fn breeds(gallery: &Gallery, search: Option<&str>) -> Result<()> {
    let breeds = report(gallery.breeds().await)?;
    let matches = filter_breeds(&breeds, search.unwrap_or_default());

    if matches.is_empty() {
        println!("No breeds found.");
    }
    for breed in matches {
        println!("{breed}");
    }
    Ok(())
}

pub async fn images(gallery: &Gallery, breed: &str, image: Option<usize>) -> Result<()> {
    let images = report(gallery.breed_images(breed).await)?;

    let query = QueryState::new(MemoryHistory::new(breed_url(breed, image)?), GALLERY_PARAMS);
    let selected = selected_image(query.params(), images.len());
    if let (Some(index), None) = (image, selected) {
        eprintln!("Image {index} is out of range; {} images available.", images.len());
    }

    for (index, url) in images.iter().enumerate() {
        let marker = if Some(index) == selected { '*' } else { ' ' };
        println!("{marker} {index:>3} {url}");
    }
    println!("\n{}", query.history().location());
    Ok(())
}

/// Each stdin line replaces the search box contents.
pub async fn browse(gallery: &Gallery, quiet: Duration) -> Result<()> {
    let breeds = report(gallery.breeds().await)?;

    let history = MemoryHistory::new(Url::parse(GALLERY_ROOT)?);
    let mut query = QueryState::new(history, GALLERY_PARAMS);
    let debouncer = Debouncer::new(query.get(SEARCH_PARAM).unwrap_or_default().to_string(), quiet);
    let mut settled = debouncer.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render_search(&breeds, &query);

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => debouncer.push(line.trim().to_string()),
                None => break,
            },
            changed = settled.changed() => {
                if changed.is_err() {
                    break;
                }
                let term = settled.borrow_and_update().clone();
                apply_search(&mut query, &breeds, &term)?;
            }
        }
    }

    // Input closed: give the last line its quiet period before exiting.
    if let Ok(Ok(())) = tokio::time::timeout(quiet * 2, settled.changed()).await {
        let term = settled.borrow_and_update().clone();
        apply_search(&mut query, &breeds, &term)?;
    }
    Ok(())
}

pub async fn cache_purge(store: &ExpiringStore) -> Result<()> {
    let removed = store.purge_expired().await?;
    println!("Purged {removed} expired record{}.", if removed == 1 { "" } else { "s" });
    Ok(())
}

pub async fn cache_clear(store: &ExpiringStore) -> Result<()> {
    let removed = store.clear().await?;
    println!("Cleared {removed} record{}.", if removed == 1 { "" } else { "s" });
    Ok(())
}

fn apply_search(query: &mut QueryState<MemoryHistory>, breeds: &[String], term: &str) -> Result<()> {
    if query.update(SEARCH_PARAM, Some(term))? {
        let reconciled = query.on_location_changed();
        tracing::debug!(?reconciled, revision = query.revision(), "search param written");
    }
    render_search(breeds, query);
    Ok(())
}

fn render_search(breeds: &[String], query: &QueryState<MemoryHistory>) {
    let term = query.get(SEARCH_PARAM).unwrap_or_default();
    let matches = filter_breeds(breeds, term);
    println!("-- {} ({} of {} breeds)", query.history().location(), matches.len(), breeds.len());
    for breed in matches {
        println!("   {breed}");
    }
}

/// Location of a breed page reached from the breed list.
fn breed_url(breed: &str, image: Option<usize>) -> Result<Url> {
    let mut url = Url::parse(GALLERY_ROOT)?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(["breed", breed]);
    }
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair(FROM_PARAM, SEARCH_PARAM);
        if let Some(index) = image {
            pairs.append_pair(IMAGE_PARAM, &index.to_string());
        }
    }
    Ok(url)
}

/// Print any advisory and unwrap the data, or fail with a friendly message.
fn report<T>(outcome: FetchOutcome<T>) -> Result<T> {
    if let Some(advisory) = outcome.advisory() {
        eprintln!("{advisory}");
    }
    match outcome {
        FetchOutcome::Fresh(data) | FetchOutcome::Stale { data, .. } => Ok(data),
        FetchOutcome::Unavailable(err) => {
            tracing::debug!(error = %err, "no data available");
            bail!("{}", err.friendly_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kennel_client::NetworkStatus;
    use kennel_core::{AppConfig, CacheKey, Error};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_unopenable_cache_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/breeds/list/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "message": {"affenpinscher": [], "akita": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = open_store(Path::new("/nonexistent_dir/kennel/x.sqlite")).await.unwrap();
        let config = AppConfig { api_base_url: format!("{}/api", server.uri()), ..Default::default() };
        let gallery = Gallery::new(&config, store.clone(), NetworkStatus::fixed(true)).unwrap();

        breeds(&gallery, Some("ak")).await.unwrap();
        assert_eq!(
            store.get::<Vec<String>>(&CacheKey::breed_list()).await,
            Some(vec!["affenpinscher".to_string(), "akita".to_string()])
        );
    }

    #[test]
    fn test_breed_url() {
        let url = breed_url("akita", Some(3)).unwrap();
        assert_eq!(url.as_str(), "kennel://gallery/breed/akita?from=search&image=3");

        let url = breed_url("akita", None).unwrap();
        assert_eq!(url.query(), Some("from=search"));
    }

    #[test]
    fn test_report_stale_returns_data() {
        let outcome = FetchOutcome::Stale { data: 7, cause: Error::Offline("x".into()) };
        assert_eq!(report(outcome).unwrap(), 7);
    }

    #[test]
    fn test_report_unavailable_is_friendly() {
        let outcome: FetchOutcome<()> = FetchOutcome::Unavailable(Error::Offline("no fresh data".into()));
        let err = report(outcome).unwrap_err();
        assert_eq!(err.to_string(), Error::Offline(String::new()).friendly_message());
    }
}
