use crate::models::TrendingVideo;
use crate::utils::{parse_iso8601, provider_error_message};
use anyhow::Result;
use log::info;
use reqwest::Client;
use serde_json::Value;
use url::Url;

const YOUTUBE_VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Upper bound the YouTube API allows for one page of `videos.list`.
pub const TRENDING_BATCH_SIZE: u32 = 50;

/// Source of the most popular videos for a region.
#[rocket::async_trait]
pub trait VideoProvider: Send + Sync {
    async fn fetch_trending(&self) -> Result<Vec<TrendingVideo>>;
}

pub struct YouTubeClient {
    client: Client,
    endpoint: String,
    api_key: String,
    region_code: String,
}

impl YouTubeClient {
    pub fn new(client: Client, api_key: String, region_code: String) -> Self {
        YouTubeClient {
            client,
            endpoint: YOUTUBE_VIDEOS_ENDPOINT.to_string(),
            api_key,
            region_code,
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    fn trending_url(&self) -> Result<Url> {
        let max_results = TRENDING_BATCH_SIZE.to_string();
        // Documentation: https://developers.google.com/youtube/v3/docs/videos/list
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("key", self.api_key.as_str()),
                ("part", "snippet"),
                ("chart", "mostPopular"),
                ("maxResults", max_results.as_str()),
                ("regionCode", self.region_code.as_str()),
            ],
        )?;
        Ok(url)
    }
}

#[rocket::async_trait]
impl VideoProvider for YouTubeClient {
    async fn fetch_trending(&self) -> Result<Vec<TrendingVideo>> {
        let response = self.client.get(self.trending_url()?).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "YouTube API request failed with status {}: {}",
                status,
                provider_error_message(&body)
            ));
        }

        let videos = parse_trending_response(&serde_json::from_str::<Value>(&body)?);
        info!(
            "Fetched {} trending videos for region {}",
            videos.len(),
            self.region_code
        );
        Ok(videos)
    }
}

pub fn parse_trending_response(response: &Value) -> Vec<TrendingVideo> {
    let Some(items) = response["items"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let video_id = item["id"].as_str().filter(|id| !id.is_empty())?;
            let snippet = &item["snippet"];
            let thumbnails = &snippet["thumbnails"];

            Some(TrendingVideo {
                video_id: video_id.to_string(),
                title: snippet["title"].as_str().unwrap_or("").to_string(),
                description: snippet["description"].as_str().unwrap_or("").to_string(),
                thumbnail: thumbnails["medium"]["url"]
                    .as_str()
                    .or_else(|| thumbnails["default"]["url"].as_str())
                    .unwrap_or("")
                    .to_string(),
                published_at: snippet["publishedAt"].as_str().and_then(parse_iso8601),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    /// Answers a single request on a local port with a canned HTTP response.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 4096];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{address}/youtube/v3/videos")
    }

    fn client_for(endpoint: &str, timeout: Duration) -> YouTubeClient {
        let http = Client::builder().timeout(timeout).build().unwrap();
        YouTubeClient::new(http, "k3y".to_string(), "US".to_string()).with_endpoint(endpoint)
    }

    #[test]
    fn maps_snippet_fields() {
        let response = json!({
            "kind": "youtube#videoListResponse",
            "items": [{
                "id": "dQw4w9WgXcQ",
                "snippet": {
                    "publishedAt": "2009-10-25T06:57:33Z",
                    "title": "Never Gonna Give You Up",
                    "description": "The official video",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg" },
                        "medium": { "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/mqdefault.jpg" }
                    }
                }
            }]
        });

        let videos = parse_trending_response(&response);
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "dQw4w9WgXcQ");
        assert_eq!(videos[0].title, "Never Gonna Give You Up");
        assert_eq!(videos[0].description, "The official video");
        assert_eq!(
            videos[0].thumbnail,
            "https://i.ytimg.com/vi/dQw4w9WgXcQ/mqdefault.jpg"
        );
        assert_eq!(
            videos[0].published_at,
            parse_iso8601("2009-10-25T06:57:33Z")
        );
    }

    #[test]
    fn tolerates_sparse_items() {
        let response = json!({
            "items": [
                { "snippet": { "title": "no id" } },
                {
                    "id": "abc",
                    "snippet": {
                        "title": "only default thumb",
                        "publishedAt": "not a date",
                        "thumbnails": { "default": { "url": "https://example.com/d.jpg" } }
                    }
                },
                { "id": "bare" }
            ]
        });

        let videos = parse_trending_response(&response);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].thumbnail, "https://example.com/d.jpg");
        assert!(videos[0].published_at.is_none());
        assert_eq!(videos[1].video_id, "bare");
        assert_eq!(videos[1].title, "");
        assert_eq!(videos[1].thumbnail, "");
    }

    #[test]
    fn missing_items_yield_empty_batch() {
        assert!(parse_trending_response(&json!({})).is_empty());
    }

    #[test]
    fn trending_url_requests_most_popular_for_region() {
        let client = YouTubeClient::new(Client::new(), "k3y".to_string(), "DE".to_string());
        let url = client.trending_url().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("www.googleapis.com"));
        assert!(pairs.contains(&("chart".to_string(), "mostPopular".to_string())));
        assert!(pairs.contains(&("maxResults".to_string(), "50".to_string())));
        assert!(pairs.contains(&("regionCode".to_string(), "DE".to_string())));
        assert!(pairs.contains(&("key".to_string(), "k3y".to_string())));
    }

    #[tokio::test]
    async fn non_json_error_body_keeps_http_status() {
        let endpoint = serve_once(
            "HTTP/1.1 502 Bad Gateway\r\nContent-Type: text/html\r\nContent-Length: 22\r\nConnection: close\r\n\r\n<h1>Bad Gateway</h1>\r\n",
        );
        let client = client_for(&endpoint, Duration::from_secs(5));

        let err = client.fetch_trending().await.unwrap_err().to_string();
        assert!(err.contains("502"), "{err}");
        assert!(err.contains("<h1>Bad Gateway</h1>"), "{err}");
    }

    #[tokio::test]
    async fn google_error_message_is_surfaced() {
        let endpoint = serve_once(
            "HTTP/1.1 403 Forbidden\r\nContent-Type: application/json\r\nContent-Length: 41\r\nConnection: close\r\n\r\n{\"error\":{\"code\":403,\"message\":\"quota!\"}}",
        );
        let client = client_for(&endpoint, Duration::from_secs(5));

        let err = client.fetch_trending().await.unwrap_err().to_string();
        assert!(err.contains("403"), "{err}");
        assert!(err.ends_with("quota!"), "{err}");
    }

    #[tokio::test]
    async fn unresponsive_upstream_times_out_as_error() {
        // Accepts connections into the backlog but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/youtube/v3/videos", listener.local_addr().unwrap());
        let client = client_for(&endpoint, Duration::from_millis(200));

        let err = client.fetch_trending().await.unwrap_err();
        let timed_out = err
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_timeout);
        assert!(timed_out, "{err:?}");
        drop(listener);
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let address = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let client = client_for(
            &format!("http://{address}/youtube/v3/videos"),
            Duration::from_millis(200),
        );

        assert!(client.fetch_trending().await.is_err());
    }
}
