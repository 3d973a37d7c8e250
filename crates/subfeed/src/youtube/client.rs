//! YouTube resource helper and `ChannelIndex` implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::convert::{to_followed_channel, to_item};
use super::error::YoutubeError;
use super::types::{
    ChannelListResponse, PlaylistItemListResponse, SubscriptionListResponse, VideoListResponse,
};
use crate::http::reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::remote::{self, ChannelIndex, ContainerRef, FollowedChannel};
use crate::retry::{RetryPolicy, with_retry};
use crate::sync::Item;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Page size for list endpoints (the API maximum).
pub const PAGE_SIZE: u32 = 50;

/// Upper bound on subscription pages followed in one listing.
pub const MAX_SUBSCRIPTION_PAGES: usize = 100;

/// How a request identifies itself to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Reads the signed-in user's data; needs the bearer token.
    User,
    /// Public data; uses the API key when one is configured.
    Public,
}

/// YouTube Data API client.
#[derive(Clone)]
pub struct YoutubeClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<String>,
    token: Option<String>,
    retry: RetryPolicy,
}

impl YoutubeClient {
    /// Create a client backed by reqwest with the default timeout.
    ///
    /// At least one of `api_key` or `token` must be present.
    pub fn new(api_key: Option<String>, token: Option<String>) -> Result<Self, YoutubeError> {
        let transport = ReqwestTransport::with_timeout(DEFAULT_TIMEOUT)
            .map_err(|e| YoutubeError::Config(e.to_string()))?;
        let client = Self::new_with_transport(Arc::new(transport))
            .with_api_key(api_key)
            .with_token(token);
        if client.api_key.is_none() && client.token.is_none() {
            return Err(YoutubeError::Config(
                "either an API key or an access token is required".to_string(),
            ));
        }
        Ok(client)
    }

    pub fn new_with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            token: None,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Build a GET request for `resource`, stamping either the bearer token or
    /// the API key.
    fn build_request(
        &self,
        resource: &str,
        params: &[(&str, &str)],
        access: Access,
    ) -> Result<HttpRequest, YoutubeError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, resource))
            .map_err(|e| YoutubeError::Config(format!("invalid base URL: {e}")))?;

        let bearer = match (access, &self.api_key, &self.token) {
            (Access::User, _, Some(token)) => Some(token),
            (Access::User, _, None) => {
                return Err(YoutubeError::Auth(format!(
                    "{resource} requires an access token"
                )));
            }
            (Access::Public, Some(_), _) => None,
            (Access::Public, None, Some(token)) => Some(token),
            (Access::Public, None, None) => {
                return Err(YoutubeError::Config(
                    "no API key or access token configured".to_string(),
                ));
            }
        };

        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
            if bearer.is_none()
                && let Some(key) = &self.api_key
            {
                query.append_pair("key", key);
            }
        }

        let mut request = HttpRequest::new(HttpMethod::Get, url.as_str())
            .with_header("Accept", "application/json")
            .with_header("User-Agent", "subfeed");
        if let Some(token) = bearer {
            request = request.with_header("Authorization", format!("Bearer {token}"));
        }
        Ok(request)
    }

    async fn send_once(&self, request: HttpRequest) -> Result<HttpResponse, YoutubeError> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(YoutubeError::from_response(response.status, &response.body));
        }
        Ok(response)
    }

    /// Issue a GET against `resource`, retrying per the configured policy.
    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
        access: Access,
    ) -> Result<T, YoutubeError> {
        let request = self.build_request(resource, params, access)?;
        tracing::debug!(resource, url = %request.url, "YouTube request");

        let response = with_retry(
            || {
                let request = request.clone();
                async move { self.send_once(request).await }
            },
            &self.retry,
            |e: &YoutubeError| e.status().is_some_and(|s| self.retry.is_retryable_status(s)),
            resource,
        )
        .await?;

        serde_json::from_slice(&response.body).map_err(YoutubeError::Json)
    }

    /// All subscriptions of the signed-in user, following `nextPageToken`.
    pub async fn list_subscriptions(&self) -> Result<Vec<FollowedChannel>, YoutubeError> {
        let page_size = PAGE_SIZE.to_string();
        let mut channels = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_SUBSCRIPTION_PAGES {
            let mut params = vec![
                ("part", "snippet"),
                ("mine", "true"),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response: SubscriptionListResponse =
                self.get("subscriptions", &params, Access::User).await?;
            tracing::debug!(page, count = response.items.len(), "Fetched subscription page");
            channels.extend(response.items.into_iter().filter_map(to_followed_channel));

            match response.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => return Ok(channels),
            }
        }

        tracing::warn!(
            pages = MAX_SUBSCRIPTION_PAGES,
            "Subscription listing truncated at page limit"
        );
        Ok(channels)
    }

    /// The uploads playlist of a channel.
    pub async fn uploads_playlist(&self, channel_id: &str) -> Result<String, YoutubeError> {
        let response: ChannelListResponse = self
            .get(
                "channels",
                &[("part", "contentDetails"), ("id", channel_id)],
                Access::Public,
            )
            .await?;

        response
            .items
            .into_iter()
            .find(|c| c.id == channel_id)
            .and_then(|c| c.content_details)
            .and_then(|d| d.related_playlists.uploads)
            .filter(|uploads| !uploads.is_empty())
            .ok_or_else(|| YoutubeError::ChannelNotFound(channel_id.to_string()))
    }

    /// Video ids on the first page of a playlist, newest first.
    pub async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>, YoutubeError> {
        let page_size = PAGE_SIZE.to_string();
        let response: PlaylistItemListResponse = self
            .get(
                "playlistItems",
                &[
                    ("part", "contentDetails"),
                    ("playlistId", playlist_id),
                    ("maxResults", page_size.as_str()),
                ],
                Access::Public,
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| item.content_details.video_id)
            .collect())
    }

    /// Details for a batch of videos in one request.
    pub async fn videos(&self, video_ids: &[String]) -> Result<Vec<Item>, YoutubeError> {
        if video_ids.is_empty() {
            return Err(YoutubeError::InvalidRequest(
                "video detail request with no ids".to_string(),
            ));
        }
        let ids = video_ids.join(",");
        let response: VideoListResponse = self
            .get("videos", &[("part", "snippet"), ("id", ids.as_str())], Access::Public)
            .await?;

        Ok(response.items.into_iter().map(to_item).collect())
    }
}

#[async_trait]
impl ChannelIndex for YoutubeClient {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn list_followed_channels(&self) -> remote::Result<Vec<FollowedChannel>> {
        Ok(self.list_subscriptions().await?)
    }

    async fn resolve_item_container(&self, channel_id: &str) -> remote::Result<ContainerRef> {
        Ok(ContainerRef::new(self.uploads_playlist(channel_id).await?))
    }

    async fn list_container_item_ids(&self, container: &ContainerRef) -> remote::Result<Vec<String>> {
        Ok(self.playlist_video_ids(container.as_str()).await?)
    }

    async fn fetch_item_details(&self, item_ids: &[String]) -> remote::Result<Vec<Item>> {
        Ok(self.videos(item_ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use crate::remote::RemoteError;
    use std::time::Duration;

    const BASE: &str = "https://yt.test/v3";

    fn client(transport: &MockTransport) -> YoutubeClient {
        YoutubeClient::new_with_transport(Arc::new(transport.clone()))
            .with_base_url(BASE)
            .with_api_key(Some("k".to_string()))
            .with_token(Some("tok".to_string()))
            .with_retry_policy(
                RetryPolicy::default().with_delays(Duration::from_millis(1), Duration::from_millis(1)),
            )
    }

    fn video_json(id: &str, published_at: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "snippet": {
                "publishedAt": published_at,
                "title": format!("Video {id}"),
                "description": "",
                "thumbnails": {"default": {"url": format!("https://i.ytimg.com/vi/{id}/default.jpg")}}
            }
        })
    }

    fn subscription_json(id: &str, title: &str) -> serde_json::Value {
        serde_json::json!({
            "snippet": {
                "title": title,
                "resourceId": {"kind": "youtube#channel", "channelId": id},
                "thumbnails": {"medium": {"url": format!("https://yt3.test/{id}.jpg")}}
            }
        })
    }

    #[test]
    fn test_youtube_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<YoutubeClient>();
    }

    #[test]
    fn test_with_base_url_trims_trailing_slashes() {
        let transport = MockTransport::new();
        let client = YoutubeClient::new_with_transport(Arc::new(transport))
            .with_base_url("https://yt.test/v3//");
        assert_eq!(client.base_url(), "https://yt.test/v3");
    }

    #[test]
    fn test_public_request_carries_key_not_bearer() {
        let transport = MockTransport::new();
        let request = client(&transport)
            .build_request("videos", &[("part", "snippet"), ("id", "a,b")], Access::Public)
            .expect("request");
        assert_eq!(request.url, format!("{BASE}/videos?part=snippet&id=a%2Cb&key=k"));
        assert!(request.header("authorization").is_none());
    }

    #[test]
    fn test_user_request_carries_bearer_not_key() {
        let transport = MockTransport::new();
        let request = client(&transport)
            .build_request("subscriptions", &[("part", "snippet"), ("mine", "true")], Access::User)
            .expect("request");
        assert_eq!(request.url, format!("{BASE}/subscriptions?part=snippet&mine=true"));
        assert_eq!(request.header("Authorization"), Some("Bearer tok"));
    }

    #[test]
    fn test_user_request_without_token_is_auth_error() {
        let transport = MockTransport::new();
        let client = client(&transport).with_token(None);
        let err = client
            .build_request("subscriptions", &[("mine", "true")], Access::User)
            .expect_err("token required");
        assert!(matches!(err, YoutubeError::Auth(_)));
        assert!(matches!(RemoteError::from(err), RemoteError::AuthRequired));
    }

    #[test]
    fn test_public_request_falls_back_to_bearer_without_key() {
        let transport = MockTransport::new();
        let client = client(&transport).with_api_key(None);
        let request = client
            .build_request("channels", &[("id", "UC1")], Access::Public)
            .expect("request");
        assert_eq!(request.url, format!("{BASE}/channels?id=UC1"));
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_list_subscriptions_follows_page_tokens() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/subscriptions?part=snippet&mine=true&maxResults=50"),
            200,
            serde_json::json!({
                "nextPageToken": "P2",
                "items": [subscription_json("UC1", "One"), subscription_json("UC2", "Two")]
            }),
        );
        transport.push_json(
            format!("{BASE}/subscriptions?part=snippet&mine=true&maxResults=50&pageToken=P2"),
            200,
            serde_json::json!({"items": [subscription_json("UC3", "Three")]}),
        );

        let channels = client(&transport).list_subscriptions().await.expect("subs");
        let ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["UC1", "UC2", "UC3"]);
        assert_eq!(channels[0].thumbnail, "https://yt3.test/UC1.jpg");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_uploads_playlist_resolves_related_playlist() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/channels?part=contentDetails&id=UC1&key=k"),
            200,
            serde_json::json!({
                "items": [{"id": "UC1", "contentDetails": {"relatedPlaylists": {"uploads": "UU1"}}}]
            }),
        );

        let container = client(&transport)
            .resolve_item_container("UC1")
            .await
            .expect("container");
        assert_eq!(container, ContainerRef::new("UU1"));
    }

    #[tokio::test]
    async fn test_uploads_playlist_missing_channel_is_not_found() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/channels?part=contentDetails&id=UCgone&key=k"),
            200,
            serde_json::json!({"items": []}),
        );

        let err = client(&transport)
            .resolve_item_container("UCgone")
            .await
            .expect_err("missing channel");
        assert!(matches!(err, RemoteError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_playlist_video_ids_reads_first_page_in_order() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/playlistItems?part=contentDetails&playlistId=UU1&maxResults=50&key=k"),
            200,
            serde_json::json!({
                "nextPageToken": "ignored",
                "items": [
                    {"contentDetails": {"videoId": "v3"}},
                    {"contentDetails": {"videoId": "v2"}},
                    {"contentDetails": {"videoId": "v1"}}
                ]
            }),
        );

        let ids = client(&transport)
            .list_container_item_ids(&ContainerRef::new("UU1"))
            .await
            .expect("ids");
        assert_eq!(ids, vec!["v3", "v2", "v1"]);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_item_details_joins_ids_into_one_request() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/videos?part=snippet&id=v1%2Cv2&key=k"),
            200,
            serde_json::json!({
                "items": [video_json("v1", "2024-01-01T00:00:00Z"), video_json("v2", "2024-01-02T00:00:00Z")]
            }),
        );

        let items = client(&transport)
            .fetch_item_details(&["v1".to_string(), "v2".to_string()])
            .await
            .expect("items");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, "v2");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_item_details_rejects_empty_id_set_without_sending() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .fetch_item_details(&[])
            .await
            .expect_err("empty set");
        assert!(matches!(err, RemoteError::InvalidRequest { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_retries_once_on_500_then_succeeds() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/playlistItems?part=contentDetails&playlistId=UU1&maxResults=50&key=k");
        transport.push_json(&url, 500, serde_json::json!({"error": {"code": 500, "message": "backendError"}}));
        transport.push_json(&url, 200, serde_json::json!({"items": [{"contentDetails": {"videoId": "v1"}}]}));

        let ids = client(&transport)
            .playlist_video_ids("UU1")
            .await
            .expect("second attempt succeeds");
        assert_eq!(ids, vec!["v1"]);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_get_gives_up_after_second_500() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/playlistItems?part=contentDetails&playlistId=UU1&maxResults=50&key=k");
        for _ in 0..3 {
            transport.push_json(&url, 500, serde_json::json!({"error": {"code": 500, "message": "backendError"}}));
        }

        let err = client(&transport)
            .playlist_video_ids("UU1")
            .await
            .expect_err("gives up");
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_get_does_not_retry_client_errors() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/playlistItems?part=contentDetails&playlistId=UU1&maxResults=50&key=k");
        transport.push_json(&url, 403, serde_json::json!({"error": {"code": 403, "message": "quotaExceeded"}}));

        let err = client(&transport)
            .list_container_item_ids(&ContainerRef::new("UU1"))
            .await
            .expect_err("403 is final");
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("quotaExceeded"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/channels?part=contentDetails&id=UC1&key=k"),
            200,
            serde_json::json!({"items": "not-a-list"}),
        );

        let err = client(&transport)
            .resolve_item_container("UC1")
            .await
            .expect_err("decode error");
        assert!(matches!(err, RemoteError::Decode { .. }));
    }
}
