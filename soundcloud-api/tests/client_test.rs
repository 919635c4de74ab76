use pretty_assertions::assert_eq;
use soundcloud_api::ApiError;
use soundcloud_api::Pager;
use soundcloud_api::SoundCloudApi;
use soundcloud_api::TrackQuery;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

fn api_for(server: &MockServer) -> SoundCloudApi {
    SoundCloudApi::builder("test-client")
        .base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn every_request_carries_client_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks/42"))
        .and(query_param("client_id", "test-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 42,
            "title": "Night Drive",
            "user": {"id": 7, "username": "someone"},
            "waveform_url": "https://w1.sndcdn.com/x.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let track = api_for(&server).track("42").await.unwrap();

    assert_eq!(track.title.as_deref(), Some("Night Drive"));
    assert_eq!(track.user.unwrap().username.as_deref(), Some("someone"));
    assert!(track.extra.contains_key("waveform_url"));
}

#[tokio::test]
async fn token_is_sent_as_oauth_token_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(query_param("client_id", "test-client"))
        .and(query_param("oauth_token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "username": "me"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.set_token("tok-1");
    let me = api.me().await.unwrap();

    assert_eq!(me.username.as_deref(), Some("me"));
}

#[tokio::test]
async fn unauthorized_maps_to_dedicated_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("401 - Unauthorized"))
        .mount(&server)
        .await;

    let err = api_for(&server).me().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)), "got {err:?}");
}

#[tokio::test]
async fn other_failures_keep_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    match api_for(&server).user("9").await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn pager_parameters_reach_the_search_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks"))
        .and(query_param("q", "lofi"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "10"))
        .and(query_param("client_id", "test-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "title": "a"},
            {"id": 2, "title": "b"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = TrackQuery::builder().query("lofi").build();
    let mut pager = Pager::with_page_size(&query, 10);
    let tracks = api_for(&server)
        .search_tracks_with(pager.next())
        .await
        .unwrap();

    assert_eq!(tracks.len(), 2);
}
