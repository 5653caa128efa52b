//! Integration tests for srradio against a mocked upstream

use serde_json::json;
use srradio::{
    AggregatorSettings, ChannelFailurePolicy, Error, SongAggregator, SverigesRadioClient,
    TrafficFetcher,
};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a mock program index with one program per channel
fn mock_index_json(channels: &[i64]) -> serde_json::Value {
    let programs: Vec<serde_json::Value> = channels
        .iter()
        .map(|id| {
            json!({
                "id": id * 1000,
                "name": format!("Program {}", id),
                "programurl": "https://sverigesradio.se/",
                "channel": { "id": id, "name": format!("Channel {}", id) }
            })
        })
        .collect();

    json!({
        "copyright": "Copyright Sveriges Radio 2026. All rights reserved.",
        "programs": programs,
        "pagination": {
            "page": 1,
            "size": 10,
            "totalhits": channels.len(),
            "totalpages": 1
        }
    })
}

fn mock_song_json(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": format!("{} - Artist", title),
        "artist": "Artist",
        "composer": "Composer",
        "recordlabel": "Label",
        "starttimeutc": "/Date(1760000000000)/",
        "stoptimeutc": "/Date(1760000200000)/"
    })
}

fn client_for(server: &MockServer) -> SverigesRadioClient {
    SverigesRadioClient::builder()
        .base_url(format!("{}/api/v2", server.uri()))
        .build()
        .unwrap()
}

async fn mount_index(server: &MockServer, channels: &[i64]) {
    Mock::given(method("GET"))
        .and(path("/api/v2/programs/index"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_index_json(channels)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_right_now(server: &MockServer, channel: i64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v2/playlists/rightnow"))
        .and(query_param("channelid", channel.to_string().as_str()))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn sorted_titles(songs: &[srradio::Song]) -> Vec<String> {
    let mut titles: Vec<String> = songs.iter().filter_map(|s| s.title.clone()).collect();
    titles.sort();
    titles
}

#[tokio::test]
async fn test_current_and_previous_songs() {
    let mock_server = MockServer::start().await;
    mount_index(&mock_server, &[132, 164]).await;
    mount_right_now(
        &mock_server,
        132,
        json!({ "playlist": { "song": mock_song_json("A") } }),
    )
    .await;
    mount_right_now(
        &mock_server,
        164,
        json!({ "playlist": { "song": null, "previoussong": mock_song_json("B") } }),
    )
    .await;

    let aggregator = SongAggregator::with_defaults(client_for(&mock_server));
    let songs = aggregator.aggregate_songs().await.unwrap();

    assert_eq!(songs.len(), 2);
    assert_eq!(sorted_titles(&songs), vec!["A", "B"]);
    assert!(songs.iter().all(|s| s.recordlabel.as_deref() == Some("Label")));
}

#[tokio::test]
async fn test_seven_channels_two_batches() {
    let mock_server = MockServer::start().await;
    let channels: Vec<i64> = (1..=7).collect();
    mount_index(&mock_server, &channels).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/playlists/rightnow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "playlist": { "song": mock_song_json("X") } })),
        )
        .expect(7)
        .mount(&mock_server)
        .await;

    let aggregator = SongAggregator::with_defaults(client_for(&mock_server));
    let aggregate = aggregator.aggregate().await.unwrap();

    assert_eq!(aggregate.batches, 2);
    assert_eq!(aggregate.songs.len(), 7);
    assert!(aggregate.failed_channels.is_empty());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_silent_channel_contributes_nothing() {
    let mock_server = MockServer::start().await;
    mount_index(&mock_server, &[1, 2]).await;
    mount_right_now(&mock_server, 1, json!({ "playlist": { "song": mock_song_json("A") } })).await;
    mount_right_now(
        &mock_server,
        2,
        json!({ "playlist": { "song": null, "previoussong": null } }),
    )
    .await;

    let aggregator = SongAggregator::with_defaults(client_for(&mock_server));
    let songs = aggregator.aggregate_songs().await.unwrap();

    assert_eq!(sorted_titles(&songs), vec!["A"]);
}

#[tokio::test]
async fn test_failing_channel_is_skipped_by_default() {
    let mock_server = MockServer::start().await;
    mount_index(&mock_server, &[1, 2, 3]).await;
    mount_right_now(&mock_server, 1, json!({ "playlist": { "song": mock_song_json("A") } })).await;
    mount_right_now(&mock_server, 3, json!({ "playlist": { "song": mock_song_json("C") } })).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/playlists/rightnow"))
        .and(query_param("channelid", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let aggregator = SongAggregator::with_defaults(client_for(&mock_server));
    let aggregate = aggregator.aggregate().await.unwrap();

    assert_eq!(sorted_titles(&aggregate.songs), vec!["A", "C"]);
    assert_eq!(aggregate.failed_channels, vec![2]);
}

#[tokio::test]
async fn test_failing_channel_aborts_when_configured() {
    let mock_server = MockServer::start().await;
    mount_index(&mock_server, &[1, 2, 3]).await;
    mount_right_now(&mock_server, 1, json!({ "playlist": { "song": mock_song_json("A") } })).await;
    mount_right_now(&mock_server, 3, json!({ "playlist": { "song": mock_song_json("C") } })).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/playlists/rightnow"))
        .and(query_param("channelid", "2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let settings = AggregatorSettings {
        channel_failure: ChannelFailurePolicy::Abort,
        ..Default::default()
    };
    let aggregator = SongAggregator::new(client_for(&mock_server), settings);
    let err = aggregator.aggregate().await.unwrap_err();

    match err {
        Error::ChannelFetch { channel, source } => {
            assert_eq!(channel, 2);
            assert!(matches!(*source, Error::UpstreamStatus { status, .. } if status.as_u16() == 404));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_index_status_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/programs/index"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let aggregator = SongAggregator::with_defaults(client_for(&mock_server));
    let err = aggregator.aggregate().await.unwrap_err();

    match &err {
        Error::UpstreamStatus { status, url } => {
            assert_eq!(status.as_u16(), 503);
            assert!(url.contains("/api/v2/programs/index"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_malformed_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/traffic/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.traffic_messages().await.unwrap_err();

    assert!(matches!(err, Error::MalformedBody { .. }));
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_strict_typing_is_malformed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/programs/index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "programs": [ { "channel": { "id": "132" } } ]
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).channel_index().await.unwrap_err();
    assert!(matches!(err, Error::MalformedBody { .. }));
}

#[tokio::test]
async fn test_connection_refused() {
    // Reserve a port, then free it so nothing listens there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = SverigesRadioClient::builder()
        .base_url(format!("http://127.0.0.1:{}/api/v2", port))
        .build()
        .unwrap();

    let err = client.channel_index().await.unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable(_)));
    assert!(err.is_upstream());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_upstream_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/traffic/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "messages": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = SverigesRadioClient::builder()
        .base_url(format!("{}/api/v2", mock_server.uri()))
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = client.traffic_messages().await.unwrap_err();
    assert!(err.is_timeout());
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_traffic_messages() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/traffic/messages"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "copyright": "Copyright Sveriges Radio 2026. All rights reserved.",
            "messages": [
                { "id": 2, "title": "T2", "description": "D2", "category": "C", "priority": 5,
                  "exactlocation": "E4", "latitude": 59.3, "longitude": 18.0 },
                { "id": 1, "title": "T1", "description": "D", "category": "C", "priority": 1 }
            ]
        })))
        .mount(&mock_server)
        .await;

    let fetcher = TrafficFetcher::new(client_for(&mock_server));
    let messages = fetcher.latest_messages().await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, 2);
    assert_eq!(messages[1].title.as_deref(), Some("T1"));
    assert_eq!(messages[1].priority, 1);
}

#[tokio::test]
async fn test_null_traffic_messages() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/traffic/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": null })))
        .mount(&mock_server)
        .await;

    let fetcher = TrafficFetcher::new(client_for(&mock_server));
    assert!(fetcher.latest_messages().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_follow_pagination() {
    let mock_server = MockServer::start().await;

    let page = |ids: &[i64], page: u32| {
        let mut body = mock_index_json(ids);
        body["pagination"] = json!({ "page": page, "size": 2, "totalhits": 5, "totalpages": 3 });
        body
    };

    Mock::given(method("GET"))
        .and(path("/api/v2/programs/index"))
        .and(query_param("size", "2"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[1, 2], 1)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/programs/index"))
        .and(query_param("size", "2"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[3, 4], 2)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/programs/index"))
        .and(query_param("size", "2"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[5], 3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SverigesRadioClient::builder()
        .base_url(format!("{}/api/v2", mock_server.uri()))
        .follow_pagination(true)
        .index_page_size(Some(2))
        .build()
        .unwrap();

    let index = client.channel_index().await.unwrap();
    assert_eq!(index.channel_ids(), vec![1, 2, 3, 4, 5]);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_single_page_by_default() {
    let mock_server = MockServer::start().await;

    let mut body = mock_index_json(&[1, 2]);
    body["pagination"]["totalpages"] = json!(4);
    Mock::given(method("GET"))
        .and(path("/api/v2/programs/index"))
        .and(query_param_is_missing("page"))
        .and(query_param_is_missing("size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let index = client_for(&mock_server).channel_index().await.unwrap();
    assert_eq!(index.channel_ids(), vec![1, 2]);

    mock_server.verify().await;
}
