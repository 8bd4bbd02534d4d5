//! Wiremock tests for [`StoreConnection`] and the Data API wire protocol.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jukebox::cache::{CacheConfig, MemoCache, Ttl};
use jukebox::store::{LEADERBOARD_COLLECTION, SONGS_COLLECTION};
use jukebox::{
    Document, InsertAck, InsertPayload, JukeboxError, LeaderboardEntry, SongRecord, StaticSecrets,
    StoreConfig, StoreConnection,
};

fn store_with(server: &MockServer) -> StoreConnection {
    let config = StoreConfig {
        endpoint: Some(server.uri()),
        api_key: Some("test-key".into()),
        data_source: Some("test-cluster".into()),
        database: Some("quiz".into()),
    };
    StoreConnection::new(
        config,
        Arc::new(StaticSecrets::new()),
        Arc::new(MemoCache::new(&CacheConfig::new())),
    )
}

fn song_documents() -> serde_json::Value {
    json!({
        "documents": [
            { "_id": "65f01", "song": "Go Your Own Way", "artist": "Fleetwood Mac",
              "chart_name": "70s-rock", "id": "4xh1" },
            { "_id": "65f02", "song": "Dream On", "artist": "Aerosmith",
              "chart_name": "70s-rock", "id": "5kq2" }
        ]
    })
}

// =========================================================================
// query
// =========================================================================

#[tokio::test]
async fn query_returns_matching_documents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(header("api-key", "test-key"))
        .and(body_partial_json(json!({
            "dataSource": "test-cluster",
            "database": "quiz",
            "collection": "musicgen",
            "filter": { "chart_name": { "$in": ["70s-rock"] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(song_documents()))
        .mount(&server)
        .await;

    let store = store_with(&server);
    let documents = store
        .query(
            SONGS_COLLECTION,
            json!({ "chart_name": { "$in": ["70s-rock"] } }),
            json!({ "song": 1, "artist": 1, "chart_name": 1, "id": 1 }),
            Ttl::DEFAULT,
        )
        .await
        .unwrap();

    assert_eq!(documents.len(), 2);
    assert!(
        documents
            .iter()
            .all(|doc| doc.get("chart_name") == Some(&json!("70s-rock")))
    );

    let record = SongRecord::try_from(documents[0].clone()).unwrap();
    assert_eq!(record.artist, "Fleetwood Mac");
}

#[tokio::test]
async fn repeated_query_within_ttl_hits_the_store_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .respond_with(ResponseTemplate::new(200).set_body_json(song_documents()))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(&server);
    let filter = json!({ "chart_name": { "$in": ["70s-rock"] } });
    let projection = json!({ "song": 1, "artist": 1, "chart_name": 1, "id": 1 });

    let first = store
        .query(SONGS_COLLECTION, filter.clone(), projection.clone(), Ttl::DEFAULT)
        .await
        .unwrap();
    let second = store
        .query(SONGS_COLLECTION, filter, projection, Ttl::DEFAULT)
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn zero_matches_is_an_empty_sequence_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
        .mount(&server)
        .await;

    let store = store_with(&server);
    let documents = store
        .query(
            SONGS_COLLECTION,
            json!({ "chart_name": { "$in": [] } }),
            json!({}),
            Ttl::DEFAULT,
        )
        .await
        .unwrap();

    assert!(documents.is_empty());
}

// =========================================================================
// aggregate / distinct
// =========================================================================

#[tokio::test]
async fn aggregate_sends_pipeline_and_caches_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .and(body_partial_json(json!({
            "collection": "leaderboard",
            "pipeline": [
                { "$match": { "mode": "rock from the 70s" } },
                { "$sort": { "score": -1 } },
                { "$limit": 15 },
                { "$project": { "name": 1, "score": 1 } }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                { "_id": "l1", "name": "ana", "score": 840 },
                { "_id": "l2", "name": "bo", "score": 560 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(&server);
    let pipeline = vec![
        json!({ "$match": { "mode": "rock from the 70s" } }),
        json!({ "$sort": { "score": -1 } }),
        json!({ "$limit": 15 }),
        json!({ "$project": { "name": 1, "score": 1 } }),
    ];

    let first = store
        .aggregate(LEADERBOARD_COLLECTION, pipeline.clone(), Ttl::DEFAULT)
        .await
        .unwrap();
    let second = store
        .aggregate(LEADERBOARD_COLLECTION, pipeline, Ttl::DEFAULT)
        .await
        .unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].get("name"), Some(&json!("ana")));
    assert_eq!(first, second);
}

#[tokio::test]
async fn distinct_groups_on_the_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .and(body_partial_json(json!({
            "collection": "musicgen",
            "pipeline": [{ "$group": { "_id": "$am_genre" } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{ "_id": "rock" }, { "_id": "pop" }, { "_id": "rock" }]
        })))
        .mount(&server)
        .await;

    let store = store_with(&server);
    let genres = store
        .distinct(SONGS_COLLECTION, "am_genre", Ttl::DEFAULT)
        .await
        .unwrap();

    // Canonical order, duplicates collapsed.
    assert_eq!(genres, vec![json!("pop"), json!("rock")]);
}

// =========================================================================
// insert
// =========================================================================

#[tokio::test]
async fn single_record_routes_to_insert_one() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({
            "collection": "leaderboard",
            "document": { "name": "ana", "score": 840 }
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "insertedId": "65f99" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(&server);
    let entry = LeaderboardEntry::new("ana", 840, "rock from the 70s");
    let payload = InsertPayload::try_from(entry).unwrap();

    let ack = store.insert(LEADERBOARD_COLLECTION, payload).await.unwrap();
    assert_eq!(
        ack,
        InsertAck::Single {
            inserted_id: "65f99".into()
        }
    );
    assert_eq!(ack.inserted_count(), 1);
}

#[tokio::test]
async fn record_sequence_routes_to_insert_many() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/insertMany"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "insertedIds": ["65fa0", "65fa1"] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(&server);
    let documents: Vec<Document> = vec![
        Document::try_from(json!({ "name": "ana", "score": 840 })).unwrap(),
        Document::try_from(json!({ "name": "bo", "score": 560 })).unwrap(),
    ];

    let ack = store.insert(LEADERBOARD_COLLECTION, documents).await.unwrap();
    assert_eq!(ack.inserted_count(), 2);
}

#[tokio::test]
async fn scalar_insert_is_a_type_error_before_any_traffic() {
    let server = MockServer::start().await;
    // No mocks mounted: a type error must never reach the wire.

    let store = store_with(&server);
    let err = store
        .insert_value(LEADERBOARD_COLLECTION, json!(42))
        .await
        .unwrap_err();

    assert!(matches!(err, JukeboxError::InvalidInput(_)));
}

#[tokio::test]
async fn insert_is_never_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "insertedId": "65f99" })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let store = store_with(&server);
    let document = Document::try_from(json!({ "name": "ana", "score": 840 })).unwrap();

    store
        .insert(LEADERBOARD_COLLECTION, document.clone())
        .await
        .unwrap();
    store.insert(LEADERBOARD_COLLECTION, document).await.unwrap();
}

// =========================================================================
// Failure propagation
// =========================================================================

#[tokio::test]
async fn server_failure_is_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/find"))
        .respond_with(ResponseTemplate::new(200).set_body_json(song_documents()))
        .mount(&server)
        .await;

    let store = store_with(&server);
    let filter = json!({ "chart_name": { "$in": ["70s-rock"] } });

    let err = store
        .query(SONGS_COLLECTION, filter.clone(), json!({}), Ttl::DEFAULT)
        .await
        .unwrap_err();
    assert!(matches!(err, JukeboxError::Api { status: 500, .. }));

    // The failure was not remembered; the retry reaches the store.
    let documents = store
        .query(SONGS_COLLECTION, filter, json!({}), Ttl::DEFAULT)
        .await
        .unwrap();
    assert_eq!(documents.len(), 2);
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = store_with(&server);
    let err = store
        .query(SONGS_COLLECTION, json!({}), json!({}), Ttl::DEFAULT)
        .await
        .unwrap_err();

    assert!(matches!(err, JukeboxError::AuthenticationFailed));
}
