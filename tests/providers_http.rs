//! Provider tests against a local mock HTTP server: happy paths plus the
//! degrade-and-continue behavior when one channel is down.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trend_radar::ai::gemini::GeminiGenerator;
use trend_radar::ai::IdeaGenerator;
use trend_radar::ingest::cultural::CulturalTrendsCollector;
use trend_radar::ingest::providers::instagram::InstagramProfileProvider;
use trend_radar::ingest::providers::reddit::RedditHotProvider;
use trend_radar::ingest::providers::tiktok::TiktokHashtagProvider;
use trend_radar::ingest::types::SourceProvider;
use trend_radar::Post;

const REDDIT_HOT: &str = include_str!("fixtures/reddit_hot.xml");

#[tokio::test]
async fn reddit_provider_fetches_and_ranks_a_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/HomeCooking/hot.rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REDDIT_HOT))
        .mount(&server)
        .await;

    let provider =
        RedditHotProvider::with_base_url(server.uri(), vec!["HomeCooking".to_string()], 15)
            .unwrap();
    let posts = provider.fetch_latest().await.unwrap();

    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].id, "h0t001");
    assert_eq!(posts[0].rank, Some(1));
    assert_eq!(posts[2].rank, Some(3));
    assert_eq!(posts[0].channel, "r/HomeCooking");
    assert_eq!(posts[0].views, 0);
}

#[tokio::test]
async fn reddit_provider_skips_a_dead_subreddit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/HomeCooking/hot.rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REDDIT_HOT))
        .mount(&server)
        .await;
    // /r/Gone/hot.rss is unmounted and 404s.

    let provider = RedditHotProvider::with_base_url(
        server.uri(),
        vec!["Gone".to_string(), "HomeCooking".to_string()],
        15,
    )
    .unwrap();
    let posts = provider.fetch_latest().await.unwrap();
    assert_eq!(posts.len(), 3);
}

#[tokio::test]
async fn tiktok_provider_parses_item_lists() {
    let body = r#"{
        "itemList": [
            {
                "id": "7301",
                "desc": "cheap dinner hack for the family",
                "createTime": 1756100000,
                "author": {"uniqueId": "homechef"},
                "stats": {"diggCount": 5200, "commentCount": 310, "playCount": 88000}
            }
        ]
    }"#;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/challenge/item_list/"))
        .and(query_param("challengeName", "homecooking"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let provider =
        TiktokHashtagProvider::with_base_url(server.uri(), vec!["homecooking".to_string()], 15)
            .unwrap();
    let posts = provider.fetch_latest().await.unwrap();

    assert_eq!(posts.len(), 1);
    let p = &posts[0];
    assert_eq!(p.id, "7301");
    assert_eq!(p.likes, 5200);
    assert_eq!(p.comments, 310);
    assert_eq!(p.views, 88000);
    assert_eq!(p.channel, "@homechef");
    assert_eq!(
        p.url.as_deref(),
        Some("https://www.tiktok.com/@homechef/video/7301")
    );
}

#[tokio::test]
async fn instagram_provider_parses_profile_media() {
    let body = r#"{
        "data": {"user": {"edge_owner_to_timeline_media": {"edges": [
            {"node": {
                "shortcode": "Cxy123",
                "taken_at_timestamp": 1756100000,
                "edge_liked_by": {"count": 4100},
                "edge_media_to_comment": {"count": 95},
                "video_view_count": 60000,
                "edge_media_to_caption": {"edges": [{"node": {"text": "family dinner, simple and cheap"}}]}
            }}
        ]}}}
    }"#;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .and(query_param("username", "tasty"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let provider =
        InstagramProfileProvider::with_base_url(server.uri(), vec!["tasty".to_string()], 15)
            .unwrap();
    let posts = provider.fetch_latest().await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "Cxy123");
    assert_eq!(posts[0].likes, 4100);
    assert_eq!(posts[0].views, 60000);
}

#[tokio::test]
async fn cultural_collector_merges_all_sources() {
    let reddit = MockServer::start().await;
    let listing = r#"{"data": {"children": [
        {"data": {"title": "Huge final tonight", "subreddit": "sports", "ups": 90000}}
    ]}}"#;
    for p in ["/r/all.json", "/r/sports.json", "/r/movies.json"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing))
            .mount(&reddit)
            .await;
    }

    let trends = MockServer::start().await;
    let rss = r#"<rss xmlns:ht="https://trends.google.com/trends/trendingsearches/daily" version="2.0">
  <channel><item><title>labor day recipes</title><ht:approx_traffic>200,000+</ht:approx_traffic></item></channel>
</rss>"#;
    Mock::given(method("GET"))
        .and(path("/trends/trendingsearches/daily/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss))
        .mount(&trends)
        .await;

    let collector = CulturalTrendsCollector::with_base_urls(reddit.uri(), trends.uri()).unwrap();
    let events = collector.fetch().await;

    assert_eq!(events.len(), 4);
    assert!(events.iter().any(|e| e.event_type == "google_trend"));
    assert!(events.iter().any(|e| e.event_type == "sports"));
}

#[tokio::test]
async fn cultural_collector_survives_a_down_endpoint() {
    let reddit = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/all.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data": {"children": [{"data": {"title": "still here", "subreddit": "all", "ups": 10}}]}}"#,
        ))
        .mount(&reddit)
        .await;
    // sports/movies/trends all 404.

    let collector = CulturalTrendsCollector::with_base_urls(reddit.uri(), reddit.uri()).unwrap();
    let events = collector.fetch().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_name, "still here");
}

#[tokio::test]
async fn gemini_generator_round_trips_the_api() {
    let idea_json = r#"{"b2c_content_ideas":[{"title":"Game day platter","format":"Reel"}],"b2b_content_ideas":[],"trending_themes":["comfort food"],"key_insights":"short"}"#;
    let response = serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"text": format!("```json\n{idea_json}\n```")}]}
        }]
    });

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let gen = GeminiGenerator::new("test-key", "gemini-2.5-flash", server.uri()).unwrap();
    let mut post = Post::new("TikTok", "p1");
    post.title = "Viral pasta".to_string();
    post.viral_score = Some(8.2);

    let batch = gen.generate(&[post], &[]).await.unwrap();
    assert_eq!(batch.b2c_content_ideas[0].title, "Game day platter");
    assert_eq!(batch.trending_themes, vec!["comfort food"]);
}

#[tokio::test]
async fn gemini_http_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let gen = GeminiGenerator::new("test-key", "gemini-2.5-flash", server.uri()).unwrap();
    assert!(gen.generate(&[], &[]).await.is_err());
}
