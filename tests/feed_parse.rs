// tests/feed_parse.rs
//
// Feed documents → raw items → normalized items, using static fixtures.

use chrono::{TimeZone, Utc};
use news_aggregator::ingest::normalize::normalize_item;
use news_aggregator::ingest::parse::parse_feed;
use news_aggregator::ingest::providers::FixtureFeedFetcher;
use news_aggregator::ingest::types::FeedFetcher;
use news_aggregator::rank::filter_by_query;
use news_aggregator::NormalizedItem;

const AUTOSPORT_XML: &str = include_str!("fixtures/autosport_rss.xml");
const RACEFANS_XML: &str = include_str!("fixtures/racefans_rss.xml");
const ATOM_XML: &str = include_str!("fixtures/atom_feed.xml");
const RDF_XML: &str = include_str!("fixtures/rdf_feed.xml");
const MRSS_EXTRAS_XML: &str = include_str!("fixtures/mrss_extras.xml");
const ATOM_MEDIA_XML: &str = include_str!("fixtures/atom_media.xml");

fn normalized(xml: &str, source: &str) -> Vec<NormalizedItem> {
    let now = Utc.with_ymd_and_hms(2025, 5, 26, 0, 0, 0).unwrap();
    parse_feed(xml)
        .expect("fixture parses")
        .iter()
        .map(|raw| normalize_item(raw, source, now))
        .collect()
}

#[test]
fn rss_items_keep_document_order() {
    let items = normalized(AUTOSPORT_XML, "Autosport");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].title, "Ferrari wins in Monaco");
    assert_eq!(items[1].title, "McLaren podium analysis");
    assert!(items.iter().all(|i| i.source == "Autosport"));
}

#[test]
fn rss_fields_are_mapped() {
    let items = normalized(AUTOSPORT_XML, "Autosport");
    let first = &items[0];
    assert_eq!(first.id, "autosport-1001");
    assert_eq!(
        first.link,
        "https://www.autosport.com/f1/news/ferrari-wins-in-monaco/1001/"
    );
    assert_eq!(first.published_at, "2025-05-25T15:30:00.000Z");
    assert_eq!(first.summary, "Charles Leclerc's home win at last.");

    let second = &items[1];
    // no guid → link is the id
    assert_eq!(second.id, "https://www.autosport.com/f1/news/mclaren-podium/1002/");
    assert_eq!(second.summary, "Norris & Piastri on the rostrum");
}

#[test]
fn rss_missing_title_and_bad_date() {
    let items = normalized(AUTOSPORT_XML, "Autosport");
    let third = &items[2];
    assert_eq!(third.title, "Untitled");
    assert_eq!(third.published_at, "not a real date");
    assert_eq!(third.summary, "");
    assert!(third.image.is_none());
}

#[test]
fn enclosure_wins_over_media_content() {
    let items = normalized(AUTOSPORT_XML, "Autosport");
    assert_eq!(
        items[0].image.as_deref(),
        Some("https://cdn.autosport.com/images/1001.jpg")
    );
}

#[test]
fn first_media_content_is_used_and_made_https() {
    let items = normalized(AUTOSPORT_XML, "Autosport");
    assert_eq!(
        items[1].image.as_deref(),
        Some("https://cdn.autosport.com/images/1002.jpg")
    );
}

#[test]
fn content_encoded_img_dc_date_and_entities() {
    let items = normalized(RACEFANS_XML, "RaceFans");
    let first = &items[0];
    assert_eq!(
        first.image.as_deref(),
        Some("https://www.racefans.net/wp-content/uploads/floor.jpg")
    );
    assert_eq!(first.published_at, "2025-05-24T08:15:00.000Z");
    assert_eq!(first.summary, "A closer look at the new floor...");
}

#[test]
fn protocol_relative_thumbnail_becomes_https() {
    let items = normalized(RACEFANS_XML, "RaceFans");
    assert_eq!(
        items[1].image.as_deref(),
        Some("https://i0.wp.com/racefans.net/thumb.jpg")
    );
}

#[test]
fn media_group_content_counts_as_media_content() {
    let items = normalized(RACEFANS_XML, "RaceFans");
    assert_eq!(
        items[2].image.as_deref(),
        Some("https://www.racefans.net/group.jpg")
    );
}

#[test]
fn atom_entries_are_mapped() {
    let items = normalized(ATOM_XML, "Paddock");
    assert_eq!(items.len(), 2);

    let first = &items[0];
    assert_eq!(first.id, "urn:uuid:aaaa-1");
    assert_eq!(first.title, "Aston Martin & Honda");
    assert_eq!(first.link, "https://paddock.example/aston-honda");
    assert_eq!(first.published_at, "2025-05-25T09:00:00.000Z");
    assert_eq!(first.summary, "Full story");
    assert_eq!(first.image.as_deref(), Some("https://paddock.example/aston.png"));

    let second = &items[1];
    assert_eq!(second.link, "https://paddock.example/only-updated");
    assert_eq!(second.published_at, "2025-05-24T16:30:00.000Z");
    assert_eq!(second.summary, "Summary with image");
    assert_eq!(
        second.image.as_deref(),
        Some("https://paddock.example/inline.jpg")
    );
}

#[test]
fn rdf_items_are_found_next_to_channel() {
    let items = normalized(RDF_XML, "Old");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "RDF item");
    assert_eq!(items[0].published_at, "2025-05-20T07:00:00.000Z");
}

#[test]
fn media_rss_title_and_description_do_not_clash_with_core_fields() {
    let items = normalized(MRSS_EXTRAS_XML, "Motorsport");
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.title, "Hamilton on Ferrari's new floor");
    assert_eq!(item.summary, "Seven-time champion explains the upgrade");
    assert_eq!(item.link, "https://www.motorsport.com/f1/news/hamilton-floor/2001/");
    assert_eq!(item.published_at, "2025-05-26T09:00:00.000Z");
    assert_eq!(
        item.image.as_deref(),
        Some("https://cdn.motorsport.com/images/2001.jpg")
    );
}

#[test]
fn atom_entry_with_content_and_media_content() {
    let items = normalized(ATOM_MEDIA_XML, "Paddock");
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.summary, "Grove gets a boost");
    assert_eq!(item.link, "https://paddock.example/williams-sponsor");
    // media:content beats media:thumbnail, and gets a scheme
    assert_eq!(
        item.image.as_deref(),
        Some("https://paddock.example/williams.jpg")
    );
}

#[test]
fn long_descriptions_stay_searchable() {
    let body = format!("{}and then Ferrari", "Lap after lap. ".repeat(150));
    let xml = format!(
        r#"<rss version="2.0"><channel><item><title>Race report</title><description>{body}</description></item></channel></rss>"#
    );
    let items = normalized(&xml, "RaceFans");
    assert!(items[0].summary.chars().count() > 2000);

    let hits = filter_by_query(items, Some("ferrari"));
    assert_eq!(hits.len(), 1);
}

#[test]
fn serialized_items_omit_missing_image() {
    let items = normalized(AUTOSPORT_XML, "Autosport");
    let v = serde_json::to_value(&items).unwrap();
    assert!(v[0].get("image").is_some());
    assert!(v[2].get("image").is_none());
    assert_eq!(v[0]["publishedAt"], "2025-05-25T15:30:00.000Z");
}

#[test]
fn malformed_xml_is_an_error() {
    assert!(parse_feed("<rss><channel><item><title>oops</channel>").is_err());
    assert!(parse_feed("this is not xml at all").is_err());
}

#[tokio::test]
async fn fixture_fetcher_serves_known_urls_only() {
    let fetcher = FixtureFeedFetcher::new().with_doc("https://a.example/rss", AUTOSPORT_XML);
    let items = fetcher
        .fetch_items("https://a.example/rss")
        .await
        .expect("known url");
    assert_eq!(items.len(), 3);
    assert!(fetcher.fetch_items("https://b.example/rss").await.is_err());
}
