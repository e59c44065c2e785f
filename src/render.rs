use chrono::{DateTime, NaiveTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::{config::FeedMeta, store::OfferRecord};

const EXPIRED_BG: &str = "#FFE2E2";
const ACTIVE_BG: &str = "#DFF5E1";

/// `Fri, 01 Mar 2024 00:00:00 GMT`
fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn html_row(record: &OfferRecord, now: DateTime<Utc>) -> String {
    let bg = if record.is_expired(now) {
        EXPIRED_BG
    } else {
        ACTIVE_BG
    };
    format!(
        r#"      <tr style="background-color: {bg}">
        <td>{offer}</td>
        <td>{start}</td>
        <td>{end}</td>
        <td><a href="{url}" target="_blank">Link</a></td>
      </tr>"#,
        offer = encode_text(&record.offer),
        start = record.start,
        end = record.end,
        url = encode_double_quoted_attribute(&record.url),
    )
}

/// Every record becomes a row, expired ones just get a red background.
pub fn render_html(records: &[OfferRecord], feed: &FeedMeta, now: DateTime<Utc>) -> String {
    let rows = records
        .iter()
        .map(|record| html_row(record, now))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <link href="rss.xml" rel="alternate" title="{feed_title}" type="application/rss+xml">
  <title>{page_title}</title>
  <style>
    body {{ font-family: Arial, sans-serif; margin: 20px; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
    th {{ background-color: #f2f2f2; }}
  </style>
</head>
<body>
  <h1>{feed_heading} <a href="rss.xml">[RSS]</a></h1>
  <table>
    <thead>
      <tr>
        <th>Oferta</th>
        <th>Data de inicio</th>
        <th>Data de fim</th>
        <th>URL</th>
      </tr>
    </thead>
    <tbody>
{rows}
    </tbody>
  </table>
</body>
</html>
"#,
        feed_title = encode_double_quoted_attribute(&feed.title),
        page_title = encode_text(&feed.page_title),
        feed_heading = encode_text(&feed.title),
    )
}

fn rss_item(record: &OfferRecord) -> Item {
    let published = record.start.and_time(NaiveTime::MIN).and_utc();
    ItemBuilder::default()
        .title(Some(record.offer.clone()))
        .link(Some(record.url.clone()))
        .description(Some(format!("De {} a {}", record.start, record.end)))
        .pub_date(Some(http_date(published)))
        .guid(Some(
            GuidBuilder::default()
                .value(record.feed_guid())
                .permalink(false)
                .build(),
        ))
        .build()
}

/// Expired offers are left out of the feed entirely.
pub fn render_rss(
    records: &[OfferRecord],
    feed: &FeedMeta,
    now: DateTime<Utc>,
) -> Result<String, rss::Error> {
    let items: Vec<Item> = records
        .iter()
        .filter(|record| !record.is_expired(now))
        .map(rss_item)
        .collect();
    let channel = ChannelBuilder::default()
        .title(feed.title.clone())
        .link(feed.link.clone())
        .description(feed.description.clone())
        .last_build_date(Some(http_date(now)))
        .items(items)
        .build();
    let buf = channel.write_to(Vec::new())?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
