use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use ytchat_core::{ChatError, FetchParams, LiveSession, VideoDetails};

const UNKNOWN_TITLE: &str = "Unknown Stream";
const TITLE_SUFFIX: &str = " - YouTube";

static LIVE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link rel="canonical" href="https://www\.youtube\.com/watch\?v=(.+?)">"#)
        .expect("valid live id pattern")
});
static REPLAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]isReplay['"]:\s*(true)"#)
        .expect("valid replay pattern")
});
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]INNERTUBE_API_KEY['"]:\s*['"](.+?)['"]"#)
        .expect("valid api key pattern")
});
static CLIENT_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]clientVersion['"]:\s*['"]([\d.]+?)['"]"#)
        .expect("valid client version pattern")
});

/// Extracts the session parameters embedded in a live page.
///
/// Rules are applied in order and each one fails on its own: live id,
/// replay marker, API key, client version, then the continuation hidden in the
/// `viewSelector` block. The title and video details are best-effort.
pub fn bootstrap_from_page(html: &str) -> Result<LiveSession, ChatError> {
    let live_id = capture(&LIVE_ID_RE, html).ok_or(ChatError::LiveNotFound)?;
    let title = page_title(html);

    if REPLAY_RE.is_match(html) {
        return Err(ChatError::FinishedLive {
            live_id: live_id.to_string(),
        });
    }

    let api_key = capture(&API_KEY_RE, html).ok_or(ChatError::ApiKeyNotFound)?;
    let client_version =
        capture(&CLIENT_VERSION_RE, html).ok_or(ChatError::ClientVersionNotFound)?;
    let continuation = initial_continuation(html).ok_or(ChatError::FailedExtraction)?;

    Ok(LiveSession {
        live_id: live_id.to_string(),
        title,
        params: FetchParams {
            api_key: api_key.to_string(),
            client_version: client_version.to_string(),
            continuation,
        },
        details: video_details(html),
    })
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn page_title(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse("title") else {
        return UNKNOWN_TITLE.to_string();
    };
    doc.select(&selector)
        .next()
        .map(|node| node.text().collect::<String>())
        .and_then(|text| text.trim().strip_suffix(TITLE_SUFFIX).map(str::to_string))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Reload continuation of the first sort-filter entry that is not selected.
fn initial_continuation(html: &str) -> Option<String> {
    let fragment = balanced_object_after(html, "viewSelector")?;
    let selector: Value = json5::from_str(fragment).ok()?;
    selector
        .pointer("/sortFilterSubMenuRenderer/subMenuItems")?
        .as_array()?
        .iter()
        .find(|item| item.get("selected").and_then(Value::as_bool) != Some(true))?
        .pointer("/continuation/reloadContinuationData/continuation")?
        .as_str()
        .map(str::to_string)
}

fn video_details(html: &str) -> Option<VideoDetails> {
    let fragment = balanced_object_after(html, "\"videoDetails\"")?;
    serde_json::from_str(fragment).ok()
}

/// Returns the object starting at the first brace after `anchor`, bounded by
/// brace depth. The first brace found must open; string contents are not
/// treated specially.
fn balanced_object_after<'a>(text: &'a str, anchor: &str) -> Option<&'a str> {
    let from = text.find(anchor)?;
    let rest = &text[from..];
    let mut braces = rest.match_indices(['{', '}']);

    let (start, first) = braces.next()?;
    if first != "{" {
        return None;
    }
    let mut depth = 1usize;
    for (index, brace) in braces {
        if brace == "{" {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(&rest[start..=index]);
            }
        }
    }
    None
}
