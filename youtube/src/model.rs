//! Extraction of tracks from YouTube Music innertube responses.

use playsync_model::search::{ResultType, SearchHit};
use serde_json::Value;

#[macro_export]
macro_rules! get {
    ( $val:expr, $( $x:expr ),* ) => {
        {
            let mut val: Option<&serde_json::Value> = Some($val);
            $(
                val = val.and_then(|v| v.get($x));
            )*
            val
        }
    };
}

/// Collects every value stored under `key` anywhere below `val`, in document order.
pub fn find<'a>(val: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut matches: Vec<&'a Value> = Vec::new();
    let mut stack: Vec<&'a Value> = vec![val];
    while let Some(current) = stack.pop() {
        match current {
            Value::Array(arr) => stack.extend(arr.iter().rev()),
            Value::Object(obj) => {
                if let Some(v) = obj.get(key) {
                    matches.push(v);
                }
                let mut children: Vec<&Value> = obj
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(_, v)| v)
                    .collect();
                children.reverse();
                stack.extend(children);
            }
            // null, bool, number and string
            _ => {}
        }
    }
    matches
}

fn runs(text: Option<&Value>) -> Vec<&Value> {
    text.and_then(|t| t.get("runs"))
        .and_then(Value::as_array)
        .map(|runs| runs.iter().collect())
        .unwrap_or_default()
}

fn run_text(run: &Value) -> Option<&str> {
    run.get("text").and_then(Value::as_str)
}

fn is_artist_run(run: &Value) -> bool {
    get!(
        run,
        "navigationEndpoint",
        "browseEndpoint",
        "browseEndpointContextSupportedConfigs",
        "browseEndpointContextMusicConfig",
        "pageType"
    )
    .and_then(Value::as_str)
    .map(|page| page == "MUSIC_PAGE_TYPE_ARTIST" || page == "MUSIC_PAGE_TYPE_USER_CHANNEL")
    .unwrap_or(false)
}

fn artists_from_runs(runs: &[&Value]) -> Vec<String> {
    runs.iter()
        .filter(|run| is_artist_run(run))
        .filter_map(|run| run_text(run))
        .map(str::to_string)
        .collect()
}

fn flex_column(renderer: &Value, idx: usize) -> Option<&Value> {
    get!(
        renderer,
        "flexColumns",
        idx,
        "musicResponsiveListItemFlexColumnRenderer",
        "text"
    )
}

fn video_id(renderer: &Value) -> Option<String> {
    get!(renderer, "playlistItemData", "videoId")
        .or_else(|| find(renderer, "videoId").into_iter().next())
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Parses a `musicResponsiveListItemRenderer` of a song listing.
pub fn parse_list_item(renderer: &Value, result_type: ResultType) -> Option<SearchHit> {
    let title = runs(flex_column(renderer, 0))
        .first()
        .and_then(|run| run_text(run))?
        .to_string();
    let details = runs(flex_column(renderer, 1));
    let mut artists = artists_from_runs(&details);
    if artists.is_empty() {
        // uploads without artist pages only carry the channel name
        if let Some(first) = details.first().and_then(|run| run_text(run)) {
            artists.push(first.to_string());
        }
    }
    Some(SearchHit {
        title,
        artists,
        video_id: video_id(renderer),
        result_type,
    })
}

/// All song rows below `response`.
pub fn parse_list_items(response: &Value, result_type: ResultType) -> Vec<SearchHit> {
    find(response, "musicResponsiveListItemRenderer")
        .into_iter()
        .filter_map(|renderer| parse_list_item(renderer, result_type))
        .collect()
}

fn result_type_from_label(label: &str) -> ResultType {
    match label.trim().to_lowercase().as_str() {
        "song" => ResultType::Song,
        "video" => ResultType::Video,
        "album" | "single" | "ep" => ResultType::Album,
        "artist" => ResultType::Artist,
        "playlist" => ResultType::Playlist,
        _ => ResultType::Other,
    }
}

/// Parses the top result card of an unfiltered search.
pub fn parse_top_result(response: &Value) -> Option<SearchHit> {
    let card = find(response, "musicCardShelfRenderer").into_iter().next()?;
    let title_runs = runs(card.get("title"));
    let title_run = title_runs.first()?;
    let title = run_text(title_run)?.to_string();
    let subtitle = runs(card.get("subtitle"));
    let result_type = subtitle
        .first()
        .and_then(|run| run_text(run))
        .map(result_type_from_label)
        .unwrap_or(ResultType::Other);
    let mut artists = artists_from_runs(&subtitle);
    if artists.is_empty() {
        // "Song", " • ", "Artist", ...
        if let Some(artist) = subtitle.get(2).and_then(|run| run_text(run)) {
            artists.push(artist.to_string());
        }
    }
    let video_id = get!(*title_run, "navigationEndpoint", "watchEndpoint", "videoId")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(SearchHit {
        title,
        artists,
        video_id,
        result_type,
    })
}

pub fn playlist_title(response: &Value) -> Option<String> {
    ["musicResponsiveHeaderRenderer", "musicDetailHeaderRenderer", "musicEditablePlaylistDetailHeaderRenderer"]
        .iter()
        .flat_map(|key| find(response, key))
        .find_map(|header| runs(header.get("title")).first().and_then(|run| run_text(run)).map(str::to_string))
}

pub fn continuation(response: &Value) -> Option<String> {
    find(response, "continuationCommand")
        .into_iter()
        .chain(find(response, "nextContinuationData"))
        .find_map(|c| c.get("token").or_else(|| c.get("continuation")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn artist_run(name: &str) -> Value {
        json!({
            "text": name,
            "navigationEndpoint": {"browseEndpoint": {
                "browseId": "UC123",
                "browseEndpointContextSupportedConfigs": {
                    "browseEndpointContextMusicConfig": {"pageType": "MUSIC_PAGE_TYPE_ARTIST"}
                }
            }}
        })
    }

    pub fn song_row(title: &str, artists: &[&str], video_id: &str) -> Value {
        let mut details: Vec<Value> = Vec::new();
        for (i, artist) in artists.iter().enumerate() {
            if i > 0 {
                details.push(json!({"text": ", "}));
            }
            details.push(artist_run(artist));
        }
        details.push(json!({"text": " • "}));
        details.push(json!({"text": "3:41"}));
        json!({"musicResponsiveListItemRenderer": {
            "playlistItemData": {"videoId": video_id},
            "flexColumns": [
                {"musicResponsiveListItemFlexColumnRenderer": {"text": {"runs": [{"text": title}]}}},
                {"musicResponsiveListItemFlexColumnRenderer": {"text": {"runs": details}}}
            ]
        }})
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_song_rows_in_order() {
        let response = json!({"contents": {"tabbedSearchResultsRenderer": {"tabs": [{"tabRenderer": {"content": {
            "sectionListRenderer": {"contents": [{"musicShelfRenderer": {"contents": [
                song_row("One More Time", &["Daft Punk"], "FGBhQbmPwH8"),
                song_row("Get Lucky", &["Daft Punk", "Pharrell Williams"], "5NV6Rdv1a3I"),
            ]}}]}
        }}}]}}});
        let hits = parse_list_items(&response, ResultType::Song);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "One More Time");
        assert_eq!(hits[0].video_id.as_deref(), Some("FGBhQbmPwH8"));
        assert_eq!(hits[1].artists, vec!["Daft Punk", "Pharrell Williams"]);
        assert_eq!(hits[1].artist_string(), "Daft Punk, Pharrell Williams");
    }

    #[test]
    fn parses_top_result_card() {
        let response = json!({"contents": [{"musicCardShelfRenderer": {
            "title": {"runs": [{"text": "Harder Better Faster Stronger",
                "navigationEndpoint": {"watchEndpoint": {"videoId": "yydNF8tuVmU"}}}]},
            "subtitle": {"runs": [{"text": "Song"}, {"text": " • "}, artist_run("Daft Punk")]}
        }}]});
        let top = parse_top_result(&response).expect("top result");
        assert_eq!(top.result_type, ResultType::Song);
        assert_eq!(top.artists, vec!["Daft Punk"]);
        assert_eq!(top.video_id.as_deref(), Some("yydNF8tuVmU"));
    }

    #[test]
    fn finds_continuation_token() {
        let response = json!({"a": [{"continuationItemRenderer": {"continuationEndpoint": {
            "continuationCommand": {"token": "abc"}}}}]});
        assert_eq!(continuation(&response).as_deref(), Some("abc"));
        assert_eq!(continuation(&json!({})), None);
    }
}
