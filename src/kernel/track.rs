use serde::{Deserialize, Serialize};

/// Now-playing metadata as reported by the music source.
/// Equality is structural over the raw fields: two tracks that only differ by
/// an absent vs. blank field are NOT equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl Track {
    pub fn new(title: Option<&str>, artist: Option<&str>, album: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            artist: artist.map(str::to_string),
            album: album.map(str::to_string),
        }
    }

    /// Title with every parenthesized chunk removed ("Song (Live)" -> "Song").
    /// None when nothing but whitespace is left.
    pub fn clean_title(&self) -> Option<String> {
        let title = non_blank(self.title.as_deref())?;
        let stripped = strip_parenthesized(title);
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(collapsed)
        }
    }

    pub fn artist(&self) -> Option<&str> {
        non_blank(self.artist.as_deref())
    }

    pub fn album(&self) -> Option<&str> {
        non_blank(self.album.as_deref())
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Track(title={:?}, artist={:?}, album={:?})",
            self.title, self.artist, self.album
        )
    }
}

/// Play state carried by every ingress event. No history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackState {
    Playing,
    Preparing,
    Stopped,
}

/// Blank and absent are the same thing for classification.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Drops every `(...)` group that has at least one character inside.
/// An unmatched `(` is kept as-is along with the rest of the text.
fn strip_parenthesized(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('(') {
        let after_open = &rest[open + 1..];
        match after_open.find(')') {
            Some(close) if close > 0 => {
                out.push_str(&rest[..open]);
                rest = &after_open[close + 1..];
            }
            _ => {
                // "()" or no closing paren: keep the '(' and move on
                out.push_str(&rest[..=open]);
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}
