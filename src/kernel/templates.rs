//! Message Template Bank.
//!
//! Stateless. Every family is a fixed, ordered list of phrasings; one is drawn
//! uniformly from the caller's random source, so a seeded or mock RNG gives an
//! exact, reproducible message.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One classification branch of the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateFamily {
    /// No title, artist and album known.
    ArtistAndAlbum,
    /// No title, artist only.
    ArtistOnly,
    /// No title, album only.
    AlbumOnly,
    /// Nothing usable at all.
    Ambient,
    /// Title without any artist or album.
    NoSource,
    SameArtist,
    SameAlbum,
    NewAlbum,
    NewArtist,
}

/// The fields a family needs, borrowed from the cleaned track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario<'a> {
    NoTitle {
        artist: Option<&'a str>,
        album: Option<&'a str>,
    },
    NoSource {
        title: &'a str,
    },
    SameArtist {
        artist: &'a str,
        title: &'a str,
    },
    SameAlbum {
        album: &'a str,
        title: &'a str,
    },
    NewAlbum {
        album: &'a str,
        title: &'a str,
    },
    NewArtist {
        artist: &'a str,
        title: &'a str,
    },
}

impl Scenario<'_> {
    pub fn family(&self) -> TemplateFamily {
        match self {
            Scenario::NoTitle { artist: Some(_), album: Some(_) } => TemplateFamily::ArtistAndAlbum,
            Scenario::NoTitle { artist: Some(_), album: None } => TemplateFamily::ArtistOnly,
            Scenario::NoTitle { artist: None, album: Some(_) } => TemplateFamily::AlbumOnly,
            Scenario::NoTitle { artist: None, album: None } => TemplateFamily::Ambient,
            Scenario::NoSource { .. } => TemplateFamily::NoSource,
            Scenario::SameArtist { .. } => TemplateFamily::SameArtist,
            Scenario::SameAlbum { .. } => TemplateFamily::SameAlbum,
            Scenario::NewAlbum { .. } => TemplateFamily::NewAlbum,
            Scenario::NewArtist { .. } => TemplateFamily::NewArtist,
        }
    }

    fn fill(&self, template: &str) -> String {
        let (title, artist, album) = match *self {
            Scenario::NoTitle { artist, album } => (None, artist, album),
            Scenario::NoSource { title } => (Some(title), None, None),
            Scenario::SameArtist { artist, title } | Scenario::NewArtist { artist, title } => {
                (Some(title), Some(artist), None)
            }
            Scenario::SameAlbum { album, title } | Scenario::NewAlbum { album, title } => {
                (Some(title), None, Some(album))
            }
        };

        // Single pass over the template: inserted values are never rescanned.
        let mut text = String::with_capacity(template.len() + 32);
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            text.push_str(&rest[..open]);
            let tail = &rest[open..];
            let slot = [("{title}", title), ("{artist}", artist), ("{album}", album)]
                .into_iter()
                .find(|(placeholder, _)| tail.starts_with(*placeholder));

            match slot {
                Some((placeholder, Some(value))) => {
                    text.push_str(value);
                    rest = &tail[placeholder.len()..];
                }
                _ => {
                    text.push('{');
                    rest = &tail[1..];
                }
            }
        }
        text.push_str(rest);
        text
    }
}

const ARTIST_AND_ALBUM: &[&str] = &[
    "Here's a track from: {album}; the famous album by {artist}.",
    "I just pulled up {album}; by {artist}.",
    "Let's spend the next few minutes with: {artist}, and a track from: {album}.",
];

const ARTIST_ONLY: &[&str] = &[
    "Let's change the mood with a few notes by: {artist}.",
    "It's now time for some {artist}.",
];

const ALBUM_ONLY: &[&str] = &[
    "Let's change the mood with a few notes from: {album}.",
    "The next track comes straight out of: {album}.",
];

const AMBIENT: &[&str] = &[
    "And now, close your eyes and let the music speak to you…",
    "The next one is a surprise… Can you guess what it is?",
];

const NO_SOURCE: &[&str] = &[
    "And now, we're listening to: {title}",
    "Next up: {title}",
    "Let's change the mood now, with: {title}",
];

const SAME_ARTIST: &[&str] = &[
    "I hope you like {artist}, because here's another one of their best songs: {title}!",
    "I can't have enough of {artist}. Here comes: {title}.",
    "That was {artist}. And again now, with: {title}.",
];

const SAME_ALBUM: &[&str] = &[
    "I could play {album} all day long. Hope you don't mind, cause now it's: {title}.",
    "And now, let's hear: {title}; also from {album}.",
];

const NEW_ALBUM: &[&str] = &[
    "Here’s another trip down memory lane with: {title}; from {album}",
    "We have {album} on tap now, with: {title}",
    "Next up is a song sure to soothe you. {title}, from {album}",
    "Let’s change the pace with: {title}; from: {album}",
];

const NEW_ARTIST: &[&str] = &[
    "We'll spend the next minutes with {artist}, and their hit: {title}",
    "Here’s another trip down memory lane with: {title}; by {artist}",
    "We have {artist} on tap now, with: {title}",
    "Next up is a song sure to soothe you. {title}, by {artist}",
    "Let’s change the pace with: {title}; by: {artist}",
];

/// Raw phrasings of a family, placeholders included.
pub fn variants(family: TemplateFamily) -> &'static [&'static str] {
    match family {
        TemplateFamily::ArtistAndAlbum => ARTIST_AND_ALBUM,
        TemplateFamily::ArtistOnly => ARTIST_ONLY,
        TemplateFamily::AlbumOnly => ALBUM_ONLY,
        TemplateFamily::Ambient => AMBIENT,
        TemplateFamily::NoSource => NO_SOURCE,
        TemplateFamily::SameArtist => SAME_ARTIST,
        TemplateFamily::SameAlbum => SAME_ALBUM,
        TemplateFamily::NewAlbum => NEW_ALBUM,
        TemplateFamily::NewArtist => NEW_ARTIST,
    }
}

/// Every phrasing the scenario could produce, filled in.
pub fn candidates(scenario: &Scenario<'_>) -> Vec<String> {
    variants(scenario.family())
        .iter()
        .map(|template| scenario.fill(template))
        .collect()
}

/// PURE FUNCTION: picks one phrasing of the scenario's family.
pub fn compose<R: Rng + ?Sized>(scenario: &Scenario<'_>, rng: &mut R) -> String {
    let family = variants(scenario.family());
    // Families are never empty, the fallback only keeps this total.
    let template = family.choose(rng).copied().unwrap_or("");
    scenario.fill(template)
}
