//! Playlist fetch and resolution to an ordered list of absolute segment URIs.

use m3u8_rs::{MasterPlaylist, MediaPlaylist, Playlist};
use std::collections::HashMap;
use url::Url;

use crate::error::PlaylistError;
use crate::fetch::Fetcher;

/// Fetches `playlist_url` and returns its segment URIs in playlist order.
///
/// A master playlist is followed one level to its highest-bandwidth variant.
pub fn load_segments(
    fetcher: &Fetcher,
    playlist_url: &str,
    headers: &HashMap<String, String>,
) -> Result<Vec<String>, PlaylistError> {
    let base = parse_url(playlist_url)?;
    let (media, media_url) = match fetch_playlist(fetcher, &base, headers)? {
        Playlist::MediaPlaylist(pl) => (pl, base),
        Playlist::MasterPlaylist(master) => {
            let variant_url = best_variant_url(&master, &base)?;
            tracing::debug!(master = %base, variant = %variant_url, "resolved master playlist");
            match fetch_playlist(fetcher, &variant_url, headers)? {
                Playlist::MediaPlaylist(pl) => (pl, variant_url),
                Playlist::MasterPlaylist(_) => {
                    return Err(PlaylistError::Parse(
                        "variant is itself a master playlist".to_string(),
                    ))
                }
            }
        }
    };
    segment_urls(&media, &media_url)
}

/// Parses playlist text against `base`; the network-free half of [`load_segments`].
pub fn segments_from_bytes(bytes: &[u8], base: &str) -> Result<Vec<String>, PlaylistError> {
    let base = parse_url(base)?;
    match parse(bytes)? {
        Playlist::MediaPlaylist(pl) => segment_urls(&pl, &base),
        Playlist::MasterPlaylist(_) => Err(PlaylistError::Parse(
            "expected a media playlist".to_string(),
        )),
    }
}

fn fetch_playlist(
    fetcher: &Fetcher,
    url: &Url,
    headers: &HashMap<String, String>,
) -> Result<Playlist, PlaylistError> {
    let bytes = fetcher.fetch_bytes(url.as_str(), headers)?;
    parse(&bytes)
}

fn parse(bytes: &[u8]) -> Result<Playlist, PlaylistError> {
    m3u8_rs::parse_playlist_res(bytes).map_err(|e| PlaylistError::Parse(e.to_string()))
}

fn parse_url(url: &str) -> Result<Url, PlaylistError> {
    Url::parse(url).map_err(|source| PlaylistError::Url {
        url: url.to_string(),
        source,
    })
}

fn join(base: &Url, uri: &str) -> Result<Url, PlaylistError> {
    base.join(uri).map_err(|source| PlaylistError::Url {
        url: uri.to_string(),
        source,
    })
}

fn best_variant_url(master: &MasterPlaylist, base: &Url) -> Result<Url, PlaylistError> {
    let best = master
        .variants
        .iter()
        .filter(|v| !v.is_i_frame)
        .max_by_key(|v| v.bandwidth)
        .ok_or(PlaylistError::NoVariants)?;
    join(base, &best.uri)
}

fn segment_urls(media: &MediaPlaylist, base: &Url) -> Result<Vec<String>, PlaylistError> {
    if media.segments.is_empty() {
        return Err(PlaylistError::Empty);
    }
    media
        .segments
        .iter()
        .map(|s| join(base, &s.uri).map(String::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDIA: &str = "#EXTM3U\n\
        #EXT-X-VERSION:3\n\
        #EXT-X-TARGETDURATION:4\n\
        #EXTINF:4.0,\n\
        seg0.ts\n\
        #EXTINF:4.0,\n\
        /abs/seg1.ts\n\
        #EXTINF:2.5,\n\
        https://cdn.other/seg2.ts?sig=1\n\
        #EXT-X-ENDLIST\n";

    #[test]
    fn relative_uris_resolve_against_playlist() {
        let urls = segments_from_bytes(MEDIA.as_bytes(), "https://v.host/a/b/index.m3u8?t=9").unwrap();
        assert_eq!(
            urls,
            vec![
                "https://v.host/a/b/seg0.ts",
                "https://v.host/abs/seg1.ts",
                "https://cdn.other/seg2.ts?sig=1",
            ]
        );
    }

    #[test]
    fn empty_media_playlist() {
        let text = "#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXT-X-ENDLIST\n";
        let err = segments_from_bytes(text.as_bytes(), "https://v.host/i.m3u8").unwrap_err();
        assert!(matches!(err, PlaylistError::Empty));
    }

    #[test]
    fn garbage_is_parse_error() {
        let err = segments_from_bytes(b"<html>not found</html>", "https://v.host/i.m3u8").unwrap_err();
        assert!(matches!(err, PlaylistError::Parse(_)));
    }

    #[test]
    fn bad_base_url() {
        let err = segments_from_bytes(MEDIA.as_bytes(), "not a url").unwrap_err();
        assert!(matches!(err, PlaylistError::Url { .. }));
    }

    #[test]
    fn master_picks_highest_bandwidth() {
        let text = "#EXTM3U\n\
            #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\n\
            low/index.m3u8\n\
            #EXT-X-STREAM-INF:BANDWIDTH=2400000,RESOLUTION=1280x720\n\
            high/index.m3u8\n\
            #EXT-X-STREAM-INF:BANDWIDTH=1200000,RESOLUTION=960x540\n\
            mid/index.m3u8\n";
        let Playlist::MasterPlaylist(master) = parse(text.as_bytes()).unwrap() else {
            panic!("expected master playlist");
        };
        let base = Url::parse("https://v.host/v/master.m3u8").unwrap();
        assert_eq!(
            best_variant_url(&master, &base).unwrap().as_str(),
            "https://v.host/v/high/index.m3u8"
        );
    }
}
