use crate::{
    error::{Error, LookupKind, Result},
    spotify::request::{RequestContext, decode, ensure_success},
    types::{Artist, ArtistSearchResponse},
};

/// Searches the catalog for `name` and returns the top-ranked artist.
///
/// Only the first page is requested (`offset=0`, `limit` items) and no
/// disambiguation happens beyond taking the first item. An empty result page is
/// reported as [`Error::NotFound`].
///
/// # Example
///
/// ```
/// let artist = search_artist(&ctx, "Daft Punk", 20).await?;
/// println!("{} -> {}", artist.name, artist.id);
/// ```
pub async fn search_artist(ctx: &RequestContext, name: &str, limit: u32) -> Result<Artist> {
    let not_found = || Error::NotFound {
        kind: LookupKind::Artist,
        query: name.to_string(),
    };

    if name.trim().is_empty() {
        return Err(not_found());
    }

    let query = [
        ("q", name.to_string()),
        ("type", "artist".to_string()),
        ("offset", "0".to_string()),
        ("limit", limit.to_string()),
    ];

    let response = ctx.get("search", &query).await?;
    let response = ensure_success(response, "search").await?;
    let page: ArtistSearchResponse = decode(response, "search").await?;

    page.artists.items.into_iter().next().ok_or_else(not_found)
}
