//! Cache key derivation.

use rendercache_core::{CacheKey, RequestInfo};

/// Literal segment separating the route from the bot flag.
pub const BOT_SEGMENT: &str = "__";

/// Derives the key a route is stored under.
///
/// With `use_host_prefix` and a resolvable hostname the key is
/// `hostname/route/__/is_bot`, so each host and each audience (crawlers,
/// browsers) gets its own copy. Otherwise the key is the route itself.
pub fn derive_key(
    route: &str,
    request: &RequestInfo,
    is_bot: bool,
    use_host_prefix: bool,
) -> CacheKey {
    if use_host_prefix && let Some(hostname) = request.resolve_hostname() {
        let bot = if is_bot { "true" } else { "false" };
        return CacheKey::from_segments([hostname, route, BOT_SEGMENT, bot]);
    }
    CacheKey::from_route(route)
}
