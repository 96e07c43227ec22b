//! Header alias resolution for spreadsheet exports.

const SHOP_ALIASES: &[&str] = &["shop", "shop_name", "store_name", "store", "name"];
const LATITUDE_ALIASES: &[&str] = &["latitude", "lat", "lng_lat"];
const LONGITUDE_ALIASES: &[&str] = &["longitude", "long", "lng", "lon"];
const SALESMAN_ALIASES: &[&str] = &["salesman", "salesman_name", "sales person", "salesperson"];
const BEAT_ALIASES: &[&str] = &["beat", "beat_name", "area", "zone", "route"];

/// Logical store fields resolved to the normalized header that carries them.
///
/// A field is `None` when no header in the file matches any of its aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    pub shop: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub salesman: Option<String>,
    pub beat: Option<String>,
}

impl HeaderMap {
    /// Resolve each logical field to the first header (in file order) that
    /// appears in its alias list.
    ///
    /// `headers` must already be normalized (lower-cased, quote-free).
    #[must_use]
    pub fn resolve(headers: &[String]) -> Self {
        Self {
            shop: first_match(headers, SHOP_ALIASES),
            latitude: first_match(headers, LATITUDE_ALIASES),
            longitude: first_match(headers, LONGITUDE_ALIASES),
            salesman: first_match(headers, SALESMAN_ALIASES),
            beat: first_match(headers, BEAT_ALIASES),
        }
    }

    /// Returns `true` when both coordinate columns were found.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

fn first_match(headers: &[String], aliases: &[&str]) -> Option<String> {
    headers
        .iter()
        .find(|h| aliases.contains(&h.as_str()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|h| (*h).to_owned()).collect()
    }

    #[test]
    fn resolves_canonical_names() {
        let map = HeaderMap::resolve(&headers(&[
            "shop",
            "latitude",
            "longitude",
            "salesman",
            "beat",
        ]));
        assert_eq!(map.shop.as_deref(), Some("shop"));
        assert_eq!(map.latitude.as_deref(), Some("latitude"));
        assert_eq!(map.longitude.as_deref(), Some("longitude"));
        assert_eq!(map.salesman.as_deref(), Some("salesman"));
        assert_eq!(map.beat.as_deref(), Some("beat"));
    }

    #[test]
    fn resolves_short_aliases() {
        let map = HeaderMap::resolve(&headers(&["name", "lat", "lng", "sales person", "route"]));
        assert_eq!(map.shop.as_deref(), Some("name"));
        assert_eq!(map.latitude.as_deref(), Some("lat"));
        assert_eq!(map.longitude.as_deref(), Some("lng"));
        assert_eq!(map.salesman.as_deref(), Some("sales person"));
        assert_eq!(map.beat.as_deref(), Some("route"));
        assert!(map.has_coordinates());
    }

    #[test]
    fn first_header_in_file_order_wins() {
        let map = HeaderMap::resolve(&headers(&["store", "shop_name", "lat", "lon"]));
        assert_eq!(map.shop.as_deref(), Some("store"));
    }

    #[test]
    fn unmatched_fields_are_absent() {
        let map = HeaderMap::resolve(&headers(&["id", "title", "x"]));
        assert_eq!(map, HeaderMap::default());
        assert!(!map.has_coordinates());
    }
}
