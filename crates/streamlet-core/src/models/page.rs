use serde::Deserialize;

/// The two listing shapes the service returns: paginated endpoints wrap
/// their items in `{ "content": [...] }`, the rest return a bare array.
/// Normalized here, once, so call sites only ever see `Vec<T>`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paginated { content: Vec<T> },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Paginated { content } => content,
            Listing::Plain(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paginated_shape() {
        let json = r#"{"content": [1, 2, 3], "totalPages": 1, "number": 0}"#;
        let listing: Listing<i64> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.into_items(), vec![1, 2, 3]);
    }

    #[test]
    fn parses_bare_array_shape() {
        let listing: Listing<i64> = serde_json::from_str("[4, 5]").unwrap();
        assert_eq!(listing.into_items(), vec![4, 5]);
    }

    #[test]
    fn empty_listings_are_empty_not_errors() {
        let listing: Listing<i64> = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(listing.into_items().is_empty());

        let listing: Listing<i64> = serde_json::from_str("[]").unwrap();
        assert!(listing.into_items().is_empty());
    }
}
