use serde::Serialize;

use crate::ids::{CategoryId, GenreId, TitleId};

/// Single required classification of a title ("Films", "Books", "Music").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    #[serde(skip_serializing)]
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// One of several tags a title may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    #[serde(skip_serializing)]
    pub id: GenreId,
    pub name: String,
    pub slug: String,
}

/// A reviewed work, read shape: nested category/genre objects plus the
/// derived average rating (absent until the first review lands).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<Genre>,
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_serializes_nested_catalog_objects() {
        let title = Title {
            id: TitleId(5),
            name: "Solaris".into(),
            year: 1972,
            rating: None,
            description: None,
            genre: vec![Genre {
                id: GenreId(1),
                name: "Drama".into(),
                slug: "drama".into(),
            }],
            category: Category {
                id: CategoryId(1),
                name: "Films".into(),
                slug: "films".into(),
            },
        };
        let value = serde_json::to_value(&title).unwrap();
        assert_eq!(value["id"], 5);
        assert_eq!(value["rating"], serde_json::Value::Null);
        assert_eq!(value["category"]["slug"], "films");
        assert_eq!(value["genre"][0]["slug"], "drama");
        assert!(value["genre"][0].get("id").is_none());
    }
}
