use async_trait::async_trait;
use critique_model::{Category, Genre, Title, TitleId};

use crate::database::Page;
use crate::error::Result;

/// Optional narrowing applied to title listings; filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleFilter {
    /// Genre slug.
    pub genre: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub year: Option<i32>,
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
}

/// Write shape for titles: category and genres arrive as slug references and
/// must resolve to existing rows.
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: String,
    pub genre: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// When present, replaces the full genre set.
    pub genre: Option<Vec<String>>,
}

#[async_trait]
pub trait CategoriesRepository: Send + Sync {
    async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(Vec<Category>, i64)>;

    async fn create(&self, name: &str, slug: &str) -> Result<Category>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    async fn delete_by_slug(&self, slug: &str) -> Result<bool>;
}

#[async_trait]
pub trait GenresRepository: Send + Sync {
    async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(Vec<Genre>, i64)>;

    async fn create(&self, name: &str, slug: &str) -> Result<Genre>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Genre>>;

    async fn delete_by_slug(&self, slug: &str) -> Result<bool>;
}

#[async_trait]
pub trait TitlesRepository: Send + Sync {
    async fn list(
        &self,
        filter: &TitleFilter,
        page: Page,
    ) -> Result<(Vec<Title>, i64)>;

    async fn get(&self, id: TitleId) -> Result<Option<Title>>;

    async fn exists(&self, id: TitleId) -> Result<bool>;

    async fn create(&self, new_title: NewTitle) -> Result<Title>;

    async fn update(&self, id: TitleId, patch: TitlePatch) -> Result<Title>;

    async fn delete(&self, id: TitleId) -> Result<bool>;
}
