use serde::{Deserialize, Serialize};

use super::Article;

/// A saved copy of an article, taken at the moment it was bookmarked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: Option<i64>,
    pub article_url: String,
    pub title: String,
    pub source: String,
    pub post_title: String,
    pub description: Option<String>,
    pub category: Option<Vec<String>>,
    pub image_url: Option<String>,
}

impl Bookmark {
    pub fn from_article(article_url: &str, article: &Article) -> Self {
        Self {
            id: None,
            article_url: article_url.to_string(),
            title: article.title.clone(),
            source: article.source.clone(),
            post_title: article.post_title.clone(),
            description: article.description.clone(),
            category: article.category.clone(),
            image_url: article.image_url.clone(),
        }
    }

    /// Rebuild the article so saved items render like live ones.
    pub fn to_article(&self) -> Article {
        Article::new(
            self.title.clone(),
            self.source.clone(),
            self.post_title.clone(),
        )
        .with_description(self.description.clone())
        .with_category(self.category.clone())
        .with_image_url(self.image_url.clone())
        .with_article_url(Some(self.article_url.clone()))
    }
}
