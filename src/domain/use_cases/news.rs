use std::sync::Arc;

use crate::{
    entities::{
        envelope::Page,
        news::{NewNewsRequest, News, NewsInsert, NewsListQuery, UpdateNewsRequest},
    },
    errors::AppError,
    repositories::news::NewsRepository,
    utils::valid_uuid::valid_uuid,
};

pub struct NewsHandler {
    pub news_repo: Arc<dyn NewsRepository>,
}

impl NewsHandler {
    pub fn new(news_repo: Arc<dyn NewsRepository>) -> Self {
        NewsHandler { news_repo }
    }

    pub async fn list_news(&self, query: NewsListQuery) -> Result<Page<News>, AppError> {
        self.news_repo.list_news(query.pagination()).await
    }

    pub async fn get_news_by_id(&self, id: &str) -> Result<News, AppError> {
        let valid_id = valid_uuid(id)?;

        self.news_repo.get_news_by_id(&valid_id).await
    }

    pub async fn create_news(&self, request: NewNewsRequest) -> Result<News, AppError> {
        let new_news = NewsInsert::try_from(request)?;

        let news = self.news_repo.create_news(&new_news).await?;
        tracing::info!(id = %news.id, "News article created");

        Ok(news)
    }

    pub async fn update_news(&self, id: &str, request: UpdateNewsRequest) -> Result<News, AppError> {
        let valid_id = valid_uuid(id)?;
        let changes = request.prepare()?;

        self.news_repo.update_news(&valid_id, &changes).await
    }

    pub async fn delete_news(&self, id: &str) -> Result<(), AppError> {
        let valid_id = valid_uuid(id)?;

        self.news_repo.delete_news(&valid_id).await
    }
}
