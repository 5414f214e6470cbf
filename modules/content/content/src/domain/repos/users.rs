use content_sdk::models::{Email, User};
use content_sdk::{ContentError, ListFilter};

use crate::domain::context::RequestCtx;
use crate::domain::permit::Permit;

record_repo!(UserRepo => User);

impl UserRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_login(
        &self,
        ctx: &RequestCtx,
        login: &str,
    ) -> Result<Permit<User>, ContentError> {
        self.records.get_by(ctx, "login", &[login]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn search(
        &self,
        ctx: &RequestCtx,
        query: &str,
    ) -> Result<Vec<Permit<User>>, ContentError> {
        self.records.list(ctx, ListFilter::search(query)).await
    }
}

record_repo!(EmailRepo => Email);

impl EmailRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_value(
        &self,
        ctx: &RequestCtx,
        value: &str,
    ) -> Result<Permit<Email>, ContentError> {
        self.records.get_by(ctx, "value", &[value]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_user(
        &self,
        ctx: &RequestCtx,
        user_id: &str,
    ) -> Result<Vec<Permit<Email>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("user_id", user_id)).await
    }
}
