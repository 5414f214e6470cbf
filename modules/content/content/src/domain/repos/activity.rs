use content_sdk::models::{Appled, Comment, Enrolled, Notification};
use content_sdk::{ContentError, ListFilter};

use crate::domain::context::RequestCtx;
use crate::domain::permit::Permit;

record_repo!(CommentRepo => Comment);

impl CommentRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_commentable(
        &self,
        ctx: &RequestCtx,
        commentable_id: &str,
    ) -> Result<Vec<Permit<Comment>>, ContentError> {
        self.records
            .list(ctx, ListFilter::eq("commentable_id", commentable_id))
            .await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_user(
        &self,
        ctx: &RequestCtx,
        user_id: &str,
    ) -> Result<Vec<Permit<Comment>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("user_id", user_id)).await
    }
}

record_repo!(EnrolledRepo => Enrolled);

impl EnrolledRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_enrollee(
        &self,
        ctx: &RequestCtx,
        enrollable_id: &str,
        user_id: &str,
    ) -> Result<Permit<Enrolled>, ContentError> {
        self.records
            .get_by(ctx, "enrollee", &[enrollable_id, user_id])
            .await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_enrollable(
        &self,
        ctx: &RequestCtx,
        enrollable_id: &str,
    ) -> Result<Vec<Permit<Enrolled>>, ContentError> {
        self.records
            .list(ctx, ListFilter::eq("enrollable_id", enrollable_id))
            .await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_user(
        &self,
        ctx: &RequestCtx,
        user_id: &str,
    ) -> Result<Vec<Permit<Enrolled>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("user_id", user_id)).await
    }
}

record_repo!(AppledRepo => Appled);

impl AppledRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_appler(
        &self,
        ctx: &RequestCtx,
        appleable_id: &str,
        user_id: &str,
    ) -> Result<Permit<Appled>, ContentError> {
        self.records
            .get_by(ctx, "appler", &[appleable_id, user_id])
            .await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_appleable(
        &self,
        ctx: &RequestCtx,
        appleable_id: &str,
    ) -> Result<Vec<Permit<Appled>>, ContentError> {
        self.records
            .list(ctx, ListFilter::eq("appleable_id", appleable_id))
            .await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_user(
        &self,
        ctx: &RequestCtx,
        user_id: &str,
    ) -> Result<Vec<Permit<Appled>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("user_id", user_id)).await
    }
}

record_repo!(NotificationRepo => Notification);

impl NotificationRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_user(
        &self,
        ctx: &RequestCtx,
        user_id: &str,
    ) -> Result<Vec<Permit<Notification>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("user_id", user_id)).await
    }
}
