use content_sdk::models::{Label, Labeled, Topic};
use content_sdk::{AccessKind, ContentError, ListFilter};

use crate::domain::context::RequestCtx;
use crate::domain::permit::Permit;

record_repo!(LabelRepo => Label);

impl LabelRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_name(
        &self,
        ctx: &RequestCtx,
        study_id: &str,
        name: &str,
    ) -> Result<Permit<Label>, ContentError> {
        self.records.get_by(ctx, "name", &[study_id, name]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_study(
        &self,
        ctx: &RequestCtx,
        study_id: &str,
    ) -> Result<Vec<Permit<Label>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("study_id", study_id)).await
    }
}

record_repo!(
    /// Label attachments. Attaching and detaching are authorized as
    /// connect / disconnect rather than create / delete.
    LabeledRepo => Labeled
);

impl LabeledRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_labelable(
        &self,
        ctx: &RequestCtx,
        label_id: &str,
        labelable_id: &str,
    ) -> Result<Permit<Labeled>, ContentError> {
        self.records
            .get_by(ctx, "labelable", &[label_id, labelable_id])
            .await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_label(
        &self,
        ctx: &RequestCtx,
        label_id: &str,
    ) -> Result<Vec<Permit<Labeled>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("label_id", label_id)).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_labelable(
        &self,
        ctx: &RequestCtx,
        labelable_id: &str,
    ) -> Result<Vec<Permit<Labeled>>, ContentError> {
        self.records
            .list(ctx, ListFilter::eq("labelable_id", labelable_id))
            .await
    }

    /// Attach `label_id` to `labelable_id`.
    ///
    /// # Errors
    ///
    /// `AccessDenied` before any storage call when the viewer may not
    /// connect the label.
    pub async fn connect(
        &self,
        ctx: &RequestCtx,
        label_id: &str,
        labelable_id: &str,
    ) -> Result<Permit<Labeled>, ContentError> {
        let candidate = Labeled {
            label_id: label_id.to_owned(),
            labelable_id: labelable_id.to_owned(),
            ..Labeled::default()
        };
        self.records
            .insert_as(ctx, AccessKind::Connect, candidate)
            .await
    }

    /// Detach `label_id` from `labelable_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the label is not attached; `AccessDenied` before the
    /// write when the viewer may not disconnect it.
    pub async fn disconnect(
        &self,
        ctx: &RequestCtx,
        label_id: &str,
        labelable_id: &str,
    ) -> Result<Permit<Labeled>, ContentError> {
        self.records
            .remove_by(ctx, AccessKind::Disconnect, "labelable", &[label_id, labelable_id])
            .await
    }
}

record_repo!(TopicRepo => Topic);

impl TopicRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_name(
        &self,
        ctx: &RequestCtx,
        name: &str,
    ) -> Result<Permit<Topic>, ContentError> {
        self.records.get_by(ctx, "name", &[name]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list(&self, ctx: &RequestCtx) -> Result<Vec<Permit<Topic>>, ContentError> {
        self.records.list(ctx, ListFilter::All).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn search(
        &self,
        ctx: &RequestCtx,
        query: &str,
    ) -> Result<Vec<Permit<Topic>>, ContentError> {
        self.records.list(ctx, ListFilter::search(query)).await
    }
}
