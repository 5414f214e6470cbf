use content_sdk::models::{Course, CourseLesson, Lesson, Study, UserAsset};
use content_sdk::{ContentError, ListFilter};

use crate::domain::context::RequestCtx;
use crate::domain::permit::Permit;

record_repo!(StudyRepo => Study);

impl StudyRepo {
    /// A study is named uniquely within its owner's studies.
    ///
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_name(
        &self,
        ctx: &RequestCtx,
        user_id: &str,
        name: &str,
    ) -> Result<Permit<Study>, ContentError> {
        self.records.get_by(ctx, "name", &[user_id, name]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_user(
        &self,
        ctx: &RequestCtx,
        user_id: &str,
    ) -> Result<Vec<Permit<Study>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("user_id", user_id)).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn search(
        &self,
        ctx: &RequestCtx,
        query: &str,
    ) -> Result<Vec<Permit<Study>>, ContentError> {
        self.records.list(ctx, ListFilter::search(query)).await
    }
}

record_repo!(LessonRepo => Lesson);

impl LessonRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_number(
        &self,
        ctx: &RequestCtx,
        study_id: &str,
        number: i32,
    ) -> Result<Permit<Lesson>, ContentError> {
        let number = number.to_string();
        self.records.get_by(ctx, "number", &[study_id, &number]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_study(
        &self,
        ctx: &RequestCtx,
        study_id: &str,
    ) -> Result<Vec<Permit<Lesson>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("study_id", study_id)).await
    }
}

record_repo!(CourseRepo => Course);

impl CourseRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_number(
        &self,
        ctx: &RequestCtx,
        study_id: &str,
        number: i32,
    ) -> Result<Permit<Course>, ContentError> {
        let number = number.to_string();
        self.records.get_by(ctx, "number", &[study_id, &number]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_study(
        &self,
        ctx: &RequestCtx,
        study_id: &str,
    ) -> Result<Vec<Permit<Course>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("study_id", study_id)).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn search(
        &self,
        ctx: &RequestCtx,
        query: &str,
    ) -> Result<Vec<Permit<Course>>, ContentError> {
        self.records.list(ctx, ListFilter::search(query)).await
    }
}

record_repo!(CourseLessonRepo => CourseLesson);

impl CourseLessonRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_number(
        &self,
        ctx: &RequestCtx,
        course_id: &str,
        number: i32,
    ) -> Result<Permit<CourseLesson>, ContentError> {
        let number = number.to_string();
        self.records.get_by(ctx, "number", &[course_id, &number]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_course(
        &self,
        ctx: &RequestCtx,
        course_id: &str,
    ) -> Result<Vec<Permit<CourseLesson>>, ContentError> {
        self.records
            .list(ctx, ListFilter::eq("course_id", course_id))
            .await
    }
}

record_repo!(UserAssetRepo => UserAsset);

impl UserAssetRepo {
    /// # Errors
    ///
    /// See [`RecordRepo::get_by`](super::RecordRepo::get_by).
    pub async fn get_by_name(
        &self,
        ctx: &RequestCtx,
        study_id: &str,
        name: &str,
    ) -> Result<Permit<UserAsset>, ContentError> {
        self.records.get_by(ctx, "name", &[study_id, name]).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_study(
        &self,
        ctx: &RequestCtx,
        study_id: &str,
    ) -> Result<Vec<Permit<UserAsset>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("study_id", study_id)).await
    }

    /// # Errors
    ///
    /// See [`RecordRepo::list`](super::RecordRepo::list).
    pub async fn list_by_user(
        &self,
        ctx: &RequestCtx,
        user_id: &str,
    ) -> Result<Vec<Permit<UserAsset>>, ContentError> {
        self.records.list(ctx, ListFilter::eq("user_id", user_id)).await
    }
}
