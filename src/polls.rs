//! The polls side of the site: published questions, choice voting and the
//! open comment board. Voting here is anonymous, unlike event responses.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, found};
use crate::forms::{CommentForm, FormErrors};
use crate::models::{Choice, Comment, Question};
use crate::state::AppState;

const MSG_NO_CHOICE: &str = "You didn't select a choice.";

#[derive(Serialize)]
pub struct QuestionListPage {
    pub latest_questions: Vec<Question>,
}

pub async fn list_questions(
    State(state): State<AppState>,
) -> Result<Json<QuestionListPage>, AppError> {
    let now = Local::now().naive_local();
    let latest_questions = db::latest_questions(&state.pool, now).await?;
    Ok(Json(QuestionListPage { latest_questions }))
}

#[derive(Serialize)]
pub struct QuestionPage {
    pub question: Question,
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn question_page(
    pool: &SqlitePool,
    question: Question,
    error: Option<&str>,
) -> Result<QuestionPage, AppError> {
    let choices = db::question_choices(pool, question.id).await?;
    Ok(QuestionPage {
        question,
        choices,
        error: error.map(str::to_string),
    })
}

/// Unpublished questions are invisible here but reachable on the results
/// page.
pub async fn question_detail(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Json<QuestionPage>, AppError> {
    let now = Local::now().naive_local();
    let question = db::get_published_question(&state.pool, question_id, now)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no question with id {question_id}")))?;
    question_page(&state.pool, question, None).await.map(Json)
}

pub async fn question_results(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Json<QuestionPage>, AppError> {
    let question = db::get_question(&state.pool, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no question with id {question_id}")))?;
    question_page(&state.pool, question, None).await.map(Json)
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct PollVotePayload {
    pub choice: Option<i64>,
}

pub async fn vote(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Json(payload): Json<PollVotePayload>,
) -> Result<Response, AppError> {
    let question = db::get_question(&state.pool, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no question with id {question_id}")))?;

    if let Some(choice_id) = payload.choice {
        if db::cast_poll_vote(&state.pool, question.id, choice_id).await? {
            return Ok(found(&format!("/polls/{}/results", question.id)));
        }
    }

    let page = question_page(&state.pool, question, Some(MSG_NO_CHOICE)).await?;
    Ok(Json(page).into_response())
}

#[derive(Serialize)]
pub struct CommentFormPage {
    pub values: CommentForm,
    pub errors: FormErrors,
}

pub async fn comment_form() -> Json<CommentFormPage> {
    Json(CommentFormPage {
        values: CommentForm::default(),
        errors: FormErrors::default(),
    })
}

pub async fn submit_comment(
    State(state): State<AppState>,
    Json(form): Json<CommentForm>,
) -> Result<Response, AppError> {
    match form.validate() {
        Ok((name_text, comment_text)) => {
            db::create_comment(&state.pool, &name_text, &comment_text).await?;
            Ok(found("/polls/comments/list"))
        }
        Err(errors) => Ok(Json(CommentFormPage {
            values: form,
            errors,
        })
        .into_response()),
    }
}

#[derive(Serialize)]
pub struct CommentListPage {
    pub comments: Vec<Comment>,
}

pub async fn comment_list(
    State(state): State<AppState>,
) -> Result<Json<CommentListPage>, AppError> {
    let comments = db::all_comments(&state.pool).await?;
    Ok(Json(CommentListPage { comments }))
}
