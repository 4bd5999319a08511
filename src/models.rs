use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub organizer: String,
    pub name: String,
    pub comment: String,
    pub address: String,
    pub geolocation: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    #[serde(skip_serializing)]
    pub created_at: NaiveDateTime,
}

impl Event {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.event_date.and_time(self.event_time)
    }
}

/// One of the three fixed attendance options of an event.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventResponse {
    pub id: i64,
    #[serde(skip_serializing)]
    pub event_id: i64,
    pub response_text: String,
    pub votes: i64,
}

pub const RESPONSE_OPTIONS: [&str; 3] = ["Going", "Not Going", "Maybe"];

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub user_id: i64,
    pub full_name: String,
    pub bio: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// Who is looking at an event detail page, decided once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerRole {
    Organizer,
    Respondent,
    Anonymous,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Choice {
    pub id: i64,
    #[serde(skip_serializing)]
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub name_text: String,
    pub comment_text: String,
    #[serde(skip_serializing)]
    pub created_at: NaiveDateTime,
}
