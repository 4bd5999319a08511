//! Form validation. The exact message strings matter: the frontend
//! string-matches on them.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::fmt;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_INVALID_DATE: &str = "Enter a valid date.";
pub const MSG_INVALID_TIME: &str = "Enter a valid time.";
pub const MSG_PAST_EVENT: &str = "This event is in the past.";

/// Per-field messages plus form-wide ones, in the order fields are declared.
#[derive(Debug, Default, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<&'static str, String>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    fn field(&mut self, name: &'static str, message: &str) {
        self.fields.entry(name).or_insert_with(|| message.to_string());
    }
}

fn required(errors: &mut FormErrors, name: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.field(name, MSG_REQUIRED);
        false
    } else {
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub organizer: String,
    pub name: String,
    pub comment: String,
    pub address: String,
    pub geolocation: String,
    pub event_date: String,
    pub event_time: String,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub organizer: String,
    pub name: String,
    pub comment: String,
    pub address: String,
    pub geolocation: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
}

impl EventForm {
    pub fn validate(&self, now: NaiveDateTime) -> Result<NewEvent, FormErrors> {
        let mut errors = FormErrors::default();

        required(&mut errors, "organizer", &self.organizer);
        required(&mut errors, "name", &self.name);
        required(&mut errors, "comment", &self.comment);
        required(&mut errors, "address", &self.address);
        required(&mut errors, "geolocation", &self.geolocation);

        let date = if required(&mut errors, "event_date", &self.event_date) {
            let parsed = fmt::parse_date(self.event_date.trim());
            if parsed.is_none() {
                errors.field("event_date", MSG_INVALID_DATE);
            }
            parsed
        } else {
            None
        };

        let time = if required(&mut errors, "event_time", &self.event_time) {
            let parsed = fmt::parse_time(self.event_time.trim());
            if parsed.is_none() {
                errors.field("event_time", MSG_INVALID_TIME);
            }
            parsed
        } else {
            None
        };

        if let (Some(date), Some(time)) = (date, time) {
            if date.and_time(time) < now {
                errors.non_field.push(MSG_PAST_EVENT.to_string());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewEvent {
            organizer: self.organizer.trim().to_string(),
            name: self.name.trim().to_string(),
            comment: self.comment.trim().to_string(),
            address: self.address.trim().to_string(),
            geolocation: self.geolocation.trim().to_string(),
            event_date: date.unwrap(),
            event_time: time.unwrap(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub full_name: String,
    pub bio: String,
    pub birthday: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub bio: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ProfileUpdate, FormErrors> {
        let mut errors = FormErrors::default();

        required(&mut errors, "full_name", &self.full_name);

        let birthday = match self.birthday.trim() {
            "" => None,
            raw => {
                let parsed = fmt::parse_date(raw);
                if parsed.is_none() {
                    errors.field("birthday", MSG_INVALID_DATE);
                }
                parsed
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let bio = match self.bio.trim() {
            "" => None,
            text => Some(text.to_string()),
        };

        Ok(ProfileUpdate {
            full_name: self.full_name.trim().to_string(),
            bio,
            birthday,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub name_text: String,
    pub comment_text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::default();
        required(&mut errors, "name_text", &self.name_text);
        required(&mut errors, "comment_text", &self.comment_text);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok((
            self.name_text.trim().to_string(),
            self.comment_text.trim().to_string(),
        ))
    }
}
