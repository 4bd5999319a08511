use chrono::NaiveDateTime;
use nanoid::nanoid;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::forms::{NewEvent, ProfileUpdate};
use crate::models::{
    Choice, Comment, Event, EventResponse, Profile, Question, RESPONSE_OPTIONS, User,
};

pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS profiles (
            user_id INTEGER PRIMARY KEY,
            full_name TEXT NOT NULL,
            bio TEXT,
            birthday DATE,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            organizer TEXT NOT NULL,
            name TEXT NOT NULL,
            comment TEXT NOT NULL,
            address TEXT NOT NULL,
            geolocation TEXT NOT NULL,
            event_date DATE NOT NULL,
            event_time TIME NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users (id)
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS responses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL,
            response_text TEXT NOT NULL,
            votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
            FOREIGN KEY (event_id) REFERENCES events (id) ON DELETE CASCADE
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_text TEXT NOT NULL,
            pub_date TIMESTAMP NOT NULL
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS choices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER NOT NULL,
            choice_text TEXT NOT NULL,
            votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
            FOREIGN KEY (question_id) REFERENCES questions (id) ON DELETE CASCADE
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name_text TEXT NOT NULL,
            comment_text TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// --- users & sessions ---

pub async fn find_user_by_name(pool: &SqlitePool, name: &str) -> Result<Option<User>, AppError> {
    sqlx::query_as("SELECT id, username FROM users WHERE username = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn create_user(pool: &SqlitePool, name: &str) -> Result<User, AppError> {
    let user_id = sqlx::query("INSERT INTO users (username) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(User {
        id: user_id,
        username: name.to_string(),
    })
}

pub async fn create_session(pool: &SqlitePool, user_id: i64) -> Result<String, AppError> {
    let token = nanoid!(32);
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?, ?)")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn user_for_token(pool: &SqlitePool, token: &str) -> Result<Option<User>, AppError> {
    sqlx::query_as(
        "SELECT u.id, u.username FROM users u
         JOIN sessions s ON s.user_id = u.id
         WHERE s.token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from)
}

// --- events & responses ---

/// Events at or after `now`, in insertion order.
pub async fn upcoming_events(pool: &SqlitePool, now: NaiveDateTime) -> Result<Vec<Event>, AppError> {
    sqlx::query_as(
        "SELECT * FROM events
         WHERE event_date > ? OR (event_date = ? AND event_time >= ?)
         ORDER BY id",
    )
    .bind(now.date())
    .bind(now.date())
    .bind(now.time())
    .fetch_all(pool)
    .await
    .map_err(AppError::from)
}

pub async fn get_event(pool: &SqlitePool, event_id: i64) -> Result<Option<Event>, AppError> {
    sqlx::query_as("SELECT * FROM events WHERE id = ?")
        .bind(event_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

/// Inserts the event together with its three zero-tally response rows.
pub async fn create_event(
    pool: &SqlitePool,
    user_id: i64,
    new: &NewEvent,
) -> Result<Event, AppError> {
    let mut tx = pool.begin().await?;
    let event: Event = sqlx::query_as(
        "INSERT INTO events (user_id, organizer, name, comment, address, geolocation, event_date, event_time)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(user_id)
    .bind(&new.organizer)
    .bind(&new.name)
    .bind(&new.comment)
    .bind(&new.address)
    .bind(&new.geolocation)
    .bind(new.event_date)
    .bind(new.event_time)
    .fetch_one(&mut *tx)
    .await?;

    for option in RESPONSE_OPTIONS {
        sqlx::query("INSERT INTO responses (event_id, response_text) VALUES (?, ?)")
            .bind(event.id)
            .bind(option)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(event)
}

pub async fn event_responses(
    pool: &SqlitePool,
    event_id: i64,
) -> Result<Vec<EventResponse>, AppError> {
    sqlx::query_as("SELECT * FROM responses WHERE event_id = ? ORDER BY id")
        .bind(event_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
}

/// Single in-place increment; scoping by event id keeps a response id from
/// another event from counting. Returns false when nothing matched.
pub async fn cast_event_vote(
    pool: &SqlitePool,
    event_id: i64,
    response_id: i64,
) -> Result<bool, AppError> {
    let affected = sqlx::query("UPDATE responses SET votes = votes + 1 WHERE id = ? AND event_id = ?")
        .bind(response_id)
        .bind(event_id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected == 1)
}

pub async fn delete_event(pool: &SqlitePool, event_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}

// --- profiles ---

pub async fn get_profile(pool: &SqlitePool, user_id: i64) -> Result<Option<Profile>, AppError> {
    sqlx::query_as("SELECT * FROM profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn upsert_profile(
    pool: &SqlitePool,
    user_id: i64,
    update: &ProfileUpdate,
) -> Result<Profile, AppError> {
    sqlx::query_as(
        "INSERT INTO profiles (user_id, full_name, bio, birthday) VALUES (?, ?, ?, ?)
         ON CONFLICT (user_id) DO UPDATE
         SET full_name = excluded.full_name, bio = excluded.bio, birthday = excluded.birthday
         RETURNING *",
    )
    .bind(user_id)
    .bind(&update.full_name)
    .bind(&update.bio)
    .bind(update.birthday)
    .fetch_one(pool)
    .await
    .map_err(AppError::from)
}

// --- polls ---

pub async fn create_question(
    pool: &SqlitePool,
    question_text: &str,
    pub_date: NaiveDateTime,
) -> Result<Question, AppError> {
    sqlx::query_as("INSERT INTO questions (question_text, pub_date) VALUES (?, ?) RETURNING *")
        .bind(question_text)
        .bind(pub_date)
        .fetch_one(pool)
        .await
        .map_err(AppError::from)
}

pub async fn create_choice(
    pool: &SqlitePool,
    question_id: i64,
    choice_text: &str,
) -> Result<Choice, AppError> {
    sqlx::query_as("INSERT INTO choices (question_id, choice_text) VALUES (?, ?) RETURNING *")
        .bind(question_id)
        .bind(choice_text)
        .fetch_one(pool)
        .await
        .map_err(AppError::from)
}

/// The five most recently published questions, excluding future ones.
pub async fn latest_questions(
    pool: &SqlitePool,
    now: NaiveDateTime,
) -> Result<Vec<Question>, AppError> {
    sqlx::query_as("SELECT * FROM questions WHERE pub_date <= ? ORDER BY pub_date DESC LIMIT 5")
        .bind(now)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
}

pub async fn get_question(pool: &SqlitePool, question_id: i64) -> Result<Option<Question>, AppError> {
    sqlx::query_as("SELECT * FROM questions WHERE id = ?")
        .bind(question_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

/// Detail pages hide questions that are not yet published; results pages
/// use `get_question` instead.
pub async fn get_published_question(
    pool: &SqlitePool,
    question_id: i64,
    now: NaiveDateTime,
) -> Result<Option<Question>, AppError> {
    sqlx::query_as("SELECT * FROM questions WHERE id = ? AND pub_date <= ?")
        .bind(question_id)
        .bind(now)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn question_choices(
    pool: &SqlitePool,
    question_id: i64,
) -> Result<Vec<Choice>, AppError> {
    sqlx::query_as("SELECT * FROM choices WHERE question_id = ? ORDER BY id")
        .bind(question_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
}

pub async fn cast_poll_vote(
    pool: &SqlitePool,
    question_id: i64,
    choice_id: i64,
) -> Result<bool, AppError> {
    let affected =
        sqlx::query("UPDATE choices SET votes = votes + 1 WHERE id = ? AND question_id = ?")
            .bind(choice_id)
            .bind(question_id)
            .execute(pool)
            .await?
            .rows_affected();
    Ok(affected == 1)
}

pub async fn create_comment(
    pool: &SqlitePool,
    name_text: &str,
    comment_text: &str,
) -> Result<Comment, AppError> {
    sqlx::query_as("INSERT INTO comments (name_text, comment_text) VALUES (?, ?) RETURNING *")
        .bind(name_text)
        .bind(comment_text)
        .fetch_one(pool)
        .await
        .map_err(AppError::from)
}

pub async fn all_comments(pool: &SqlitePool) -> Result<Vec<Comment>, AppError> {
    sqlx::query_as("SELECT * FROM comments ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
}

pub async fn count_responses(pool: &SqlitePool, event_id: i64) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM responses WHERE event_id = ?")
        .bind(event_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
