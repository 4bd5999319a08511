use std::env;
use std::str::FromStr;

use chrono::Local;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use zlot::db;

async fn seed_database_if_empty(pool: &SqlitePool) {
    let question_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
        .expect("failed to check question count");

    if question_count.0 == 0 {
        tracing::info!("empty database, seeding a sample poll");
        let now = Local::now().naive_local();
        let question = db::create_question(pool, "What's new?", now)
            .await
            .expect("failed to seed question");
        for choice in ["Not much", "The sky", "Just hacking again"] {
            db::create_choice(pool, question.id, choice)
                .await
                .expect("failed to seed choice");
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let connect_options = SqliteConnectOptions::from_str(&db_url)
        .expect("failed to parse DATABASE_URL")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("failed to connect to db");

    db::init_schema(&pool).await.expect("failed to create schema");
    seed_database_if_empty(&pool).await;

    let app = zlot::app(pool);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.unwrap();
}
