//! Shared fixture for pymk-rec integration tests
//!
//! Builds a small social graph in an in-memory store. User ids equal their
//! usernames so assertions can name them directly.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use pymk_common::db::{
    init_memory_database, insert_comment, insert_follow, insert_like, insert_post, insert_user,
    Comment, Post, User,
};
use sqlx::SqlitePool;

pub struct Fixture {
    pub pool: SqlitePool,
    /// Evaluation instant used by every test
    pub as_of: DateTime<Utc>,
}

impl Fixture {
    pub async fn new() -> Self {
        let pool = init_memory_database()
            .await
            .expect("Should open in-memory database");
        Self {
            pool,
            as_of: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
        }
    }

    /// A point well outside the recency window
    pub fn long_ago(&self) -> DateTime<Utc> {
        self.as_of - Duration::days(90)
    }

    pub async fn user(&self, name: &str) -> String {
        let mut user = User::new(name, self.long_ago());
        user.id = name.to_string();
        user.display_name = format!("{} Display", name);
        insert_user(&self.pool, &user).await.expect("Should insert user");
        user.id
    }

    pub async fn users(&self, prefix: &str, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            ids.push(self.user(&format!("{}{:02}", prefix, i)).await);
        }
        ids
    }

    pub async fn follow(&self, follower: &str, following: &str) {
        insert_follow(&self.pool, follower, following, self.long_ago())
            .await
            .expect("Should insert follow");
    }

    /// Post created `age` before the evaluation instant
    pub async fn post_aged(&self, author: &str, age: Duration) -> String {
        let post = Post::new(author, "hello", self.as_of - age);
        insert_post(&self.pool, &post).await.expect("Should insert post");
        post.id
    }

    /// Post far outside the recency window
    pub async fn old_post(&self, author: &str) -> String {
        self.post_aged(author, Duration::days(90)).await
    }

    pub async fn like(&self, user: &str, post: &str) {
        insert_like(&self.pool, user, post, self.long_ago())
            .await
            .expect("Should insert like");
    }

    pub async fn comment(&self, user: &str, post: &str) {
        let comment = Comment::new(user, post, "nice", self.long_ago());
        insert_comment(&self.pool, &comment)
            .await
            .expect("Should insert comment");
    }

    /// Give `target` exactly `count` new followers nobody else knows about
    pub async fn add_followers(&self, target: &str, count: usize) {
        let fans = self.users(&format!("{}-fan", target), count).await;
        for fan in fans {
            self.follow(&fan, target).await;
        }
    }
}
