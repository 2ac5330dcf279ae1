use anyhow::{Context, Result};
use chrono::Utc;

use crate::db::Db;
use crate::models::Workout;

/// How long a cached workout list stays fresh, in milliseconds.
pub const CACHE_TTL_MS: i64 = 5 * 60 * 1000;

/// Per-program workout cache backed by the local database. One row per
/// program, replaced atomically on write, so readers never see a list from
/// one fetch with a timestamp from another.
pub struct WorkoutCache<'a> {
    pool: &'a Db,
}

impl<'a> WorkoutCache<'a> {
    pub fn new(pool: &'a Db) -> Self {
        Self { pool }
    }

    pub async fn get(&self, program_id: &str) -> Result<Option<Vec<Workout>>> {
        self.get_at(program_id, Utc::now().timestamp_millis()).await
    }

    /// Fresh iff the entry is strictly younger than the TTL.
    pub async fn get_at(&self, program_id: &str, now_ms: i64) -> Result<Option<Vec<Workout>>> {
        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT workouts, timestamp FROM program_workout_cache WHERE program_id = ?",
        )
        .bind(program_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some((raw, ts)) if now_ms - ts < CACHE_TTL_MS => {
                let workouts = serde_json::from_str(&raw).context("corrupt cached workouts")?;
                Ok(Some(workouts))
            }
            _ => Ok(None),
        }
    }

    pub async fn put(&self, program_id: &str, workouts: &[Workout]) -> Result<()> {
        self.put_at(program_id, workouts, Utc::now().timestamp_millis())
            .await
    }

    pub async fn put_at(&self, program_id: &str, workouts: &[Workout], now_ms: i64) -> Result<()> {
        let raw = serde_json::to_string(workouts)?;
        sqlx::query(
            "INSERT OR REPLACE INTO program_workout_cache (program_id, workouts, timestamp)
             VALUES (?, ?, ?)",
        )
        .bind(program_id)
        .bind(raw)
        .bind(now_ms)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn invalidate(&self, program_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM program_workout_cache WHERE program_id = ?")
            .bind(program_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::WorkoutType;

    async fn pool() -> Db {
        db::open("sqlite::memory:").await.unwrap()
    }

    fn workout(id: &str) -> Workout {
        Workout {
            workout_id: id.to_string(),
            name: "Push Day".to_string(),
            focus: None,
            workout_type: WorkoutType::Strength,
            estimated_duration: 45,
            intensity: None,
            is_rest_day: false,
            exercises: Vec::new(),
            scheduled_date: None,
            distance_km: None,
            pace_target: None,
        }
    }

    #[tokio::test]
    async fn hit_within_ttl_miss_after() {
        let pool = pool().await;
        let cache = WorkoutCache::new(&pool);

        cache.put_at("p1", &[workout("w1")], 1_000_000).await.unwrap();

        let hit = cache.get_at("p1", 1_000_000 + CACHE_TTL_MS - 1).await.unwrap();
        assert_eq!(hit.unwrap()[0].workout_id, "w1");

        // Exactly at the TTL the entry is already stale.
        let miss = cache.get_at("p1", 1_000_000 + CACHE_TTL_MS).await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn unknown_program_misses() {
        let pool = pool().await;
        let cache = WorkoutCache::new(&pool);
        assert!(cache.get_at("nope", 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_both_payload_and_timestamp() {
        let pool = pool().await;
        let cache = WorkoutCache::new(&pool);

        cache.put_at("p1", &[workout("old")], 0).await.unwrap();
        cache.put_at("p1", &[workout("new")], CACHE_TTL_MS * 2).await.unwrap();

        // The old timestamp is gone with the old payload.
        let hit = cache.get_at("p1", CACHE_TTL_MS * 2 + 1).await.unwrap();
        assert_eq!(hit.unwrap()[0].workout_id, "new");
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let pool = pool().await;
        let cache = WorkoutCache::new(&pool);

        cache.put_at("p1", &[workout("w1")], 0).await.unwrap();
        cache.invalidate("p1").await.unwrap();
        assert!(cache.get_at("p1", 1).await.unwrap().is_none());
    }
}
