use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tokio::sync::OnceCell;

use super::store::IdiomStore;
use crate::error::StoreError;
use crate::models::idiom::{Idiom, IdiomRow};

/// 多个实例同时冷启动时，用事务级 advisory lock 串行化建表
const SCHEMA_LOCK_ID: i64 = 0x6368_656e_6779_75;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS idioms (
        key           TEXT PRIMARY KEY,
        pronunciation TEXT NOT NULL DEFAULT '',
        meaning       TEXT NOT NULL DEFAULT '',
        origin        TEXT NOT NULL DEFAULT '',
        examples      TEXT[] NOT NULL DEFAULT '{}',
        usage_note    TEXT,
        synonyms      TEXT[] NOT NULL DEFAULT '{}',
        antonyms      TEXT[] NOT NULL DEFAULT '{}',
        served        BOOLEAN NOT NULL DEFAULT FALSE,
        created_at    TIMESTAMPTZ DEFAULT NOW(),
        updated_at    TIMESTAMPTZ DEFAULT NOW()
    )
"#;

const CREATE_SERVED_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_idioms_served ON idioms(served)";

const SELECT_COLUMNS: &str = "SELECT key, pronunciation, meaning, origin, examples, usage_note, \
     synonyms, antonyms, served, updated_at FROM idioms";

/// Postgres 持久层。没有配置数据库时所有操作返回 `StoreError::Unavailable`。
pub struct PgIdiomStore {
    pool: Option<PgPool>,
    schema: OnceCell<()>,
}

impl PgIdiomStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Some(pool),
            schema: OnceCell::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            pool: None,
            schema: OnceCell::new(),
        }
    }

    /// 每个进程只建一次表；失败不会缓存，下次调用会重试
    async fn pool(&self) -> Result<&PgPool, StoreError> {
        let pool = self.pool.as_ref().ok_or(StoreError::Unavailable)?;
        self.schema.get_or_try_init(|| ensure_schema(pool)).await?;
        Ok(pool)
    }
}

async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_ID)
        .execute(&mut *tx)
        .await?;
    sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
    sqlx::query(CREATE_SERVED_INDEX).execute(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("<<< idioms 表已就绪");
    Ok(())
}

fn to_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

#[async_trait]
impl IdiomStore for PgIdiomStore {
    async fn get(&self, key: &str) -> Result<Option<Idiom>, StoreError> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, IdiomRow>(&format!("{SELECT_COLUMNS} WHERE key = $1"))
            .bind(key)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Idiom::from))
    }

    async fn upsert(&self, idiom: &Idiom) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO idioms (key, pronunciation, meaning, origin, examples, usage_note, synonyms, antonyms, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (key) DO UPDATE SET
                pronunciation = EXCLUDED.pronunciation,
                meaning = EXCLUDED.meaning,
                origin = EXCLUDED.origin,
                examples = EXCLUDED.examples,
                usage_note = EXCLUDED.usage_note,
                synonyms = EXCLUDED.synonyms,
                antonyms = EXCLUDED.antonyms,
                updated_at = NOW()
            "#,
        )
        .bind(&idiom.key)
        .bind(&idiom.pronunciation)
        .bind(&idiom.meaning)
        .bind(&idiom.origin)
        .bind(&idiom.examples)
        .bind(&idiom.usage_note)
        .bind(&idiom.synonyms)
        .bind(&idiom.antonyms)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let pool = self.pool().await?;
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM idioms")
            .fetch_one(pool)
            .await?;
        Ok(to_count(n))
    }

    async fn count_served(&self) -> Result<usize, StoreError> {
        let pool = self.pool().await?;
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM idioms WHERE served = TRUE")
            .fetch_one(pool)
            .await?;
        Ok(to_count(n))
    }

    async fn delete_all(&self) -> Result<usize, StoreError> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM idioms").execute(pool).await?;
        Ok(result.rows_affected() as usize)
    }

    async fn mark_served(&self, key: &str) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        sqlx::query("UPDATE idioms SET served = TRUE WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn random_sample(&self, n: usize) -> Result<Vec<Idiom>, StoreError> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, IdiomRow>(&format!("{SELECT_COLUMNS} ORDER BY RANDOM() LIMIT $1"))
            .bind(i64::try_from(n).unwrap_or(i64::MAX))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Idiom::from).collect())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let pool = self.pool().await?;
        Ok(sqlx::query_scalar("SELECT key FROM idioms").fetch_all(pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_store_is_unavailable() {
        let store = PgIdiomStore::disabled();
        assert!(matches!(store.get("温故知新").await, Err(StoreError::Unavailable)));
        assert!(matches!(store.count().await, Err(StoreError::Unavailable)));
    }
}
