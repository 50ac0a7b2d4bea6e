//! # HTS Rate Repository
//!
//! Database operations for tariff lines.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  hts_rates                                                              │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  hts_code (PK) │ description │ general_rate │ special_rate │ column2_   │
//! │  0102.21.00.00 │ Live cattle │ 2.5%         │ Free         │ 5%         │
//! │  0201.10.00.00 │ Carcasses.. │ 4.4¢/kg      │ Free         │ 6.6¢/kg    │
//! │  ...           │             │ NULL = column absent for this line       │
//! │                                                                         │
//! │        │ HtsRateRow (FromRow)                                           │
//! │        ▼                                                                │
//! │  HtsRateRecord { hts_code, description, rates: {column → text} }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rate text is stored verbatim and parsed at calculation time.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use landed_core::validation::{validate_description, validate_search_query};
use landed_core::{HtsCode, HtsRateRecord, HtsSection, RateColumn, SectionSummary};

const TABLE: &str = "hts_rates";

/// One `hts_rates` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct HtsRateRow {
    pub hts_code: String,
    pub description: String,
    pub general_rate: Option<String>,
    pub special_rate: Option<String>,
    pub column2_rate: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<HtsRateRow> for HtsRateRecord {
    type Error = DbError;

    fn try_from(row: HtsRateRow) -> Result<Self, Self::Error> {
        let hts_code = HtsCode::parse(&row.hts_code)
            .map_err(|e| DbError::corrupt(TABLE, format!("{}: {}", row.hts_code, e)))?;

        let rates: BTreeMap<RateColumn, String> = [
            (RateColumn::General, row.general_rate),
            (RateColumn::Special, row.special_rate),
            (RateColumn::Column2, row.column2_rate),
        ]
        .into_iter()
        .filter_map(|(column, text)| text.map(|t| (column, t)))
        .collect();

        Ok(HtsRateRecord {
            hts_code,
            description: row.description,
            rates,
        })
    }
}

/// One row of the per-section summary query.
#[derive(Debug, Clone, FromRow)]
struct SectionSummaryRow {
    section: String,
    item_count: i64,
    first_description: String,
}

impl TryFrom<SectionSummaryRow> for SectionSummary {
    type Error = DbError;

    fn try_from(row: SectionSummaryRow) -> Result<Self, Self::Error> {
        let section: HtsSection = row
            .section
            .parse()
            .map_err(|e| DbError::corrupt(TABLE, format!("section {}: {}", row.section, e)))?;

        Ok(SectionSummary {
            section,
            item_count: row.item_count,
            first_description: row.first_description,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        hts_code,
        description,
        general_rate,
        special_rate,
        column2_rate,
        created_at,
        updated_at
    FROM hts_rates
"#;

const UPSERT: &str = r#"
    INSERT INTO hts_rates (
        hts_code, description, general_rate, special_rate, column2_rate,
        section, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
    ON CONFLICT(hts_code) DO UPDATE SET
        description  = excluded.description,
        section      = excluded.section,
        general_rate = excluded.general_rate,
        special_rate = excluded.special_rate,
        column2_rate = excluded.column2_rate,
        updated_at   = excluded.updated_at
"#;

/// Repository for tariff line operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.hts_rates();
///
/// repo.replace_all(&sample_records()).await?;
/// let cattle = repo.get_by_code(&HtsCode::parse("0102.21.00.00")?).await?;
/// let hits = repo.search("cattle", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HtsRateRepository {
    pool: SqlitePool,
}

impl HtsRateRepository {
    /// Creates a new HtsRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HtsRateRepository { pool }
    }

    /// Exact-match lookup by canonical code.
    ///
    /// ## Returns
    /// * `Ok(Some(record))` - Line found
    /// * `Ok(None)` - Code not in the schedule
    pub async fn get_by_code(&self, code: &HtsCode) -> DbResult<Option<HtsRateRecord>> {
        debug!(hts_code = %code, "Fetching rate record");

        let row: Option<HtsRateRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE hts_code = ?1"))
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(HtsRateRecord::try_from).transpose()
    }

    /// Inserts a line or replaces its description and rates.
    ///
    /// `created_at` survives updates; `updated_at` is refreshed. Blank or
    /// over-long descriptions are rejected.
    pub async fn upsert(&self, record: &HtsRateRecord) -> DbResult<()> {
        debug!(hts_code = %record.hts_code, "Upserting rate record");
        validate_description(&record.description)?;

        bind_upsert(record, Utc::now()).execute(&self.pool).await?;
        Ok(())
    }

    /// Replaces the whole schedule in one transaction.
    ///
    /// Either every record lands or the previous schedule is left intact.
    ///
    /// ## Returns
    /// Number of records written.
    pub async fn replace_all(&self, records: &[HtsRateRecord]) -> DbResult<usize> {
        info!(count = records.len(), "Replacing rate schedule");

        for record in records {
            validate_description(&record.description)?;
        }

        let mut tx: Transaction<'_, Sqlite> = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM hts_rates").execute(&mut *tx).await?;

        let now = Utc::now();
        for record in records {
            bind_upsert(record, now).execute(&mut *tx).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = records.len(), "Rate schedule replaced");
        Ok(records.len())
    }

    /// Keyword search over descriptions, case-insensitive, in code order.
    ///
    /// An empty keyword lists the first `limit` lines. `%` and `_` in the
    /// keyword match literally. Over-long keywords are rejected.
    pub async fn search(&self, keyword: &str, limit: u32) -> DbResult<Vec<HtsRateRecord>> {
        let keyword = validate_search_query(keyword)?;
        debug!(keyword = %keyword, limit = %limit, "Searching rate records");

        let pattern = format!("%{}%", escape_like(&keyword));

        let rows: Vec<HtsRateRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE description LIKE ?1 ESCAPE '\\' ORDER BY hts_code LIMIT ?2"
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Search returned rate records");
        rows.into_iter().map(HtsRateRecord::try_from).collect()
    }

    /// Codes near `code`: same heading first, then same chapter, in code order.
    pub async fn suggest_codes(&self, code: &HtsCode, limit: u32) -> DbResult<Vec<HtsCode>> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT hts_code
            FROM hts_rates
            WHERE substr(hts_code, 1, 2) = ?1
              AND hts_code != ?3
            ORDER BY substr(hts_code, 1, 4) != ?2, hts_code
            LIMIT ?4
            "#,
        )
        .bind(code.chapter())
        .bind(code.heading())
        .bind(code.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        codes
            .iter()
            .map(|c| HtsCode::parse(c).map_err(|e| DbError::corrupt(TABLE, format!("{c}: {e}"))))
            .collect()
    }

    /// Line counts per section, in section order. Lines outside any
    /// section are left out.
    pub async fn section_summary(&self) -> DbResult<Vec<SectionSummary>> {
        let rows: Vec<SectionSummaryRow> = sqlx::query_as(
            r#"
            SELECT
                r.section AS section,
                COUNT(*) AS item_count,
                (SELECT f.description
                   FROM hts_rates f
                  WHERE f.section = r.section
                  ORDER BY f.hts_code
                  LIMIT 1) AS first_description
            FROM hts_rates r
            WHERE r.section IS NOT NULL
            GROUP BY r.section
            ORDER BY MIN(r.hts_code)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SectionSummary::try_from).collect()
    }

    /// Number of lines in the schedule.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hts_rates")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn bind_upsert(
    record: &HtsRateRecord,
    now: DateTime<Utc>,
) -> sqlx::query::Query<'_, Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(UPSERT)
        .bind(record.hts_code.as_str())
        .bind(record.description.as_str())
        .bind(record.rate(RateColumn::General))
        .bind(record.rate(RateColumn::Special))
        .bind(record.rate(RateColumn::Column2))
        .bind(record.hts_code.section().map(|s| s.numeral()))
        .bind(now)
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use landed_core::schedule::sample_records;

    fn code(s: &str) -> HtsCode {
        HtsCode::parse(s).unwrap()
    }

    async fn seeded() -> HtsRateRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.hts_rates();
        repo.replace_all(&sample_records()).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_replace_all_and_get_by_code() {
        let repo = seeded().await;
        assert_eq!(repo.count().await.unwrap(), sample_records().len() as i64);

        let cattle = repo.get_by_code(&code("0102.21.00.00")).await.unwrap().unwrap();
        assert_eq!(cattle.description, "Live cattle, purebred breeding animals");
        assert_eq!(cattle.rate(RateColumn::General), Some("2.5%"));
        assert_eq!(cattle.rate(RateColumn::Column2), Some("5%"));

        assert!(repo.get_by_code(&code("9999.99.99.99")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_rate_text() {
        let repo = seeded().await;
        for expected in sample_records() {
            let stored = repo.get_by_code(&expected.hts_code).await.unwrap().unwrap();
            assert_eq!(stored, expected);
        }
    }

    #[tokio::test]
    async fn test_replace_all_discards_previous_schedule() {
        let repo = seeded().await;
        let oxygen = HtsRateRecord::new(code("2804.40.00.00"), "Oxygen", "3.7%", "Free", "25%");

        assert_eq!(repo.replace_all(std::slice::from_ref(&oxygen)).await.unwrap(), 1);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.get_by_code(&code("0101.30.00.00")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_updates_and_keeps_missing_columns_absent() {
        let repo = seeded().await;

        let mut sodium = HtsRateRecord::new(code("2805.11.00.00"), "Sodium", "5.5%", "Free", "41%");
        sodium.rates.remove(&RateColumn::Special);
        repo.upsert(&sodium).await.unwrap();

        let stored = repo.get_by_code(&sodium.hts_code).await.unwrap().unwrap();
        assert_eq!(stored.rate(RateColumn::General), Some("5.5%"));
        assert_eq!(stored.rate(RateColumn::Special), None);
        assert_eq!(repo.count().await.unwrap(), sample_records().len() as i64);
    }

    #[tokio::test]
    async fn test_search_by_description() {
        let repo = seeded().await;

        let hits = repo.search("PUREBRED", 10).await.unwrap();
        let codes: Vec<&str> = hits.iter().map(|r| r.hts_code.as_str()).collect();
        assert_eq!(codes, vec!["0102.21.00.00", "0103.10.00.00", "0104.10.10.00"]);

        assert_eq!(repo.search("", 4).await.unwrap().len(), 4);
        assert_eq!(repo.search("  ", 100).await.unwrap().len(), sample_records().len());
        assert!(repo.search("100%", 10).await.unwrap().is_empty());
        assert!(matches!(
            repo.search(&"x".repeat(500), 10).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected() {
        let repo = seeded().await;
        let blank = HtsRateRecord::new(code("2804.40.00.00"), "   ", "3.7%", "Free", "25%");

        assert!(matches!(repo.upsert(&blank).await, Err(DbError::Validation(_))));
        assert!(repo.get_by_code(&blank.hts_code).await.unwrap().is_none());

        let mut records = sample_records();
        records.push(blank);
        assert!(matches!(repo.replace_all(&records).await, Err(DbError::Validation(_))));
        assert_eq!(repo.count().await.unwrap(), sample_records().len() as i64);
    }

    #[tokio::test]
    async fn test_suggest_codes_prefers_heading() {
        let repo = seeded().await;

        let suggestions = repo.suggest_codes(&code("0102.29.00.00"), 3).await.unwrap();
        assert_eq!(
            suggestions,
            vec![code("0102.21.00.00"), code("0101.30.00.00"), code("0103.10.00.00")]
        );

        assert!(repo.suggest_codes(&code("9999.99.99.99"), 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_section_summary_groups_by_chapter_range() {
        let repo = seeded().await;

        let summary = repo.section_summary().await.unwrap();
        let counts: Vec<(&str, i64)> = summary
            .iter()
            .map(|s| (s.section.numeral(), s.item_count))
            .collect();
        assert_eq!(
            counts,
            vec![("I", 6), ("II", 3), ("VI", 2), ("XV", 2), ("XVI", 2)]
        );
        assert_eq!(summary[0].first_description, "Live asses");
        assert_eq!(summary[2].first_description, "Oxygen");

        let total: i64 = summary.iter().map(|s| s.item_count).sum();
        assert_eq!(total, repo.count().await.unwrap());

        assert_eq!(summary, landed_core::RateSchedule::sample().section_summary());
    }

    #[tokio::test]
    async fn test_lines_outside_sections_are_not_summarized() {
        let repo = seeded().await;
        let special = HtsRateRecord::new(code("9903.88.15.00"), "Section 301 duties", "25%", "", "");
        repo.upsert(&special).await.unwrap();

        let summary = repo.section_summary().await.unwrap();
        assert_eq!(summary.len(), 5);
        assert!(repo.get_by_code(&special.hts_code).await.unwrap().is_some());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("10%_off\\"), "10\\%\\_off\\\\");
        assert_eq!(escape_like("cattle"), "cattle");
    }
}
