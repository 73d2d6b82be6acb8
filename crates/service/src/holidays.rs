//! Holiday directory: named public holidays, read by the leave editor.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::calendar::format_date;
use crate::errors::ServiceError;

/// Holiday as served to clients, date in `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub id: Uuid,
    pub date: String,
    pub name: String,
}

impl From<models::holiday::Model> for Holiday {
    fn from(m: models::holiday::Model) -> Self {
        Holiday { id: m.id, date: format_date(m.date), name: m.name }
    }
}

#[async_trait]
pub trait HolidayRepository: Send + Sync {
    async fn all(&self) -> Result<Vec<models::holiday::Model>, ServiceError>;
    async fn in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<models::holiday::Model>, ServiceError>;
    async fn upsert(&self, date: NaiveDate, name: &str) -> Result<models::holiday::Model, ServiceError>;
    async fn remove(&self, date: NaiveDate) -> Result<bool, ServiceError>;
}

pub struct HolidayService<R: HolidayRepository> {
    repo: Arc<R>,
}

impl<R: HolidayRepository> HolidayService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn all(&self) -> Result<Vec<Holiday>, ServiceError> {
        Ok(self.repo.all().await?.into_iter().map(Holiday::from).collect())
    }

    pub async fn in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Holiday>, ServiceError> {
        if end < start {
            return Err(ServiceError::InvalidRange("end must be on or after start".into()));
        }
        Ok(self.repo.in_range(start, end).await?.into_iter().map(Holiday::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn upsert(&self, date: NaiveDate, name: &str) -> Result<Holiday, ServiceError> {
        let saved = self.repo.upsert(date, name).await?;
        info!(date = %saved.date, name = %saved.name, "holiday_saved");
        Ok(saved.into())
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, date: NaiveDate) -> Result<(), ServiceError> {
        if !self.repo.remove(date).await? {
            return Err(ServiceError::not_found("holiday"));
        }
        info!(%date, "holiday_removed");
        Ok(())
    }
}

pub mod seaorm {
    use super::*;
    use models::pool::DbPool;
    use sea_orm::ConnectionTrait;

    /// Holiday dates within `[start, end]` as a lookup set, read on `db`.
    ///
    /// Takes any connection so the leave editor can read inside its transaction.
    pub async fn holiday_dates<C: ConnectionTrait>(
        db: &C,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, ServiceError> {
        Ok(models::holiday::in_range(db, start, end).await?.into_iter().map(|h| h.date).collect())
    }

    pub struct SeaOrmHolidayRepository {
        pub pool: Arc<DbPool>,
    }

    impl SeaOrmHolidayRepository {
        pub fn new(pool: Arc<DbPool>) -> Self { Self { pool } }
    }

    #[async_trait]
    impl HolidayRepository for SeaOrmHolidayRepository {
        async fn all(&self) -> Result<Vec<models::holiday::Model>, ServiceError> {
            Ok(models::holiday::all(self.pool.conn().as_ref()).await?)
        }

        async fn in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<models::holiday::Model>, ServiceError> {
            Ok(models::holiday::in_range(self.pool.conn().as_ref(), start, end).await?)
        }

        async fn upsert(&self, date: NaiveDate, name: &str) -> Result<models::holiday::Model, ServiceError> {
            Ok(models::holiday::upsert(self.pool.conn().as_ref(), date, name).await?)
        }

        async fn remove(&self, date: NaiveDate) -> Result<bool, ServiceError> {
            Ok(models::holiday::delete_on(self.pool.conn().as_ref(), date).await?)
        }
    }
}

/// In-memory repository for tests.
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockHolidayRepository {
        rows: Mutex<BTreeMap<NaiveDate, models::holiday::Model>>,
    }

    impl MockHolidayRepository {
        pub fn with(dates: &[(NaiveDate, &str)]) -> Self {
            let repo = Self::default();
            {
                let mut rows = repo.rows.lock().unwrap();
                for (date, name) in dates {
                    rows.insert(*date, models::holiday::Model { id: Uuid::new_v4(), date: *date, name: name.to_string() });
                }
            }
            repo
        }
    }

    #[async_trait]
    impl HolidayRepository for MockHolidayRepository {
        async fn all(&self) -> Result<Vec<models::holiday::Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<models::holiday::Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().range(start..=end).map(|(_, h)| h.clone()).collect())
        }

        async fn upsert(&self, date: NaiveDate, name: &str) -> Result<models::holiday::Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let entry = rows
                .entry(date)
                .or_insert_with(|| models::holiday::Model { id: Uuid::new_v4(), date, name: String::new() });
            entry.name = name.to_string();
            Ok(entry.clone())
        }

        async fn remove(&self, date: NaiveDate) -> Result<bool, ServiceError> {
            Ok(self.rows.lock().unwrap().remove(&date).is_some())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockHolidayRepository;
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn svc() -> HolidayService<MockHolidayRepository> {
        HolidayService::new(Arc::new(MockHolidayRepository::with(&[
            (d("2025-12-25"), "Christmas Day"),
            (d("2025-01-01"), "New Year's Day"),
            (d("2025-05-01"), "Labour Day"),
        ])))
    }

    #[tokio::test]
    async fn all_is_date_ordered_and_formatted() {
        let all = svc().all().await.unwrap();
        let dates: Vec<_> = all.iter().map(|h| h.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-01", "2025-05-01", "2025-12-25"]);
    }

    #[tokio::test]
    async fn range_is_inclusive_on_both_ends() {
        let s = svc();
        let hits = s.in_range(d("2025-01-01"), d("2025-05-01")).await.unwrap();
        assert_eq!(hits.len(), 2);
        let none = s.in_range(d("2025-01-02"), d("2025-04-30")).await.unwrap();
        assert!(none.is_empty());
        assert_eq!(s.in_range(d("2025-02-01"), d("2025-01-01")).await.unwrap_err().code(), "INVALID_RANGE");
    }

    #[tokio::test]
    async fn remove_missing_is_not_found() {
        let s = svc();
        s.remove(d("2025-05-01")).await.unwrap();
        assert_eq!(s.remove(d("2025-05-01")).await.unwrap_err().code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn directory_lookup_sees_uncommitted_holidays_in_the_same_transaction() -> Result<(), anyhow::Error> {
        use sea_orm::TransactionTrait;
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let pool = crate::test_support::get_pool().await?;
        let day = d("2034-08-15");
        let db = pool.conn();
        let txn = db.begin().await?;
        models::holiday::upsert(&txn, day, "Assumption Day").await?;
        let inside = super::seaorm::holiday_dates(&txn, d("2034-08-01"), d("2034-08-31")).await?;
        assert!(inside.contains(&day));
        txn.rollback().await?;
        let after = super::seaorm::holiday_dates(db.as_ref(), d("2034-08-01"), d("2034-08-31")).await?;
        assert!(!after.contains(&day));
        Ok(())
    }
}
