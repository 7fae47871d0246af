use sqlx::Error;

use crate::model::{Staking_Rate_Stats, Table};

use super::QueryResult;

impl Table<Staking_Rate_Stats> {
    pub async fn create_table(&self) -> Result<QueryResult, Error> {
        const SQL: &str = r#"
        CREATE TABLE stakingratestats (
            block_nr int PRIMARY KEY,
            block_time bigint,
            nominal_rate numeric,
            actual_rate numeric
        )
        "#;

        sqlx::query(SQL).execute(&self.pool).await
    }

    pub async fn drop_table(&self) -> Result<QueryResult, Error> {
        const SQL: &str = r#"
        DROP TABLE stakingratestats
        "#;

        sqlx::query(SQL).execute(&self.pool).await
    }

    /// First write wins, a row already present for `block_nr` is kept.
    pub async fn insert(
        &self,
        data: Staking_Rate_Stats,
    ) -> Result<QueryResult, Error> {
        const SQL: &str = r#"
        INSERT INTO stakingratestats (
            block_nr,
            block_time,
            nominal_rate,
            actual_rate
        )
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (block_nr) DO NOTHING
        "#;

        sqlx::query(SQL)
            .bind(data.block_nr)
            .bind(data.block_time)
            .bind(&data.nominal_rate)
            .bind(&data.actual_rate)
            .persistent(true)
            .execute(&self.pool)
            .await
    }

    pub async fn get_recent(
        &self,
        limit: i64,
    ) -> Result<Vec<Staking_Rate_Stats>, Error> {
        const SQL: &str = r#"
        SELECT block_nr, block_time, nominal_rate, actual_rate
        FROM stakingratestats
        ORDER BY block_nr DESC
        LIMIT $1
        "#;

        sqlx::query_as(SQL)
            .bind(limit)
            .persistent(true)
            .fetch_all(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::dao::PoolOption;

    /// Runs only with `STAKINGSTAT_TEST_DATABASE_URL` set. The table in that
    /// database is dropped and recreated.
    async fn test_table() -> Option<Table<Staking_Rate_Stats>> {
        let url = std::env::var("STAKINGSTAT_TEST_DATABASE_URL").ok()?;
        let pool = PoolOption::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        let table = Table::new(pool);
        let _ = table.drop_table().await;
        table.create_table().await.unwrap();
        Some(table)
    }

    fn row(block_nr: i32, actual_rate: &str) -> Staking_Rate_Stats {
        Staking_Rate_Stats {
            block_nr,
            block_time: 1700000000 + i64::from(block_nr) * 120,
            nominal_rate: BigDecimal::from_str("4.9").unwrap(),
            actual_rate: BigDecimal::from_str(actual_rate).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_keeps_first_row_and_reads_newest() {
        let Some(table) = test_table().await else {
            return;
        };

        table.insert(row(1000, "98.0")).await.unwrap();
        let replay = table.insert(row(1000, "196.0")).await.unwrap();
        assert_eq!(replay.rows_affected(), 0);

        table.insert(row(998, "97.0")).await.unwrap();
        table.insert(row(1001, "99.0")).await.unwrap();

        let rows = table.get_recent(2).await.unwrap();
        let blocks: Vec<i32> = rows.iter().map(|row| row.block_nr).collect();
        assert_eq!(blocks, vec![1001, 1000]);
        assert_eq!(rows[1].actual_rate, BigDecimal::from_str("98").unwrap());

        table.drop_table().await.unwrap();
    }
}
