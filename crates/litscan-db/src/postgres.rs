//! Postgres-backed `Store` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use litscan_core::{
    is_unique_violation, Article, Consumer, ConsumerStatus, Error, HitCountRow, Job, JobStatus, Metadata, Result,
    ResultView, SectionBucket,
};
use sqlx::{Pool, Postgres, Row};

use crate::store::{NewAbstractSentence, NewArticle, NewBodySentence, Store};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Query(e.to_string()))?;
        Ok(())
    }
}

fn parse_job_row(row: &sqlx::postgres::PgRow) -> Job {
    let status: String = row.get("status");
    Job {
        job_id: row.get("job_id"),
        display_id: row.get("display_id"),
        query: row.get("query"),
        search_limit: row.get("search_limit"),
        status: JobStatus::from_str(&status).unwrap_or(JobStatus::Error),
        submitted: row.get("submitted"),
        finished: row.get("finished"),
        hit_count: row.get("hit_count"),
    }
}

fn parse_consumer_row(row: &sqlx::postgres::PgRow) -> Consumer {
    let status: String = row.get("status");
    Consumer {
        ip: row.get("ip"),
        port: row.get("port"),
        status: ConsumerStatus::from_str(&status).unwrap_or(ConsumerStatus::Error),
        job_id: row.get("job_id"),
    }
}

fn parse_article_row(row: &sqlx::postgres::PgRow) -> Article {
    Article {
        pmcid: row.get("pmcid"),
        title: row.get("title"),
        abstract_text: row.get("abstract_text"),
        author: row.get("author"),
        pmid: row.get("pmid"),
        doi: row.get("doi"),
        journal: row.get("journal"),
        article_type: row.get("article_type"),
        year: row.get("year"),
        score: row.get("score"),
        cited_by: row.get("cited_by"),
        retracted: row.get("retracted"),
        rna_related: row.get("rna_related"),
        probability: row.get("probability"),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn register_consumer(&self, ip: &str, port: &str) -> Result<()> {
        let result = sqlx::query("INSERT INTO consumer (ip, port, status) VALUES ($1, $2, 'available')")
            .bind(ip)
            .bind(port)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(ref db_err)) if is_unique_violation_db(db_err.as_ref()) => {
                tracing::debug!(ip, "consumer already registered, ignoring duplicate");
                Ok(())
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn set_consumer(&self, ip: &str, status: ConsumerStatus, job_id: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE consumer SET status = $1::consumer_status, job_id = $2 WHERE ip = $3")
            .bind(status.as_str())
            .bind(job_id)
            .bind(ip)
            .execute(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn find_available_consumers(&self) -> Result<Vec<Consumer>> {
        let rows = sqlx::query("SELECT ip, port, status::text AS status, job_id FROM consumer WHERE status = 'available'")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(rows.iter().map(parse_consumer_row).collect())
    }

    async fn save_job(&self, display_id: &str, query: Option<&str>, search_limit: Option<i64>) -> Result<String> {
        let job_id = display_id.to_lowercase();
        sqlx::query(
            "INSERT INTO job (job_id, display_id, query, search_limit, status, submitted)
             VALUES ($1, $2, $3, $4, 'pending', now())",
        )
        .bind(&job_id)
        .bind(display_id)
        .bind(query)
        .bind(search_limit)
        .execute(&self.pool)
        .await
        .map_err(Error::from)?;
        Ok(job_id)
    }

    async fn search_performed(&self, value: &str) -> Result<Option<String>> {
        let normalized = value.to_lowercase();
        let row = sqlx::query("SELECT job_id FROM job WHERE job_id = $1")
            .bind(&normalized)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(row.map(|r| r.get("job_id")))
    }

    async fn set_job_status(&self, job_id: &str, status: JobStatus) -> Result<()> {
        if status.is_terminal() {
            sqlx::query("UPDATE job SET status = $1::job_status, finished = now() WHERE job_id = $2")
                .bind(status.as_str())
                .bind(job_id)
                .execute(&self.pool)
                .await
                .map_err(Error::from)?;
        } else {
            sqlx::query("UPDATE job SET status = $1::job_status WHERE job_id = $2")
                .bind(status.as_str())
                .bind(job_id)
                .execute(&self.pool)
                .await
                .map_err(Error::from)?;
        }
        Ok(())
    }

    async fn save_hit_count(&self, job_id: &str, hit_count: i64) -> Result<()> {
        sqlx::query("UPDATE job SET hit_count = $1 WHERE job_id = $2")
            .bind(hit_count)
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn find_jobs_to_run(&self) -> Result<Vec<Job>> {
        let rows = sqlx::query(
            "SELECT job_id, display_id, query, search_limit, status::text AS status, submitted, finished, hit_count
             FROM job WHERE status = 'pending' ORDER BY submitted ASC LIMIT 8",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)?;
        Ok(rows.iter().map(parse_job_row).collect())
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<Job>> {
        let row = sqlx::query(
            "SELECT job_id, display_id, query, search_limit, status::text AS status, submitted, finished, hit_count
             FROM job WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)?;
        Ok(row.map(|r| parse_job_row(&r)))
    }

    async fn save_article(&self, article: &NewArticle) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO article (pmcid, title, abstract_text, author, pmid, doi, journal, article_type, year, score, cited_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&article.pmcid)
        .bind(&article.title)
        .bind(&article.abstract_text)
        .bind(&article.author)
        .bind(&article.pmid)
        .bind(&article.doi)
        .bind(&article.journal)
        .bind(&article.article_type)
        .bind(article.year)
        .bind(article.score)
        .bind(article.cited_by)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(ref db_err)) if is_unique_violation_db(db_err.as_ref()) => Ok(()),
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn save_result(
        &self,
        pmcid: &str,
        job_id: &str,
        id_in_title: bool,
        id_in_abstract: bool,
        id_in_body: bool,
    ) -> Result<Option<i64>> {
        let result = sqlx::query(
            "INSERT INTO result (pmcid, job_id, id_in_title, id_in_abstract, id_in_body)
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(pmcid)
        .bind(job_id)
        .bind(id_in_title)
        .bind(id_in_abstract)
        .bind(id_in_body)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(Some(row.get("id"))),
            Err(sqlx::Error::Database(ref db_err)) if is_unique_violation_db(db_err.as_ref()) => {
                tracing::debug!(pmcid, job_id, "duplicate result, skipping");
                Ok(None)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn save_abstract_sentences(&self, batch: &[NewAbstractSentence]) -> Result<()> {
        for s in batch {
            sqlx::query("INSERT INTO abstract_sentence (result_id, sentence) VALUES ($1, $2)")
                .bind(s.result_id)
                .bind(&s.sentence)
                .execute(&self.pool)
                .await
                .map_err(Error::from)?;
        }
        Ok(())
    }

    async fn save_body_sentences(&self, batch: &[NewBodySentence]) -> Result<()> {
        for s in batch {
            sqlx::query("INSERT INTO body_sentence (result_id, sentence, location) VALUES ($1, $2, $3)")
                .bind(s.result_id)
                .bind(&s.sentence)
                .bind(s.location.as_str())
                .execute(&self.pool)
                .await
                .map_err(Error::from)?;
        }
        Ok(())
    }

    async fn get_pmcid(&self, pmcid: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT pmcid FROM article WHERE pmcid = $1")
            .bind(pmcid)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(row.map(|r| r.get("pmcid")))
    }

    async fn get_pmcid_in_result(&self, job_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT pmcid FROM result WHERE job_id = $1")
            .bind(job_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(rows.iter().map(|r| r.get("pmcid")).collect())
    }

    async fn save_metadata(&self, batch: &[Metadata]) -> Result<()> {
        for m in batch {
            let result = sqlx::query("INSERT INTO metadata (name, job_id, primary_id) VALUES ($1, $2, $3)")
                .bind(&m.name)
                .bind(&m.job_id)
                .bind(&m.primary_id)
                .execute(&self.pool)
                .await;

            match result {
                Ok(_) => {}
                Err(sqlx::Error::Database(ref db_err)) if is_unique_violation_db(db_err.as_ref()) => {
                    tracing::debug!(name = %m.name, job_id = %m.job_id, "duplicate metadata link, skipping");
                }
                Err(e) => return Err(Error::from(e)),
            }
        }
        Ok(())
    }

    async fn search_metadata(&self, job_id: &str, name: &str, primary_id: Option<&str>) -> Result<bool> {
        let row = sqlx::query(
            "SELECT id FROM metadata WHERE job_id = $1 AND name = $2 AND primary_id IS NOT DISTINCT FROM $3",
        )
        .bind(job_id)
        .bind(name)
        .bind(primary_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)?;
        Ok(row.is_some())
    }

    async fn get_search_date(&self, job_id: &str) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT finished FROM job WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(row.and_then(|r| r.get("finished")))
    }

    async fn get_hit_count(&self, job_id: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT hit_count FROM job WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(row.and_then(|r| r.get("hit_count")))
    }

    async fn get_query_and_limit(&self, job_id: &str) -> Result<(Option<String>, Option<i64>)> {
        let row = sqlx::query("SELECT query, search_limit FROM job WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from)?;
        match row {
            Some(r) => Ok((r.get("query"), r.get("search_limit"))),
            None => Ok((None, None)),
        }
    }

    async fn reset_job_for_rescan(&self, job_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::from)?;

        sqlx::query(
            "DELETE FROM result WHERE job_id = $1",
        )
        .bind(job_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::from)?;

        sqlx::query(
            "UPDATE job SET status = 'pending', finished = NULL, hit_count = NULL, submitted = now() WHERE job_id = $1",
        )
        .bind(job_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::from)?;

        tx.commit().await.map_err(Error::from)?;
        Ok(())
    }

    async fn results_for_job(&self, job_id: &str) -> Result<Vec<ResultView>> {
        let normalized = job_id.to_lowercase();
        let result_rows = sqlx::query(
            "SELECT r.id, r.pmcid, r.job_id, r.id_in_title, r.id_in_abstract, r.id_in_body,
                    a.title, a.author, a.pmid, a.doi, a.year, a.journal, a.score, a.cited_by, a.retracted
             FROM result r JOIN article a ON a.pmcid = r.pmcid
             WHERE r.job_id = $1
             ORDER BY r.id",
        )
        .bind(&normalized)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)?;

        let mut views = Vec::with_capacity(result_rows.len());
        for row in &result_rows {
            let result_id: i64 = row.get("id");

            let abstract_sentences: Vec<String> = sqlx::query("SELECT sentence FROM abstract_sentence WHERE result_id = $1 ORDER BY id")
                .bind(result_id)
                .fetch_all(&self.pool)
                .await
                .map_err(Error::from)?
                .iter()
                .map(|r| r.get("sentence"))
                .collect();

            let body_sentences: Vec<litscan_core::BodySentenceView> = sqlx::query(
                "SELECT location, sentence FROM body_sentence WHERE result_id = $1 ORDER BY location, id",
            )
            .bind(result_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::from)?
            .iter()
            .map(|r| litscan_core::BodySentenceView {
                location: r.get("location"),
                sentence: r.get("sentence"),
            })
            .collect();

            views.push(ResultView {
                job_id: row.get("job_id"),
                pmcid: row.get("pmcid"),
                title: row.get("title"),
                author: row.get("author"),
                pmid: row.get("pmid"),
                doi: row.get("doi"),
                year: row.get("year"),
                journal: row.get("journal"),
                score: row.get("score"),
                cited_by: row.get("cited_by"),
                retracted: row.get("retracted"),
                id_in_title: row.get("id_in_title"),
                id_in_abstract: row.get("id_in_abstract"),
                id_in_body: row.get("id_in_body"),
                abstract_sentence: abstract_sentences,
                body_sentence: body_sentences,
            });
        }
        Ok(views)
    }

    async fn aggregate_hit_counts(&self) -> Result<Vec<HitCountRow>> {
        let rows = sqlx::query(
            "SELECT primary_id AS urs, SUM(j.hit_count) AS hit_count
             FROM metadata m JOIN job j ON j.job_id = m.job_id
             WHERE m.name = 'rnacentral' AND j.hit_count > 0 AND m.primary_id IS NOT NULL
             GROUP BY primary_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)?;

        Ok(rows
            .iter()
            .map(|r| HitCountRow {
                urs: r.get("urs"),
                hit_count: r.get("hit_count"),
            })
            .collect())
    }

    async fn next_classifier_batch(&self, after_pmcid: Option<&str>, limit: i64) -> Result<Vec<Article>> {
        let rows = match after_pmcid {
            Some(cursor) => sqlx::query(
                "SELECT pmcid, title, abstract_text, author, pmid, doi, journal, article_type, year, score,
                        cited_by, retracted, rna_related, probability
                 FROM article WHERE retracted = false AND pmcid > $1 ORDER BY pmcid LIMIT $2",
            )
            .bind(cursor)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::from)?,
            None => sqlx::query(
                "SELECT pmcid, title, abstract_text, author, pmid, doi, journal, article_type, year, score,
                        cited_by, retracted, rna_related, probability
                 FROM article WHERE retracted = false ORDER BY pmcid LIMIT $1",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::from)?,
        };
        Ok(rows.iter().map(parse_article_row).collect())
    }

    async fn update_classification(&self, pmcid: &str, rna_related: bool, probability: f64) -> Result<()> {
        let rounded = (probability * 100.0).round() / 100.0;
        sqlx::query("UPDATE article SET rna_related = $1, probability = $2 WHERE pmcid = $3")
            .bind(rna_related)
            .bind(rounded)
            .bind(pmcid)
            .execute(&self.pool)
            .await
            .map_err(Error::from)?;
        Ok(())
    }
}

fn is_unique_violation_db(db_err: &(dyn sqlx::error::DatabaseError + 'static)) -> bool {
    db_err.code().as_deref() == Some("23505")
}
