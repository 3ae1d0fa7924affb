//! Postgres-backed store.
//!
//! Foreign keys enforce the protected deletes (`ON DELETE RESTRICT` from
//! circuits to providers and types) and the termination cascade; unique
//! constraints surface as [`StoreError::Conflict`].

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    CircuitStore, CircuitTypeStore, ProviderStore, ReferenceStore, StoreError, StoreResult,
    TerminationStore,
};
use crate::common::{
    CircuitId, CircuitTypeId, GraphId, Id, Page, PageRequest, ProviderId, SiteId, TenantId,
    TerminationId,
};
use crate::domains::circuits::filters::{like_pattern, CircuitFilter, ProviderFilter};
use crate::domains::circuits::models::{
    Circuit, CircuitBulkUpdate, CircuitInput, CircuitRow, CircuitType, CircuitTypeInput,
    CircuitTypeListRow, Graph, GraphType, Provider, ProviderBulkUpdate, ProviderInput,
    ProviderListRow, Site, TermSide, Tenant, Termination, TerminationInput, TerminationRow,
};

const PROVIDER_LIST_SELECT: &str = r#"
    SELECT p.*,
        (SELECT COUNT(*) FROM circuits c WHERE c.provider_id = p.id) AS count_circuits
    FROM providers p
    WHERE TRUE
"#;

const CIRCUIT_ROW_SELECT: &str = r#"
    SELECT c.*,
        p.name AS provider_name, p.slug AS provider_slug,
        ct.name AS type_name, ct.slug AS type_slug,
        tn.name AS tenant_name, tn.slug AS tenant_slug,
        s.name AS site_name, s.slug AS site_slug,
        (SELECT COUNT(*) FROM circuit_terminations t WHERE t.circuit_id = c.id) AS count_terminations
    FROM circuits c
    JOIN providers p ON p.id = c.provider_id
    JOIN circuit_types ct ON ct.id = c.type_id
    LEFT JOIN tenants tn ON tn.id = c.tenant_id
    LEFT JOIN sites s ON s.id = c.site_id
    WHERE TRUE
"#;

const TERMINATION_ROW_SELECT: &str = r#"
    SELECT t.*,
        s.name AS site_name, s.slug AS site_slug,
        p.name AS provider_name, c.cid AS cid
    FROM circuit_terminations t
    JOIN sites s ON s.id = t.site_id
    JOIN circuits c ON c.id = t.circuit_id
    JOIN providers p ON p.id = c.provider_id
"#;

fn uuids<T>(ids: &[Id<T>]) -> Vec<Uuid> {
    ids.iter().map(|id| id.into_uuid()).collect()
}

/// Translate a unique violation into `Conflict`; everything else stays a
/// database error.
fn write_error(entity: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::Conflict {
                entity,
                field: conflict_field(db.constraint()),
            };
        }
    }
    StoreError::Database(err)
}

fn conflict_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(c) if c.contains("slug") => "slug",
        Some(c) if c.contains("cid") => "cid",
        Some(c) if c.contains("term_side") => "side",
        _ => "name",
    }
}

fn push_provider_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProviderFilter) {
    if let Some(q) = &filter.q {
        let pattern = like_pattern(q);
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.account ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.comments ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(asn) = filter.asn {
        qb.push(" AND p.asn = ").push_bind(asn);
    }
    if !filter.site.is_empty() {
        qb.push(
            " AND p.id IN (SELECT c.provider_id FROM circuits c JOIN sites s ON s.id = c.site_id WHERE s.slug = ANY(",
        )
        .push_bind(filter.site.clone())
        .push(
            ") UNION SELECT c.provider_id FROM circuits c \
             JOIN circuit_terminations t ON t.circuit_id = c.id \
             JOIN sites s ON s.id = t.site_id WHERE s.slug = ANY(",
        )
        .push_bind(filter.site.clone())
        .push("))");
    }
}

fn push_circuit_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CircuitFilter) {
    if let Some(q) = &filter.q {
        let pattern = like_pattern(q);
        qb.push(" AND (c.cid ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.comments ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if !filter.provider.is_empty() {
        qb.push(" AND p.slug = ANY(")
            .push_bind(filter.provider.clone())
            .push(")");
    }
    if !filter.circuit_type.is_empty() {
        qb.push(" AND ct.slug = ANY(")
            .push_bind(filter.circuit_type.clone())
            .push(")");
    }
    if !filter.tenant.is_empty() {
        qb.push(" AND tn.slug = ANY(")
            .push_bind(filter.tenant.clone())
            .push(")");
    }
    if !filter.site.is_empty() {
        qb.push(" AND (s.slug = ANY(")
            .push_bind(filter.site.clone())
            .push(
                ") OR EXISTS (SELECT 1 FROM circuit_terminations t \
                 JOIN sites ts ON ts.id = t.site_id \
                 WHERE t.circuit_id = c.id AND ts.slug = ANY(",
            )
            .push_bind(filter.site.clone())
            .push(")))");
    }
}

/// Store backed by a Postgres connection pool
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProviderStore for PostgresStore {
    async fn list_providers(
        &self,
        filter: &ProviderFilter,
        page: PageRequest,
    ) -> StoreResult<Page<ProviderListRow>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM providers p WHERE TRUE");
        push_provider_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        let total = total as u64;
        let page = page.clamp_to(total);

        let mut qb = QueryBuilder::<Postgres>::new(PROVIDER_LIST_SELECT);
        push_provider_filter(&mut qb, filter);
        qb.push(" ORDER BY LOWER(p.name) LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = qb
            .build_query_as::<ProviderListRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(rows, total, page))
    }

    async fn all_providers(&self) -> StoreResult<Vec<Provider>> {
        let providers =
            sqlx::query_as::<_, Provider>("SELECT * FROM providers ORDER BY LOWER(name)")
                .fetch_all(&self.pool)
                .await?;
        Ok(providers)
    }

    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<Provider>> {
        let provider = sqlx::query_as::<_, Provider>("SELECT * FROM providers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(provider)
    }

    async fn get_provider_by_slug(&self, slug: &str) -> StoreResult<Option<Provider>> {
        let provider = sqlx::query_as::<_, Provider>("SELECT * FROM providers WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(provider)
    }

    async fn find_provider_by_name(&self, name: &str) -> StoreResult<Option<Provider>> {
        let provider = sqlx::query_as::<_, Provider>("SELECT * FROM providers WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(provider)
    }

    async fn get_providers(&self, ids: &[ProviderId]) -> StoreResult<Vec<Provider>> {
        let providers = sqlx::query_as::<_, Provider>(
            "SELECT * FROM providers WHERE id = ANY($1) ORDER BY LOWER(name)",
        )
        .bind(uuids(ids))
        .fetch_all(&self.pool)
        .await?;
        Ok(providers)
    }

    async fn insert_provider(&self, input: &ProviderInput) -> StoreResult<Provider> {
        let provider = sqlx::query_as::<_, Provider>(
            r#"
            INSERT INTO providers (
                id, name, slug, asn, account, portal_url, noc_contact, admin_contact, comments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(ProviderId::new())
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.asn)
        .bind(&input.account)
        .bind(&input.portal_url)
        .bind(&input.noc_contact)
        .bind(&input.admin_contact)
        .bind(&input.comments)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("provider", e))?;
        Ok(provider)
    }

    async fn insert_providers(&self, inputs: &[ProviderInput]) -> StoreResult<Vec<Provider>> {
        let mut tx = self.pool.begin().await?;
        let mut providers = Vec::with_capacity(inputs.len());
        for input in inputs {
            let provider = sqlx::query_as::<_, Provider>(
                r#"
                INSERT INTO providers (
                    id, name, slug, asn, account, portal_url, noc_contact, admin_contact, comments
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
                "#,
            )
            .bind(ProviderId::new())
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.asn)
            .bind(&input.account)
            .bind(&input.portal_url)
            .bind(&input.noc_contact)
            .bind(&input.admin_contact)
            .bind(&input.comments)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| write_error("provider", e))?;
            providers.push(provider);
        }
        tx.commit().await?;
        Ok(providers)
    }

    async fn update_provider(
        &self,
        id: ProviderId,
        input: &ProviderInput,
    ) -> StoreResult<Provider> {
        sqlx::query_as::<_, Provider>(
            r#"
            UPDATE providers SET
                name = $2,
                slug = $3,
                asn = $4,
                account = $5,
                portal_url = $6,
                noc_contact = $7,
                admin_contact = $8,
                comments = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.asn)
        .bind(&input.account)
        .bind(&input.portal_url)
        .bind(&input.noc_contact)
        .bind(&input.admin_contact)
        .bind(&input.comments)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("provider", e))?
        .ok_or(StoreError::NotFound { entity: "provider" })
    }

    async fn bulk_update_providers(
        &self,
        ids: &[ProviderId],
        update: &ProviderBulkUpdate,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE providers SET
                asn = COALESCE($2, asn),
                account = COALESCE($3, account),
                portal_url = COALESCE($4, portal_url),
                comments = COALESCE($5, comments),
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(uuids(ids))
        .bind(update.asn)
        .bind(&update.account)
        .bind(&update.portal_url)
        .bind(&update.comments)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_providers(&self, ids: &[ProviderId]) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let in_use: Option<(String, i64)> = sqlx::query_as(
            r#"
            SELECT p.name, COUNT(c.id)
            FROM providers p
            JOIN circuits c ON c.provider_id = p.id
            WHERE p.id = ANY($1)
            GROUP BY p.id, p.name
            ORDER BY p.name
            LIMIT 1
            "#,
        )
        .bind(uuids(ids))
        .fetch_optional(&mut *tx)
        .await?;
        if let Some((name, count)) = in_use {
            return Err(StoreError::Protected {
                entity: "provider",
                name,
                count,
            });
        }
        let result = sqlx::query("DELETE FROM providers WHERE id = ANY($1)")
            .bind(uuids(ids))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn count_providers(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM providers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl CircuitTypeStore for PostgresStore {
    async fn list_circuit_types(&self, page: PageRequest) -> StoreResult<Page<CircuitTypeListRow>> {
        let total = self.count_circuit_types().await?;
        let page = page.clamp_to(total);
        let rows = sqlx::query_as::<_, CircuitTypeListRow>(
            r#"
            SELECT ct.*,
                (SELECT COUNT(*) FROM circuits c WHERE c.type_id = ct.id) AS circuit_count
            FROM circuit_types ct
            ORDER BY LOWER(ct.name)
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(rows, total, page))
    }

    async fn all_circuit_types(&self) -> StoreResult<Vec<CircuitType>> {
        let types =
            sqlx::query_as::<_, CircuitType>("SELECT * FROM circuit_types ORDER BY LOWER(name)")
                .fetch_all(&self.pool)
                .await?;
        Ok(types)
    }

    async fn get_circuit_type(&self, id: CircuitTypeId) -> StoreResult<Option<CircuitType>> {
        let circuit_type =
            sqlx::query_as::<_, CircuitType>("SELECT * FROM circuit_types WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(circuit_type)
    }

    async fn get_circuit_type_by_slug(&self, slug: &str) -> StoreResult<Option<CircuitType>> {
        let circuit_type =
            sqlx::query_as::<_, CircuitType>("SELECT * FROM circuit_types WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        Ok(circuit_type)
    }

    async fn find_circuit_type_by_name(&self, name: &str) -> StoreResult<Option<CircuitType>> {
        let circuit_type =
            sqlx::query_as::<_, CircuitType>("SELECT * FROM circuit_types WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(circuit_type)
    }

    async fn get_circuit_types(&self, ids: &[CircuitTypeId]) -> StoreResult<Vec<CircuitType>> {
        let types = sqlx::query_as::<_, CircuitType>(
            "SELECT * FROM circuit_types WHERE id = ANY($1) ORDER BY LOWER(name)",
        )
        .bind(uuids(ids))
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }

    async fn insert_circuit_type(&self, input: &CircuitTypeInput) -> StoreResult<CircuitType> {
        let circuit_type = sqlx::query_as::<_, CircuitType>(
            "INSERT INTO circuit_types (id, name, slug) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(CircuitTypeId::new())
        .bind(&input.name)
        .bind(&input.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("circuit type", e))?;
        Ok(circuit_type)
    }

    async fn update_circuit_type(
        &self,
        id: CircuitTypeId,
        input: &CircuitTypeInput,
    ) -> StoreResult<CircuitType> {
        sqlx::query_as::<_, CircuitType>(
            r#"
            UPDATE circuit_types SET name = $2, slug = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("circuit type", e))?
        .ok_or(StoreError::NotFound {
            entity: "circuit type",
        })
    }

    async fn delete_circuit_types(&self, ids: &[CircuitTypeId]) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let in_use: Option<(String, i64)> = sqlx::query_as(
            r#"
            SELECT ct.name, COUNT(c.id)
            FROM circuit_types ct
            JOIN circuits c ON c.type_id = ct.id
            WHERE ct.id = ANY($1)
            GROUP BY ct.id, ct.name
            ORDER BY ct.name
            LIMIT 1
            "#,
        )
        .bind(uuids(ids))
        .fetch_optional(&mut *tx)
        .await?;
        if let Some((name, count)) = in_use {
            return Err(StoreError::Protected {
                entity: "circuit type",
                name,
                count,
            });
        }
        let result = sqlx::query("DELETE FROM circuit_types WHERE id = ANY($1)")
            .bind(uuids(ids))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn count_circuit_types(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM circuit_types")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl CircuitStore for PostgresStore {
    async fn list_circuits(
        &self,
        filter: &CircuitFilter,
        page: PageRequest,
    ) -> StoreResult<Page<CircuitRow>> {
        let mut count = QueryBuilder::<Postgres>::new(
            r#"
            SELECT COUNT(*)
            FROM circuits c
            JOIN providers p ON p.id = c.provider_id
            JOIN circuit_types ct ON ct.id = c.type_id
            LEFT JOIN tenants tn ON tn.id = c.tenant_id
            LEFT JOIN sites s ON s.id = c.site_id
            WHERE TRUE
            "#,
        );
        push_circuit_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        let total = total as u64;
        let page = page.clamp_to(total);

        let mut qb = QueryBuilder::<Postgres>::new(CIRCUIT_ROW_SELECT);
        push_circuit_filter(&mut qb, filter);
        qb.push(" ORDER BY LOWER(p.name), c.cid LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = qb
            .build_query_as::<CircuitRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(rows, total, page))
    }

    async fn circuits_for_provider(&self, provider_id: ProviderId) -> StoreResult<Vec<CircuitRow>> {
        let sql = format!("{CIRCUIT_ROW_SELECT} AND c.provider_id = $1 ORDER BY c.cid");
        let rows = sqlx::query_as::<_, CircuitRow>(&sql)
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_circuit(&self, id: CircuitId) -> StoreResult<Option<CircuitRow>> {
        let sql = format!("{CIRCUIT_ROW_SELECT} AND c.id = $1");
        let row = sqlx::query_as::<_, CircuitRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_circuits(&self, ids: &[CircuitId]) -> StoreResult<Vec<CircuitRow>> {
        let sql = format!("{CIRCUIT_ROW_SELECT} AND c.id = ANY($1) ORDER BY LOWER(p.name), c.cid");
        let rows = sqlx::query_as::<_, CircuitRow>(&sql)
            .bind(uuids(ids))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_circuit(
        &self,
        provider_id: ProviderId,
        cid: &str,
    ) -> StoreResult<Option<Circuit>> {
        let circuit = sqlx::query_as::<_, Circuit>(
            "SELECT * FROM circuits WHERE provider_id = $1 AND cid = $2",
        )
        .bind(provider_id)
        .bind(cid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(circuit)
    }

    async fn insert_circuit(&self, input: &CircuitInput) -> StoreResult<Circuit> {
        let mut tx = self.pool.begin().await?;
        let circuit = insert_circuit_row(&mut tx, input).await?;
        tx.commit().await?;
        Ok(circuit)
    }

    async fn insert_circuits(&self, inputs: &[CircuitInput]) -> StoreResult<Vec<Circuit>> {
        let mut tx = self.pool.begin().await?;
        let mut circuits = Vec::with_capacity(inputs.len());
        for input in inputs {
            circuits.push(insert_circuit_row(&mut tx, input).await?);
        }
        tx.commit().await?;
        Ok(circuits)
    }

    async fn update_circuit(&self, id: CircuitId, input: &CircuitInput) -> StoreResult<Circuit> {
        sqlx::query_as::<_, Circuit>(
            r#"
            UPDATE circuits SET
                cid = $2,
                provider_id = $3,
                type_id = $4,
                tenant_id = $5,
                site_id = $6,
                install_date = $7,
                commit_rate = $8,
                description = $9,
                comments = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.cid)
        .bind(input.provider_id)
        .bind(input.type_id)
        .bind(input.tenant_id)
        .bind(input.site_id)
        .bind(input.install_date)
        .bind(input.commit_rate)
        .bind(&input.description)
        .bind(&input.comments)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("circuit", e))?
        .ok_or(StoreError::NotFound { entity: "circuit" })
    }

    async fn bulk_update_circuits(
        &self,
        ids: &[CircuitId],
        update: &CircuitBulkUpdate,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE circuits SET
                provider_id = COALESCE($2, provider_id),
                type_id = COALESCE($3, type_id),
                tenant_id = CASE WHEN $4 THEN $5 ELSE tenant_id END,
                commit_rate = COALESCE($6, commit_rate),
                description = COALESCE($7, description),
                comments = COALESCE($8, comments),
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(uuids(ids))
        .bind(update.provider_id)
        .bind(update.type_id)
        .bind(update.tenant_id.is_some())
        .bind(update.tenant_id.flatten())
        .bind(update.commit_rate)
        .bind(&update.description)
        .bind(&update.comments)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("circuit", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_circuits(&self, ids: &[CircuitId]) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM circuits WHERE id = ANY($1)")
            .bind(uuids(ids))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_circuits(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM circuits")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

async fn insert_circuit_row(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    input: &CircuitInput,
) -> StoreResult<Circuit> {
    let circuit = sqlx::query_as::<_, Circuit>(
        r#"
        INSERT INTO circuits (
            id, cid, provider_id, type_id, tenant_id, site_id,
            install_date, commit_rate, description, comments
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(CircuitId::new())
    .bind(&input.cid)
    .bind(input.provider_id)
    .bind(input.type_id)
    .bind(input.tenant_id)
    .bind(input.site_id)
    .bind(input.install_date)
    .bind(input.commit_rate)
    .bind(&input.description)
    .bind(&input.comments)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| write_error("circuit", e))?;
    Ok(circuit)
}

#[async_trait]
impl TerminationStore for PostgresStore {
    async fn terminations_for_circuit(
        &self,
        circuit_id: CircuitId,
    ) -> StoreResult<Vec<TerminationRow>> {
        let sql = format!("{TERMINATION_ROW_SELECT} WHERE t.circuit_id = $1 ORDER BY t.term_side");
        let rows = sqlx::query_as::<_, TerminationRow>(&sql)
            .bind(circuit_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_termination(&self, id: TerminationId) -> StoreResult<Option<TerminationRow>> {
        let sql = format!("{TERMINATION_ROW_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TerminationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_termination(
        &self,
        circuit_id: CircuitId,
        side: TermSide,
    ) -> StoreResult<Option<Termination>> {
        let termination = sqlx::query_as::<_, Termination>(
            "SELECT * FROM circuit_terminations WHERE circuit_id = $1 AND term_side = $2",
        )
        .bind(circuit_id)
        .bind(side.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(termination)
    }

    async fn insert_termination(
        &self,
        circuit_id: CircuitId,
        input: &TerminationInput,
    ) -> StoreResult<Termination> {
        let termination = sqlx::query_as::<_, Termination>(
            r#"
            INSERT INTO circuit_terminations (
                id, circuit_id, term_side, site_id, port_speed, upstream_speed, xconnect_id, pp_info
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(TerminationId::new())
        .bind(circuit_id)
        .bind(input.term_side.to_string())
        .bind(input.site_id)
        .bind(input.port_speed)
        .bind(input.upstream_speed)
        .bind(&input.xconnect_id)
        .bind(&input.pp_info)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("termination", e))?;
        Ok(termination)
    }

    async fn update_termination(
        &self,
        id: TerminationId,
        input: &TerminationInput,
    ) -> StoreResult<Termination> {
        sqlx::query_as::<_, Termination>(
            r#"
            UPDATE circuit_terminations SET
                term_side = $2,
                site_id = $3,
                port_speed = $4,
                upstream_speed = $5,
                xconnect_id = $6,
                pp_info = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.term_side.to_string())
        .bind(input.site_id)
        .bind(input.port_speed)
        .bind(input.upstream_speed)
        .bind(&input.xconnect_id)
        .bind(&input.pp_info)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("termination", e))?
        .ok_or(StoreError::NotFound {
            entity: "termination",
        })
    }

    async fn delete_termination(&self, id: TerminationId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM circuit_terminations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_terminations(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM circuit_terminations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl ReferenceStore for PostgresStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn all_sites(&self) -> StoreResult<Vec<Site>> {
        let sites = sqlx::query_as::<_, Site>("SELECT id, name, slug FROM sites ORDER BY LOWER(name)")
            .fetch_all(&self.pool)
            .await?;
        Ok(sites)
    }

    async fn get_site(&self, id: SiteId) -> StoreResult<Option<Site>> {
        let site = sqlx::query_as::<_, Site>("SELECT id, name, slug FROM sites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(site)
    }

    async fn insert_site(&self, name: &str, slug: &str) -> StoreResult<Site> {
        let site = sqlx::query_as::<_, Site>(
            "INSERT INTO sites (id, name, slug) VALUES ($1, $2, $3) RETURNING id, name, slug",
        )
        .bind(SiteId::new())
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("site", e))?;
        Ok(site)
    }

    async fn all_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let tenants =
            sqlx::query_as::<_, Tenant>("SELECT id, name, slug FROM tenants ORDER BY LOWER(name)")
                .fetch_all(&self.pool)
                .await?;
        Ok(tenants)
    }

    async fn get_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT id, name, slug FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn find_tenant_by_name(&self, name: &str) -> StoreResult<Option<Tenant>> {
        let tenant =
            sqlx::query_as::<_, Tenant>("SELECT id, name, slug FROM tenants WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(tenant)
    }

    async fn insert_tenant(&self, name: &str, slug: &str) -> StoreResult<Tenant> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name, slug) VALUES ($1, $2, $3) RETURNING id, name, slug",
        )
        .bind(TenantId::new())
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("tenant", e))?;
        Ok(tenant)
    }

    async fn graphs_exist(&self, graph_type: GraphType) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM graphs WHERE graph_type = $1)")
                .bind(graph_type.code())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_graph(
        &self,
        graph_type: GraphType,
        name: &str,
        source: &str,
    ) -> StoreResult<Graph> {
        let graph = sqlx::query_as::<_, Graph>(
            r#"
            INSERT INTO graphs (id, graph_type, name, source)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(GraphId::new())
        .bind(graph_type.code())
        .bind(name)
        .bind(source)
        .fetch_one(&self.pool)
        .await?;
        Ok(graph)
    }
}
