use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{
    error::StoreError,
    query::{ProductQuerySpec, SortKey},
    repo_types::{Product, ProductInput},
};

/// Persistence seam for products. Validation of incoming fields happens
/// here, so every backend rejects the same payloads.
#[async_trait]
pub trait ProductRepo: Send + Sync {
    async fn find(&self, spec: &ProductQuerySpec) -> Result<Vec<Product>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn create(&self, input: ProductInput) -> Result<Product, StoreError>;
    async fn update_by_id(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> Result<Option<Product>, StoreError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
}

const COLUMNS: &str =
    "id, name, description, price, quantity, category, image_url, created_at, updated_at";

#[derive(Clone)]
pub struct PgProductRepo {
    db: PgPool,
}

impl PgProductRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Escapes LIKE metacharacters so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn push_select<'a>(qb: &mut QueryBuilder<'a, Postgres>, spec: &'a ProductQuerySpec) {
    let mut has_where = false;

    if !spec.text.is_empty() {
        qb.push(" WHERE (");
        let mut any = qb.separated(" OR ");
        for m in &spec.text {
            any.push(m.field.column());
            any.push_unseparated(" ILIKE ");
            any.push_bind_unseparated(like_pattern(&m.needle));
        }
        qb.push(")");
        has_where = true;
    }

    if let Some(category) = &spec.category {
        qb.push(if has_where { " AND " } else { " WHERE " });
        qb.push("category = ");
        qb.push_bind(category.as_str());
    }

    match &spec.sort.key {
        SortKey::Field(field) => {
            qb.push(" ORDER BY ");
            qb.push(field.column());
            qb.push(" ");
            qb.push(spec.sort.direction.to_sql());
            qb.push(", id");
        }
        SortKey::Unknown(name) => {
            debug!(sort = %name, "unknown sort field ignored");
        }
    }
}

#[async_trait]
impl ProductRepo for PgProductRepo {
    async fn find(&self, spec: &ProductQuerySpec) -> Result<Vec<Product>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM products"));
        push_select(&mut qb, spec);
        let rows = qb.build_query_as::<Product>().fetch_all(&self.db).await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn create(&self, input: ProductInput) -> Result<Product, StoreError> {
        let p = input.into_new()?;
        let row = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, description, price, quantity, category, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(p.name)
        .bind(p.description)
        .bind(p.price)
        .bind(p.quantity)
        .bind(p.category)
        .bind(p.image_url)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> Result<Option<Product>, StoreError> {
        let patch = input.into_patch()?;
        let row = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
               SET name        = COALESCE($2, name),
                   description = COALESCE($3, description),
                   price       = COALESCE($4, price),
                   quantity    = COALESCE($5, quantity),
                   category    = COALESCE($6, category),
                   image_url   = COALESCE($7, image_url),
                   updated_at  = now()
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.price)
        .bind(patch.quantity)
        .bind(patch.category)
        .bind(patch.image_url)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::query::{build, ListParams};

    fn sql_for(params: ListParams) -> String {
        let spec = build(&params);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products");
        push_select(&mut qb, &spec);
        qb.sql().to_string()
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("shirt"), "%shirt%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn default_query_orders_newest_first() {
        assert_eq!(
            sql_for(ListParams::default()),
            "SELECT * FROM products ORDER BY created_at DESC, id"
        );
    }

    #[test]
    fn search_and_category_build_where_clause() {
        let sql = sql_for(ListParams {
            search: Some("shirt".into()),
            category: Some("apparel".into()),
            sort: Some("price".into()),
        });
        assert_eq!(
            sql,
            "SELECT * FROM products WHERE (name ILIKE $1 OR description ILIKE $2) \
             AND category = $3 ORDER BY price ASC, id"
        );
    }

    #[test]
    fn category_alone_and_unknown_sort() {
        let sql = sql_for(ListParams {
            category: Some("apparel".into()),
            sort: Some("-sku; DROP TABLE products".into()),
            ..Default::default()
        });
        assert_eq!(sql, "SELECT * FROM products WHERE category = $1");
    }
}
