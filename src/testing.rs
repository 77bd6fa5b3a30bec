//! In-memory collaborators for unit and router tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use bytes::Bytes;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::{repo::UserRepo, repo_types::User},
    products::{
        error::StoreError,
        query::ProductQuerySpec,
        repo::ProductRepo,
        repo_types::{Product, ProductInput},
    },
    storage::ImageStore,
};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    products: Mutex<Vec<Product>>,
    last_ts: Mutex<Option<OffsetDateTime>>,
    /// When set, every product operation fails with a backend error.
    pub fail_backend: AtomicBool,
}

impl MemoryStore {
    pub fn add_user(&self, email: &str, is_admin: bool) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: "$argon2id$v=19$fake".into(),
            is_admin,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn remove_user(&self, id: Uuid) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }

    /// Stores a row as-is, bypassing validation.
    pub fn insert_raw(&self, product: Product) {
        self.products.lock().unwrap().push(product);
    }

    pub fn products(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }

    /// Strictly increasing, so creation order is always observable.
    fn next_timestamp(&self) -> OffsetDateTime {
        let mut last = self.last_ts.lock().unwrap();
        let mut now = OffsetDateTime::now_utc();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }

    fn check_backend(&self) -> Result<(), StoreError> {
        if self.fail_backend.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!("connection reset by peer")));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ProductRepo for MemoryStore {
    async fn find(&self, spec: &ProductQuerySpec) -> Result<Vec<Product>, StoreError> {
        self.check_backend()?;
        let mut rows: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| spec.matches(p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| spec.compare(a, b));
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        self.check_backend()?;
        Ok(self.products.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, input: ProductInput) -> Result<Product, StoreError> {
        self.check_backend()?;
        let p = input.into_new()?;
        let now = self.next_timestamp();
        let product = Product {
            id: Uuid::new_v4(),
            name: p.name,
            description: p.description,
            price: p.price,
            quantity: p.quantity,
            category: p.category,
            image_url: p.image_url,
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> Result<Option<Product>, StoreError> {
        self.check_backend()?;
        let patch = input.into_patch()?;
        let now = self.next_timestamp();
        let mut products = self.products.lock().unwrap();
        let Some(p) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(v) = patch.name {
            p.name = v;
        }
        if let Some(v) = patch.description {
            p.description = v;
        }
        if let Some(v) = patch.price {
            p.price = v;
        }
        if let Some(v) = patch.quantity {
            p.quantity = v;
        }
        if let Some(v) = patch.category {
            p.category = v;
        }
        if let Some(v) = patch.image_url {
            p.image_url = Some(v);
        }
        p.updated_at = now;
        Ok(Some(p.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check_backend()?;
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }
}

/// Object storage that remembers keys instead of uploading.
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<Vec<(String, usize, String)>>,
}

#[async_trait]
impl ImageStore for FakeStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), body.len(), content_type.to_string()));
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().retain(|(k, _, _)| k != key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, _ttl: std::time::Duration) -> anyhow::Result<String> {
        Ok(format!("https://fake.local/{}", key))
    }
}
