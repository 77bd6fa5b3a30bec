//! Translation of listing parameters into a store-independent query.

use std::cmp::Ordering;

use serde::Deserialize;

use super::repo_types::{Product, ProductField};

/// Query string of `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Text columns covered by `search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Description,
}

impl SearchField {
    pub fn column(self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Description => "description",
        }
    }

    fn value(self, p: &Product) -> &str {
        match self {
            SearchField::Name => &p.name,
            SearchField::Description => &p.description,
        }
    }
}

/// Case-insensitive substring match on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub field: SearchField,
    pub needle: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Field(ProductField),
    /// A name that is not a product attribute; stores leave the order alone.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Field(ProductField::CreatedAt),
            direction: SortDirection::Desc,
        }
    }
}

/// `(text[0] OR text[1] OR ...) AND category = ?`, ordered by `sort`.
/// Empty `text` and `None` category match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuerySpec {
    pub text: Vec<TextMatch>,
    pub category: Option<String>,
    pub sort: SortSpec,
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

pub fn build(params: &ListParams) -> ProductQuerySpec {
    let text = match present(&params.search) {
        Some(needle) => [SearchField::Name, SearchField::Description]
            .into_iter()
            .map(|field| TextMatch {
                field,
                needle: needle.to_string(),
            })
            .collect(),
        None => Vec::new(),
    };

    let category = present(&params.category).map(str::to_string);

    let sort = match present(&params.sort) {
        Some(raw) => {
            let (direction, name) = match raw.strip_prefix('-') {
                Some(rest) => (SortDirection::Desc, rest),
                None => (SortDirection::Asc, raw),
            };
            let key = ProductField::parse(name)
                .map(SortKey::Field)
                .unwrap_or_else(|| SortKey::Unknown(name.to_string()));
            SortSpec { key, direction }
        }
        None => SortSpec::default(),
    };

    ProductQuerySpec {
        text,
        category,
        sort,
    }
}

impl ProductQuerySpec {
    /// In-memory evaluation of the filter clauses.
    pub fn matches(&self, p: &Product) -> bool {
        let text_ok = self.text.is_empty()
            || self.text.iter().any(|m| {
                m.field
                    .value(p)
                    .to_lowercase()
                    .contains(&m.needle.to_lowercase())
            });
        let category_ok = self.category.as_deref().map_or(true, |c| p.category == c);
        text_ok && category_ok
    }

    /// In-memory ordering; `Equal` for unknown keys so a stable sort keeps
    /// insertion order.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let SortKey::Field(field) = &self.sort.key else {
            return Ordering::Equal;
        };
        let ord = match field {
            ProductField::Name => a.name.cmp(&b.name),
            ProductField::Description => a.description.cmp(&b.description),
            ProductField::Price => a.price.cmp(&b.price),
            ProductField::Quantity => a.quantity.cmp(&b.quantity),
            ProductField::Category => a.category.cmp(&b.category),
            ProductField::ImageUrl => a.image_url.cmp(&b.image_url),
            ProductField::CreatedAt => a.created_at.cmp(&b.created_at),
            ProductField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        match self.sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}
