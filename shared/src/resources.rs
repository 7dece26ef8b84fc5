//! REST resources the app lists, shows and edits.
//!
//! Each resource is a zero-sized descriptor: where it lives, which key its
//! list envelope uses, what one record looks like, how it can be filtered and
//! the copy its screens show when things go wrong or come back empty.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filters::{push_filter, ListFilters, NoFilters};
use crate::form::{FieldErrors, Validate};

pub trait Resource: Send + Sync + 'static {
    /// Path segment under the API base, e.g. `contacts`.
    const PATH: &'static str;
    /// Key of the item array inside the list envelope's `data` object.
    const ITEMS_KEY: &'static str;

    type Item: Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static;
    type Filters: ListFilters;

    fn load_error_copy() -> &'static str;

    /// `filtered` is true while a search or filter is applied.
    fn empty_copy(filtered: bool) -> &'static str;
}

/// Resources the app can create, update and delete.
pub trait Editable: Resource {
    type Draft: Validate + Serialize + Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    fn save_error_copy() -> &'static str;

    fn delete_error_copy() -> &'static str;
}

// ---- Contacts ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Customer,
    Supplier,
    Employee,
}

impl ContactKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub kind: Option<ContactKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilters {
    pub kind: Option<ContactKind>,
}

impl ListFilters for ContactFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "kind", self.kind);
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContactKind>,
}

impl Validate for ContactDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Ad soyad boş bırakılamaz.");
        }
        if let Some(email) = self.email.as_deref().map(str::trim) {
            let plausible = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if !email.is_empty() && !plausible {
                errors.insert("email", "Geçerli bir e-posta adresi girin.");
            }
        }
        if self.kind.is_none() {
            errors.insert("kind", "Kişi türü seçilmelidir.");
        }
        errors
    }
}

pub struct Contacts;

impl Resource for Contacts {
    const PATH: &'static str = "contacts";
    const ITEMS_KEY: &'static str = "contacts";
    type Item = Contact;
    type Filters = ContactFilters;

    fn load_error_copy() -> &'static str {
        "Kişiler yüklenirken bir hata oluştu."
    }

    fn empty_copy(filtered: bool) -> &'static str {
        if filtered {
            "Aramanızla eşleşen kişi bulunamadı."
        } else {
            "Henüz kişi eklenmemiş."
        }
    }
}

impl Editable for Contacts {
    type Draft = ContactDraft;

    fn save_error_copy() -> &'static str {
        "Kişi kaydedilirken bir hata oluştu."
    }

    fn delete_error_copy() -> &'static str {
        "Kişi silinirken bir hata oluştu."
    }
}

// ---- Products ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Passive,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Passive => "passive",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub brand_id: Option<u64>,
    #[serde(default)]
    pub price: Option<f64>,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub status: Option<ProductStatus>,
    pub brand_id: Option<u64>,
}

impl ListFilters for ProductFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "status", self.status);
        push_filter(&mut pairs, "brand_id", self.brand_id);
        pairs
    }
}

pub struct Products;

impl Resource for Products {
    const PATH: &'static str = "products";
    const ITEMS_KEY: &'static str = "products";
    type Item = Product;
    type Filters = ProductFilters;

    fn load_error_copy() -> &'static str {
        "Ürünler yüklenirken bir hata oluştu."
    }

    fn empty_copy(filtered: bool) -> &'static str {
        if filtered {
            "Aramanızla eşleşen ürün bulunamadı."
        } else {
            "Henüz ürün eklenmemiş."
        }
    }
}

// ---- Customers ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub status: CustomerStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilters {
    pub status: Option<CustomerStatus>,
}

impl ListFilters for CustomerFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "status", self.status);
        pairs
    }
}

pub struct Customers;

impl Resource for Customers {
    const PATH: &'static str = "customers";
    const ITEMS_KEY: &'static str = "customers";
    type Item = Customer;
    type Filters = CustomerFilters;

    fn load_error_copy() -> &'static str {
        "Müşteriler yüklenirken bir hata oluştu."
    }

    fn empty_copy(filtered: bool) -> &'static str {
        if filtered {
            "Aramanızla eşleşen müşteri bulunamadı."
        } else {
            "Henüz müşteri eklenmemiş."
        }
    }
}

// ---- Tires ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Summer,
    Winter,
    AllSeason,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Summer => "summer",
            Self::Winter => "winter",
            Self::AllSeason => "all_season",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tire {
    pub id: u64,
    pub brand_id: u64,
    /// e.g. `205/55 R16`
    pub size: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub season: Option<Season>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TireFilters {
    pub brand_id: Option<u64>,
    pub season: Option<Season>,
}

impl ListFilters for TireFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "brand_id", self.brand_id);
        push_filter(&mut pairs, "season", self.season);
        pairs
    }
}

pub struct Tires;

impl Resource for Tires {
    const PATH: &'static str = "tires";
    const ITEMS_KEY: &'static str = "tires";
    type Item = Tire;
    type Filters = TireFilters;

    fn load_error_copy() -> &'static str {
        "Lastikler yüklenirken bir hata oluştu."
    }

    fn empty_copy(filtered: bool) -> &'static str {
        if filtered {
            "Aramanızla eşleşen lastik bulunamadı."
        } else {
            "Henüz lastik eklenmemiş."
        }
    }
}

// ---- Brands ----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: u64,
    pub name: String,
}

/// Brand picker in the bottom sheets; search only.
pub struct Brands;

impl Resource for Brands {
    const PATH: &'static str = "brands";
    const ITEMS_KEY: &'static str = "brands";
    type Item = Brand;
    type Filters = NoFilters;

    fn load_error_copy() -> &'static str {
        "Markalar yüklenirken bir hata oluştu."
    }

    fn empty_copy(filtered: bool) -> &'static str {
        if filtered {
            "Aramanızla eşleşen marka bulunamadı."
        } else {
            "Henüz marka eklenmemiş."
        }
    }
}

// ---- Quotes ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Try,
    Usd,
    Eur,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Try => "TRY",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: u64,
    pub number: String,
    pub customer_id: u64,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub amount: f64,
    pub currency: Currency,
    pub status: QuoteStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilters {
    pub status: Option<QuoteStatus>,
    pub currency: Option<Currency>,
}

impl ListFilters for QuoteFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_filter(&mut pairs, "status", self.status);
        push_filter(&mut pairs, "currency", self.currency);
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteDraft {
    pub customer_id: Option<u64>,
    pub amount: f64,
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Validate for QuoteDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.customer_id.is_none() {
            errors.insert("customer_id", "Müşteri seçilmelidir.");
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            errors.insert("amount", "Tutar 0'dan büyük olmalıdır.");
        }
        if self.currency.is_none() {
            errors.insert("currency", "Para birimi seçilmelidir.");
        }
        errors
    }
}

pub struct Quotes;

impl Resource for Quotes {
    const PATH: &'static str = "quotes";
    const ITEMS_KEY: &'static str = "quotes";
    type Item = Quote;
    type Filters = QuoteFilters;

    fn load_error_copy() -> &'static str {
        "Teklifler yüklenirken bir hata oluştu."
    }

    fn empty_copy(filtered: bool) -> &'static str {
        if filtered {
            "Aramanızla eşleşen teklif bulunamadı."
        } else {
            "Henüz teklif oluşturulmamış."
        }
    }
}

impl Editable for Quotes {
    type Draft = QuoteDraft;

    fn save_error_copy() -> &'static str {
        "Teklif kaydedilirken bir hata oluştu."
    }

    fn delete_error_copy() -> &'static str {
        "Teklif silinirken bir hata oluştu."
    }
}
