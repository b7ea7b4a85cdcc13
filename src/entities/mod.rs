//! Per-entity key-builder configurations.
//!
//! Each cached entity contributes exactly two things: a key prefix and an
//! ordered field list. Everything else — canonical serialization, digesting,
//! scope handling, invalidation patterns — is shared machinery in
//! [`crate::keys`]. Field order inside `key_fields` is the documented digest
//! order for that entity; changing it changes every derived key, so treat it
//! as part of the wire format.

use crate::keys::{EntityKeys, Field, KeyFields};
use crate::query::PageRequest;

/// One cached query shape: a key prefix plus an ordered field list.
pub trait QueryFilter {
    const PREFIX: &'static str;

    /// Filter fields in digest order. Absent optionals must still be pushed
    /// (as the null sentinel) so presence is part of the key.
    fn key_fields(&self) -> KeyFields;

    fn entity_keys() -> EntityKeys {
        EntityKeys::new(Self::PREFIX)
    }
}

/// Derive the `list`-scope key for a paginated read.
pub fn derive_list_key<F: QueryFilter>(page: &PageRequest, filter: &F) -> String {
    F::entity_keys().list_key(page, &filter.key_fields())
}

/// Derive the `all`-scope key for an unpaginated read.
pub fn derive_all_key<F: QueryFilter>(filter: &F) -> String {
    F::entity_keys().all_key(&filter.key_fields())
}

/// Glob covering every cache entry of the entity, both scopes.
pub fn invalidation_pattern<F: QueryFilter>() -> String {
    F::entity_keys().invalidation_pattern()
}

/// Currency list filter. Soft-deleted rows are included by default because
/// the currency catalog is administered through the same listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyFilter {
    pub search: Option<String>,
    pub alphabetic_code: Option<String>,
    pub numeric_code: Option<String>,
    pub status: Option<String>,
    pub include_deleted: bool,
}

impl Default for CurrencyFilter {
    fn default() -> Self {
        Self {
            search: None,
            alphabetic_code: None,
            numeric_code: None,
            status: None,
            include_deleted: true,
        }
    }
}

impl QueryFilter for CurrencyFilter {
    const PREFIX: &'static str = "currency";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("alphabeticCode", Field::opt_normalized(self.alphabetic_code.as_deref()))
            .field("numericCode", Field::opt_text(self.numeric_code.as_deref()))
            .field("status", Field::opt_text(self.status.as_deref()))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryFilter {
    pub search: Option<String>,
    pub alphabetic_code: Option<String>,
    pub numeric_code: Option<i64>,
    pub include_deleted: bool,
}

impl QueryFilter for CountryFilter {
    const PREFIX: &'static str = "country";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("alphabeticCode", Field::opt_normalized(self.alphabetic_code.as_deref()))
            .field("numericCode", Field::opt_int(self.numeric_code))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub document_type_id: Option<i64>,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub residence_country_id: Option<i64>,
    pub is_pep: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for CustomerFilter {
    const PREFIX: &'static str = "customer";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("documentTypeId", Field::opt_int(self.document_type_id))
            .field("documentNumber", Field::opt_text(self.document_number.as_deref()))
            .field("email", Field::opt_normalized(self.email.as_deref()))
            .field("gender", Field::opt_text(self.gender.as_deref()))
            .field("residenceCountryId", Field::opt_int(self.residence_country_id))
            .field("isPep", Field::opt_flag(self.is_pep))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountingAccountFilter {
    pub search: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    /// Account classification (asset, liability, equity, income, expense).
    pub kind: Option<String>,
    /// Normal balance side (debit or credit).
    pub normal_side: Option<String>,
    pub active: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for AccountingAccountFilter {
    const PREFIX: &'static str = "accounting-account";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("code", Field::opt_text(self.code.as_deref()))
            .field("name", Field::opt_normalized(self.name.as_deref()))
            .field("type", Field::opt_text(self.kind.as_deref()))
            .field("normalSide", Field::opt_text(self.normal_side.as_deref()))
            .field("active", Field::opt_flag(self.active))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeneficiaryAccountFilter {
    pub customer_id: Option<i64>,
    pub account_number: Option<String>,
}

impl QueryFilter for BeneficiaryAccountFilter {
    const PREFIX: &'static str = "beneficiary-account";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("customerId", Field::opt_int(self.customer_id))
            .field("accountNumber", Field::opt_text(self.account_number.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupationFilter {
    pub search: Option<String>,
    pub include_deleted: bool,
}

impl QueryFilter for OccupationFilter {
    const PREFIX: &'static str = "occupation";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductAttributeFilter {
    pub search: Option<String>,
    pub name: Option<String>,
    pub display_type: Option<String>,
    pub active: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for ProductAttributeFilter {
    const PREFIX: &'static str = "product-attribute";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("name", Field::opt_normalized(self.name.as_deref()))
            .field("displayType", Field::opt_text(self.display_type.as_deref()))
            .field("active", Field::opt_flag(self.active))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductAttributeValueFilter {
    pub search: Option<String>,
    pub name: Option<String>,
    pub attribute_id: Option<i64>,
    pub active: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for ProductAttributeValueFilter {
    const PREFIX: &'static str = "product-attribute-value";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("name", Field::opt_normalized(self.name.as_deref()))
            .field("attributeId", Field::opt_int(self.attribute_id))
            .field("active", Field::opt_flag(self.active))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductBrandFilter {
    pub search: Option<String>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for ProductBrandFilter {
    const PREFIX: &'static str = "product-brand";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("name", Field::opt_normalized(self.name.as_deref()))
            .field("active", Field::opt_flag(self.active))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCategoryUomFilter {
    pub search: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for ProductCategoryUomFilter {
    const PREFIX: &'static str = "product-category-uom";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("code", Field::opt_text(self.code.as_deref()))
            .field("name", Field::opt_normalized(self.name.as_deref()))
            .field("active", Field::opt_flag(self.active))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

/// Product template list filter, the widest query shape in the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductTemplateFilter {
    pub search: Option<String>,
    pub name: Option<String>,
    pub internal_reference: Option<String>,
    pub product_type: Option<String>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub status: Option<String>,
    pub can_be_sold: Option<bool>,
    pub can_be_purchased: Option<bool>,
    pub has_variants: Option<bool>,
    pub active: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for ProductTemplateFilter {
    const PREFIX: &'static str = "product-template";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("name", Field::opt_normalized(self.name.as_deref()))
            .field("internalReference", Field::opt_text(self.internal_reference.as_deref()))
            .field("type", Field::opt_text(self.product_type.as_deref()))
            .field("categoryId", Field::opt_int(self.category_id))
            .field("brandId", Field::opt_int(self.brand_id))
            .field("status", Field::opt_text(self.status.as_deref()))
            .field("canBeSold", Field::opt_flag(self.can_be_sold))
            .field("canBePurchased", Field::opt_flag(self.can_be_purchased))
            .field("hasVariants", Field::opt_flag(self.has_variants))
            .field("active", Field::opt_flag(self.active))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUomFilter {
    pub search: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub active: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for ProductUomFilter {
    const PREFIX: &'static str = "product-uom";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("code", Field::opt_text(self.code.as_deref()))
            .field("name", Field::opt_normalized(self.name.as_deref()))
            .field("categoryId", Field::opt_int(self.category_id))
            .field("active", Field::opt_flag(self.active))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemDocumentTypeFilter {
    pub search: Option<String>,
    pub code: Option<String>,
    pub required: Option<bool>,
    pub for_person: Option<bool>,
    pub for_company: Option<bool>,
    pub active: Option<bool>,
    pub include_deleted: bool,
}

impl QueryFilter for SystemDocumentTypeFilter {
    const PREFIX: &'static str = "system-document-type";

    fn key_fields(&self) -> KeyFields {
        KeyFields::new()
            .field("search", Field::opt_normalized(self.search.as_deref()))
            .field("code", Field::opt_text(self.code.as_deref()))
            .field("required", Field::opt_flag(self.required))
            .field("forPerson", Field::opt_flag(self.for_person))
            .field("forCompany", Field::opt_flag(self.for_company))
            .field("active", Field::opt_flag(self.active))
            .field("includeDeleted", Field::flag(self.include_deleted))
    }
}
