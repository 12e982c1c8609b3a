use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A business entity whose mutations are recorded as revisions
///
/// Implementors serialize to a JSON object. Fields named in
/// [`Auditable::transient_fields`] vary between reads of the same logical
/// entity (lazily loaded collections, derived values) and are removed at every
/// depth before snapshots are compared.
pub trait Auditable: Serialize {
    /// Aggregate kind stored on every revision record
    const ENTITY_TYPE: &'static str;

    /// Identifier of this entity, used as the revision ledger key
    fn audit_id(&self) -> String;

    /// Field names omitted from snapshots
    fn transient_fields() -> &'static [&'static str] {
        &[]
    }
}

/// Postal address shared by contracts and resellers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub street: String,
    pub ward: Option<String>,
    pub district: Option<String>,
    pub city: String,
    pub zip_code: Option<String>,
}

impl Address {
    pub fn new(id: impl Into<String>, street: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            street: street.into(),
            city: city.into(),
            ..Default::default()
        }
    }
}

impl Auditable for Address {
    const ENTITY_TYPE: &'static str = "address";

    fn audit_id(&self) -> String {
        self.id.clone()
    }
}

/// Energy-supply contract
///
/// `orders` is loaded on demand by the persistence layer, so two reads of the
/// same contract may or may not carry it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    pub contract_number: String,
    pub company_name: String,
    pub reseller_id: Option<String>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub unit_price: Option<f64>,
    pub address: Option<Address>,
    pub attachment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,
}

impl Contract {
    pub fn new(
        id: impl Into<String>,
        contract_number: impl Into<String>,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            contract_number: contract_number.into(),
            company_name: company_name.into(),
            status: "draft".to_string(),
            ..Default::default()
        }
    }
}

impl Auditable for Contract {
    const ENTITY_TYPE: &'static str = "contract";

    fn audit_id(&self) -> String {
        self.id.clone()
    }

    fn transient_fields() -> &'static [&'static str] {
        &["orders"]
    }
}

/// Supply order placed under a contract
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub contract_id: Option<String>,
    pub status: String,
    pub quantity: i64,
    pub delivery_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    /// Embedded back-reference to the parent contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<Box<Contract>>,
}

impl Order {
    pub fn new(id: impl Into<String>, order_number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order_number: order_number.into(),
            status: "pending".to_string(),
            ..Default::default()
        }
    }
}

impl Auditable for Order {
    const ENTITY_TYPE: &'static str = "order";

    fn audit_id(&self) -> String {
        self.id.clone()
    }

    fn transient_fields() -> &'static [&'static str] {
        &["contract"]
    }
}

/// Reseller company distributing contracts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reseller {
    pub id: String,
    pub company_name: String,
    pub tax_code: Option<String>,
    pub contact_email: Option<String>,
    pub active: bool,
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracts: Option<Vec<Contract>>,
}

impl Reseller {
    pub fn new(id: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            company_name: company_name.into(),
            active: true,
            ..Default::default()
        }
    }
}

impl Auditable for Reseller {
    const ENTITY_TYPE: &'static str = "reseller";

    fn audit_id(&self) -> String {
        self.id.clone()
    }

    fn transient_fields() -> &'static [&'static str] {
        &["contracts"]
    }
}

/// Transient fields of the aggregate kind named `entity_type`
///
/// Used when only an untyped state and its type name are at hand. Unknown
/// kinds have none.
pub fn transient_fields_for(entity_type: &str) -> &'static [&'static str] {
    let kind = entity_type.trim();
    if kind.eq_ignore_ascii_case(Contract::ENTITY_TYPE) {
        Contract::transient_fields()
    } else if kind.eq_ignore_ascii_case(Order::ENTITY_TYPE) {
        Order::transient_fields()
    } else if kind.eq_ignore_ascii_case(Reseller::ENTITY_TYPE) {
        Reseller::transient_fields()
    } else if kind.eq_ignore_ascii_case(Address::ENTITY_TYPE) {
        Address::transient_fields()
    } else {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_serializes_camel_case() {
        let mut contract = Contract::new("c-1", "HD-001", "Cong Ty Cu");
        contract.start_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        let value = serde_json::to_value(&contract).unwrap();

        assert_eq!(value["companyName"], "Cong Ty Cu");
        assert_eq!(value["startDate"], "2024-01-15");
        assert!(value.get("orders").is_none());
    }

    #[test]
    fn test_entity_types_are_distinct() {
        let types = [
            Contract::ENTITY_TYPE,
            Order::ENTITY_TYPE,
            Reseller::ENTITY_TYPE,
            Address::ENTITY_TYPE,
        ];
        for (i, a) in types.iter().enumerate() {
            for b in &types[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_transient_fields_name_lazy_collections() {
        assert_eq!(Contract::transient_fields(), &["orders"]);
        assert_eq!(Reseller::transient_fields(), &["contracts"]);
        assert!(Order::transient_fields().is_empty());
    }

    #[test]
    fn test_transient_fields_by_type_name() {
        assert_eq!(transient_fields_for("contract"), &["orders"]);
        assert_eq!(transient_fields_for(" Reseller "), &["contracts"]);
        assert_eq!(transient_fields_for("order"), &["contract"]);
        assert!(transient_fields_for("address").is_empty());
        assert!(transient_fields_for("invoice").is_empty());
    }
}
