use serde::{Deserialize, Serialize};
use std::fmt;

/// Business processes defined by UBL 2.1 (sections 2.3 to 2.18).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessProcess {
    Tendering,
    Catalogue,
    Quotation,
    Ordering,
    Fulfilment,
    Billing,
    FreightBilling,
    UtilityBilling,
    PaymentNotification,
    CollaborativePlanning,
    VendorManagedInventory,
    InternationalFreight,
    IntermodalFreight,
    FreightStatusReporting,
    CertificationOfOrigin,
}

impl BusinessProcess {
    pub const ALL: [BusinessProcess; 15] = [
        BusinessProcess::Tendering,
        BusinessProcess::Catalogue,
        BusinessProcess::Quotation,
        BusinessProcess::Ordering,
        BusinessProcess::Fulfilment,
        BusinessProcess::Billing,
        BusinessProcess::FreightBilling,
        BusinessProcess::UtilityBilling,
        BusinessProcess::PaymentNotification,
        BusinessProcess::CollaborativePlanning,
        BusinessProcess::VendorManagedInventory,
        BusinessProcess::InternationalFreight,
        BusinessProcess::IntermodalFreight,
        BusinessProcess::FreightStatusReporting,
        BusinessProcess::CertificationOfOrigin,
    ];

    /// Stable snake_case name, used in action identities.
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessProcess::Tendering => "tendering",
            BusinessProcess::Catalogue => "catalogue",
            BusinessProcess::Quotation => "quotation",
            BusinessProcess::Ordering => "ordering",
            BusinessProcess::Fulfilment => "fulfilment",
            BusinessProcess::Billing => "billing",
            BusinessProcess::FreightBilling => "freight_billing",
            BusinessProcess::UtilityBilling => "utility_billing",
            BusinessProcess::PaymentNotification => "payment_notification",
            BusinessProcess::CollaborativePlanning => "collaborative_planning",
            BusinessProcess::VendorManagedInventory => "vendor_managed_inventory",
            BusinessProcess::InternationalFreight => "international_freight",
            BusinessProcess::IntermodalFreight => "intermodal_freight",
            BusinessProcess::FreightStatusReporting => "freight_status_reporting",
            BusinessProcess::CertificationOfOrigin => "certification_of_origin",
        }
    }
}

impl fmt::Display for BusinessProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = BusinessProcess::ALL.iter().map(|p| p.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BusinessProcess::ALL.len());
    }

    #[test]
    fn serde_name_matches_display() {
        let json = serde_json::to_string(&BusinessProcess::FreightBilling).unwrap();
        assert_eq!(json, "\"freight_billing\"");
    }
}
