//! Endpoints, protocol defaults and well-known field codes.

/// Production server interface endpoint.
pub const PRODUCTION_ENDPOINT: &str = "https://epayment1.point.fi/pw/serverinterface";

/// Test server interface endpoint.
pub const TEST_ENDPOINT: &str = "https://epayment.test.point.fi/pw/serverinterface";

/// Production hosted payment page URL (for browser-posted payment forms).
pub const PRODUCTION_PAYMENT_URL: &str = "https://epayment1.point.fi/pw/payment";

/// Test hosted payment page URL.
pub const TEST_PAYMENT_URL: &str = "https://epayment.test.point.fi/pw/payment";

/// Version of the payment interface spoken by this crate.
pub const DEFAULT_INTERFACE_VERSION: &str = "5";

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "EUR";

// Base fields present on every server interface request.
pub const REQUEST_ID: &str = "l-f-1-20_request-id";
pub const REQUEST_TIMESTAMP: &str = "t-f-14-19_request-timestamp";
pub const MERCHANT_AGREEMENT_CODE: &str = "s-f-1-36_merchant-agreement-code";
pub const SOFTWARE: &str = "s-f-1-30_software";
pub const SOFTWARE_VERSION: &str = "s-f-1-10_software-version";
pub const INTERFACE_VERSION: &str = "i-f-1-11_interface-version";
pub const OPERATION: &str = "s-f-1-30_operation";

// Signature fields, attached to both requests and responses.
pub const SIGNATURE_ONE: &str = "s-t-256-256_signature-one";
pub const SIGNATURE_TWO: &str = "s-t-256-256_signature-two";

// Response fields with dedicated accessors.
pub const AVAILABILITY: &str = "i-f-1-1_availability";
pub const ERROR_MESSAGE: &str = "s-f-1-30_error-message";
/// Excluded from response signature verification when present.
pub const SHOP_ORDER_PHASE: &str = "s-t-1-40_shop-order__phase";

// Currency fields injected by the client facade.
pub const CURRENCY_CODE: &str = "i-f-1-3_currency-code";
pub const ORDER_CURRENCY_CODE: &str = "i-f-1-3_order-currency-code";
pub const REFUND_CURRENCY_CODE: &str = "i-f-1-3_refund-currency-code";

// Operation-specific fields the facade fills in.
pub const ORDER_NUMBER: &str = "s-f-1-36_order-number";
pub const PAYMENT_TIMESTAMP: &str = "t-f-14-19_payment-timestamp";
pub const ORDER_TIMESTAMP: &str = "t-f-14-19_order-timestamp";
pub const ORDER_EXPIRY_TIMESTAMP: &str = "t-f-14-19_order-expiry-timestamp";
pub const SAVED_PAYMENT_METHOD_ID: &str = "l-t-1-20_saved-payment-method-id";
pub const PAYMENT_LINK_NUMBER: &str = "s-t-1-36_payment-link-number";
pub const DELIVERY_COUNTRY_CODE: &str = "i-t-1-3_delivery-address-country-code";

/// Runtime endpoint configuration. Decouples the client from the
/// compile-time URLs so a mock or regional endpoint can be substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Server interface URL (machine-to-machine operations).
    pub server_interface: String,
    /// Hosted payment page URL (browser form posts).
    pub payment_page: String,
}

impl Default for EndpointConfig {
    /// Defaults to the production endpoints.
    fn default() -> Self {
        Self {
            server_interface: PRODUCTION_ENDPOINT.to_string(),
            payment_page: PRODUCTION_PAYMENT_URL.to_string(),
        }
    }
}

impl EndpointConfig {
    /// Test environment endpoints.
    pub fn test() -> Self {
        Self {
            server_interface: TEST_ENDPOINT.to_string(),
            payment_page: TEST_PAYMENT_URL.to_string(),
        }
    }
}
