//! Order records as read from the CSV files.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Matches an order number that already carries its shop, e.g. `541032-050842`.
static FULL_ORDER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+-\d+$").expect("valid order key pattern"));

/// Separator between shop number and order number in a full order key.
pub const ORDER_KEY_SEPARATOR: char = '-';

/// One order row from an order CSV file.
///
/// All fields are trimmed. `secure_id` is stored uppercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order number, either bare (`050842`) or full (`541032-050842`).
    pub order_number: String,
    /// Shop number the order was placed at.
    pub shop_number: String,
    /// Free-text label for the order.
    #[serde(default)]
    pub identifier: String,
    /// Pickup code printed on the envelope.
    #[serde(default)]
    pub secure_id: String,
    /// Alternate order id used only for photo downloads.
    #[serde(default)]
    pub cewe_order_id: String,
    /// Explicit extraction folder for downloaded photos.
    #[serde(default)]
    pub output_path: String,
}

impl OrderRecord {
    /// Create a record from the two required fields.
    pub fn new(order_number: impl Into<String>, shop_number: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into().trim().to_string(),
            shop_number: shop_number.into().trim().to_string(),
            ..Default::default()
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into().trim().to_string();
        self
    }

    /// Set the pickup code. It is normalized to uppercase.
    pub fn with_secure_id(mut self, secure_id: impl Into<String>) -> Self {
        self.secure_id = normalize_secure_id(&secure_id.into());
        self
    }

    pub fn with_cewe_order_id(mut self, cewe_order_id: impl Into<String>) -> Self {
        self.cewe_order_id = cewe_order_id.into().trim().to_string();
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<String>) -> Self {
        self.output_path = output_path.into().trim().to_string();
        self
    }

    /// The full `shop-order` key used by the status endpoint.
    pub fn resolved_key(&self) -> String {
        if FULL_ORDER_KEY.is_match(&self.order_number) {
            self.order_number.clone()
        } else {
            join_key(&self.shop_number, &self.order_number)
        }
    }

    /// The order id used by the download endpoint.
    ///
    /// Prefers `cewe_order_id`, completed with the shop number when it has
    /// no separator of its own.
    pub fn download_key(&self) -> String {
        if self.cewe_order_id.is_empty() {
            self.resolved_key()
        } else if self.cewe_order_id.contains(ORDER_KEY_SEPARATOR) {
            self.cewe_order_id.clone()
        } else {
            join_key(&self.shop_number, &self.cewe_order_id)
        }
    }

    pub fn has_secure_id(&self) -> bool {
        !self.secure_id.is_empty()
    }
}

fn join_key(shop_number: &str, order_number: &str) -> String {
    format!("{}{}{}", shop_number, ORDER_KEY_SEPARATOR, order_number)
}

/// Uppercase and trim a pickup code.
pub fn normalize_secure_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A CSV row that was not turned into an [`OrderRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the file (the header is line 1).
    pub line: u64,
    pub reason: String,
}

/// All records read from one order file.
#[derive(Debug, Clone, Default)]
pub struct OrderFile {
    /// File name without directory, e.g. `march.csv`.
    pub filename: String,
    /// Records in row order.
    pub records: Vec<OrderRecord>,
    /// Rows that were skipped while reading.
    pub skipped_rows: Vec<SkippedRow>,
}
