//! Testing utilities and mock implementations of the upstream service traits.
//!
//! The mocks let the run pipeline be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use fotocheck_core::testing::{MockDownloader, MockStatusChecker};
//!
//! let checker = MockStatusChecker::new();
//! checker.set_status("541032-050842", OrderStatus::new("DELIVERED", "Ready")).await;
//!
//! let downloader = MockDownloader::new();
//! downloader.set_file_count(12).await;
//! ```

mod mock_downloader;
mod mock_status_checker;

pub use mock_downloader::MockDownloader;
pub use mock_status_checker::MockStatusChecker;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::orders::OrderRecord;
    use crate::status::OrderStatus;

    /// Header line with every supported column.
    pub const FULL_HEADER: &str =
        "order_number,shop_number,identifier,secure_id,cewe_order_id,output_path";

    /// A record with a bare order number and a label.
    pub fn order(order_number: &str, shop_number: &str, identifier: &str) -> OrderRecord {
        OrderRecord::new(order_number, shop_number).with_identifier(identifier)
    }

    pub fn ready() -> OrderStatus {
        OrderStatus::new("DELIVERED", "Ready for pickup")
    }

    pub fn shipped() -> OrderStatus {
        OrderStatus::new("SHIPPED", "On the way to the store")
    }

    /// Render records as an order CSV file with [`FULL_HEADER`].
    pub fn orders_csv(records: &[OrderRecord]) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(FULL_HEADER.split(','))
            .expect("write header");
        for r in records {
            writer
                .write_record([
                    &r.order_number,
                    &r.shop_number,
                    &r.identifier,
                    &r.secure_id,
                    &r.cewe_order_id,
                    &r.output_path,
                ])
                .expect("write order row");
        }
        let bytes = writer.into_inner().expect("flush order rows");
        String::from_utf8(bytes).expect("order rows are UTF-8")
    }

}
