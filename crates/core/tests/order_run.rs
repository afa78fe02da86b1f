//! End-to-end order run tests.
//!
//! These tests drive the real HTTP clients against local mock servers:
//! orders dir -> status checks -> downloads -> report -> results file.

use std::fs;
use std::io::Write;
use std::path::Path;

use mockito::{Matcher, Mock, Server, ServerGuard};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use fotocheck_core::{
    config::{DownloadConfig, StatusConfig},
    read_results, render_report, write_results, DownloadStatus, HttpDownloadClient,
    HttpStatusClient, NoDelayPacer, OrderRunner, OrderSource, RunOptions, RunReport,
    testing::fixtures,
};

const STATUS_PATH: &str = "/spotapi/orderInfo/order";

/// Local stand-ins for the status and download endpoints.
struct TestHarness {
    server: ServerGuard,
    mocks: Vec<Mock>,
    orders_dir: TempDir,
    downloads_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        Self {
            server: Server::new_async().await,
            mocks: Vec::new(),
            orders_dir: TempDir::new().expect("Failed to create orders dir"),
            downloads_dir: TempDir::new().expect("Failed to create downloads dir"),
        }
    }

    fn write_orders(&self, name: &str, content: &str) {
        fs::write(self.orders_dir.path().join(name), content).expect("Failed to write orders");
    }

    async fn status(&mut self, order_key: &str, code: &str, text: &str) {
        let mock = self
            .server
            .mock("GET", STATUS_PATH)
            .match_query(Matcher::UrlEncoded("fullOrderId".into(), order_key.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"summaryStateCode":"{}","summaryStateText":"{}"}}"#,
                code, text
            ))
            .create_async()
            .await;
        self.mocks.push(mock);
    }

    async fn status_error(&mut self, order_key: &str, status: usize) {
        let mock = self
            .server
            .mock("GET", STATUS_PATH)
            .match_query(Matcher::UrlEncoded("fullOrderId".into(), order_key.into()))
            .with_status(status)
            .with_body("upstream failure")
            .create_async()
            .await;
        self.mocks.push(mock);
    }

    async fn archive(&mut self, order_id: &str, secure_id: &str, files: &[(&str, &[u8])]) {
        let mock = self
            .server
            .mock(
                "GET",
                format!("/api/imageCD/{}/{}/download", order_id, secure_id).as_str(),
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/zip")
            .with_body(zip_bytes(files))
            .create_async()
            .await;
        self.mocks.push(mock);
    }

    async fn archive_error(&mut self, order_id: &str, secure_id: &str, status: usize) {
        let mock = self
            .server
            .mock(
                "GET",
                format!("/api/imageCD/{}/{}/download", order_id, secure_id).as_str(),
            )
            .match_query(Matcher::Any)
            .with_status(status)
            .create_async()
            .await;
        self.mocks.push(mock);
    }

    fn runner(
        &self,
        downloads: bool,
    ) -> OrderRunner<HttpStatusClient, HttpDownloadClient, NoDelayPacer> {
        let status = HttpStatusClient::new(&StatusConfig {
            base_url: format!("{}{}", self.server.url(), STATUS_PATH),
            timeout_secs: 5,
            ..StatusConfig::default()
        })
        .expect("Failed to build status client");

        let download = HttpDownloadClient::new(DownloadConfig {
            base_url: format!("{}/api/imageCD", self.server.url()),
            timeout_secs: 5,
            ..DownloadConfig::default()
        })
        .expect("Failed to build download client");

        let options = if downloads {
            RunOptions::with_downloads(self.downloads_dir.path())
        } else {
            RunOptions::status_only()
        };
        OrderRunner::new(status, download, NoDelayPacer, options)
    }

    async fn run(&self, downloads: bool) -> RunReport {
        let files = OrderSource::open(self.orders_dir.path(), &["orders_template.csv".to_string()])
            .expect("Failed to open orders dir");
        self.runner(downloads).run(files).await
    }
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(content).expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to list dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_empty_orders_dir_completes_with_empty_summary() {
    let harness = TestHarness::new().await;
    harness.write_orders("orders_template.csv", "order_number,shop_number,identifier\n1,2,x\n");
    fs::write(harness.orders_dir.path().join("notes.txt"), "not an order file").unwrap();

    let report = harness.run(false).await;

    assert!(report.files.is_empty());
    assert!(report.skipped_files.is_empty());
    assert_eq!(report.summary().orders, 0);
    assert!(render_report(&report).contains("No order files found."));
}

#[tokio::test]
async fn test_one_failing_status_does_not_affect_the_others() {
    let mut harness = TestHarness::new().await;
    harness.write_orders(
        "orders.csv",
        &fixtures::orders_csv(&[
            fixtures::order("1", "541032", "One"),
            fixtures::order("2", "541032", "Two"),
            fixtures::order("541032-3", "999", "Three"),
            fixtures::order("4", "541032", "Four"),
            fixtures::order("5", "541032", "Five"),
        ]),
    );
    harness.status("541032-1", "DELIVERED", "Ready for pickup").await;
    harness.status("541032-2", "SHIPPED", "On its way").await;
    harness.status_error("541032-3", 500).await;
    harness.status("541032-4", "IN_PROCESSING", "In production").await;
    harness.status("541032-5", "DELIVERED", "Ready for pickup").await;

    let report = harness.run(false).await;

    let results = &report.files[0].results;
    let keys: Vec<&str> = results.iter().map(|r| r.order_key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["541032-1", "541032-2", "541032-3", "541032-4", "541032-5"]
    );

    assert!(results[2].outcome.is_failed());
    assert!(results[2].outcome.display().contains("HTTP 500"));
    assert_eq!(results[0].outcome.status().unwrap().text, "Ready for pickup");
    assert_eq!(results[1].outcome.status().unwrap().code, "SHIPPED");
    assert_eq!(results[3].outcome.status().unwrap().code, "IN_PROCESSING");
    assert!(results[4].outcome.is_ready_for_pickup());

    let summary = report.summary();
    assert_eq!(summary.orders, 5);
    assert_eq!(summary.status_errors, 1);
    assert_eq!(summary.ready_for_pickup, 2);
}

#[tokio::test]
async fn test_downloads_land_in_output_path_or_identifier_folder() {
    let mut harness = TestHarness::new().await;
    let explicit = TempDir::new().unwrap();
    let explicit_path = explicit.path().join("x");
    harness.write_orders(
        "orders.csv",
        &format!(
            "order_number,shop_number,identifier,secure_id,output_path\n\
             1,10,Summer Trip,preh1,{}\n\
             2,10,Summer Trip,abc,\n",
            explicit_path.display()
        ),
    );
    harness.status("10-1", "DELIVERED", "Ready").await;
    harness.status("10-2", "DELIVERED", "Ready").await;
    harness
        .archive("10-1", "PREH1", &[("a.jpg", b"a"), ("b.jpg", b"b")])
        .await;
    harness.archive("10-2", "ABC", &[("c.jpg", b"c")]).await;

    let report = harness.run(true).await;

    assert_eq!(file_names(&explicit_path), vec!["a.jpg", "b.jpg"]);
    let by_identifier = harness.downloads_dir.path().join("Summer_Trip");
    assert_eq!(file_names(&by_identifier), vec!["c.jpg"]);

    let results = &report.files[0].results;
    assert_eq!(
        results[0].download.as_ref().unwrap().status,
        DownloadStatus::Downloaded { files: 2 }
    );
    assert_eq!(results[1].download.as_ref().unwrap().output_dir, by_identifier);
    assert_eq!(report.summary().downloaded, 2);
}

#[tokio::test]
async fn test_rejected_download_continues_and_keeps_existing_files() {
    let mut harness = TestHarness::new().await;
    harness.write_orders(
        "orders.csv",
        "order_number,shop_number,identifier,secure_id\n\
         1,10,Rejected,bad\n\
         2,10,Kept,old\n\
         3,10,Fresh,new\n",
    );
    let kept = harness.downloads_dir.path().join("Kept");
    fs::create_dir_all(&kept).unwrap();
    fs::write(kept.join("earlier.jpg"), b"earlier").unwrap();

    harness.status("10-1", "DELIVERED", "Ready").await;
    harness.status("10-2", "DELIVERED", "Ready").await;
    harness.status("10-3", "DELIVERED", "Ready").await;
    harness.archive_error("10-1", "BAD", 403).await;
    harness.archive("10-3", "NEW", &[("new.jpg", b"n")]).await;

    let report = harness.run(true).await;
    let results = &report.files[0].results;

    match &results[0].download.as_ref().unwrap().status {
        DownloadStatus::Failed { reason } => assert!(reason.contains("Access rejected")),
        other => panic!("expected failed download, got {:?}", other),
    }
    assert_eq!(
        results[1].download.as_ref().unwrap().status,
        DownloadStatus::AlreadyPresent
    );
    assert_eq!(file_names(&kept), vec!["earlier.jpg"]);
    assert_eq!(
        results[2].download.as_ref().unwrap().status,
        DownloadStatus::Downloaded { files: 1 }
    );

    let summary = report.summary();
    assert_eq!(summary.download_failures, 1);
    assert_eq!(summary.already_present, 1);
    assert_eq!(summary.downloaded, 1);
}

#[tokio::test]
async fn test_results_file_reproduces_printed_rows() {
    let mut harness = TestHarness::new().await;
    harness.write_orders("a.csv", "order_number,shop_number,identifier\n1,10,Alpha\n");
    harness.write_orders(
        "b.csv",
        "order_number,shop_number,identifier\n2,10,Beta\n3,10,Gamma\n",
    );
    harness.status("10-1", "DELIVERED", "Ready").await;
    harness.status_error("10-2", 502).await;
    harness.status("10-3", "SHIPPED", "Shipped").await;

    let report = harness.run(false).await;
    let rendered = render_report(&report);

    let out = TempDir::new().unwrap();
    let path = out.path().join("results.json");
    write_results(&path, &report).unwrap();
    let back = read_results(&path).unwrap();

    assert_eq!(back.status_rows(), report.status_rows());
    assert_eq!(back.status_rows().len(), 3);
    for (file, _, identifier, status) in back.status_rows() {
        assert!(rendered.contains(&format!("=== {} ===", file)));
        assert!(rendered.contains(&identifier));
        assert!(rendered.contains(&status));
    }
}

#[tokio::test]
async fn test_file_missing_columns_is_skipped() {
    let mut harness = TestHarness::new().await;
    harness.write_orders("a_bad.csv", "identifier,secure_id\nx,y\n");
    harness.write_orders("b_good.csv", "Order_Number,SHOP_NUMBER,Identifier\n1,10,Ok\n");
    harness.status("10-1", "SHIPPED", "Shipped").await;

    let report = harness.run(false).await;

    assert_eq!(report.skipped_files.len(), 1);
    assert_eq!(report.skipped_files[0].filename, "a_bad.csv");
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].results[0].record.identifier, "Ok");
}
