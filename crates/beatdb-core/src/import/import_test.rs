use std::sync::Mutex;

use super::*;
use crate::stores::StoreKey;

/// In-memory stand-in for the `stores` table.
///
/// Records are stored exactly as handed over. Any record named in `fail_on`
/// makes `create` return an error.
#[derive(Default)]
struct MemoryStores {
    rows: Mutex<Vec<StoreRecord>>,
    fail_on: Vec<String>,
}

impl MemoryStores {
    fn failing_on(name: &str) -> Self {
        Self {
            rows: Mutex::default(),
            fail_on: vec![name.to_owned()],
        }
    }

    fn stored(&self) -> Vec<StoreRecord> {
        self.rows.lock().unwrap().clone()
    }
}

impl StoreRepository for MemoryStores {
    type Error = String;

    async fn find_matching(
        &self,
        names: &[&str],
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<StoreRecord>, String> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| {
                names.iter().any(|name| {
                    r.key() == StoreKey::new(name, latitude, longitude)
                })
            })
            .cloned())
    }

    async fn create(&self, mut record: StoreRecord) -> Result<StoreRecord, String> {
        if self.fail_on.contains(&record.display_name) {
            return Err(format!("insert rejected for {}", record.display_name));
        }
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

fn assert_balanced(summary: &ImportSummary) {
    assert_eq!(
        summary.inserted + summary.skipped,
        summary.total_rows,
        "inserted + skipped must equal total: {summary:?}"
    );
    assert!(summary.error_count <= summary.skipped);
}

// -----------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------

#[tokio::test]
async fn empty_input_is_rejected() {
    let repo = MemoryStores::default();
    let err = import_csv(&repo, "").await.unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));
}

#[tokio::test]
async fn whitespace_only_input_is_rejected() {
    let repo = MemoryStores::default();
    let err = import_csv(&repo, "  \n\t\n").await.unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));
}

#[tokio::test]
async fn header_without_data_is_rejected() {
    let repo = MemoryStores::default();
    let err = import_csv(&repo, "shop,lat,lng\n\n   \n").await.unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));
    assert!(repo.stored().is_empty());
}

// -----------------------------------------------------------------------
// Counting and dedup
// -----------------------------------------------------------------------

#[tokio::test]
async fn mixed_batch_counts_duplicates_and_bad_coordinates() {
    let repo = MemoryStores::default();
    let csv = "shop,lat,lng\nA,1.000000,2.000000\nA,1.0000001,2.0000001\nB,x,y";

    let summary = import_csv(&repo, csv).await.unwrap();

    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.error_count, 1);
    assert_eq!(
        summary.errors,
        vec![RowFailure {
            row: 4,
            reason: "Invalid coordinates".to_owned(),
        }]
    );
    assert_balanced(&summary);
}

#[tokio::test]
async fn reimporting_same_file_inserts_nothing() {
    let repo = MemoryStores::default();
    let csv = "shop,latitude,longitude,salesman,beat\n\
               Alpha,12.9716,77.5946,Ravi,North\n\
               Beta,12.123456789,77.987654321,Ravi,North\n\
               Gamma,13.0,78.0,Asha,South";

    let first = import_csv(&repo, csv).await.unwrap();
    assert_eq!(first.inserted, 3);

    let second = import_csv(&repo, csv).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.error_count, 0);
    assert_eq!(repo.stored().len(), 3);
}

#[tokio::test]
#[allow(clippy::float_cmp)]
async fn created_records_carry_the_coordinates_used_for_lookup() {
    let repo = MemoryStores::default();
    let csv = "shop,lat,lng\nTie Mart,0.0005045,1.2345675";

    import_csv(&repo, csv).await.unwrap();

    let stored = repo.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].latitude, round_coordinate(0.000_504_5));
    assert_eq!(stored[0].longitude, round_coordinate(1.234_567_5));
}

#[tokio::test]
async fn same_coordinates_different_name_is_not_duplicate() {
    let repo = MemoryStores::default();
    let csv = "shop,lat,lng\nA,1.5,2.5\nB,1.5,2.5";

    let summary = import_csv(&repo, csv).await.unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.skipped, 0);
}

#[tokio::test]
async fn short_lines_are_excluded_from_total() {
    let repo = MemoryStores::default();
    let csv = "shop,lat,lng\nA,1,2\njust-one-field\nx,y\nB,3,4";

    let summary = import_csv(&repo, csv).await.unwrap();
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.inserted, 2);
    assert_balanced(&summary);
}

#[tokio::test]
async fn error_list_is_capped_but_count_is_exact() {
    let repo = MemoryStores::default();
    let mut csv = String::from("shop,lat,lng\n");
    for i in 0..12 {
        csv.push_str(&format!("Shop {i},north,east\n"));
    }
    csv.push_str("Good,1,1\n");

    let summary = import_csv(&repo, &csv).await.unwrap();
    assert_eq!(summary.total_rows, 13);
    assert_eq!(summary.error_count, 12);
    assert_eq!(summary.errors.len(), MAX_REPORTED_ERRORS);
    assert_eq!(summary.errors[0].row, 2);
    assert_eq!(summary.errors[9].row, 11);
    assert_eq!(summary.inserted, 1);
    assert_balanced(&summary);
}

#[tokio::test]
async fn storage_failure_is_recorded_and_batch_continues() {
    let repo = MemoryStores::failing_on("Boom");
    let csv = "shop,lat,lng\nFirst,1,1\nBoom,2,2\nLast,3,3";

    let summary = import_csv(&repo, csv).await.unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.errors[0].row, 3);
    assert_eq!(summary.errors[0].reason, "insert rejected for Boom");
    assert_balanced(&summary);
}

// -----------------------------------------------------------------------
// Header aliasing and field derivation
// -----------------------------------------------------------------------

#[tokio::test]
async fn mixed_case_aliases_resolve_coordinates() {
    let repo = MemoryStores::default();
    let csv = "Store_Name,Lat,Lng,Sales Person,Zone\n\"Kumar Stores\",12.5,77.25,Ravi,East";

    let summary = import_csv(&repo, csv).await.unwrap();
    assert_eq!(summary.inserted, 1);

    let stored = repo.stored();
    assert_eq!(
        stored[0],
        StoreRecord {
            display_name: "Kumar Stores".to_owned(),
            latitude: 12.5,
            longitude: 77.25,
            salesman_name: "Ravi".to_owned(),
            beat_name: "East".to_owned(),
        }
    );
}

#[tokio::test]
async fn missing_columns_fall_back_to_defaults() {
    let repo = MemoryStores::default();
    let csv = "id,notes,extra\n1,hello,world";

    let summary = import_csv(&repo, csv).await.unwrap();
    assert_eq!(summary.inserted, 1);

    let stored = &repo.stored()[0];
    assert_eq!(stored.display_name, "Unknown Shop");
    assert!(stored.latitude.abs() < f64::EPSILON);
    assert!(stored.longitude.abs() < f64::EPSILON);
    assert_eq!(stored.salesman_name, "Unassigned");
    assert_eq!(stored.beat_name, "Unassigned");
}

#[tokio::test]
async fn blank_cells_fall_back_to_defaults() {
    let repo = MemoryStores::default();
    let csv = "shop,lat,lng,salesman,beat\n,,,,";

    let summary = import_csv(&repo, csv).await.unwrap();
    assert_eq!(summary.inserted, 1);
    let stored = &repo.stored()[0];
    assert_eq!(stored.display_name, "Unknown Shop");
    assert_eq!(stored.salesman_name, "Unassigned");
}

#[tokio::test]
async fn empty_aliased_name_falls_back_to_shop_column() {
    let repo = MemoryStores::default();
    let csv = "name,shop,lat,lng\n,Fallback Mart,1,2";

    import_csv(&repo, csv).await.unwrap();
    assert_eq!(repo.stored()[0].display_name, "Fallback Mart");
}

#[tokio::test]
async fn quoted_name_keeps_embedded_comma() {
    let repo = MemoryStores::default();
    let csv = "shop,lat,lng\n\"Patel & Sons, MG Road\",\"18.52\",\"73.85\"";

    let summary = import_csv(&repo, csv).await.unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(repo.stored()[0].display_name, "Patel & Sons, MG Road");
}

#[tokio::test]
async fn row_numbers_count_blank_lines() {
    let repo = MemoryStores::default();
    let csv = "shop,lat,lng\r\n\r\nA,bad,1\r\n";

    let summary = import_csv(&repo, csv).await.unwrap();
    assert_eq!(summary.total_rows, 1);
    assert_eq!(summary.errors[0].row, 3);
}

// -----------------------------------------------------------------------
// parse_csv
// -----------------------------------------------------------------------

#[test]
fn parse_csv_reports_in_file_duplicates() {
    let parsed = parse_csv("shop,lat,lng\nA,1,2\nA,1.0000002,2\nB,1,2\nC,?,2").unwrap();
    assert_eq!(parsed.total_rows(), 4);
    assert_eq!(parsed.records().count(), 3);
    assert_eq!(parsed.invalid_rows(), 1);
    assert_eq!(parsed.in_file_duplicates(), 1);
    assert_eq!(parsed.headers, vec!["shop", "lat", "lng"]);
    assert!(parsed.header_map.has_coordinates());
}

#[test]
fn parse_csv_does_not_merge_distinct_huge_coordinates() {
    let parsed = parse_csv("shop,lat,lng\nFar,1e20,0\nFar,2e20,0").unwrap();
    assert_eq!(parsed.records().count(), 2);
    assert_eq!(parsed.in_file_duplicates(), 0);
}

#[test]
fn parse_csv_tags_rows_with_line_numbers() {
    let parsed = parse_csv("shop,lat,lng\n\nA,1,2\nB,x,2").unwrap();
    let rows: Vec<usize> = parsed.rows.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![3, 4]);
    assert_eq!(parsed.rows[1].outcome, Err(RowError::InvalidCoordinates));
}

#[test]
fn import_summary_serializes_failures_as_row_and_error() {
    let failure = RowFailure {
        row: 7,
        reason: "Invalid coordinates".to_owned(),
    };
    let json = serde_json::to_value(&failure).expect("serialize");
    assert_eq!(json["row"], 7);
    assert_eq!(json["error"], "Invalid coordinates");
}
