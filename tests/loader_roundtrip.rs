use chrono::NaiveDate;

use recession_npp::data::{SeriesOrigin, SeriesSource, load};
use recession_npp::domain::RawObservation;
use recession_npp::error::ErrorKind;
use recession_npp::io::export::write_raw_csv;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn raw_export_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("djia_close_2020-04-09.csv");

    let series = vec![
        RawObservation::new(d(2020, 2, 11), 29276.34),
        RawObservation::new(d(2020, 2, 12), 29551.42),
        RawObservation::new(d(2020, 2, 13), 29423.31),
        RawObservation::new(d(2020, 3, 23), 18591.93),
        RawObservation::new(d(2020, 4, 9), 23719.37),
    ];
    write_raw_csv(&path, &series).unwrap();

    let loaded = load(SeriesSource::Local(&path), d(1896, 5, 27), None).unwrap();
    assert_eq!(loaded.observations, series);
    assert_eq!(loaded.origin, SeriesOrigin::Local);
    assert_eq!(loaded.duplicates_replaced, 0);

    // Reloading with a window keeps only the matching rows.
    let window = load(SeriesSource::Local(&path), d(2020, 2, 12), Some(d(2020, 3, 23))).unwrap();
    assert_eq!(window.observations, series[1..4].to_vec());
}

#[test]
fn unsorted_file_with_duplicates_and_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("closes.csv");
    std::fs::write(
        &path,
        "Date,Open,Close\n2020-01-03,1,12.5\n2020-01-02,1,11\n2020-01-06,1,.\n2020-01-03,1,13\n",
    )
    .unwrap();

    let loaded = load(SeriesSource::Local(&path), d(2020, 1, 1), None).unwrap();
    assert_eq!(
        loaded.observations,
        vec![RawObservation::new(d(2020, 1, 2), 11.0), RawObservation::new(d(2020, 1, 3), 13.0)]
    );
    assert_eq!(loaded.duplicates_replaced, 1);
    assert_eq!(loaded.gaps_skipped, 1);
}

#[test]
fn missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();

    let err = load(SeriesSource::Local(&dir.path().join("nope.csv")), d(2020, 1, 1), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingFile);

    let bad = dir.path().join("bad.csv");
    std::fs::write(&bad, "Date,Close\n2020-01-02,-5\n").unwrap();
    let err = load(SeriesSource::Local(&bad), d(2020, 1, 1), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedData);
}
