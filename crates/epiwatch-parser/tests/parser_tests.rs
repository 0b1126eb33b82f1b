//! Fixture-driven tests for status-page extraction.

use chrono::{NaiveDate, NaiveTime};
use epiwatch_parser::PageDocument;

const GLOBAL_MARKER: &str = "全球疫情";
const COUNTRY_MARKER: &str = "中国疫情";

/// Page shape mirrors the live source: a country section first (title, two
/// `today-time` spans, bounded `div.prod` rows, per-province containers with
/// an `area` heading), then the global section with unbounded rows.
fn page() -> String {
    format!(
        r#"<html><body>
        <div class="block">
          <span class="today-title">{country}</span>
          <span class="today-time">数据更新</span>
          <span class="today-time">最后更新时间 2020-03-01 10:00:00</span>
          <div class="prod"><span>Hubei</span><span>67103</span><span>2803</span><span>33757</span></div>
          <div class="prod"><span>Guangdong</span><span>1350</span><span>7</span><span>1101</span></div>
          <div class="prod"><span>Henan</span><span>1272</span><span>22</span><span>1198</span></div>
        </div>
        <div class="area-box">
          <div class="summary"><span class="area">Hubei</span><span>67103</span></div>
          <div class="head"><span>城市</span><span>确诊</span><span>死亡</span><span>治愈</span></div>
          <div class="city"><span>Wuhan</span><span>49122</span><span>2195</span><span>24890</span></div>
          <div class="city"><span>Xiaogan</span><span>3518</span><span>124</span><span>2576</span></div>
        </div>
        <div class="area-box">
          <div class="summary"><span class="area">Empty</span><span>0</span></div>
          <div class="head"><span>城市</span><span>确诊</span><span>死亡</span><span>治愈</span></div>
        </div>
        <div class="block">
          <span class="today-title">{global}</span>
          <span class="today-time">数据更新</span>
          <span class="today-time">最后更新时间 2020-03-01 12:30:00</span>
          <div class="prod"><span>Korea</span><span>3736</span><span>18</span><span>30</span></div>
          <div class="prod"><span>Italy</span><span>1694</span><span>34</span><span>83</span></div>
        </div>
        </body></html>"#,
        country = COUNTRY_MARKER,
        global = GLOBAL_MARKER,
    )
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn t(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M:%S").unwrap()
}

#[test]
fn global_snapshot_reads_stamp_and_rows() {
    let doc = PageDocument::parse(&page());
    let snapshot = doc.snapshot(GLOBAL_MARKER, None).unwrap();
    assert_eq!(snapshot.date, d("2020-03-01"));
    assert_eq!(snapshot.time, t("12:30:00"));
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[0].name, "Korea");
    assert_eq!(snapshot.rows[0].confirmed, 3736);
    assert_eq!(snapshot.rows[1].recovered, 83);
}

#[test]
fn country_snapshot_honors_row_limit() {
    let doc = PageDocument::parse(&page());
    let snapshot = doc.snapshot(COUNTRY_MARKER, Some(2)).unwrap();
    assert_eq!(snapshot.time, t("10:00:00"));
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[0].name, "Hubei");
    assert_eq!(snapshot.rows[1].name, "Guangdong");
}

#[test]
fn country_rows_do_not_leak_into_unbounded_walks_backwards() {
    // The global walk starts at the global title, so the country rows that
    // precede it are never picked up.
    let doc = PageDocument::parse(&page());
    let snapshot = doc.snapshot(GLOBAL_MARKER, None).unwrap();
    assert!(snapshot.rows.iter().all(|r| r.name != "Hubei"));
}

#[test]
fn missing_marker_is_no_data() {
    let doc = PageDocument::parse(&page());
    let err = doc.snapshot("南极疫情", None).unwrap_err();
    assert_eq!(err.code(), "ERR_NO_DATA_AVAILABLE");
}

#[test]
fn missing_time_field_is_malformed_timestamp() {
    let body = format!(
        r#"<html><body>
        <span class="today-title">{m}</span>
        <span class="today-time">仅有一个时间栏</span>
        <div class="prod"><span>Korea</span><span>1</span><span>0</span><span>0</span></div>
        </body></html>"#,
        m = GLOBAL_MARKER
    );
    let err = PageDocument::parse(&body)
        .snapshot(GLOBAL_MARKER, None)
        .unwrap_err();
    assert_eq!(err.code(), "ERR_MALFORMED_TIMESTAMP");
}

#[test]
fn stamp_without_time_pattern_is_malformed_timestamp() {
    let body = format!(
        r#"<html><body>
        <span class="today-title">{m}</span>
        <span class="today-time">x</span>
        <span class="today-time">2020-03-01 中午</span>
        <div class="prod"><span>Korea</span><span>1</span><span>0</span><span>0</span></div>
        </body></html>"#,
        m = GLOBAL_MARKER
    );
    let err = PageDocument::parse(&body)
        .snapshot(GLOBAL_MARKER, None)
        .unwrap_err();
    assert_eq!(err.code(), "ERR_MALFORMED_TIMESTAMP");
}

#[test]
fn non_numeric_field_rejects_whole_snapshot() {
    let body = format!(
        r#"<html><body>
        <span class="today-title">{m}</span>
        <span class="today-time">x</span>
        <span class="today-time">2020-03-01 12:30:00</span>
        <div class="prod"><span>Korea</span><span>3736</span><span>18</span><span>30</span></div>
        <div class="prod"><span>Italy</span><span>many</span><span>34</span><span>83</span></div>
        </body></html>"#,
        m = GLOBAL_MARKER
    );
    let err = PageDocument::parse(&body)
        .snapshot(GLOBAL_MARKER, None)
        .unwrap_err();
    assert_eq!(err.code(), "ERR_MALFORMED_ROW");
}

#[test]
fn short_row_rejects_whole_snapshot() {
    let body = format!(
        r#"<html><body>
        <span class="today-title">{m}</span>
        <span class="today-time">x</span>
        <span class="today-time">2020-03-01 12:30:00</span>
        <div class="prod"><span>Korea</span><span>3736</span></div>
        </body></html>"#,
        m = GLOBAL_MARKER
    );
    let err = PageDocument::parse(&body)
        .snapshot(GLOBAL_MARKER, None)
        .unwrap_err();
    assert_eq!(err.code(), "ERR_MALFORMED_ROW");
}

#[test]
fn marker_present_but_no_rows_is_no_data() {
    let body = format!(
        r#"<html><body>
        <span class="today-title">{m}</span>
        <span class="today-time">x</span>
        <span class="today-time">2020-03-01 12:30:00</span>
        </body></html>"#,
        m = GLOBAL_MARKER
    );
    let err = PageDocument::parse(&body)
        .snapshot(GLOBAL_MARKER, None)
        .unwrap_err();
    assert_eq!(err.code(), "ERR_NO_DATA_AVAILABLE");
}

#[test]
fn province_snapshot_reads_cities() {
    let doc = PageDocument::parse(&page());
    let snapshot = doc.province_snapshot(COUNTRY_MARKER, "Hubei").unwrap();
    // Stamp comes from the country section
    assert_eq!(snapshot.date, d("2020-03-01"));
    assert_eq!(snapshot.time, t("10:00:00"));
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[0].name, "Wuhan");
    assert_eq!(snapshot.rows[0].deaths, 2195);
    assert_eq!(snapshot.rows[1].name, "Xiaogan");
}

#[test]
fn unknown_province_is_unknown_region() {
    let doc = PageDocument::parse(&page());
    let err = doc
        .province_snapshot(COUNTRY_MARKER, "Atlantis")
        .unwrap_err();
    assert_eq!(err.code(), "ERR_UNKNOWN_REGION");
}

#[test]
fn province_heading_without_cities_is_no_data() {
    let doc = PageDocument::parse(&page());
    let err = doc.province_snapshot(COUNTRY_MARKER, "Empty").unwrap_err();
    assert_eq!(err.code(), "ERR_NO_DATA_AVAILABLE");
}
