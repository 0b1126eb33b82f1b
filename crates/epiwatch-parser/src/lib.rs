//! SnapshotParser - typed extraction from the fetched status page.
//!
//! Turns the raw HTML body into a [`RawSnapshot`]: section title lookup,
//! the publisher's update stamp, and the per-region data rows. Parsing is
//! all-or-nothing: one malformed row rejects the whole snapshot.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use epiwatch_core::model::{RawRow, RawSnapshot};
use epiwatch_core::{IngestError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.today-title").expect("valid selector"));
static AREA_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.area").expect("valid selector"));
static DIV_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div").expect("valid selector"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid pattern"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}:\d{2}:\d{2}").expect("valid pattern"));

/// A fetched status page, parsed once and queried per scope.
pub struct PageDocument {
    doc: Html,
}

impl PageDocument {
    /// Parse the fetched HTML body. Parsing itself never fails; missing
    /// structure surfaces when a snapshot is requested.
    pub fn parse(body: &str) -> Self {
        Self {
            doc: Html::parse_document(body),
        }
    }

    /// Extract the listing under the section titled `marker`.
    ///
    /// `row_limit` bounds the row walk for the country listing; the global
    /// listing runs unbounded.
    pub fn snapshot(&self, marker: &str, row_limit: Option<usize>) -> Result<RawSnapshot> {
        let title = self.find_title(marker)?;
        let (date, time) = update_stamp(marker, title)?;
        let rows = self.rows_following(title, row_limit)?;
        if rows.is_empty() {
            return Err(IngestError::NoDataAvailable {
                scope: marker.to_string(),
            });
        }
        Ok(RawSnapshot {
            scope_label: marker.to_string(),
            date,
            time,
            rows,
        })
    }

    /// Extract one province's per-city listing.
    ///
    /// The update stamp still comes from the country section title; the rows
    /// come from the province's own container.
    pub fn province_snapshot(&self, marker: &str, province: &str) -> Result<RawSnapshot> {
        let title = self.find_title(marker)?;
        let (date, time) = update_stamp(marker, title)?;
        let rows = self.province_rows(province)?;
        if rows.is_empty() {
            return Err(IngestError::NoDataAvailable {
                scope: province.to_string(),
            });
        }
        Ok(RawSnapshot {
            scope_label: province.to_string(),
            date,
            time,
            rows,
        })
    }

    fn find_title(&self, marker: &str) -> Result<ElementRef<'_>> {
        self.doc
            .select(&TITLE_SEL)
            .find(|el| element_text(*el) == marker)
            .ok_or_else(|| IngestError::NoDataAvailable {
                scope: marker.to_string(),
            })
    }

    /// Data rows are the `div.prod` elements following the title in document
    /// order.
    fn rows_following(
        &self,
        title: ElementRef<'_>,
        limit: Option<usize>,
    ) -> Result<Vec<RawRow>> {
        let mut rows = Vec::new();
        let mut past_title = false;
        for node in self.doc.tree.root().descendants() {
            if node.id() == title.id() {
                past_title = true;
                continue;
            }
            if !past_title {
                continue;
            }
            if let Some(el) = ElementRef::wrap(node) {
                if el.value().name() == "div" && el.value().classes().any(|c| c == "prod") {
                    rows.push(parse_row(el, rows.len())?);
                    if limit.is_some_and(|max| rows.len() >= max) {
                        break;
                    }
                }
            }
        }
        Ok(rows)
    }

    /// Province rows live in the grandparent container of the matching
    /// `span.area` heading, after two header cells.
    fn province_rows(&self, province: &str) -> Result<Vec<RawRow>> {
        let heading = self
            .doc
            .select(&AREA_SEL)
            .find(|el| element_text(*el) == province)
            .ok_or_else(|| IngestError::UnknownRegion {
                region: province.to_string(),
            })?;
        let container = heading
            .parent()
            .and_then(|node| node.parent())
            .and_then(ElementRef::wrap)
            .ok_or_else(|| IngestError::NoDataAvailable {
                scope: province.to_string(),
            })?;
        container
            .select(&DIV_SEL)
            .skip(2)
            .enumerate()
            .map(|(index, el)| parse_row(el, index))
            .collect()
    }
}

/// The update stamp sits in the second `today-time` span following the title.
fn update_stamp(marker: &str, title: ElementRef<'_>) -> Result<(NaiveDate, NaiveTime)> {
    let mut seen = 0usize;
    let mut node = title.next_sibling();
    let stamp = loop {
        let Some(current) = node else {
            return Err(IngestError::MalformedTimestamp {
                reason: format!("no update-time field after title '{}'", marker),
            });
        };
        if let Some(el) = ElementRef::wrap(current) {
            if el.value().name() == "span" && el.value().classes().any(|c| c == "today-time") {
                seen += 1;
                if seen == 2 {
                    break element_text(el);
                }
            }
        }
        node = current.next_sibling();
    };

    let date_str = DATE_RE
        .find(&stamp)
        .map(|m| m.as_str())
        .ok_or_else(|| IngestError::MalformedTimestamp {
            reason: format!("no date in '{}'", stamp),
        })?;
    let time_str = TIME_RE
        .find(&stamp)
        .map(|m| m.as_str())
        .ok_or_else(|| IngestError::MalformedTimestamp {
            reason: format!("no time in '{}'", stamp),
        })?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        IngestError::MalformedTimestamp {
            reason: format!("bad date '{}': {}", date_str, e),
        }
    })?;
    let time = NaiveTime::parse_from_str(time_str, "%H:%M:%S").map_err(|e| {
        IngestError::MalformedTimestamp {
            reason: format!("bad time '{}': {}", time_str, e),
        }
    })?;
    Ok((date, time))
}

/// The four positional fields of a row: region name, confirmed, deaths,
/// recovered.
fn parse_row(el: ElementRef<'_>, index: usize) -> Result<RawRow> {
    let cells: Vec<String> = el
        .children()
        .filter_map(ElementRef::wrap)
        .map(element_text)
        .collect();
    if cells.len() < 4 {
        return Err(IngestError::MalformedRow {
            index,
            reason: format!("expected 4 fields, found {}", cells.len()),
        });
    }
    Ok(RawRow {
        name: cells[0].clone(),
        confirmed: parse_count(&cells[1], index, "confirmed")?,
        deaths: parse_count(&cells[2], index, "deaths")?,
        recovered: parse_count(&cells[3], index, "recovered")?,
    })
}

fn parse_count(text: &str, index: usize, field: &str) -> Result<u32> {
    text.parse::<u32>().map_err(|_| IngestError::MalformedRow {
        index,
        reason: format!("non-numeric {} field '{}'", field, text),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
