//! # In-Memory Rate Schedule
//!
//! A read-only [`RateTable`] backed by a `BTreeMap`, plus the reference
//! sample of tariff lines used for seeding and tests.
//!
//! Keys are canonical [`HtsCode`]s, so a lookup is an exact match on the
//! full ten-digit code.

use std::collections::BTreeMap;

use crate::calculator::RateTable;
use crate::error::LookupError;
use crate::types::{HtsCode, HtsRateRecord, SectionSummary};

/// Tariff lines held in memory.
#[derive(Debug, Clone, Default)]
pub struct RateSchedule {
    records: BTreeMap<HtsCode, HtsRateRecord>,
}

impl RateSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule preloaded with [`sample_records`].
    pub fn sample() -> Self {
        sample_records().into_iter().collect()
    }

    /// Inserts or replaces the record for its code.
    pub fn insert(&mut self, record: HtsRateRecord) -> Option<HtsRateRecord> {
        self.records.insert(record.hts_code.clone(), record)
    }

    pub fn get(&self, code: &HtsCode) -> Option<&HtsRateRecord> {
        self.records.get(code)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in code order.
    pub fn records(&self) -> impl Iterator<Item = &HtsRateRecord> {
        self.records.values()
    }

    /// Line counts per section, in section order.
    ///
    /// Sections cover contiguous chapter ranges, so code order visits each
    /// section's lines consecutively.
    pub fn section_summary(&self) -> Vec<SectionSummary> {
        let mut summary: Vec<SectionSummary> = Vec::new();
        for record in self.records.values() {
            let Some(section) = record.hts_code.section() else {
                continue;
            };
            match summary.last_mut() {
                Some(last) if last.section == section => last.item_count += 1,
                _ => summary.push(SectionSummary {
                    section,
                    item_count: 1,
                    first_description: record.description.clone(),
                }),
            }
        }
        summary
    }
}

impl FromIterator<HtsRateRecord> for RateSchedule {
    fn from_iter<I: IntoIterator<Item = HtsRateRecord>>(iter: I) -> Self {
        let mut schedule = RateSchedule::new();
        for record in iter {
            schedule.insert(record);
        }
        schedule
    }
}

impl RateTable for RateSchedule {
    fn lookup(&self, code: &HtsCode) -> Result<Option<HtsRateRecord>, LookupError> {
        Ok(self.records.get(code).cloned())
    }

    fn suggest(&self, code: &HtsCode, limit: usize) -> Vec<HtsCode> {
        nearby_codes(self.records.keys(), code, limit)
    }
}

/// Codes sharing `code`'s heading, then its chapter, in code order.
///
/// Shared by every table implementation so suggestions read the same no
/// matter where the schedule lives.
pub fn nearby_codes<'a>(
    known: impl Iterator<Item = &'a HtsCode> + Clone,
    code: &HtsCode,
    limit: usize,
) -> Vec<HtsCode> {
    let same_heading = known
        .clone()
        .filter(|k| *k != code && k.heading() == code.heading());
    let same_chapter = known
        .filter(|k| *k != code && k.heading() != code.heading() && k.chapter() == code.chapter());

    same_heading.chain(same_chapter).take(limit).cloned().collect()
}

// =============================================================================
// Sample Schedule
// =============================================================================

/// Sample tariff lines: (code, description, general, special, column 2).
const SAMPLE: &[(&str, &str, &str, &str, &str)] = &[
    // Section I: live animals; animal products
    ("0101.30.00.00", "Live asses", "Free", "Free", "Free"),
    ("0102.21.00.00", "Live cattle, purebred breeding animals", "2.5%", "Free", "5%"),
    ("0103.10.00.00", "Live swine, purebred breeding animals", "Free", "Free", "Free"),
    ("0104.10.10.00", "Live sheep, purebred breeding animals", "3¢/kg", "Free", "6¢/kg"),
    ("0105.11.00.10", "Live chickens weighing not more than 185g", "0.9¢ each", "Free", "4¢ each"),
    ("0201.10.00.00", "Carcasses and half-carcasses of bovine animals, fresh or chilled", "4.4¢/kg", "Free", "6.6¢/kg"),
    // Section II: vegetable products
    ("0701.10.00.00", "Seed potatoes, fresh or chilled", "0.5¢/kg", "Free", "3¢/kg"),
    ("0702.00.00.00", "Tomatoes, fresh or chilled", "2.8¢/kg", "Free", "4.6¢/kg"),
    ("0803.10.20.00", "Plantains, fresh", "Free", "Free", "Free"),
    // Section VI: chemical products
    ("2804.40.00.00", "Oxygen", "3.7%", "Free", "25%"),
    ("2805.11.00.00", "Sodium", "5.3%", "Free", "41%"),
    // Section XV: base metals
    ("7201.10.00.00", "Nonalloy pig iron", "Free", "Free", "$1.11/t"),
    ("7202.11.10.00", "Ferromanganese", "1.4%", "Free", "5%"),
    // Section XVI: machinery
    ("8471.30.01.00", "Portable automatic data processing machines", "Free", "Free", "35%"),
    ("8517.12.00.50", "Smartphones", "Free", "Free", "35%"),
];

/// The reference sample schedule.
///
/// Some lines ("0.9¢ each", "$1.11/t") deliberately use notations the
/// parser does not recognize.
pub fn sample_records() -> Vec<HtsRateRecord> {
    SAMPLE
        .iter()
        .filter_map(|(code, description, general, special, column2)| {
            let code = HtsCode::parse(code).ok()?;
            Some(HtsRateRecord::new(code, *description, *general, *special, *column2))
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
