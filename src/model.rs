// Core data model: location records and the loaded/displayed dataset.

use std::ops::Deref;
use std::rc::Rc;
use yew::Reducible;

pub const NO_RESULTS: &str = "No results found";

/// One climbing school from the source feed.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationRecord {
    /// Position slot used by the map: `.0` is x (longitude), `.1` is y (latitude).
    pub coordinates: (f64, f64),
    /// Count of routes. Not validated; may be NaN when the source field is malformed.
    pub value: f64,
    pub name: String,
}

impl LocationRecord {
    pub fn longitude(&self) -> f64 {
        self.coordinates.0
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.1
    }
}

pub fn results_label(count: usize) -> String {
    format!("{} results", count)
}

/// Shared, immutable list of records.
///
/// Equality is identity: records may carry NaN, so comparing contents would
/// make a list unequal to itself.
#[derive(Clone, Debug, Default)]
pub struct RecordList(Rc<Vec<LocationRecord>>);

impl RecordList {
    pub fn new(records: Vec<LocationRecord>) -> Self {
        Self(Rc::new(records))
    }
}

impl PartialEq for RecordList {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for RecordList {
    type Target = [LocationRecord];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Loaded records plus the subset currently drawn and listed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    /// Write-once after the initial load.
    pub original: RecordList,
    /// Always a subset of `original`.
    pub displayed: RecordList,
    /// Human-readable result count shown in the side panel.
    pub info: String,
    pub loaded: bool,
}

impl Dataset {
    pub fn from_records(records: Vec<LocationRecord>) -> Self {
        let info = results_label(records.len());
        let original = RecordList::new(records);
        Self {
            displayed: original.clone(),
            original,
            info,
            loaded: true,
        }
    }

    /// Case-insensitive substring filter against the original collection.
    ///
    /// Queries of at most one UTF-16 unit restore everything. A query with no
    /// matches clears the display so the map agrees with the message.
    pub fn filtered(&self, query: &str) -> Self {
        if query.encode_utf16().count() <= 1 {
            return Self {
                displayed: self.original.clone(),
                info: if self.loaded {
                    results_label(self.original.len())
                } else {
                    self.info.clone()
                },
                ..self.clone()
            };
        }
        let needle = query.to_uppercase();
        let matches: Vec<LocationRecord> = self
            .original
            .iter()
            .filter(|r| r.name.to_uppercase().contains(&needle))
            .cloned()
            .collect();
        let info = if matches.is_empty() {
            NO_RESULTS.to_string()
        } else {
            results_label(matches.len())
        };
        Self {
            displayed: RecordList::new(matches),
            info,
            ..self.clone()
        }
    }
}

pub enum DatasetAction {
    Loaded(Vec<LocationRecord>),
    Filter(String),
}

impl Reducible for Dataset {
    type Action = DatasetAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            DatasetAction::Loaded(records) => {
                if self.loaded {
                    tracing::warn!(ignored = records.len(), "dataset already loaded");
                    return self;
                }
                tracing::info!(count = records.len(), "loaded climbing areas");
                Rc::new(Dataset::from_records(records))
            }
            DatasetAction::Filter(query) => {
                if !self.loaded {
                    return self;
                }
                let next = self.filtered(&query);
                tracing::debug!(?query, info = %next.info, "filter");
                Rc::new(next)
            }
        }
    }
}
