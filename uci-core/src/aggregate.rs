//! Summary statistics and category counts for one refresh cycle.

use serde::{Deserialize, Serialize};

use crate::{Record, SexCode};

/// Shown instead of the mean age when no record carries a valid age.
pub const NO_DATA_PLACEHOLDER: &str = "–";

/// Count for one category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Label → count mapping that iterates in first-seen order. Charts render in
/// this order, so it must not be sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCounts {
    entries: Vec<CategoryCount>,
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to `label`, appending it if this is its first occurrence.
    pub fn increment(&mut self, label: &str) {
        match self.entries.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => entry.count += 1,
            None => self.entries.push(CategoryCount {
                label: label.to_string(),
                count: 1,
            }),
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map_or(0, |entry| entry.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryCount> {
        self.entries.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over all buckets.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}

/// Headline numbers of the summary panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: usize,
    pub female: usize,
    pub male: usize,
    /// Mean of valid ages rounded to one decimal; `None` means no data, not zero.
    pub mean_age: Option<f64>,
}

impl SummaryStats {
    pub fn mean_age_label(&self) -> String {
        match self.mean_age {
            Some(mean) => format!("{mean:.1}"),
            None => NO_DATA_PLACEHOLDER.to_string(),
        }
    }
}

/// Output of a single aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryAggregate {
    pub summary: SummaryStats,
    pub by_sex: CategoryCounts,
    pub by_condition: CategoryCounts,
}

/// Which chart a dataset feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Donut keyed by sex.
    SexDonut,
    /// Horizontal bars keyed by discharge condition.
    ConditionBar,
}

/// Labels and values ready for a chart, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

impl ChartDataset {
    /// Sex counts with display labels ("F" → "Femenino", "M" → "Masculino").
    pub fn by_sex(counts: &CategoryCounts) -> Self {
        Self::from_counts(counts, SexCode::display_label)
    }

    /// Condition counts, labels verbatim.
    pub fn by_condition(counts: &CategoryCounts) -> Self {
        Self::from_counts(counts, |label| label)
    }

    fn from_counts(counts: &CategoryCounts, label_for: impl Fn(&str) -> &str) -> Self {
        let (labels, values) = counts
            .iter()
            .map(|entry| (label_for(&entry.label).to_string(), entry.count))
            .unzip();
        Self { labels, values }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_value(&self) -> usize {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

/// Numeric coercion of an age cell. Only positive finite values count as
/// samples.
pub fn coerce_age(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Computes the summary panel and both category mappings in one pass.
pub fn aggregate(records: &[Record]) -> RegistryAggregate {
    let mut by_sex = CategoryCounts::new();
    let mut by_condition = CategoryCounts::new();
    let mut age_sum = 0.0;
    let mut age_samples = 0usize;

    for record in records {
        let code = record.sex_code();
        if !code.is_empty() {
            by_sex.increment(code.as_str());
        }

        if let Some(condition) = record.condition_label() {
            by_condition.increment(condition);
        }

        if let Some(age) = coerce_age(record.age.as_deref()) {
            age_sum += age;
            age_samples += 1;
        }
    }

    let mean_age = (age_samples > 0).then(|| {
        let mean = age_sum / age_samples as f64;
        (mean * 10.0).round() / 10.0
    });

    let summary = SummaryStats {
        total: records.len(),
        female: by_sex.get(SexCode::FEMALE),
        male: by_sex.get(SexCode::MALE),
        mean_age,
    };

    RegistryAggregate {
        summary,
        by_sex,
        by_condition,
    }
}
