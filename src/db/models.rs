use serde::{Deserialize, Serialize};

/// String encoding of a true boolean flag in the roster table.
pub const FLAG_TRUE: &str = "TRUE";
/// String encoding of a false boolean flag in the roster table.
pub const FLAG_FALSE: &str = "FALSE";

// ============================================================================
// Column layout
// ============================================================================

/// One column of the roster table. The declaration order is the on-disk /
/// on-sheet layout, header row included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    IsDev,
    QuestionsAsked,
    QuestionsMissed,
    QuestionsAnsweredCorrectly,
    Points,
    IsRemoved,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Id,
        Column::Name,
        Column::IsDev,
        Column::QuestionsAsked,
        Column::QuestionsMissed,
        Column::QuestionsAnsweredCorrectly,
        Column::Points,
        Column::IsRemoved,
    ];

    /// Header text used for this column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "Id",
            Column::Name => "Name",
            Column::IsDev => "isDev",
            Column::QuestionsAsked => "questionsAsked",
            Column::QuestionsMissed => "questionsMissed",
            Column::QuestionsAnsweredCorrectly => "questionsAnsweredCorrectly",
            Column::Points => "points",
            Column::IsRemoved => "isRemoved",
        }
    }

    /// Resolve a header cell to a column. Surrounding whitespace is ignored;
    /// unknown headers resolve to `None` and their cells are dropped.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL.into_iter().find(|c| c.as_str() == header)
    }
}

/// Canonical header row written by every backend.
pub fn header_row() -> Vec<String> {
    Column::ALL.iter().map(|c| c.as_str().to_string()).collect()
}

// ============================================================================
// PersonRecord
// ============================================================================

/// One row of the roster table. Every field is stored as a string; absent
/// values are the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "isDev")]
    pub is_dev: String,
    #[serde(rename = "questionsAsked")]
    pub questions_asked: String,
    #[serde(rename = "questionsMissed")]
    pub questions_missed: String,
    #[serde(rename = "questionsAnsweredCorrectly")]
    pub questions_answered_correctly: String,
    pub points: String,
    #[serde(rename = "isRemoved")]
    pub is_removed: String,
}

impl PersonRecord {
    /// A freshly added roster member: counters at "0", not removed.
    pub fn new_member(id: impl Into<String>, name: impl Into<String>, is_dev: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_dev: is_dev.into(),
            questions_asked: "0".into(),
            questions_missed: "0".into(),
            questions_answered_correctly: "0".into(),
            points: "0".into(),
            is_removed: FLAG_FALSE.into(),
        }
    }

    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Id => &self.id,
            Column::Name => &self.name,
            Column::IsDev => &self.is_dev,
            Column::QuestionsAsked => &self.questions_asked,
            Column::QuestionsMissed => &self.questions_missed,
            Column::QuestionsAnsweredCorrectly => &self.questions_answered_correctly,
            Column::Points => &self.points,
            Column::IsRemoved => &self.is_removed,
        }
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        let slot = match column {
            Column::Id => &mut self.id,
            Column::Name => &mut self.name,
            Column::IsDev => &mut self.is_dev,
            Column::QuestionsAsked => &mut self.questions_asked,
            Column::QuestionsMissed => &mut self.questions_missed,
            Column::QuestionsAnsweredCorrectly => &mut self.questions_answered_correctly,
            Column::Points => &mut self.points,
            Column::IsRemoved => &mut self.is_removed,
        };
        *slot = value.into();
    }

    /// Soft-delete flag.
    pub fn is_removed(&self) -> bool {
        self.is_removed == FLAG_TRUE
    }

    /// Role flag.
    pub fn is_developer(&self) -> bool {
        self.is_dev == FLAG_TRUE
    }

    /// Zero the three question counters and `points`. Identity, name, role
    /// and the removed flag are untouched.
    pub fn reset_counters(&mut self) {
        self.questions_asked = "0".into();
        self.questions_missed = "0".into();
        self.questions_answered_correctly = "0".into();
        self.points = "0".into();
    }

    /// Build a record from a data row, using `headers` as the field-name
    /// source. Missing trailing cells map to the empty string.
    pub fn from_row(headers: &[Option<Column>], row: &[String]) -> Self {
        let mut record = PersonRecord::default();
        for (idx, column) in headers.iter().enumerate() {
            if let Some(column) = column {
                let value = row.get(idx).cloned().unwrap_or_default();
                record.set(*column, value);
            }
        }
        record
    }

    /// Serialize into the fixed column order.
    pub fn to_row(&self) -> Vec<String> {
        Column::ALL.iter().map(|c| self.get(*c).to_string()).collect()
    }
}

/// Convert a raw table (header row first) into records. An empty table, or
/// one with only a header, yields no records.
pub fn records_from_table(rows: &[Vec<String>]) -> Vec<PersonRecord> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    let headers: Vec<Option<Column>> = header.iter().map(|h| Column::from_header(h)).collect();
    data.iter().map(|row| PersonRecord::from_row(&headers, row)).collect()
}

/// Convert records into a raw table: canonical header followed by one row per record.
pub fn table_from_records(records: &[PersonRecord]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header_row());
    rows.extend(records.iter().map(PersonRecord::to_row));
    rows
}

// ============================================================================
// RecordPatch
// ============================================================================

/// Field-level overwrite applied by `find_and_update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    fields: Vec<(Column, String)>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: Column, value: impl Into<String>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn apply_to(&self, record: &mut PersonRecord) {
        for (column, value) in &self.fields {
            record.set(*column, value.clone());
        }
    }
}
