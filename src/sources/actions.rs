//! Action export: `action.csv` joined with `action_desc.csv`.

use crate::app::ports::HttpClientPort;
use crate::assets::IconFetcher;
use crate::config::{ActionColumns, Config, DescriptionColumns};
use crate::constants::ACTIONS_JOB;
use crate::error::{PrepError, Result};
use crate::importer::{RawRow, TabularImporter};
use crate::markup::strip_paired_tags;
use crate::pipeline::Pipeline;
use crate::types::{ActionRecord, RecordOutcome, RunSummary, SkipReason};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Action row with its positions resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRow {
    pub id: u32,
    pub name: String,
    pub icon_id: u32,
    pub cast_tenths: u32,
    pub recast_tenths: u32,
}

impl ActionRow {
    pub fn decode(row: &RawRow, columns: &ActionColumns) -> Result<Self> {
        Ok(Self {
            id: row.number(columns.id, "id")?,
            name: row.text(columns.name, "name")?.trim().to_string(),
            icon_id: row.number(columns.icon, "icon")?,
            cast_tenths: row.number(columns.cast, "cast")?,
            recast_tenths: row.number(columns.recast, "recast")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionRow {
    pub id: u32,
    pub text: String,
}

impl DescriptionRow {
    pub fn decode(row: &RawRow, columns: &DescriptionColumns) -> Result<Self> {
        Ok(Self {
            id: row.number(columns.id, "id")?,
            text: strip_paired_tags(row.text(columns.text, "description")?),
        })
    }
}

/// Build the id → help text lookup from description rows.
pub fn collect_descriptions<I>(rows: I, columns: &DescriptionColumns) -> Result<HashMap<u32, String>>
where
    I: IntoIterator<Item = Result<RawRow>>,
{
    let mut descriptions = HashMap::new();
    for row in rows {
        let decoded = DescriptionRow::decode(&row?, columns)?;
        descriptions.insert(decoded.id, decoded.text);
    }
    Ok(descriptions)
}

/// Turn one action row into a record. Every action must have a description.
pub fn transform(
    row: &RawRow,
    columns: &ActionColumns,
    descriptions: &HashMap<u32, String>,
) -> RecordOutcome<ActionRecord> {
    match row.text(columns.name, "name") {
        Ok(name) if name.trim().is_empty() => return RecordOutcome::Skipped(SkipReason::BlankName),
        Ok(_) => {}
        Err(e) => return RecordOutcome::Fatal(e),
    }

    let action = match ActionRow::decode(row, columns) {
        Ok(action) => action,
        Err(e) => return RecordOutcome::Fatal(e),
    };

    let Some(description) = descriptions.get(&action.id) else {
        return RecordOutcome::Fatal(PrepError::MissingReference {
            kind: "action description",
            id: action.id,
        });
    };

    RecordOutcome::Success(ActionRecord {
        id: action.id,
        icon_id: action.icon_id,
        name: action.name,
        description: description.clone(),
        cast_time: f64::from(action.cast_tenths) / 10.0,
        cooldown: f64::from(action.recast_tenths) / 10.0,
        icon: None,
    })
}

#[instrument(skip_all)]
pub async fn run(config: &Config, http: Arc<dyn HttpClientPort>) -> Result<RunSummary> {
    let source = &config.actions;

    let descriptions = collect_descriptions(
        TabularImporter::new(&source.descriptions).rows()?,
        &source.description_columns,
    )?;
    info!(
        "Loaded {} action descriptions from {}",
        descriptions.len(),
        source.descriptions.display()
    );

    let fetcher = IconFetcher::new(http, config.icons.clone());
    let rows = TabularImporter::new(&source.input).rows()?;

    Pipeline::run_records(
        ACTIONS_JOB,
        rows,
        |row| transform(row, &source.columns, &descriptions),
        &fetcher,
        &source.output,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::read_rows;

    fn action_row(id: &str, name: &str, icon: &str, cast: &str, recast: &str) -> RawRow {
        let mut fields = vec![String::new(); 40];
        fields[0] = id.to_string();
        fields[1] = name.to_string();
        fields[3] = icon.to_string();
        fields[38] = cast.to_string();
        fields[39] = recast.to_string();
        RawRow::new(fields)
    }

    fn lookup() -> HashMap<u32, String> {
        HashMap::from([(5, "Heals target.".to_string())])
    }

    #[test]
    fn test_transform_joins_description_and_converts_tenths() {
        let row = action_row("5", " Cure ", "405", "15", "25");

        let RecordOutcome::Success(record) = transform(&row, &ActionColumns::default(), &lookup()) else {
            panic!("expected a record");
        };

        assert_eq!(record.id, 5);
        assert_eq!(record.name, "Cure");
        assert_eq!(record.description, "Heals target.");
        assert_eq!(record.cast_time, 1.5);
        assert_eq!(record.cooldown, 2.5);
        assert_eq!(record.icon_id, 405);
        assert_eq!(record.icon, None);
    }

    #[test]
    fn test_missing_description_is_fatal() {
        let row = action_row("6", "Raise", "406", "80", "25");

        let outcome = transform(&row, &ActionColumns::default(), &lookup());

        assert!(matches!(
            outcome,
            RecordOutcome::Fatal(PrepError::MissingReference { id: 6, .. })
        ));
    }

    #[test]
    fn test_blank_name_is_skipped_before_lookup() {
        let row = action_row("6", "   ", "", "", "");

        let outcome = transform(&row, &ActionColumns::default(), &lookup());

        assert!(matches!(outcome, RecordOutcome::Skipped(SkipReason::BlankName)));
    }

    #[test]
    fn test_short_row_is_a_schema_error() {
        let row = RawRow::new(["5", "Cure", "", "405"]);

        let outcome = transform(&row, &ActionColumns::default(), &lookup());

        assert!(matches!(
            outcome,
            RecordOutcome::Fatal(PrepError::Schema { column: 38, .. })
        ));
    }

    #[test]
    fn test_descriptions_use_paired_grammar() {
        let csv = "key,0\n#,Description\n5,Restores HP.<b>Potency</b>\n7,Plain\n";

        let descriptions =
            collect_descriptions(read_rows(csv.as_bytes(), 0), &DescriptionColumns::default()).unwrap();

        assert_eq!(descriptions.len(), 2);
        assert_eq!(descriptions[&5], "Restores HP.");
        assert_eq!(descriptions[&7], "Plain");
    }
}
