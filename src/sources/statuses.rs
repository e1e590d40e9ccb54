//! Status effect export: `status.csv`.

use crate::app::ports::HttpClientPort;
use crate::assets::IconFetcher;
use crate::config::{Config, StatusColumns};
use crate::constants::STATUSES_JOB;
use crate::error::Result;
use crate::importer::{RawRow, TabularImporter};
use crate::markup::strip_bare_tags;
use crate::pipeline::Pipeline;
use crate::types::{RecordOutcome, RunSummary, SkipReason, StatusRecord};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub icon_id: u32,
    pub max_stacks: String,
    pub category: String,
    pub hit_effect: String,
    pub vfx: String,
    pub flags: StatusFlags,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub lock_movement: bool,
    pub lock_actions: bool,
    pub lock_control: bool,
    pub transfiguration: bool,
    pub can_dispel: bool,
    pub inflicted_by_actor: bool,
    pub is_permanent: bool,
    pub is_fc_buff: bool,
    pub invisibility: bool,
}

impl StatusRow {
    pub fn decode(row: &RawRow, columns: &StatusColumns, truthy: &str) -> Result<Self> {
        let flag = |column: usize, field: &'static str| row.flag(column, field, truthy);
        Ok(Self {
            id: row.number(columns.id, "id")?,
            name: row.text(columns.name, "name")?.to_string(),
            description: row.text(columns.description, "description")?.to_string(),
            icon_id: row.number(columns.icon, "icon")?,
            max_stacks: row.text(columns.max_stacks, "max_stacks")?.to_string(),
            category: row.text(columns.category, "category")?.to_string(),
            hit_effect: row.text(columns.hit_effect, "hit_effect")?.to_string(),
            vfx: row.text(columns.vfx, "vfx")?.to_string(),
            flags: StatusFlags {
                lock_movement: flag(columns.lock_movement, "lock_movement")?,
                lock_actions: flag(columns.lock_actions, "lock_actions")?,
                lock_control: flag(columns.lock_control, "lock_control")?,
                transfiguration: flag(columns.transfiguration, "transfiguration")?,
                can_dispel: flag(columns.can_dispel, "can_dispel")?,
                inflicted_by_actor: flag(columns.inflicted_by_actor, "inflicted_by_actor")?,
                is_permanent: flag(columns.is_permanent, "is_permanent")?,
                is_fc_buff: flag(columns.is_fc_buff, "is_fc_buff")?,
                invisibility: flag(columns.invisibility, "invisibility")?,
            },
        })
    }
}

pub fn transform(row: &RawRow, columns: &StatusColumns, truthy: &str) -> RecordOutcome<StatusRecord> {
    match row.text(columns.name, "name") {
        Ok("") => return RecordOutcome::Skipped(SkipReason::BlankName),
        Ok(_) => {}
        Err(e) => return RecordOutcome::Fatal(e),
    }

    let status = match StatusRow::decode(row, columns, truthy) {
        Ok(status) => status,
        Err(e) => return RecordOutcome::Fatal(e),
    };
    let flags = status.flags;

    RecordOutcome::Success(StatusRecord {
        id: status.id,
        icon_id: status.icon_id,
        name: status.name,
        description: strip_bare_tags(&status.description),
        max_stacks: status.max_stacks,
        category: status.category,
        hit_effect: status.hit_effect,
        vfx: status.vfx,
        lock_movement: flags.lock_movement,
        lock_actions: flags.lock_actions,
        lock_control: flags.lock_control,
        transfiguration: flags.transfiguration,
        can_dispel: flags.can_dispel,
        inflicted_by_actor: flags.inflicted_by_actor,
        is_permanent: flags.is_permanent,
        is_fc_buff: flags.is_fc_buff,
        invisibility: flags.invisibility,
        icon: None,
    })
}

#[instrument(skip_all)]
pub async fn run(config: &Config, http: Arc<dyn HttpClientPort>) -> Result<RunSummary> {
    let source = &config.statuses;
    let fetcher = IconFetcher::new(http, config.icons.clone());
    let rows = TabularImporter::new(&source.input)
        .skip_leading(source.header_rows)
        .rows()?;

    Pipeline::run_records(
        STATUSES_JOB,
        rows,
        |row| transform(row, &source.columns, &source.truthy),
        &fetcher,
        &source.output,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;

    fn status_row(id: &str, name: &str, flags: &[(usize, &str)]) -> RawRow {
        let mut fields = vec!["False".to_string(); 24];
        fields[0] = id.to_string();
        fields[1] = name.to_string();
        fields[2] = "Movement is <Emphasis>halted</Emphasis>.".to_string();
        fields[3] = "15001".to_string();
        fields[4] = "0".to_string();
        fields[5] = "2".to_string();
        fields[6] = "0".to_string();
        fields[7] = "7".to_string();
        for (column, value) in flags {
            fields[*column] = value.to_string();
        }
        RawRow::new(fields)
    }

    #[test]
    fn test_flags_follow_exact_truthy_literal() {
        let row = status_row("2", "Stun", &[(8, "True"), (10, "true"), (23, "True"), (22, "1")]);

        let RecordOutcome::Success(record) = transform(&row, &StatusColumns::default(), "True") else {
            panic!("expected a record");
        };

        assert!(record.lock_movement);
        assert!(!record.lock_actions);
        assert!(record.invisibility);
        assert!(!record.is_fc_buff);
        assert!(!record.can_dispel);
        assert_eq!(record.description, "Movement is halted.");
        assert_eq!(record.category, "2");
        assert_eq!(record.vfx, "7");
        assert_eq!(record.icon_id, 15001);
    }

    #[test]
    fn test_empty_name_is_skipped() {
        let row = status_row("0", "", &[]);
        assert!(matches!(
            transform(&row, &StatusColumns::default(), "True"),
            RecordOutcome::Skipped(SkipReason::BlankName)
        ));
    }

    #[test]
    fn test_missing_flag_column_is_fatal() {
        let row = RawRow::new(["2", "Stun", "", "15001", "0", "2", "0", "7", "True"]);
        assert!(matches!(
            transform(&row, &StatusColumns::default(), "True"),
            RecordOutcome::Fatal(PrepError::Schema { column: 10, .. })
        ));
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let row = status_row("2", "Stun", &[(22, "True")]);
        let RecordOutcome::Success(record) = transform(&row, &StatusColumns::default(), "True") else {
            panic!("expected a record");
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["isFcBuff"], true);
        assert_eq!(value["maxStacks"], "0");
        assert_eq!(value["hitEffect"], "0");
        assert!(value.get("id").is_none());
    }
}
