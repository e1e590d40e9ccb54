/// Job name constants, shared by the CLI, logging spans and metric labels.
pub const ACTIONS_JOB: &str = "actions";
pub const STATUSES_JOB: &str = "statuses";
pub const TRIGGERS_JOB: &str = "triggers";
pub const CATALOG_PULL_JOB: &str = "pull";
pub const CATALOG_RECOMPILE_JOB: &str = "recompile";

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "xivprep.toml";

// Icon asset defaults
pub const ICON_URL_TEMPLATE: &str = "https://xivapi.com/i/{bucket}/{id}.png";
pub const CATALOG_ICON_URL_TEMPLATE: &str = "https://secure.xivdb.com/img/game/{bucket}/{id}.png";
pub const ICON_CACHE_DIR: &str = "icons";
pub const ICON_EXTENSION: &str = "png";
pub const ICON_PUBLIC_PREFIX: &str = "/icons";
pub const ICON_FETCH_DELAY_MS: u64 = 1000;

/// Upstream shards icon directories by thousands.
pub const ICON_BUCKET_SIZE: u32 = 1000;

// Status export starts with a three row header block (keys, names, types).
pub const STATUS_HEADER_ROWS: usize = 3;
pub const TRUTHY_LITERAL: &str = "True";

pub const CATALOG_API_URL: &str = "https://api.xivdb.com/action?columns=id,name_ja,name_en,name_fr,name_de,name_cns,lodestone_id,lodestone_type,help_ja,help_en,help_fr,help_de,help_cns,json_ja,json_en,json_fr,json_de,json_cns,icon,level,classjob_category,classjob,spell_group,can_target_self,can_target_party,can_target_friendly,can_target_hostile,can_target_dead,status_required,status_gain_self,cost,cost_hp,cost_mp,cost_tp,cost_cp,cast_range,cast_time,recast_time,is_in_game,is_trait,is_pvp,is_target_area,action_category,action_combo,action_proc_status,action_timeline_hit,action_timeline_use,action_data,effect_range,type";

