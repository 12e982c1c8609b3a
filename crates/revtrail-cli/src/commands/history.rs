//! History command

use clap::Args;
use revtrail_core::config::{DiffConfig, Language};
use revtrail_core::diff::{format_value, ChangeKind, FormatOptions};
use revtrail_core::{PagedResult, RevisionGroup};
use revtrail_engine::commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
use revtrail_engine::commands::history::{HistoryRequest, DEFAULT_PAGE_SIZE};

use crate::commands::{open_db, request_context};

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, default_value = ".revtrail/ledger.db")]
    pub db: String,

    /// Entity id whose history to show
    #[arg(long)]
    pub entity: String,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u32,

    /// Substring search over stored snapshots
    #[arg(long)]
    pub search: Option<String>,

    /// Filter over labels and displayed values
    #[arg(long)]
    pub filter: Option<String>,

    /// Display language: vi or en (overrides the config file)
    #[arg(long)]
    pub lang: Option<String>,

    /// TOML diff configuration (labels, noise lists, limits)
    #[arg(long)]
    pub config: Option<String>,

    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => DiffConfig::from_toml_file(path)?,
        None => DiffConfig::default(),
    };
    if let Some(lang) = &args.lang {
        config.language = lang.parse::<Language>()?;
    }

    let conn = open_db(&args.db)?;

    let mut request = HistoryRequest::new(&args.entity).page(args.page, args.size);
    request.search = args.search;
    request.filter = args.filter;

    let page = match apply_engine_query(
        EngineQuery::RevisionHistory(request),
        &conn,
        &config,
        &request_context(),
    )? {
        EngineQueryResult::RevisionHistory(page) => page,
        EngineQueryResult::RevisionPage(_) => return Err("unexpected query result".into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print!("{}", render_page(&args.entity, &page, &config));
    }
    Ok(())
}

fn render_page(entity_id: &str, page: &PagedResult<RevisionGroup>, config: &DiffConfig) -> String {
    let options = FormatOptions::from_config(config);
    let mut out = format!(
        "Revisions for {} (page {} of {}, {} total)\n",
        entity_id, page.page_number, page.total_pages, page.total_count
    );

    for group in &page.items {
        out.push_str(&format!(
            "\n#{} {}  {}\n",
            group.revision_id,
            group.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            group.summary
        ));
        for item in &group.changes {
            match item.kind {
                ChangeKind::Structured => {
                    let old = format_value(&item.old_value, &item.path, &options);
                    let new = format_value(&item.new_value, &item.path, &options);
                    out.push_str(&format!("  {}: {} -> {}\n", item.label, old, new));
                }
                ChangeKind::Opaque => {
                    out.push_str(&format!(
                        "  {}: {} -> {}\n",
                        item.label,
                        item.old_value.as_str().unwrap_or_default(),
                        item.new_value.as_str().unwrap_or_default()
                    ));
                }
                ChangeKind::Empty => {}
            }
        }
    }
    out
}
