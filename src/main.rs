// ==========================================
// 生产监控驾驶舱 - 命令行主入口
// ==========================================
// 子命令: init / report / kpi / export / add-record / update-record /
//         history / machines / set-machine / config
// ==========================================

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use production_kpi::app::{get_default_db_path, AppState, DB_PATH_ENV};
use production_kpi::db::read_schema_version;
use production_kpi::domain::{Machine, ProductionRecord, SessionContext, ShiftReport};
use production_kpi::domain::types::{MachineStatus, Shift, UserRole, ViewMode};
use production_kpi::engine::KpiFormatter;
use production_kpi::{logging, KpiSummary};

/// 生产 KPI 聚合与报表工具
#[derive(Parser)]
#[command(name = "production-kpi", version, about)]
struct Cli {
    /// 数据库文件路径（默认位于用户数据目录）
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<String>,

    /// 以 JSON 输出结果
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 初始化数据库结构
    Init,

    /// 班次报表（周 / 月 / 年）
    Report {
        #[arg(long, value_parser = parse_view_mode, default_value = "week")]
        view: ViewMode,

        /// 参考日（默认今天）
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// 滚动窗口 KPI
    Kpi {
        /// 截止日（默认今天）
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// 导出原始记录为 CSV
    Export {
        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        to: NaiveDate,

        /// 输出路径（默认当前目录下的标准文件名）
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// 录入生产记录
    AddRecord {
        #[command(flatten)]
        record: RecordArgs,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// 修改生产记录
    UpdateRecord {
        #[arg(long)]
        id: String,

        #[command(flatten)]
        record: RecordArgs,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// 变更历史（分页）
    History {
        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        to: NaiveDate,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// 设备列表
    Machines,

    /// 新增或修改设备
    SetMachine {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = parse_machine_status)]
        status: MachineStatus,

        #[arg(long)]
        reason: Option<String>,
    },

    /// 查看或修改配置
    Config {
        /// KEY=VALUE
        #[arg(long)]
        set: Option<String>,
    },
}

#[derive(clap::Args)]
struct RecordArgs {
    #[arg(long)]
    date: NaiveDate,

    #[arg(long, value_parser = parse_shift)]
    shift: Shift,

    #[arg(long)]
    planned: u32,

    #[arg(long)]
    actual: u32,

    #[arg(long)]
    product_type: String,

    #[arg(long)]
    line: Option<String>,
}

impl RecordArgs {
    fn into_record(self) -> ProductionRecord {
        let record = ProductionRecord::new(
            self.date,
            self.shift,
            self.planned,
            self.actual,
            self.product_type,
        );
        match self.line {
            Some(line) => record.with_line(line),
            None => record,
        }
    }
}

#[derive(clap::Args)]
struct SessionArgs {
    /// 当前用户ID
    #[arg(long)]
    user: String,

    #[arg(long, value_parser = parse_role, default_value = "worker")]
    role: UserRole,
}

impl SessionArgs {
    fn into_session(self) -> SessionContext {
        SessionContext::new(self.user.clone(), self.user, self.role)
    }
}

fn parse_view_mode(s: &str) -> Result<ViewMode, String> {
    ViewMode::from_str(s).ok_or_else(|| format!("未知视图: {} (week|month|year)", s))
}

fn parse_shift(s: &str) -> Result<Shift, String> {
    Shift::from_str(s).ok_or_else(|| format!("未知班次: {} (morning|afternoon|night)", s))
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    UserRole::from_str(s).ok_or_else(|| format!("未知角色: {} (admin|foreman|worker)", s))
}

fn parse_machine_status(s: &str) -> Result<MachineStatus, String> {
    MachineStatus::from_str(s).ok_or_else(|| format!("未知设备状态: {} (working|service|failure)", s))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::debug!(db_path = %db_path, version = production_kpi::VERSION, "启动");

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let api = state.kpi_api.clone();
    let formatter = *api.formatter();

    match cli.command {
        Command::Init => {
            let version = {
                let conn = production_kpi::db::open_sqlite_connection(&state.db_path)?;
                read_schema_version(&conn)?
            };
            println!("{}: {}", state.db_path, version.unwrap_or_default());
        }

        Command::Report { view, date } => {
            let outcome = api.load_report_or_empty(view, date.unwrap_or_else(today)).await?;
            if let Some(report) = outcome.report() {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(report)?);
                } else {
                    print_report(&formatter, report);
                }
            }
        }

        Command::Kpi { date } => {
            let summary = api.rolling_kpi_summary(date.unwrap_or_else(today)).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&formatter, &summary);
            }
        }

        Command::Export { from, to, out } => {
            let file = api.export_csv(from, to).await?;
            let path = out.unwrap_or_else(|| PathBuf::from(&file.filename));
            std::fs::write(&path, &file.bytes)
                .with_context(|| format!("写入导出文件失败: {}", path.display()))?;
            println!("{} ({} bytes)", path.display(), file.bytes.len());
        }

        Command::AddRecord { record, session } => {
            let stored = api
                .insert_record(&session.into_session(), record.into_record())
                .await?;
            println!("{}", stored.id.unwrap_or_default());
        }

        Command::UpdateRecord { id, record, session } => {
            api.update_record(&session.into_session(), &id, record.into_record())
                .await?;
            println!("{}", id);
        }

        Command::History { from, to, page } => {
            let history = api.list_history(from, to, page).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                for entry in &history.entries {
                    println!(
                        "{}  {:<6}  {}  {}",
                        entry.created_at,
                        entry.action,
                        entry.user_id.as_deref().unwrap_or("-"),
                        entry.production_data_id
                    );
                }
                println!("{}/{} ({})", history.page, history.total_pages(), history.total_count);
            }
        }

        Command::Machines => {
            let machines = state.machine_repo.find_all()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&machines)?);
            } else {
                for machine in &machines {
                    println!(
                        "{:<12} {:<24} {:<8} {}",
                        machine.id,
                        machine.name,
                        machine.status,
                        machine.failure_reason.as_deref().unwrap_or("")
                    );
                }
            }
        }

        Command::SetMachine { id, name, status, reason } => {
            match name {
                Some(name) => {
                    let mut machine = Machine::new(id, name, status);
                    if status == MachineStatus::Failure {
                        machine.failure_reason = reason;
                    }
                    state.machine_repo.upsert(&machine)?;
                }
                None => state.machine_repo.update_status(&id, status, reason.as_deref())?,
            }
        }

        Command::Config { set } => {
            if let Some(pair) = set {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("配置格式应为 KEY=VALUE: {}", pair))?;
                state.config.set_global_config_value(key.trim(), value.trim())?;
            }
            let settings = state.config.load_settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

fn print_report(formatter: &KpiFormatter, report: &ShiftReport) {
    println!("{}", report.period_label);
    if let Some(error) = &report.fetch_error {
        println!("! {}", error);
    }

    let shifts: Vec<String> = Shift::ALL.iter().map(|s| formatter.shift_name(*s)).collect();
    println!("{:<12} {:>18} {:>18} {:>18}", "", shifts[0], shifts[1], shifts[2]);
    for bucket in &report.buckets {
        let cells: Vec<String> = Shift::ALL
            .iter()
            .map(|shift| {
                let totals = bucket.totals(*shift);
                format!("{}/{}", totals.actual, totals.planned)
            })
            .collect();
        println!(
            "{:<12} {:>18} {:>18} {:>18}",
            bucket.display_label, cells[0], cells[1], cells[2]
        );
    }

    print_summary(formatter, &report.summary);
    if !report.skipped_records.is_empty() {
        println!("skipped: {}", report.skipped_records.len());
    }
}

fn print_summary(formatter: &KpiFormatter, summary: &KpiSummary) {
    println!(
        "planned {}  actual {}  efficiency {}  utilization {}",
        formatter.format_number(summary.total_planned as f64, 0),
        formatter.format_number(summary.total_actual as f64, 0),
        formatter.format_percent(summary.efficiency_percent),
        formatter.format_percent(summary.machine_utilization_percent),
    );
}
