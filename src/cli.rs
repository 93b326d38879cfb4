use crate::error::{LeadAiError, Result};
use crate::export::ExportFormat;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lead_ai_common::{
    CompanySize, CustomDateRange, DateAddedMode, FilterSpec, LeadTier, SortDirection, SortField,
    SortSpec, VerificationStatus,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lead-ai")]
#[command(about = "Webサイト解析によるリード収集・管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Webサイトを解析
    Analyze {
        /// 解析するURL（スキーム省略時は https://）
        #[arg(required = true)]
        url: String,

        /// 解析後にリードとして保存
        #[arg(long)]
        save: bool,

        /// 検証待ちとして保存
        #[arg(long)]
        verify: bool,

        /// CRMへ自動同期
        #[arg(long)]
        auto_sync: bool,

        /// 解析結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 直近の解析結果をリードとして保存
    Save,

    /// 直近の解析結果をサーバーでレポート化
    Report {
        /// 形式 (csv/json)
        #[arg(short, long, default_value = "csv")]
        format: ReportFormat,

        /// 出力ファイル（省略時は lead_data.csv / lead_analysis.json）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 保存済みリードの一覧
    Leads {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        sort: SortArgs,

        /// ページ番号（1始まり）
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// 一覧をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// リードの詳細
    Show {
        #[arg(required = true)]
        id: String,
    },

    /// 対話式ダッシュボード
    Dashboard,

    /// リードを検証済みにする
    Verify {
        #[arg(required = true)]
        id: String,

        /// 検証メモ
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// リードに要確認フラグを付ける
    Flag {
        #[arg(required = true)]
        id: String,

        /// 検証メモ
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// リードを破棄
    Discard {
        #[arg(required = true)]
        id: String,
    },

    /// リードを削除（確認あり）
    Delete {
        #[arg(required = true)]
        id: String,

        /// 確認を省略
        #[arg(short, long)]
        yes: bool,
    },

    /// CRMへ同期
    Sync {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// サーバーのリードを取り込む
    Pull,

    /// リードをファイルに出力
    Export {
        /// 出力形式 (csv/json/excel/pdf)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力項目（例: company.name,contact）。省略時は全項目
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        /// ファイル名（拡張子なし）
        #[arg(short, long, default_value = "leads")]
        title: String,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// リードをメールで送信
    Email {
        /// 送信先
        #[arg(long)]
        to: String,

        /// 件名
        #[arg(long, default_value = "Lead export")]
        subject: String,

        /// 本文
        #[arg(long, default_value = "")]
        message: String,

        /// 添付形式 (csv/json/excel/pdf)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// 出力項目
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// CRM設定を表示/編集
    Crm {
        /// プロバイダ（salesforce/hubspot/...）
        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        api_secret: Option<String>,

        #[arg(long)]
        api_url: Option<String>,

        /// 保存時の自動同期 (on/off)
        #[arg(long)]
        auto_sync: Option<Toggle>,

        /// 更新の同期 (on/off)
        #[arg(long)]
        sync_updates: Option<Toggle>,

        /// 双方向同期 (on/off)
        #[arg(long)]
        bi_directional: Option<Toggle>,

        /// 同期頻度（realtime/hourly/daily）
        #[arg(long)]
        sync_frequency: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// CRM接続テスト
    TestCrm,

    /// 設定を表示/編集
    Config {
        /// バックエンドURLを設定
        #[arg(long)]
        set_backend_url: Option<String>,

        /// 擬似バックエンドの切り替え (on/off)
        #[arg(long)]
        simulate: Option<Toggle>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(&self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
}

/// 対象リードの指定
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// リードID（カンマ区切り）
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// 現在のフィルタ・ソート結果をすべて対象にする
    #[arg(long)]
    pub all_filtered: bool,
}

/// 絞り込み条件（省略した項目は全件通過）
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// ティア（Hot,Warm,Nurture）
    #[arg(long, value_delimiter = ',', value_parser = parse_tier)]
    pub tier: Vec<LeadTier>,

    /// AIスコアの下限
    #[arg(long)]
    pub min_score: Option<f64>,

    /// AIスコアの上限
    #[arg(long)]
    pub max_score: Option<f64>,

    /// 技術カテゴリ（ai_ml,data,cloud,integration,...）
    #[arg(long, value_delimiter = ',')]
    pub tech: Vec<String>,

    /// 企業規模（small,medium,large,enterprise,unknown）
    #[arg(long, value_delimiter = ',', value_parser = parse_size)]
    pub size: Vec<CompanySize>,

    /// 検証ステータス（verified,pending,flagged）
    #[arg(long, value_delimiter = ',', value_parser = parse_status)]
    pub status: Vec<VerificationStatus>,

    /// 登録日（all/today/week/month/custom）
    #[arg(long)]
    pub added: Option<String>,

    /// カスタム期間の開始日（YYYY-MM-DD）
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// カスタム期間の終了日（YYYY-MM-DD）
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

impl FilterArgs {
    /// 条件が1つも指定されていない
    pub fn is_empty(&self) -> bool {
        self.tier.is_empty()
            && self.min_score.is_none()
            && self.max_score.is_none()
            && self.tech.is_empty()
            && self.size.is_empty()
            && self.status.is_empty()
            && self.added.is_none()
            && self.since.is_none()
            && self.until.is_none()
    }

    pub fn to_spec(&self) -> Result<FilterSpec> {
        let mut spec = FilterSpec::default();
        if !self.tier.is_empty() {
            spec.lead_tier = self.tier.clone();
        }
        spec.ai_score = (
            self.min_score.unwrap_or(spec.ai_score.0),
            self.max_score.unwrap_or(spec.ai_score.1),
        );
        if !self.tech.is_empty() {
            spec.tech_focus = self.tech.clone();
        }
        if !self.size.is_empty() {
            spec.company_size = self.size.clone();
        }
        if !self.status.is_empty() {
            spec.verification_status = self.status.clone();
        }
        spec.date_added = match &self.added {
            Some(mode) => mode.parse().map_err(LeadAiError::InvalidDateMode)?,
            // 期間だけ指定された場合はカスタム扱い
            None if self.since.is_some() || self.until.is_some() => DateAddedMode::Custom,
            None => DateAddedMode::All,
        };
        spec.custom_date_range = CustomDateRange {
            from: self.since,
            to: self.until,
        };
        Ok(spec)
    }
}

/// ソート条件
#[derive(Args, Debug, Clone, Default)]
pub struct SortArgs {
    /// ソート項目（company/score/lead-score/tier/verification/crm/investment/date-added）
    #[arg(long)]
    pub sort: Option<String>,

    /// 昇順
    #[arg(long)]
    pub asc: bool,
}

impl SortArgs {
    pub fn to_spec(&self) -> Result<SortSpec> {
        let mut spec = SortSpec::default();
        if let Some(field) = &self.sort {
            spec.field = field.parse::<SortField>().map_err(LeadAiError::InvalidSortField)?;
        }
        if self.asc {
            spec.direction = SortDirection::Asc;
        }
        Ok(spec)
    }
}

fn parse_tier(s: &str) -> std::result::Result<LeadTier, String> {
    LeadTier::ALL
        .into_iter()
        .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("Unknown tier: {}. Use hot, warm, or nurture", s))
}

fn parse_status(s: &str) -> std::result::Result<VerificationStatus, String> {
    VerificationStatus::ALL
        .into_iter()
        .find(|v| v.label().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("Unknown status: {}. Use verified, pending, or flagged", s))
}

fn parse_size(s: &str) -> std::result::Result<CompanySize, String> {
    match s.trim().to_lowercase().as_str() {
        "small" => Ok(CompanySize::Small),
        "medium" => Ok(CompanySize::Medium),
        "large" => Ok(CompanySize::Large),
        "enterprise" => Ok(CompanySize::Enterprise),
        "unknown" => Ok(CompanySize::Unknown),
        _ => Err(format!(
            "Unknown size: {}. Use small, medium, large, enterprise, or unknown",
            s
        )),
    }
}
