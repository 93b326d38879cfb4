use clap::Parser;
use lead_ai_rust::{cli, config, controller, dashboard, error, export, gateway, render, service, store};
use cli::{Cli, Commands, FilterArgs, ReportFormat, SelectionArgs, SortArgs};
use config::Config;
use controller::ViewController;
use error::{LeadAiError, Result};
use gateway::{BackendGateway, ServerExport};
use lead_ai_common::export::FieldSelection;
use lead_ai_common::{Lead, VerificationStatus};
use render::{print_notices, render_dashboard, render_lead, render_report, spinner};
use service::{AnalyzeOptions, EmailExport, LastAnalysis, LeadService};
use store::{FileStorage, LeadStore, SettingsStore, Storage, LAST_ANALYSIS_KEY};
use tracing_subscriber::EnvFilter;

type Service = LeadService<BackendGateway, FileStorage>;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_service(config: &Config) -> Result<(Service, FileStorage)> {
    let storage = FileStorage::new(config.data_dir()?);
    let controller = ViewController::new(LeadStore::new(storage.clone()), config.items_per_page);
    let settings = SettingsStore::new(storage.clone());
    let gateway = BackendGateway::from_config(config)?;
    Ok((LeadService::new(gateway, controller, settings), storage))
}

/// 前回の `analyze` の結果を読み戻す
fn restore_last_analysis(service: &mut Service, storage: &FileStorage) -> Result<()> {
    if let Some(raw) = storage.get(LAST_ANALYSIS_KEY)? {
        let last: LastAnalysis = serde_json::from_str(&raw)?;
        service.set_last_analysis(last.url, last.report);
    }
    Ok(())
}

/// フィルタ・ソートを適用
fn apply_view(service: &mut Service, filter: &FilterArgs, sort: &SortArgs) -> Result<()> {
    let filter = filter.to_spec()?;
    let sort = sort.to_spec()?;
    let controller = service.controller_mut();
    controller.apply_filters(filter);
    controller.set_sort(sort);
    Ok(())
}

/// 対象リードを決める（未指定なら `fallback_to_filtered` に従う）
fn select_targets(
    service: &mut Service,
    selection: &SelectionArgs,
    filter: &FilterArgs,
    sort: &SortArgs,
    fallback_to_filtered: bool,
) -> Result<Vec<Lead>> {
    if !selection.ids.is_empty() && !selection.all_filtered {
        return Ok(service.controller().select(&selection.ids));
    }
    if selection.all_filtered || fallback_to_filtered {
        apply_view(service, filter, sort)?;
        return Ok(service.controller_mut().visible().to_vec());
    }
    Ok(Vec::new())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = Config::load()?;

    if let Commands::Config { set_backend_url, simulate, show } = &cli.command {
        if let Some(url) = set_backend_url {
            config.set_backend_url(url.clone())?;
            println!("✔ バックエンドURLを設定しました: {}", config.backend_url);
        }
        if let Some(toggle) = simulate {
            config.set_simulate(toggle.is_on())?;
            println!("✔ 擬似バックエンド: {}", if toggle.is_on() { "有効" } else { "無効" });
        }
        if *show {
            println!("設定:");
            println!("  バックエンドURL: {}", config.backend_url);
            println!("  タイムアウト: {}秒", config.timeout_seconds);
            println!("  1ページの件数: {}", config.items_per_page);
            println!("  データ保存先: {}", config.data_dir()?.display());
            println!("  擬似バックエンド: {}", if config.simulate_backend { "有効" } else { "無効" });
        }
        return Ok(());
    }

    let (mut service, storage) = open_service(&config)?;

    match cli.command {
        Commands::Analyze { url, save, verify, auto_sync, json } => {
            let bar = spinner(&format!("{} を解析中...", url.trim()));
            let result = service
                .analyze(&url, AnalyzeOptions { save, verify, auto_sync })
                .await;
            bar.finish_and_clear();
            print_notices(&service.take_notices());
            let report = result?;

            if let Some(last) = service.last_analysis() {
                storage.set(LAST_ANALYSIS_KEY, &serde_json::to_string(last)?)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("\n{}", render_report(&last.url, &report));
                }
            }
        }

        Commands::Save => {
            restore_last_analysis(&mut service, &storage)?;
            let saved = service.save_last_analysis().await;
            print_notices(&service.take_notices());
            if let Some(id) = saved? {
                println!("✔ リードを保存しました: {}", id);
            }
        }

        Commands::Report { format, output } => {
            restore_last_analysis(&mut service, &storage)?;
            let kind = match format {
                ReportFormat::Csv => ServerExport::Csv,
                ReportFormat::Json => ServerExport::Json,
            };
            let result = service.export_last_analysis(kind, output.as_deref()).await;
            print_notices(&service.take_notices());
            result?;
        }

        Commands::Leads { filter, sort, page, json } => {
            apply_view(&mut service, &filter, &sort)?;
            let controller = service.controller_mut();
            controller.go_to_page(page);
            if json {
                println!("{}", serde_json::to_string_pretty(controller.current_page())?);
            } else {
                println!("{}", render_dashboard(&controller.view()));
            }
        }

        Commands::Show { id } => match service.controller().get(&id) {
            Some(lead) => println!("{}", render_lead(lead)),
            None => return Err(LeadAiError::LeadNotFound(id)),
        },

        Commands::Dashboard => {
            dashboard::run_dashboard(&mut service).await?;
        }

        Commands::Verify { id, notes } => {
            let found = service.verify_lead(&id, VerificationStatus::Verified, &notes).await?;
            print_notices(&service.take_notices());
            if !found {
                return Err(LeadAiError::LeadNotFound(id));
            }
        }

        Commands::Flag { id, notes } => {
            let found = service.verify_lead(&id, VerificationStatus::Flagged, &notes).await?;
            print_notices(&service.take_notices());
            if !found {
                return Err(LeadAiError::LeadNotFound(id));
            }
        }

        Commands::Discard { id } => {
            if !service.controller_mut().discard_lead(&id)? {
                return Err(LeadAiError::LeadNotFound(id));
            }
            println!("✔ リードを破棄しました: {}", id);
        }

        Commands::Delete { id, yes } => {
            let Some(company) = service.controller().get(&id).map(|l| l.company_name.clone()) else {
                return Err(LeadAiError::LeadNotFound(id));
            };
            let confirmed = yes || dashboard::confirm_delete(&company)?;
            if service.controller_mut().delete_lead(&id, |_| confirmed)? {
                println!("✔ リードを削除しました: {}", id);
            } else {
                println!("削除をキャンセルしました");
            }
        }

        Commands::Sync { selection, filter, sort } => {
            let targets = select_targets(&mut service, &selection, &filter, &sort, false)?;
            let ids: Vec<String> = targets.into_iter().map(|l| l.id).collect();

            let bar = spinner(&format!("{}件をCRMに同期中...", ids.len()));
            let result = service.sync_to_crm(&ids).await;
            bar.finish_and_clear();
            print_notices(&service.take_notices());
            let synced = result?;
            println!("✔ 同期済み: {}/{}件", synced, ids.len());
        }

        Commands::Pull => {
            let result = service.pull_leads().await;
            print_notices(&service.take_notices());
            result?;
        }

        Commands::Export { format, output, fields, title, selection, filter, sort } => {
            let leads = select_targets(&mut service, &selection, &filter, &sort, true)?;
            if leads.is_empty() {
                return Err(LeadAiError::NoLeadsSelected);
            }
            let fields = if fields.is_empty() {
                FieldSelection::all()
            } else {
                FieldSelection::from_keys(&fields)?
            };
            let output = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            let path = export::export_leads(&leads, format, &fields, &output, &title)?;
            println!("✔ {}件を出力しました: {}", leads.len(), path.display());
        }

        Commands::Email { to, subject, message, format, fields, selection, filter, sort } => {
            let leads = select_targets(&mut service, &selection, &filter, &sort, false)?;
            if !fields.is_empty() {
                // 不明な項目名はここで弾く
                FieldSelection::from_keys(&fields)?;
            }
            let email = EmailExport {
                recipient: to,
                subject,
                message,
                format,
                field_selection: fields,
            };
            let result = service.email_export(email, leads).await;
            print_notices(&service.take_notices());
            result?;
        }

        Commands::Crm {
            provider,
            api_key,
            api_secret,
            api_url,
            auto_sync,
            sync_updates,
            bi_directional,
            sync_frequency,
            show,
        } => {
            let mut settings = service.crm_settings();
            let before = settings.clone();
            if let Some(v) = provider {
                settings.provider = v;
            }
            if let Some(v) = api_key {
                settings.api_key = v;
            }
            if let Some(v) = api_secret {
                settings.api_secret = v;
            }
            if let Some(v) = api_url {
                settings.api_url = v;
            }
            if let Some(v) = auto_sync {
                settings.auto_sync = v.is_on();
            }
            if let Some(v) = sync_updates {
                settings.sync_updates = v.is_on();
            }
            if let Some(v) = bi_directional {
                settings.bi_directional = v.is_on();
            }
            if let Some(v) = sync_frequency {
                settings.sync_frequency = v;
            }
            if settings != before {
                service.update_crm_settings(&settings)?;
                print_notices(&service.take_notices());
            }
            if show {
                println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
            }
        }

        Commands::TestCrm => {
            let bar = spinner("CRMに接続中...");
            let result = service.test_crm_connection().await;
            bar.finish_and_clear();
            print_notices(&service.take_notices());
            result?;
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}
