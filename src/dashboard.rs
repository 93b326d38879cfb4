//! 対話式ダッシュボード
//!
//! 1画面ずつ表を描画し、1行コマンドで状態を変える。

use crate::controller::ViewController;
use crate::error::{LeadAiError, Result};
use crate::gateway::Gateway;
use crate::render::{print_notices, render_dashboard, render_lead};
use crate::service::LeadService;
use crate::store::Storage;
use dialoguer::{Confirm, Input};
use lead_ai_common::{SortField, VerificationStatus};

/// 対話アクション
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    /// 次のページ
    Next,
    /// 前のページ
    Prev,
    /// ソート項目の切り替え
    Sort(SortField),
    /// フィルタを既定に戻す
    ResetFilters,
    /// 詳細表示
    Show(String),
    /// 検証済みにする
    Verify(String),
    /// 要確認にする
    Flag(String),
    /// 削除（確認あり）
    Delete(String),
    /// CRM同期
    Sync(String),
    /// 終了
    Quit,
    /// 不明な入力
    Unknown(String),
}

const HELP: &str =
    "操作: [n]次 [p]前 [s <項目>]ソート [r]フィルタ解除 [i <id>]詳細 [v <id>]検証 [f <id>]要確認 [d <id>]削除 [c <id>]CRM同期 [q]終了";

/// 1行の入力をアクションに変換
pub fn parse_action(input: &str) -> DashboardAction {
    let trimmed = input.trim();
    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (trimmed, ""),
    };

    match (command, arg) {
        ("" | "n", "") => DashboardAction::Next,
        ("p", "") => DashboardAction::Prev,
        ("r", "") => DashboardAction::ResetFilters,
        ("q" | "Q", "") => DashboardAction::Quit,
        ("s", field) if !field.is_empty() => match field.parse::<SortField>() {
            Ok(field) => DashboardAction::Sort(field),
            Err(_) => DashboardAction::Unknown(trimmed.to_string()),
        },
        ("i", id) if !id.is_empty() => DashboardAction::Show(id.to_string()),
        ("v", id) if !id.is_empty() => DashboardAction::Verify(id.to_string()),
        ("f", id) if !id.is_empty() => DashboardAction::Flag(id.to_string()),
        ("d", id) if !id.is_empty() => DashboardAction::Delete(id.to_string()),
        ("c", id) if !id.is_empty() => DashboardAction::Sync(id.to_string()),
        _ => DashboardAction::Unknown(trimmed.to_string()),
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| LeadAiError::Prompt(e.to_string()))
}

/// 削除確認
pub fn confirm_delete(company: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("\"{}\" を削除しますか？", company))
        .default(false)
        .interact()
        .map_err(|e| LeadAiError::Prompt(e.to_string()))
}

fn lead_exists<S: Storage>(controller: &ViewController<S>, id: &str) -> bool {
    if controller.get(id).is_some() {
        return true;
    }
    println!("  → リードが見つかりません: {}", id);
    false
}

/// 対話ループ
pub async fn run_dashboard<G: Gateway, S: Storage>(service: &mut LeadService<G, S>) -> Result<()> {
    service.controller_mut().set_dashboard_active(true);
    println!("{}\n", HELP);

    loop {
        let view = service.controller_mut().view();
        println!("{}\n", render_dashboard(&view));

        let input = prompt_line("コマンド")?;
        match parse_action(&input) {
            DashboardAction::Next => service.controller_mut().change_page(1),
            DashboardAction::Prev => service.controller_mut().change_page(-1),
            DashboardAction::Sort(field) => service.controller_mut().change_sort(field),
            DashboardAction::ResetFilters => service.controller_mut().reset_filters(),
            DashboardAction::Show(id) => match service.controller().get(&id) {
                Some(lead) => println!("{}\n", render_lead(lead)),
                None => println!("  → リードが見つかりません: {}\n", id),
            },
            DashboardAction::Verify(id) | DashboardAction::Flag(id)
                if !lead_exists(service.controller(), &id) => {}
            DashboardAction::Verify(id) => {
                let notes = prompt_line("検証メモ")?;
                service.verify_lead(&id, VerificationStatus::Verified, &notes).await?;
            }
            DashboardAction::Flag(id) => {
                let notes = prompt_line("検証メモ")?;
                service.verify_lead(&id, VerificationStatus::Flagged, &notes).await?;
            }
            DashboardAction::Delete(id) => {
                let company = service.controller().get(&id).map(|l| l.company_name.clone());
                match company {
                    Some(company) => {
                        let confirmed = confirm_delete(&company)?;
                        service.controller_mut().delete_lead(&id, |_| confirmed)?;
                    }
                    None => println!("  → リードが見つかりません: {}", id),
                }
            }
            DashboardAction::Sync(id) => match service.sync_to_crm(&[id]).await {
                // 該当なしは通知済み
                Ok(_) | Err(LeadAiError::NoLeadsSelected) => {}
                Err(e) => return Err(e),
            },
            DashboardAction::Quit => break,
            DashboardAction::Unknown(input) => {
                println!("  → 不明なコマンド: {}", input);
                println!("{}", HELP);
            }
        }
        print_notices(&service.take_notices());
    }

    service.controller_mut().set_dashboard_active(false);
    Ok(())
}
