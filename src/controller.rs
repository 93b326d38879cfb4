//! ダッシュボードの状態管理
//!
//! リード一覧・フィルタ・ソート・ページを1つの状態として持ち、
//! 状態が変わるたびに フィルタ → ソート → ページ分割 を計算し直す。
//! 一覧を変更する操作は、そのたびに一覧全体を保存先へ書き戻す。
//!
//! IDが見つからない操作は何もせず `false` / `None` を返す。

use crate::error::Result;
use crate::gateway::CrmSyncResult;
use crate::store::{LeadStore, Storage};
use chrono::{DateTime, Utc};
use lead_ai_common::paginate::{clamp_page, paginate, PageInfo};
use lead_ai_common::{
    filter_leads, sort_leads, CrmState, CrmStatus, FilterSpec, Lead, LeadRow, RemoteSync,
    SortDirection, SortField, SortSpec, Verification, VerificationStatus,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// 表示条件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    /// 1始まり
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: FilterSpec::default(),
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

/// 描画用の1画面分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub rows: Vec<LeadRow>,
    pub page_info: PageInfo,
    pub sort: SortSpec,
    /// フィルタ前の件数
    pub total_saved: usize,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct ViewController<S: Storage> {
    store: LeadStore<S>,
    leads: Vec<Lead>,
    state: ViewState,
    /// フィルタ・ソート済み
    visible: Vec<Lead>,
    items_per_page: usize,
    dashboard_active: bool,
    stale: bool,
}

impl<S: Storage> ViewController<S> {
    /// 保存先から一覧を読み込んで初期化
    pub fn new(store: LeadStore<S>, items_per_page: usize) -> Self {
        let leads = store.load();
        let mut controller = Self {
            store,
            leads,
            state: ViewState::default(),
            visible: Vec::new(),
            items_per_page: items_per_page.max(1),
            dashboard_active: false,
            stale: true,
        };
        controller.refresh();
        controller
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn store(&self) -> &LeadStore<S> {
        &self.store
    }

    pub fn get(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    /// フィルタ・ソート済みの全件
    pub fn visible(&mut self) -> &[Lead] {
        self.ensure_fresh();
        &self.visible
    }

    pub fn is_dashboard_active(&self) -> bool {
        self.dashboard_active
    }

    /// ダッシュボード表示の切り替え（表示時は再計算）
    pub fn set_dashboard_active(&mut self, active: bool) {
        self.dashboard_active = active;
        if active {
            self.refresh();
        }
    }

    // ---- 表示条件 ----

    pub fn apply_filters(&mut self, filter: FilterSpec) {
        self.state.filter = filter;
        self.state.page = 1;
        self.refresh();
    }

    pub fn reset_filters(&mut self) {
        self.apply_filters(FilterSpec::default());
    }

    /// 同じ項目なら昇降を反転、違う項目なら降順で切り替え
    pub fn change_sort(&mut self, field: SortField) {
        if self.state.sort.field == field {
            self.state.sort.direction = self.state.sort.direction.toggled();
        } else {
            self.state.sort = SortSpec {
                field,
                direction: SortDirection::Desc,
            };
        }
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.state.sort = sort;
        self.refresh();
    }

    /// ページ移動（範囲内に収める）。並びは再計算しない
    pub fn change_page(&mut self, delta: isize) {
        self.ensure_fresh();
        self.state.page = clamp_page(self.state.page, delta, self.total_pages());
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.ensure_fresh();
        self.state.page = clamp_page(page.max(1), 0, self.total_pages());
    }

    pub fn total_pages(&self) -> usize {
        lead_ai_common::total_pages(self.visible.len(), self.items_per_page)
    }

    /// 現在ページのリード
    pub fn current_page(&mut self) -> &[Lead] {
        self.ensure_fresh();
        paginate(&self.visible, self.state.page, self.items_per_page)
    }

    pub fn view(&mut self) -> DashboardView {
        self.ensure_fresh();
        let rows = paginate(&self.visible, self.state.page, self.items_per_page)
            .iter()
            .map(LeadRow::from_lead)
            .collect();
        DashboardView {
            rows,
            page_info: PageInfo::new(self.state.page, self.visible.len(), self.items_per_page),
            sort: self.state.sort,
            total_saved: self.leads.len(),
        }
    }

    // ---- 一覧の変更 ----

    /// リードを追加して保存。IDが重複する場合は `_<n>` を付ける
    pub fn save_lead(&mut self, mut lead: Lead) -> Result<String> {
        lead.id = self.unique_id(&lead.id);
        let id = lead.id.clone();
        self.leads.push(lead);
        self.persist()?;
        debug!(id = %id, "リードを追加しました");
        Ok(id)
    }

    /// 検証ステータスを更新
    pub fn verify_lead(
        &mut self,
        id: &str,
        status: VerificationStatus,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.set_verification(id, Verification::new(status, now, notes))
    }

    /// 検証レコードを丸ごと置き換え
    pub fn set_verification(&mut self, id: &str, verification: Verification) -> Result<bool> {
        self.update(id, |lead| lead.verification = Some(verification))
    }

    pub fn discard_lead(&mut self, id: &str) -> Result<bool> {
        let before = self.leads.len();
        self.leads.retain(|l| l.id != id);
        if self.leads.len() == before {
            return Ok(false);
        }
        self.persist()?;
        debug!(id, "リードを削除しました");
        Ok(true)
    }

    /// 確認が取れた場合のみ削除
    pub fn delete_lead<F>(&mut self, id: &str, confirm: F) -> Result<bool>
    where
        F: FnOnce(&Lead) -> bool,
    {
        let Some(lead) = self.get(id) else {
            return Ok(false);
        };
        if !confirm(lead) {
            debug!(id, "削除はキャンセルされました");
            return Ok(false);
        }
        self.discard_lead(id)
    }

    pub fn set_crm(&mut self, id: &str, crm: CrmState) -> Result<bool> {
        self.update(id, |lead| lead.crm = Some(crm))
    }

    /// 同期待ちにする。該当した件数を返す
    pub fn mark_crm_queued(&mut self, ids: &[String], now: DateTime<Utc>) -> Result<usize> {
        self.update_many(ids, |lead| {
            lead.crm = Some(CrmState::with_status(CrmStatus::Queued, now));
        })
    }

    /// 全件を同期済みにする（擬似同期用）
    pub fn mark_crm_synced(&mut self, ids: &[String], now: DateTime<Utc>) -> Result<usize> {
        self.update_many(ids, |lead| {
            lead.crm = Some(CrmState::with_status(CrmStatus::Synced, now));
        })
    }

    /// サーバーの同期結果を反映（成功 → Synced、それ以外 → Failed）
    pub fn apply_crm_results(&mut self, results: &[CrmSyncResult], now: DateTime<Utc>) -> Result<usize> {
        let mut applied = 0;
        for result in results {
            let Some(lead) = self.leads.iter_mut().find(|l| l.id == result.id) else {
                continue;
            };
            let mut crm = if result.is_success() {
                CrmState::with_status(CrmStatus::Synced, now)
            } else {
                CrmState::with_status(CrmStatus::Failed, now)
            };
            if result.is_success() {
                crm.crm_id = result.crm_id.clone();
            } else {
                crm.error = result.message.clone();
            }
            lead.crm = Some(crm);
            applied += 1;
        }
        if applied > 0 {
            self.persist()?;
        }
        Ok(applied)
    }

    /// `/save-lead` の結果を記録
    pub fn set_remote_sync(&mut self, id: &str, outcome: RemoteSync) -> Result<bool> {
        self.update(id, |lead| lead.remote_sync = outcome)
    }

    /// `/verify-lead` の結果を記録
    pub fn set_verification_remote_sync(&mut self, id: &str, outcome: RemoteSync) -> Result<bool> {
        let Some(lead) = self.leads.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        let Some(verification) = lead.verification.as_mut() else {
            return Ok(false);
        };
        verification.remote_sync = outcome;
        self.persist()?;
        Ok(true)
    }

    /// サーバーの一覧をIDで統合（サーバー優先）
    ///
    /// 既存のリードは位置を保ったまま置き換え、新しいリードは末尾に追加する。
    /// 追加・更新した件数を返す。
    pub fn merge_server_leads(&mut self, server_leads: Vec<Lead>) -> Result<usize> {
        let index: HashMap<String, usize> = self
            .leads
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id.clone(), i))
            .collect();

        let mut appended: HashMap<String, usize> = HashMap::new();
        let mut merged = 0;
        for lead in server_leads {
            if let Some(&i) = index.get(&lead.id) {
                self.leads[i] = lead;
            } else if let Some(&i) = appended.get(&lead.id) {
                self.leads[i] = lead;
            } else {
                appended.insert(lead.id.clone(), self.leads.len());
                self.leads.push(lead);
            }
            merged += 1;
        }

        if merged > 0 {
            self.persist()?;
        }
        Ok(merged)
    }

    /// 指定IDのリード（指定順、存在しないIDは無視）
    pub fn select(&self, ids: &[String]) -> Vec<Lead> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }

    // ---- 内部 ----

    fn unique_id(&self, base: &str) -> String {
        if self.get(base).is_none() {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    fn update<F>(&mut self, id: &str, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut Lead),
    {
        let Some(lead) = self.leads.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        apply(lead);
        self.persist()?;
        Ok(true)
    }

    fn update_many<F>(&mut self, ids: &[String], mut apply: F) -> Result<usize>
    where
        F: FnMut(&mut Lead),
    {
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut count = 0;
        for lead in self.leads.iter_mut().filter(|l| targets.contains(l.id.as_str())) {
            apply(lead);
            count += 1;
        }
        if count > 0 {
            self.persist()?;
        }
        Ok(count)
    }

    /// 保存して、ダッシュボード表示中なら再計算
    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.leads)?;
        self.stale = true;
        if self.dashboard_active {
            self.refresh();
        }
        Ok(())
    }

    fn ensure_fresh(&mut self) {
        if self.stale {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        let filtered = filter_leads(&self.leads, &self.state.filter);
        self.visible = sort_leads(&filtered, &self.state.sort);
        self.state.page = clamp_page(self.state.page, 0, self.total_pages());
        self.stale = false;
    }
}
