//! 一覧パイプラインの性質テスト
//!
//! フィルタと一覧操作が入力によらず満たすべき性質を proptest で確認

use chrono::{Duration, TimeZone, Utc};
use lead_ai_rust::common::{
    filter_leads_at, FilterSpec, Lead, LeadTier, SalesInsights, Verification, VerificationStatus,
};
use lead_ai_rust::controller::ViewController;
use lead_ai_rust::store::{LeadStore, MemoryStorage};
use proptest::prelude::*;

fn pt_config() -> ProptestConfig {
    ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    }
}

fn arb_tier() -> impl Strategy<Value = Option<LeadTier>> {
    prop_oneof![
        Just(None),
        Just(Some(LeadTier::Hot)),
        Just(Some(LeadTier::Warm)),
        Just(Some(LeadTier::Nurture)),
    ]
}

fn arb_status() -> impl Strategy<Value = Option<VerificationStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(VerificationStatus::Verified)),
        Just(Some(VerificationStatus::Pending)),
        Just(Some(VerificationStatus::Flagged)),
    ]
}

/// IDは添字で一意にする
fn arb_leads(max: usize) -> impl Strategy<Value = Vec<Lead>> {
    prop::collection::vec(
        (
            "[A-Za-z]{0,6}",
            prop::option::of(0u8..=100),
            arb_tier(),
            arb_status(),
            0i64..1000,
        ),
        0..max,
    )
    .prop_map(|rows| {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (company, score, tier, status, minutes))| {
                let mut lead = Lead::new(format!("lead_{}", i), company, base + Duration::minutes(minutes));
                lead.ai_readiness_score = score.map(|s| s as f64 / 10.0);
                lead.sales_insights = tier.map(|t| SalesInsights {
                    lead_tier: Some(t),
                    lead_score: score.map(f64::from),
                    ..Default::default()
                });
                lead.verification = status.map(|s| Verification::new(s, base, ""));
                lead
            })
            .collect()
    })
}

fn arb_filter() -> impl Strategy<Value = FilterSpec> {
    (
        prop::sample::subsequence(LeadTier::ALL.to_vec(), 0..=3),
        prop::sample::subsequence(VerificationStatus::ALL.to_vec(), 0..=3),
        0.0f64..=10.0,
        0.0f64..=10.0,
    )
        .prop_map(|(tiers, statuses, a, b)| FilterSpec {
            lead_tier: tiers,
            verification_status: statuses,
            ai_score: (a.min(b), a.max(b)),
            ..Default::default()
        })
}

fn ids(leads: &[Lead]) -> Vec<String> {
    leads.iter().map(|l| l.id.clone()).collect()
}

/// `sub` が `full` の部分列か
fn is_subsequence(sub: &[String], full: &[String]) -> bool {
    let mut rest = full.iter();
    sub.iter().all(|id| rest.any(|other| other == id))
}

proptest! {
    #![proptest_config(pt_config())]

    /// 2回かけても結果は同じ、順序も保たれる
    #[test]
    fn prop_filter_idempotent_and_stable(leads in arb_leads(30), spec in arb_filter()) {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let once = filter_leads_at(&leads, &spec, &now);
        let twice = filter_leads_at(&once, &spec, &now);

        prop_assert_eq!(ids(&once), ids(&twice));
        prop_assert!(is_subsequence(&ids(&once), &ids(&leads)));
    }

    /// 既定のフィルタは何も落とさない
    #[test]
    fn prop_default_filter_keeps_all(leads in arb_leads(30)) {
        let now = Utc::now();
        prop_assert_eq!(filter_leads_at(&leads, &FilterSpec::default(), &now).len(), leads.len());
    }

    /// 1件破棄しても残りの並びは変わらない
    #[test]
    fn prop_discard_preserves_order(leads in arb_leads(20), pick in any::<prop::sample::Index>()) {
        prop_assume!(!leads.is_empty());
        let store = LeadStore::new(MemoryStorage::new());
        store.save(&leads).unwrap();
        let mut controller = ViewController::new(store, 10);

        let target = leads[pick.index(leads.len())].id.clone();
        prop_assert!(controller.discard_lead(&target).unwrap());

        let expected: Vec<String> = ids(&leads).into_iter().filter(|id| *id != target).collect();
        prop_assert_eq!(ids(controller.leads()), expected.clone());
        prop_assert_eq!(ids(&controller.store().load()), expected);
    }
}
