//! 解析レポートの表示用ヘルパー

/// AI成熟度スコアの説明文
pub fn score_description(score: f64) -> &'static str {
    if score <= 3.0 {
        "Early stage AI readiness. Significant transformation opportunities exist through AI implementation."
    } else if score <= 6.0 {
        "Developing AI capabilities. Good foundation with clear opportunities for strategic AI enhancements to accelerate growth."
    } else if score <= 8.0 {
        "Advanced AI readiness. Strong technical foundation for sophisticated AI implementation and optimization."
    } else {
        "Excellent AI maturity. Well-positioned for leading-edge AI applications with potential for industry leadership."
    }
}

/// 技術カテゴリキーの表示名
pub fn format_category_name(category: &str) -> String {
    match category {
        "ai_ml" => "AI & Machine Learning".to_string(),
        "data" => "Data Infrastructure".to_string(),
        "cloud" => "Cloud Technologies".to_string(),
        "integration" => "System Integration".to_string(),
        "automation" => "Process Automation".to_string(),
        other => other
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// スコア内訳の上限値（バー表示用）
pub fn component_max(component: &str) -> Option<f64> {
    match component {
        "technology_score" => Some(10.0),
        "leadership_score" => Some(5.0),
        "growth_score" => Some(2.0),
        _ => None,
    }
}
