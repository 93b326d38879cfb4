//! ページ分割

use serde::Serialize;

/// 1ページあたりの件数
pub const ITEMS_PER_PAGE: usize = 10;

/// 総ページ数（0件でも1）
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size).max(1)
}

/// 1始まりのページを切り出す。範囲外は空スライス
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// ページ送りの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageInfo {
    pub fn new(page: usize, total_items: usize, page_size: usize) -> Self {
        let total_pages = total_pages(total_items, page_size);
        Self {
            page,
            total_pages,
            total_items,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    /// `Page 2 of 5`
    pub fn indicator(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

/// `page + delta` を [1, total_pages] に収める
pub fn clamp_page(page: usize, delta: isize, total_pages: usize) -> usize {
    let target = page as isize + delta;
    target.clamp(1, total_pages.max(1) as isize) as usize
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn pt_config() -> ProptestConfig {
        ProptestConfig {
            cases: 200,
            ..ProptestConfig::default()
        }
    }

    proptest! {
        #![proptest_config(pt_config())]

        /// 全ページをつなげると元に戻る
        #[test]
        fn prop_pages_cover_everything(len in 0usize..60, page_size in 1usize..15) {
            let items: Vec<usize> = (0..len).collect();
            let pages = total_pages(len, page_size);
            prop_assert!(pages >= 1);

            let mut joined = Vec::new();
            for page in 1..=pages {
                let slice = paginate(&items, page, page_size);
                prop_assert!(slice.len() <= page_size);
                joined.extend_from_slice(slice);
            }
            prop_assert_eq!(joined, items.clone());
            prop_assert!(paginate(&items, pages + 1, page_size).is_empty());
        }

        /// ページ移動は常に範囲内
        #[test]
        fn prop_clamp_page_in_range(page in 0usize..50, delta in -60isize..60, pages in 0usize..20) {
            let clamped = clamp_page(page, delta, pages);
            prop_assert!(clamped >= 1);
            prop_assert!(clamped <= pages.max(1));
        }

        /// ページ情報の前後フラグは範囲と一致する
        #[test]
        fn prop_page_info_flags(total in 0usize..100, page_size in 1usize..15, pick in 0usize..20) {
            let pages = total_pages(total, page_size);
            let page = pick % pages + 1;
            let info = PageInfo::new(page, total, page_size);
            prop_assert_eq!(info.has_prev, page > 1);
            prop_assert_eq!(info.has_next, page < pages);
            prop_assert_eq!(info.total_pages, pages);
        }
    }
}
