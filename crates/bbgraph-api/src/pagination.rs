use bbgraph_types::models::PageWindow;

pub const DEFAULT_LIMIT: i32 = 15;
pub const MAX_LIMIT: u32 = 100;

/// Clamps client paging arguments: negative offsets start at zero, limits are
/// kept between 1 and `MAX_LIMIT`.
pub fn window(offset: i32, limit: i32) -> PageWindow {
    PageWindow {
        offset: offset.max(0) as u32,
        limit: (limit.max(1) as u32).min(MAX_LIMIT),
    }
}

/// More rows exist past this page. Computed from the store's total so a
/// short last page is not mistaken for an end when rows remain.
pub fn has_more(total: u64, window: PageWindow, returned: usize) -> bool {
    total > u64::from(window.offset) + returned as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_clamps_arguments() {
        assert_eq!(window(-5, 0), PageWindow { offset: 0, limit: 1 });
        assert_eq!(window(30, 15), PageWindow { offset: 30, limit: 15 });
        assert_eq!(window(0, 10_000).limit, MAX_LIMIT);
    }

    #[test]
    fn has_more_iff_rows_remain_after_the_page() {
        for total in 0..12u64 {
            for offset in 0..12u32 {
                for limit in 1..6u32 {
                    let w = PageWindow { offset, limit };
                    // what a store hands back for this window
                    let returned = total.saturating_sub(u64::from(offset)).min(u64::from(limit)) as usize;
                    assert_eq!(
                        has_more(total, w, returned),
                        u64::from(offset) + u64::from(limit) < total,
                        "total={total} offset={offset} limit={limit}"
                    );
                }
            }
        }
    }

    #[test]
    fn exact_last_page_has_no_more() {
        let w = PageWindow { offset: 10, limit: 5 };
        assert!(!has_more(15, w, 5));
        assert!(has_more(16, w, 5));
    }
}
