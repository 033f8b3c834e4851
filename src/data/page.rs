/// Rows shown per table page.
pub const PAGE_SIZE: usize = 20;

/// Number of pages needed for `count` rows; never less than one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a 1-indexed page number into `1..=total_pages`.
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(count, page_size))
}

/// The slice `[(page-1)*size, page*size)` of `items`, clamped to its length.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_counts() {
        assert_eq!(total_pages(0, PAGE_SIZE), 1);
        assert_eq!(total_pages(1, PAGE_SIZE), 1);
        assert_eq!(total_pages(20, PAGE_SIZE), 1);
        assert_eq!(total_pages(21, PAGE_SIZE), 2);
        assert_eq!(total_pages(100, PAGE_SIZE), 5);
    }

    #[test]
    fn slices_are_clamped() {
        let items: Vec<usize> = (0..45).collect();
        assert_eq!(page_slice(&items, 1, PAGE_SIZE), &items[0..20]);
        assert_eq!(page_slice(&items, 3, PAGE_SIZE), &items[40..45]);
        assert!(page_slice(&items, 4, PAGE_SIZE).is_empty());
        assert_eq!(clamp_page(0, 45, PAGE_SIZE), 1);
        assert_eq!(clamp_page(9, 45, PAGE_SIZE), 3);
    }

    #[test]
    fn pages_concatenate_back_to_the_input() {
        for len in [0usize, 1, 19, 20, 21, 57] {
            let items: Vec<usize> = (0..len).collect();
            let pages = total_pages(len, PAGE_SIZE);
            let rebuilt: Vec<usize> = (1..=pages)
                .flat_map(|p| page_slice(&items, p, PAGE_SIZE).iter().copied())
                .collect();
            assert_eq!(rebuilt, items);
        }
    }
}
