use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct PageContext<T> {
    pub rows: Vec<T>,
    pub total_rows: i64,
    pub next_offset: i64,
    pub prev_offset: i64,
    pub page_list: Vec<(String, i64)>,
    pub message: Option<String>,
}

impl<T> PageContext<T> {
    pub fn from_rows(rows: Vec<T>, total_rows: i64, page_size: i64, current_offset: i64) -> Self {
        if rows.is_empty() {
            return Self::no_rows();
        }

        // Partial trailing pages count as a page; a short listing is one page.
        let page_count = ((total_rows + page_size - 1) / page_size).max(1);
        let last_offset = (page_count - 1) * page_size;

        let next_offset = (current_offset + page_size).min(last_offset);
        let prev_offset = (current_offset - page_size).max(0);

        let page_list = (0..page_count)
            .map(|n| {
                let page = if n == current_offset / page_size {
                    String::from("...")
                } else {
                    format!("{}", n + 1)
                };

                (page, n * page_size)
            })
            .collect();

        Self {
            rows,
            total_rows,
            next_offset,
            prev_offset,
            page_list,
            message: Some(format!(
                "{} - {} / {}",
                current_offset,
                (current_offset + page_size).min(total_rows),
                total_rows
            )),
        }
    }

    pub fn no_rows() -> Self {
        Self {
            rows: vec![],
            total_rows: 0,
            next_offset: 0,
            prev_offset: 0,
            page_list: vec![(String::from("1"), 0)],
            message: Some(String::from("No results")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rows_yield_placeholder_page() {
        let page: PageContext<i32> = PageContext::from_rows(vec![], 0, 6, 0);
        assert_eq!(page.total_rows, 0);
        assert_eq!(page.page_list, vec![(String::from("1"), 0)]);
    }

    #[test]
    fn single_partial_page_is_one_page() {
        let page = PageContext::from_rows(vec![1, 2, 3], 3, 6, 0);
        assert_eq!(page.page_list.len(), 1);
        assert_eq!(page.next_offset, 0);
        assert_eq!(page.prev_offset, 0);
    }

    #[test]
    fn exact_multiple_has_no_phantom_trailing_page() {
        let page = PageContext::from_rows(vec![1, 2, 3, 4, 5, 6], 12, 6, 0);
        assert_eq!(page.page_list.len(), 2);
        let offsets: Vec<i64> = page.page_list.iter().map(|(_, o)| *o).collect();
        assert_eq!(offsets, vec![0, 6]);
        assert_eq!(page.next_offset, 6);
    }

    #[test]
    fn partial_trailing_page_is_counted() {
        let page = PageContext::from_rows(vec![1, 2, 3, 4, 5, 6], 14, 6, 0);
        assert_eq!(page.page_list.len(), 3);
        let offsets: Vec<i64> = page.page_list.iter().map(|(_, o)| *o).collect();
        assert_eq!(offsets, vec![0, 6, 12]);
    }

    #[test]
    fn offsets_clamp_to_bounds() {
        let page = PageContext::from_rows(vec![1, 2, 3, 4, 5, 6], 14, 6, 0);
        assert_eq!(page.prev_offset, 0);
        assert_eq!(page.next_offset, 6);

        let page = PageContext::from_rows(vec![13, 14], 14, 6, 12);
        assert_eq!(page.prev_offset, 6);
        assert_eq!(page.next_offset, 12);
    }

    #[test]
    fn current_page_is_masked_in_page_list() {
        let page = PageContext::from_rows(vec![1, 2, 3, 4, 5, 6], 14, 6, 6);
        let labels: Vec<&str> = page.page_list.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["1", "...", "3"]);
    }
}
