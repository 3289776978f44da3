use crate::constants::constants;

/// One page of a filtered list plus the page count it was sliced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<'a, T> {
  pub items: &'a [T],
  pub page_count: usize,
}

/// Total page count. Always at least 1, so an empty list still renders a
/// single (empty) page with a usable pagination bar.
pub fn page_count(len: usize, page_size: usize) -> usize {
  len.div_ceil(page_size).max(1)
}

/// Standard slice semantics: page `p` covers `[(p-1)·size, p·size)`. An
/// out-of-range page yields an empty slice, never a panic.
pub fn paginate<T>(items: &[T], page_size: usize, current_page: usize) -> Paged<'_, T> {
  let pages = page_count(items.len(), page_size);
  let start = current_page.saturating_sub(1).saturating_mul(page_size);
  let end = start.saturating_add(page_size).min(items.len());
  let items = if start >= items.len() { &items[0..0] } else { &items[start..end] };
  Paged { items, page_count: pages }
}

/// One element of the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
  /// A numbered page button.
  Page(usize),
  /// A "…" separator between the window and the first/last page button.
  Ellipsis,
}

/// Layout of the numbered page buttons: a window of at most
/// `max_visible_pages` numbers centered on the current page, re-anchored at
/// the ends, with first/last buttons and ellipses when the window doesn't
/// reach them.
pub fn page_buttons(page_count: usize, current_page: usize) -> Vec<PageMarker> {
  let max_visible = constants().max_visible_pages;
  let mut start = current_page.saturating_sub(max_visible / 2).max(1);
  let end = (start + max_visible - 1).min(page_count);
  // Re-anchor near the last page so the window stays full width.
  if end - start + 1 < max_visible && page_count >= max_visible {
    start = end.saturating_sub(max_visible - 1).max(1);
  }

  let mut markers = Vec::new();
  if start > 1 {
    markers.push(PageMarker::Page(1));
    if start > 2 {
      markers.push(PageMarker::Ellipsis);
    }
  }
  for page in start..=end {
    markers.push(PageMarker::Page(page));
  }
  if end < page_count {
    if end < page_count - 1 {
      markers.push(PageMarker::Ellipsis);
    }
    markers.push(PageMarker::Page(page_count));
  }
  markers
}

/// 1-based "showing X–Y of N" bounds for the pagination info line.
/// `(0, 0)` when the filtered list is empty. Page 0 reads as page 1.
pub fn item_range(len: usize, page_size: usize, current_page: usize) -> (usize, usize) {
  if len == 0 {
    return (0, 0);
  }
  let current_page = current_page.max(1);
  let start = (current_page - 1) * page_size + 1;
  let end = (current_page * page_size).min(len);
  (start, end)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pages(markers: &[PageMarker]) -> Vec<i64> {
    // Ellipses encoded as -1 to keep expectations readable.
    markers
      .iter()
      .map(|m| match m {
        PageMarker::Page(p) => *p as i64,
        PageMarker::Ellipsis => -1,
      })
      .collect()
  }

  // --- Slicing ---

  #[test]
  fn fourteen_items_split_twelve_then_two() {
    let items: Vec<u32> = (0..14).collect();
    let first = paginate(&items, 12, 1);
    let second = paginate(&items, 12, 2);
    assert_eq!(first.items.len(), 12);
    assert_eq!(second.items.len(), 2);
    assert_eq!(first.page_count, 2);
    assert_eq!(second.items, &[12, 13]);
  }

  #[test]
  fn out_of_range_page_yields_empty_slice() {
    let items: Vec<u32> = (0..5).collect();
    let paged = paginate(&items, 12, 3);
    assert!(paged.items.is_empty());
    assert_eq!(paged.page_count, 1);
  }

  #[test]
  fn empty_list_still_has_one_page() {
    let paged = paginate::<u32>(&[], 12, 1);
    assert!(paged.items.is_empty());
    assert_eq!(paged.page_count, 1);
  }

  #[test]
  fn concatenated_pages_reproduce_the_input() {
    let items: Vec<u32> = (0..53).collect();
    let total = page_count(items.len(), 12);
    let mut rebuilt = Vec::new();
    for page in 1..=total {
      rebuilt.extend_from_slice(paginate(&items, 12, page).items);
    }
    assert_eq!(rebuilt, items);
  }

  // --- Button window ---

  #[test]
  fn few_pages_show_every_number() {
    assert_eq!(pages(&page_buttons(3, 2)), vec![1, 2, 3]);
    assert_eq!(pages(&page_buttons(1, 1)), vec![1]);
  }

  #[test]
  fn window_centers_on_current_page() {
    // 10 pages, current 6 → window 4..=8 plus both ends with ellipses
    assert_eq!(pages(&page_buttons(10, 6)), vec![1, -1, 4, 5, 6, 7, 8, -1, 10]);
  }

  #[test]
  fn window_at_the_start_has_no_leading_ellipsis() {
    assert_eq!(pages(&page_buttons(10, 1)), vec![1, 2, 3, 4, 5, -1, 10]);
    assert_eq!(pages(&page_buttons(10, 2)), vec![1, 2, 3, 4, 5, -1, 10]);
  }

  #[test]
  fn window_reanchors_at_the_end() {
    assert_eq!(pages(&page_buttons(10, 10)), vec![1, -1, 6, 7, 8, 9, 10]);
    assert_eq!(pages(&page_buttons(10, 9)), vec![1, -1, 6, 7, 8, 9, 10]);
  }

  #[test]
  fn adjacent_first_page_omits_the_ellipsis() {
    // window starts at exactly page 2 → leading "1" but no "…"
    assert_eq!(pages(&page_buttons(6, 4)), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(pages(&page_buttons(7, 4)), vec![1, 2, 3, 4, 5, 6, 7]);
  }

  // --- Info line ---

  #[test]
  fn item_range_is_one_based_and_clamped() {
    assert_eq!(item_range(14, 12, 1), (1, 12));
    assert_eq!(item_range(14, 12, 2), (13, 14));
    assert_eq!(item_range(0, 12, 1), (0, 0));
  }

  #[test]
  fn item_range_tolerates_page_zero() {
    assert_eq!(item_range(14, 12, 0), (1, 12));
    assert_eq!(item_range(0, 12, 0), (0, 0));
  }
}
