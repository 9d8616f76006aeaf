//! Pagination: slicing result lists into fixed-size, 1-indexed pages and
//! computing the page-number strip shown under a listing.

use std::fmt;

/// The most page links shown before the strip collapses with ellipses.
const MAX_VISIBLE_PAGES: usize = 7;

/// Returns the items on 1-indexed `page`. Pages past the end (and page 0)
/// are empty; clamping is the caller's job, see [`clamp_page`].
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

/// The number of pages needed for `count` items, zero when there are none.
pub fn total_pages(count: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    count / per_page + if count % per_page == 0 { 0 } else { 1 }
}

/// Pulls `page` into `1..=total_pages`. An empty listing still has a page 1.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.max(1).min(total_pages.max(1))
}

/// The 1-indexed positions of the first and last item on `page`, or `None`
/// if the page is empty.
pub fn item_range(page: usize, per_page: usize, total_items: usize) -> Option<(usize, usize)> {
    if page == 0 || per_page == 0 {
        return None;
    }
    let start = (page - 1).saturating_mul(per_page) + 1;
    let end = page.saturating_mul(per_page).min(total_items);
    if start > end {
        None
    } else {
        Some((start, end))
    }
}

/// One entry in the page-number strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageLink {
    Number(usize),
    Ellipsis,
}

impl fmt::Display for PageLink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PageLink::Number(n) => write!(f, "{}", n),
            PageLink::Ellipsis => write!(f, "…"),
        }
    }
}

/// Computes the page-number strip for `current` out of `total` pages. Up to
/// seven pages are listed outright; beyond that the strip keeps the first and
/// last page and a window around the current one.
pub fn page_links(current: usize, total: usize) -> Vec<PageLink> {
    use self::PageLink::*;

    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(Number).collect();
    }

    let mut links = Vec::with_capacity(MAX_VISIBLE_PAGES);
    if current <= 3 {
        links.extend((1..=5).map(Number));
        links.push(Ellipsis);
        links.push(Number(total));
    } else if current >= total - 2 {
        links.push(Number(1));
        links.push(Ellipsis);
        links.extend((total - 4..=total).map(Number));
    } else {
        links.push(Number(1));
        links.push(Ellipsis);
        links.extend((current - 1..=current + 1).map(Number));
        links.push(Ellipsis);
        links.push(Number(total));
    }
    links
}

/// One page of a listing, with enough context to render navigation.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    /// The items on this page.
    pub items: &'a [T],

    /// This page's 1-indexed number, always within `1..=max(total_pages, 1)`.
    pub number: usize,

    pub per_page: usize,

    pub total_pages: usize,

    pub total_items: usize,
}

impl<'a, T> Page<'a, T> {
    /// Cuts page `page` out of `items`, clamping out-of-range page numbers
    /// onto the nearest real page.
    pub fn new(items: &'a [T], page: usize, per_page: usize) -> Page<'a, T> {
        let total = total_pages(items.len(), per_page);
        let number = clamp_page(page, total);
        Page {
            items: paginate(items, number, per_page),
            number,
            per_page,
            total_pages: total,
            total_items: items.len(),
        }
    }

    /// The previous page number, if any.
    pub fn prev(&self) -> Option<usize> {
        if self.number > 1 {
            Some(self.number - 1)
        } else {
            None
        }
    }

    /// The next page number, if any.
    pub fn next(&self) -> Option<usize> {
        if self.number < self.total_pages {
            Some(self.number + 1)
        } else {
            None
        }
    }

    pub fn links(&self) -> Vec<PageLink> {
        page_links(self.number, self.total_pages)
    }

    pub fn range(&self) -> Option<(usize, usize)> {
        item_range(self.number, self.per_page, self.total_items)
    }
}
