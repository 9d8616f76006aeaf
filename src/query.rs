//! The listing query: what an index page asks of the post list. A [`Query`]
//! carries the selected tags, the free-text search, and the requested page;
//! running it filters by tag, searches what remains, and cuts out the page.
//!
//! A [`Listing`] is computed entirely from the query that produced it, so a
//! caller that issues a new query simply replaces the old listing; there is
//! no shared state for an older request to clobber.

use crate::page::Page;
use crate::post::PostMetadata;
use crate::search::filter_posts;

/// Parameters for one listing request.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    /// Posts must carry every one of these tags.
    pub tags: Vec<String>,

    /// Free-text search; every whitespace-separated term must match.
    pub text: String,

    /// The requested 1-indexed page. Out-of-range values are clamped.
    pub page: usize,

    pub per_page: usize,
}

impl Query {
    /// An unfiltered query for the first page.
    pub fn new(per_page: usize) -> Query {
        Query {
            tags: Vec::new(),
            text: String::new(),
            page: 1,
            per_page,
        }
    }

    /// Toggles `tag` in the selected tag set, as clicking a tag chip does.
    /// Changing the filter returns the listing to the first page.
    pub fn toggle_tag(&mut self, tag: &str) {
        match self.tags.iter().position(|t| t == tag) {
            Some(i) => {
                self.tags.remove(i);
            }
            None => self.tags.push(tag.to_owned()),
        }
        self.page = 1;
    }

    /// Replaces the search text and returns to the first page.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.page = 1;
    }

    /// True if neither tags nor search text narrow the listing.
    pub fn is_unfiltered(&self) -> bool {
        self.tags.is_empty() && self.text.trim().is_empty()
    }

    /// Runs the query against the full post list.
    pub fn run<'a>(&self, posts: &'a [PostMetadata]) -> Listing<'a> {
        Listing {
            matches: filter_posts(posts, self.tags.as_slice(), &self.text),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// The posts matching a [`Query`], in list order.
#[derive(Debug)]
pub struct Listing<'a> {
    /// Every matching post, across all pages.
    pub matches: Vec<&'a PostMetadata>,

    page: usize,
    per_page: usize,
}

impl<'a> Listing<'a> {
    /// The requested page of matches, clamped onto a real page.
    pub fn page(&self) -> Page<'_, &'a PostMetadata> {
        Page::new(&self.matches, self.page, self.per_page)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::WrittenBy;

    fn posts(n: usize) -> Vec<PostMetadata> {
        (1..=n)
            .map(|i| PostMetadata {
                title: format!("Post {}", i),
                date: format!("2024-01-{:02}", 28 - i % 28),
                tags: if i % 2 == 0 {
                    vec![String::from("even"), String::from("rust")]
                } else {
                    vec![String::from("rust")]
                },
                slug: format!("post-{}", i),
                featured: false,
                excerpt: String::new(),
                reading_time: 1,
                written_by: WrittenBy::Human,
            })
            .collect()
    }

    fn slugs(page: &Page<&PostMetadata>) -> Vec<String> {
        page.items.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_unfiltered_query() {
        let posts = posts(25);
        let query = Query::new(10);
        assert!(query.is_unfiltered());

        let listing = query.run(&posts);
        assert_eq!(listing.len(), 25);
        let page = listing.page();
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn test_query_filters_then_paginates() {
        let posts = posts(25);
        let mut query = Query::new(5);
        query.toggle_tag("even");
        query.page = 3;

        let listing = query.run(&posts);
        assert_eq!(listing.len(), 12);
        let page = listing.page();
        assert_eq!(page.total_pages, 3);
        assert_eq!(slugs(&page), vec!["post-22", "post-24"]);
    }

    #[test]
    fn test_query_clamps_page() {
        let posts = posts(25);
        let mut query = Query::new(10);
        query.set_text("post 1");
        query.page = 9;

        let listing = query.run(&posts);
        // Posts 1, 10 through 19, and 21 all contain a "1".
        assert_eq!(listing.len(), 12);
        let page = listing.page();
        assert_eq!(page.number, 2);
        assert_eq!(slugs(&page), vec!["post-19", "post-21"]);
    }

    #[test]
    fn test_query_with_no_matches() {
        let posts = posts(3);
        let mut query = Query::new(10);
        query.set_text("python");
        let listing = query.run(&posts);
        assert!(listing.is_empty());
        let page = listing.page();
        assert_eq!(page.number, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_toggle_tag() {
        let mut query = Query::new(10);
        query.page = 4;
        query.toggle_tag("rust");
        assert_eq!(query.tags, vec!["rust"]);
        assert_eq!(query.page, 1);
        query.toggle_tag("rust");
        assert!(query.tags.is_empty());
    }
}
