//! Client-side style search over the post list: a lowercase search blob per
//! post, multi-term substring matching, tag filtering, and the related-post
//! suggestions shown under a post.
//!
//! Everything here is a pure function over borrowed posts and preserves the
//! order it was given (newest first, by the loader's convention) unless it
//! says otherwise.

use crate::post::PostMetadata;

/// How many related posts are suggested by default.
pub const RELATED_POSTS: usize = 3;

/// How many recent posts the sidebar shows by default.
pub const RECENT_POSTS: usize = 5;

/// A post paired with the text searches run against.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchablePost<'a> {
    pub post: &'a PostMetadata,

    /// `"{title} {tags...}"`, lowercased.
    pub search_text: String,
}

impl<'a> SearchablePost<'a> {
    pub fn new(post: &'a PostMetadata) -> SearchablePost<'a> {
        let mut text = String::with_capacity(post.title.len() + 16 * post.tags.len());
        text.push_str(&post.title);
        text.push(' ');
        text.push_str(&post.tags.join(" "));
        SearchablePost {
            post,
            search_text: text.to_lowercase(),
        }
    }

    /// True if every term occurs somewhere in the search text. Terms must
    /// already be lowercase.
    fn matches(&self, terms: &[String]) -> bool {
        terms.iter().all(|term| self.search_text.contains(term.as_str()))
    }
}

/// Builds the search index for a set of posts. The index is derived data and
/// should be rebuilt whenever the posts change.
pub fn create_search_index<'a, I>(posts: I) -> Vec<SearchablePost<'a>>
where
    I: IntoIterator<Item = &'a PostMetadata>,
{
    posts.into_iter().map(SearchablePost::new).collect()
}

/// Splits a query into lowercase, whitespace-separated terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Returns the entries whose search text contains every query term, in
/// index order. A blank query matches everything.
pub fn search_posts<'i, 'a>(
    index: &'i [SearchablePost<'a>],
    query: &str,
) -> Vec<&'i SearchablePost<'a>> {
    let terms = query_terms(query);
    index.iter().filter(|entry| entry.matches(&terms)).collect()
}

/// Returns the posts carrying every one of `tags`. An empty tag set keeps
/// every post.
pub fn filter_posts_by_tags<'a, S>(posts: &'a [PostMetadata], tags: &[S]) -> Vec<&'a PostMetadata>
where
    S: AsRef<str>,
{
    posts
        .iter()
        .filter(|post| tags.iter().all(|tag| post.has_tag(tag.as_ref())))
        .collect()
}

/// Returns the posts carrying `tag`, as on a single tag's page. An empty tag
/// keeps every post.
pub fn filter_posts_by_tag<'a>(posts: &'a [PostMetadata], tag: &str) -> Vec<&'a PostMetadata> {
    if tag.is_empty() {
        return posts.iter().collect();
    }
    filter_posts_by_tags(posts, &[tag])
}

/// Applies the tag filter, then the text search to what remains.
pub fn filter_posts<'a, S>(
    posts: &'a [PostMetadata],
    tags: &[S],
    query: &str,
) -> Vec<&'a PostMetadata>
where
    S: AsRef<str>,
{
    let tagged = filter_posts_by_tags(posts, tags);
    if query.trim().is_empty() {
        return tagged;
    }
    let index = create_search_index(tagged);
    search_posts(&index, query)
        .into_iter()
        .map(|entry| entry.post)
        .collect()
}

/// Suggests posts sharing tags with `current`, most shared tags first (ties
/// keep list order). The current post and posts sharing nothing are left
/// out.
pub fn related_posts<'a>(
    current: &PostMetadata,
    posts: &'a [PostMetadata],
    max: usize,
) -> Vec<&'a PostMetadata> {
    let mut scored: Vec<(usize, &PostMetadata)> = posts
        .iter()
        .filter(|post| post.slug != current.slug)
        .map(|post| {
            let shared = post.tags.iter().filter(|t| current.has_tag(t)).count();
            (shared, post)
        })
        .filter(|(shared, _)| *shared > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(max).map(|(_, post)| post).collect()
}

/// The first `max` posts of the list, i.e. the most recent ones.
pub fn recent_posts(posts: &[PostMetadata], max: usize) -> &[PostMetadata] {
    &posts[..posts.len().min(max)]
}

/// Up to `max` posts flagged `featured`, in list order.
pub fn featured_posts(posts: &[PostMetadata], max: usize) -> Vec<&PostMetadata> {
    posts.iter().filter(|p| p.featured).take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::WrittenBy;

    fn post(slug: &str, title: &str, tags: &[&str]) -> PostMetadata {
        PostMetadata {
            title: title.to_owned(),
            date: String::from("2024-01-01"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            slug: slug.to_owned(),
            featured: false,
            excerpt: String::new(),
            reading_time: 1,
            written_by: WrittenBy::Human,
        }
    }

    fn slugs(posts: &[&PostMetadata]) -> Vec<String> {
        posts.iter().map(|p| p.slug.clone()).collect()
    }

    fn fixture() -> Vec<PostMetadata> {
        vec![
            post("a", "Go Programming", &["go", "backend"]),
            post("b", "Rust Ownership", &["rust", "backend"]),
            post("c", "React Hooks", &["react", "frontend"]),
            post("d", "Rusty Gates", &["go", "rust"]),
        ]
    }

    #[test]
    fn test_search_text() {
        let p = post("x", "Hello World", &["Rust", "CLI"]);
        assert_eq!(SearchablePost::new(&p).search_text, "hello world rust cli");

        let untagged = post("y", "Alone", &[]);
        assert_eq!(SearchablePost::new(&untagged).search_text, "alone ");
    }

    #[test]
    fn test_search_and_semantics() {
        let posts = vec![post("go", "Go", &["programming"])];
        let index = create_search_index(&posts);
        assert_eq!(index[0].search_text, "go programming");
        assert_eq!(search_posts(&index, "go prog").len(), 1);
        assert!(search_posts(&index, "go rust").is_empty());
    }

    #[test]
    fn test_search_preserves_order() {
        let posts = fixture();
        let index = create_search_index(&posts);
        let got: Vec<&str> = search_posts(&index, "  RUST ")
            .iter()
            .map(|e| e.post.slug.as_str())
            .collect();
        assert_eq!(got, vec!["b", "d"]);
    }

    #[test]
    fn test_blank_query_returns_everything() {
        let posts = fixture();
        let index = create_search_index(&posts);
        assert_eq!(search_posts(&index, "").len(), 4);
        assert_eq!(search_posts(&index, " \t ").len(), 4);
    }

    #[test]
    fn test_filter_posts_by_tags() {
        let posts = fixture();
        let none: &[&str] = &[];
        assert_eq!(slugs(&filter_posts_by_tags(&posts, none)), vec!["a", "b", "c", "d"]);
        assert_eq!(slugs(&filter_posts_by_tags(&posts, &["go"])), vec!["a", "d"]);
        assert_eq!(slugs(&filter_posts_by_tags(&posts, &["go", "rust"])), vec!["d"]);
        assert!(filter_posts_by_tags(&posts, &["Go"]).is_empty());
    }

    #[test]
    fn test_filter_posts_by_tag() {
        let posts = fixture();
        assert_eq!(filter_posts_by_tag(&posts, "").len(), 4);
        assert_eq!(slugs(&filter_posts_by_tag(&posts, "frontend")), vec!["c"]);
    }

    #[test]
    fn test_filter_posts_composes() {
        let posts = fixture();
        let tags = vec![String::from("backend")];
        assert_eq!(slugs(&filter_posts(&posts, tags.as_slice(), "rust")), vec!["b"]);
        assert_eq!(slugs(&filter_posts(&posts, tags.as_slice(), "")), vec!["a", "b"]);
        assert!(filter_posts(&posts, tags.as_slice(), "react").is_empty());
    }

    #[test]
    fn test_related_posts() {
        let posts = fixture();
        let current = &posts[3];
        assert_eq!(slugs(&related_posts(current, &posts, RELATED_POSTS)), vec!["a", "b"]);
        assert_eq!(slugs(&related_posts(current, &posts, 1)), vec!["a"]);

        let lonely = post("z", "Lonely", &["cooking"]);
        assert!(related_posts(&lonely, &posts, RELATED_POSTS).is_empty());
    }

    #[test]
    fn test_related_posts_ranks_by_shared_tags() {
        let mut posts = fixture();
        posts.push(post("e", "Go and Rust backends", &["go", "rust", "backend"]));
        let current = post("cur", "Current", &["go", "rust", "backend"]);
        assert_eq!(
            slugs(&related_posts(&current, &posts, RELATED_POSTS)),
            vec!["e", "a", "b"]
        );
    }

    #[test]
    fn test_recent_and_featured() {
        let mut posts = fixture();
        assert_eq!(recent_posts(&posts, 2).len(), 2);
        assert_eq!(recent_posts(&posts, RECENT_POSTS).len(), 4);

        posts[1].featured = true;
        posts[3].featured = true;
        assert_eq!(slugs(&featured_posts(&posts, 5)), vec!["b", "d"]);
        assert_eq!(slugs(&featured_posts(&posts, 1)), vec!["b"]);
    }
}
