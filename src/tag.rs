//! The tag index: usage counts per tag, the topic categories shown on the
//! tag cloud, and the helpers for narrowing and weighting tags.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::post::PostMetadata;

/// The name of the bucket for tags that match no category.
pub const OTHER: &str = "Other";

/// Topic categories in match order. A tag belongs to the first category with
/// a pattern that is a substring of the lowercased tag.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "AWS Services",
        &[
            "aws", "s3", "lambda", "ec2", "rds", "dynamodb", "cloudformation", "iam", "vpc",
            "ecs", "eks", "api-gateway", "cloudwatch", "sns", "sqs",
        ],
    ),
    (
        "Languages",
        &[
            "typescript", "javascript", "python", "java", "go", "rust", "ruby", "php",
            "csharp", "cpp", "swift", "kotlin", "dart",
        ],
    ),
    (
        "Frameworks & Libraries",
        &[
            "react", "vue", "angular", "nextjs", "nestjs", "express", "django", "flask",
            "spring", "laravel", "rails", "svelte", "remix",
        ],
    ),
    (
        "Concepts & Practices",
        &[
            "architecture", "design-patterns", "testing", "tdd", "ci-cd", "devops",
            "microservices", "api-design", "security", "performance", "scalability",
            "clean-code", "refactoring", "agile", "scrum",
        ],
    ),
    (
        "Tools & Technologies",
        &[
            "docker", "kubernetes", "terraform", "git", "github", "gitlab", "jenkins",
            "github-actions", "graphql", "rest", "mongodb", "postgresql", "redis",
            "elasticsearch", "kafka",
        ],
    ),
    (
        "AI & ML",
        &[
            "ai", "machine-learning", "ml", "llm", "openai", "langchain", "vector-db",
            "embeddings", "nlp", "deep-learning",
        ],
    ),
];

/// A tag and the number of posts carrying it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagWithCount {
    pub tag: String,
    pub count: usize,
}

impl TagWithCount {
    pub fn new(tag: &str, count: usize) -> TagWithCount {
        TagWithCount {
            tag: tag.to_owned(),
            count,
        }
    }
}

/// A named group of tags, most used first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagCategory {
    pub name: String,
    pub tags: Vec<TagWithCount>,
}

impl TagCategory {
    fn new(name: &str, mut tags: Vec<TagWithCount>) -> TagCategory {
        tags.sort_by(|a, b| b.count.cmp(&a.count));
        TagCategory {
            name: name.to_owned(),
            tags,
        }
    }

    /// The summed usage count of every tag in the category.
    pub fn total(&self) -> usize {
        self.tags.iter().map(|t| t.count).sum()
    }
}

/// Counts how many posts carry each tag, most used first. Tags with equal
/// counts stay in the order they were first seen. Counting is exact: `Rust`
/// and `rust` are different tags.
pub fn count_tags(posts: &[PostMetadata]) -> Vec<TagWithCount> {
    let mut counts: Vec<TagWithCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        match positions.get(tag.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                positions.insert(tag, counts.len());
                counts.push(TagWithCount::new(tag, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Groups tags into topic categories. Empty categories are left out, the
/// rest are ordered by their [`TagCategory::total`], and unmatched tags come
/// last under [`OTHER`].
pub fn categorize_tags(tags: &[TagWithCount]) -> Vec<TagCategory> {
    let mut buckets: Vec<Vec<TagWithCount>> = vec![Vec::new(); CATEGORIES.len()];
    let mut uncategorized = Vec::new();

    for tag in tags {
        let lower = tag.tag.to_lowercase();
        let category = CATEGORIES
            .iter()
            .position(|(_, patterns)| patterns.iter().any(|p| lower.contains(p)));
        match category {
            Some(i) => buckets[i].push(tag.clone()),
            None => uncategorized.push(tag.clone()),
        }
    }

    let mut categories: Vec<TagCategory> = CATEGORIES
        .iter()
        .zip(buckets)
        .filter(|(_, tags)| !tags.is_empty())
        .map(|((name, _), tags)| TagCategory::new(name, tags))
        .collect();
    categories.sort_by(|a, b| b.total().cmp(&a.total()));

    if !uncategorized.is_empty() {
        categories.push(TagCategory::new(OTHER, uncategorized));
    }
    categories
}

/// Keeps the tags whose name contains `query`, ignoring case. A blank query
/// keeps everything.
pub fn filter_tags_by_query(tags: &[TagWithCount], query: &str) -> Vec<TagWithCount> {
    if query.trim().is_empty() {
        return tags.to_vec();
    }
    let query = query.to_lowercase();
    tags.iter()
        .filter(|t| t.tag.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// How prominently a tag is displayed relative to the most used tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Prominence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Prominence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Prominence::High => write!(f, "high"),
            Prominence::Medium => write!(f, "medium"),
            Prominence::Low => write!(f, "low"),
        }
    }
}

/// Half the top count or more is high, a fifth or more is medium.
pub fn prominence(count: usize, max_count: usize) -> Prominence {
    if max_count == 0 {
        return Prominence::Low;
    }
    let ratio = count as f64 / max_count as f64;
    if ratio >= 0.5 {
        Prominence::High
    } else if ratio >= 0.2 {
        Prominence::Medium
    } else {
        Prominence::Low
    }
}
