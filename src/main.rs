use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use kenning::build::{build_site, Error as BuildError};
use kenning::config::{Config, Error as ConfigError};
use kenning::page::PageLink;
use kenning::parser::{Error as ParseError, Parser as PostParser};
use kenning::post::{format_date, PostMetadata};
use kenning::query::Query;
use kenning::search::{related_posts, RELATED_POSTS};
use kenning::tag::{categorize_tags, count_tags, filter_tags_by_query, prominence, TagWithCount};
use kenning::url::post_url;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("kenning")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Loads, searches, and publishes a directory of Markdown blog posts")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .short("p")
                .long("project")
                .value_name("DIR")
                .takes_value(true)
                .default_value(".")
                .global(true)
                .help("Directory to start searching for kenning.yaml from"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Log at debug level unless RUST_LOG says otherwise"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Writes rss.xml and posts.json to the output directory")
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("DIR")
                        .takes_value(true)
                        .help("Overrides the configured output directory"),
                ),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists posts, optionally filtered by tags and search text")
                .arg(
                    Arg::with_name("tag")
                        .short("t")
                        .long("tag")
                        .value_name("TAG")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Only posts with this tag (repeatable; all must match)"),
                )
                .arg(
                    Arg::with_name("query")
                        .short("q")
                        .long("query")
                        .value_name("TEXT")
                        .takes_value(true)
                        .help("Only posts whose title or tags contain every term"),
                )
                .arg(
                    Arg::with_name("page")
                        .long("page")
                        .value_name("N")
                        .takes_value(true)
                        .default_value("1"),
                )
                .arg(
                    Arg::with_name("per-page")
                        .long("per-page")
                        .value_name("N")
                        .takes_value(true)
                        .help("Overrides the configured index_page_size"),
                )
                .arg(
                    Arg::with_name("featured")
                        .long("featured")
                        .help("Only featured posts"),
                ),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Shows a single post")
                .arg(Arg::with_name("slug").required(true).index(1))
                .arg(
                    Arg::with_name("raw")
                        .long("raw")
                        .help("Print the Markdown body instead of HTML"),
                ),
        )
        .subcommand(
            SubCommand::with_name("tags")
                .about("Lists tags by usage")
                .arg(
                    Arg::with_name("query")
                        .short("q")
                        .long("query")
                        .value_name("TEXT")
                        .takes_value(true)
                        .help("Only tags containing this text"),
                )
                .arg(
                    Arg::with_name("categories")
                        .short("c")
                        .long("categories")
                        .help("Group tags by topic category"),
                ),
        )
        .subcommand(
            SubCommand::with_name("related")
                .about("Suggests posts sharing tags with a post")
                .arg(Arg::with_name("slug").required(true).index(1))
                .arg(
                    Arg::with_name("max")
                        .short("n")
                        .long("max")
                        .value_name("N")
                        .takes_value(true),
                ),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(err) = source {
            eprintln!("  Caused by: {}", err);
            source = err.source();
        }
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let (name, sub) = matches.subcommand();
    let sub = match sub {
        Some(sub) => sub,
        None => return Ok(()),
    };

    // Global args are propagated to the subcommand's matches.
    init_logging(sub.is_present("verbose") || matches.is_present("verbose"));

    let project = sub
        .value_of("project")
        .or_else(|| matches.value_of("project"))
        .unwrap_or(".");
    let config = Config::from_directory(Path::new(project))?;

    match name {
        "build" => build(&config, sub),
        "list" => list(&config, sub),
        "show" => show(&config, sub),
        "tags" => tags(&config, sub),
        "related" => related(&config, sub),
        _ => Ok(()),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build(config: &Config, matches: &ArgMatches) -> Result<()> {
    let mut config = config.clone();
    if let Some(output) = matches.value_of("output") {
        config.output_directory = PathBuf::from(output);
    }
    let summary = build_site(&config, chrono::Utc::now())?;
    println!(
        "{} posts, {} feed items\n  {}\n  {}",
        summary.posts,
        summary.feed_items,
        summary.feed_path.display(),
        summary.index_path.display(),
    );
    Ok(())
}

fn list(config: &Config, matches: &ArgMatches) -> Result<()> {
    let mut posts = PostParser::new(&config.posts_directory).list_posts();
    if matches.is_present("featured") {
        posts.retain(|p| p.featured);
    }

    let mut query = Query::new(config.index_page_size);
    if let Some(tags) = matches.values_of("tag") {
        for tag in tags {
            if !query.tags.iter().any(|t| t == tag) {
                query.toggle_tag(tag);
            }
        }
    }
    if let Some(text) = matches.value_of("query") {
        query.set_text(text);
    }
    if let Some(per_page) = number(matches, "per-page")? {
        query.per_page = per_page;
    }
    query.page = number(matches, "page")?.unwrap_or(1);

    let listing = query.run(&posts);
    let page = listing.page();
    match page.range() {
        Some((first, last)) => println!(
            "Showing {}-{} of {} posts (page {} of {})",
            first, last, page.total_items, page.number, page.total_pages
        ),
        None => {
            println!("No posts found");
            return Ok(());
        }
    }

    for post in page.items {
        print_row(config, post);
    }

    if page.total_pages > 1 {
        let links: Vec<String> = page
            .links()
            .iter()
            .map(|link| match link {
                PageLink::Number(n) if *n == page.number => format!("[{}]", n),
                link => link.to_string(),
            })
            .collect();
        println!("\n{}", links.join(" "));
    }
    Ok(())
}

fn print_row(config: &Config, post: &PostMetadata) {
    let marker = if post.featured { "*" } else { " " };
    println!(
        "{} {:<40} {:<20} {:>3} min  {}",
        marker,
        post.slug,
        format_date(&post.date),
        post.reading_time,
        post.tags.join(", ")
    );
    println!("    {}", post.title);
    if let Some(url) = post_url(&config.blog_url, &post.slug) {
        println!("    {}", url);
    }
}

fn show(config: &Config, matches: &ArgMatches) -> Result<()> {
    let slug = matches.value_of("slug").unwrap_or_default();
    let post = PostParser::new(&config.posts_directory)
        .parse_post(slug)?
        .ok_or_else(|| Error::NotFound(slug.to_owned()))?;

    let meta = &post.metadata;
    println!("{}", meta.title);
    println!(
        "{} · {} min read · written by {}",
        format_date(&meta.date),
        meta.reading_time,
        meta.written_by
    );
    if !meta.tags.is_empty() {
        println!("Tags: {}", meta.tags.join(", "));
    }
    println!();
    if matches.is_present("raw") {
        println!("{}", post.content);
    } else {
        println!("{}", post.to_html(&config.blog_url));
    }
    Ok(())
}

fn tags(config: &Config, matches: &ArgMatches) -> Result<()> {
    let posts = PostParser::new(&config.posts_directory).list_posts();
    let counts = count_tags(&posts);
    let max = counts.first().map(|t| t.count).unwrap_or(0);
    let tags = filter_tags_by_query(&counts, matches.value_of("query").unwrap_or(""));

    let print_tag = |t: &TagWithCount| {
        println!("  {:<30} {:>4}  {}", t.tag, t.count, prominence(t.count, max));
    };

    if matches.is_present("categories") {
        for category in categorize_tags(&tags) {
            println!("{} ({})", category.name, category.total());
            category.tags.iter().for_each(print_tag);
        }
    } else {
        tags.iter().for_each(print_tag);
    }
    Ok(())
}

fn related(config: &Config, matches: &ArgMatches) -> Result<()> {
    let slug = matches.value_of("slug").unwrap_or_default();
    let max = number(matches, "max")?.unwrap_or(RELATED_POSTS);
    let posts = PostParser::new(&config.posts_directory).list_posts();
    let current = posts
        .iter()
        .find(|p| p.slug == slug)
        .ok_or_else(|| Error::NotFound(slug.to_owned()))?;

    for post in related_posts(current, &posts, max) {
        print_row(config, post);
    }
    Ok(())
}

fn number(matches: &ArgMatches, name: &str) -> Result<Option<usize>> {
    match matches.value_of(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidNumber(name.to_owned(), value.to_owned())),
        None => Ok(None),
    }
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
enum Error {
    Config(ConfigError),
    Build(BuildError),
    Parse(ParseError),
    NotFound(String),
    InvalidNumber(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::Build(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
            Error::NotFound(slug) => write!(f, "No post with slug `{}`", slug),
            Error::InvalidNumber(name, value) => {
                write!(f, "--{} expects a number, got `{}`", name, value)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => std::error::Error::source(err),
            Error::Build(err) => std::error::Error::source(err),
            Error::Parse(err) => std::error::Error::source(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Error {
        Error::Config(err)
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Error {
        Error::Build(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}
