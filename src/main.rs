use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use kindred::authors::active_authors;
use kindred::config::Config;
use kindred::parser::Parser;
use kindred::post::{Post, PostSummary};
use kindred::rank::Recommender;
use kindred::trending::{all_tags, related_tags, trending_tags};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let limit = Arg::with_name("limit")
        .short("n")
        .long("limit")
        .takes_value(true)
        .help("The maximum number of results (defaults to the project's `default_limit`)");
    let id = Arg::with_name("id")
        .required(true)
        .help("The ID of the reference post (its path under the posts directory, less `.md`)");
    let days = Arg::with_name("days")
        .long("days")
        .takes_value(true)
        .default_value("30")
        .help("How many days back to look");

    let matches = App::new("kindred")
        .about("Related-post recommendations for multi-author blogs")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .takes_value(true)
                .default_value(".")
                .help("A directory at or beneath the one containing `kindred.yaml`"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log debug output to stderr"),
        )
        .subcommand(
            SubCommand::with_name("related")
                .about("Posts most relevant to a post")
                .arg(id.clone())
                .arg(limit.clone())
                .arg(
                    Arg::with_name("include-drafts")
                        .long("include-drafts")
                        .help("Consider draft posts too"),
                ),
        )
        .subcommand(
            SubCommand::with_name("same-author")
                .about("Other posts by the same author, newest first")
                .arg(id.clone())
                .arg(limit.clone()),
        )
        .subcommand(
            SubCommand::with_name("similar-tags")
                .about("Posts sharing the most tags with a post")
                .arg(id.clone())
                .arg(limit.clone()),
        )
        .subcommand(
            SubCommand::with_name("cross-author")
                .about("Relevant posts by other authors, capped per author")
                .arg(id.clone())
                .arg(limit.clone())
                .arg(
                    Arg::with_name("max-per-author")
                        .long("max-per-author")
                        .takes_value(true)
                        .help("Posts allowed per author (defaults to half the limit, rounded up)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("similar-authors")
                .about("The latest post of each author writing about similar topics")
                .arg(id.clone())
                .arg(limit.clone()),
        )
        .subcommand(
            SubCommand::with_name("discover")
                .about("The latest post of each other author, most prolific first")
                .arg(id.clone())
                .arg(limit.clone()),
        )
        .subcommand(
            SubCommand::with_name("recent")
                .about("The most recent posts")
                .arg(limit.clone()),
        )
        .subcommand(
            SubCommand::with_name("trending")
                .about("The most used tags in recent posts")
                .arg(days.clone())
                .arg(limit.clone()),
        )
        .subcommand(
            SubCommand::with_name("related-tags")
                .about("Tags that most often appear alongside a tag")
                .arg(Arg::with_name("tag").required(true))
                .arg(limit.clone()),
        )
        .subcommand(
            SubCommand::with_name("active-authors")
                .about("Post counts per author in recent posts")
                .arg(days),
        )
        .subcommand(SubCommand::with_name("tags").about("Every tag in use"))
        .get_matches();

    init_logging(matches.is_present("verbose"));

    // `project` has a default value
    let config = Config::from_directory(Path::new(matches.value_of("project").unwrap()))?;
    let posts = Parser::new(&config.posts_url).parse_posts(&config.posts_source_directory)?;
    let recommender = Recommender::new(&config.weights, &config.tag_filter);
    let today = chrono::Local::now().date_naive();

    match matches.subcommand() {
        ("related", Some(m)) => print_posts(&recommender.rank_posts(
            Some(find_post(&posts, m)?),
            &posts,
            limit_of(m, &config)?,
            !m.is_present("include-drafts"),
        )),
        ("same-author", Some(m)) => print_posts(&recommender.posts_by_same_author(
            find_post(&posts, m)?,
            &posts,
            limit_of(m, &config)?,
        )),
        ("similar-tags", Some(m)) => print_posts(&recommender.posts_with_similar_tags(
            find_post(&posts, m)?,
            &posts,
            limit_of(m, &config)?,
        )),
        ("cross-author", Some(m)) => print_posts(&recommender.select_diverse(
            find_post(&posts, m)?,
            &posts,
            limit_of(m, &config)?,
            parse_opt(m, "max-per-author")?,
        )),
        ("similar-authors", Some(m)) => print_posts(&recommender.similar_authors(
            find_post(&posts, m)?,
            &posts,
            limit_of(m, &config)?,
        )),
        ("discover", Some(m)) => print_posts(&recommender.discover_authors(
            find_post(&posts, m)?,
            &posts,
            limit_of(m, &config)?,
        )),
        ("recent", Some(m)) => {
            print_posts(&recommender.recent_posts(&posts, None, limit_of(m, &config)?))
        }
        ("trending", Some(m)) => print_yaml(&trending_tags(
            &config.tag_filter,
            &posts,
            days_of(m)?,
            limit_of(m, &config)?,
            today,
        )),
        ("related-tags", Some(m)) => print_yaml(&related_tags(
            &config.tag_filter,
            &posts,
            // `tag` is required
            m.value_of("tag").unwrap(),
            limit_of(m, &config)?,
        )),
        ("active-authors", Some(m)) => print_yaml(&active_authors(&posts, days_of(m)?, today)),
        ("tags", _) => print_yaml(&all_tags(&config.tag_filter, &posts)),
        (name, _) => Err(anyhow!("Unknown subcommand `{}`", name)),
    }
}

fn init_logging(verbose: bool) {
    let filter = match verbose {
        true => EnvFilter::new("debug"),
        false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn find_post<'p>(posts: &'p [Post], m: &ArgMatches) -> Result<&'p Post> {
    // `id` is required wherever this is called
    let id = m.value_of("id").unwrap();
    posts
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| anyhow!("No post with ID `{}`", id))
}

fn parse_opt<T>(m: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match m.value_of(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("Invalid value `{}` for `--{}`: {}", raw, name, e)),
    }
}

fn limit_of(m: &ArgMatches, config: &Config) -> Result<usize> {
    Ok(parse_opt(m, "limit")?.unwrap_or(config.default_limit))
}

fn days_of(m: &ArgMatches) -> Result<i64> {
    // `days` has a default value
    Ok(parse_opt(m, "days")?.unwrap_or(30))
}

fn print_posts(posts: &[&Post]) -> Result<()> {
    let summaries: Vec<PostSummary> = posts.iter().map(|p| PostSummary::from(*p)).collect();
    print_yaml(&summaries)
}

fn print_yaml<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    serde_yaml::to_writer(std::io::stdout(), value)?;
    println!();
    Ok(())
}
