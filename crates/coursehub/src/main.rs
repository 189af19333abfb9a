//! CourseHub CLI
//!
//! Command line client for the CourseHub backend: browse and search the
//! course catalog, read and write reviews, and take part in threaded
//! discussions that reference courses inline.

mod commands;
mod render;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursehub_client::services::catalog::SortKey;
use coursehub_client::{ApiClient, ClientConfig, Session};

#[derive(Parser)]
#[command(name = "coursehub")]
#[command(version, about = "CourseHub command line client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend API base URL (overrides COURSEHUB_API_URL)
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse or search the course catalog
    /// Examples:
    ///     coursehub courses
    ///     coursehub courses --query "databases" --page 2
    ///     coursehub courses --min-external-rating 4 --free --sort external-rating --desc
    #[command(verbatim_doc_comment)]
    Courses(CoursesArgs),

    /// Show one course with its internal rating aggregate
    /// Examples:
    ///     coursehub course 3f2a9c1e-77d4-4b65-9f10-52a4c8e3b7aa
    #[command(verbatim_doc_comment)]
    Course {
        /// Course id
        id: String,

        /// Emit only the JSON response
        #[arg(short, long)]
        json: bool,
    },

    /// List reviews for a course
    Reviews {
        /// Course id
        course_id: String,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long)]
        offset: Option<usize>,

        /// Emit only the JSON response
        #[arg(short, long)]
        json: bool,
    },

    /// Submit a rating + text review for a course (requires login)
    /// Examples:
    ///     coursehub review 3f2a9c1e-77d4-4b65-9f10-52a4c8e3b7aa --rating 5
    ///     coursehub review 3f2a9c1e-77d4-4b65-9f10-52a4c8e3b7aa --rating 4 --text "Solid intro"
    #[command(verbatim_doc_comment)]
    Review {
        /// Course id
        course_id: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: f64,

        /// Review text
        #[arg(short, long, default_value = "")]
        text: String,
    },

    /// Delete one of your reviews (requires login)
    DeleteReview {
        /// Course id
        course_id: String,

        /// Review id
        review_id: String,
    },

    /// List discussions, globally or for one course
    /// Examples:
    ///     coursehub discussions
    ///     coursehub discussions --course 3f2a9c1e-77d4-4b65-9f10-52a4c8e3b7aa --limit 20
    #[command(verbatim_doc_comment)]
    Discussions {
        /// Restrict to discussions referencing this course
        #[arg(long)]
        course: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long)]
        offset: Option<usize>,

        /// Emit only the JSON response
        #[arg(short, long)]
        json: bool,
    },

    /// Show a discussion with its threaded replies
    Discussion {
        /// Discussion id
        id: String,
    },

    /// Start a new discussion (requires login)
    ///
    /// Reference a course inline by embedding ***[[course:<id>]]*** in the
    /// text; the token is stored verbatim and rendered as a link.
    /// Examples:
    ///     coursehub discuss --title "Best SQL course?" --text "I liked ***[[course:3f2a9c1e-77d4-4b65-9f10-52a4c8e3b7aa]]*** a lot"
    ///     coursehub discuss --title "Recommendations" --text "What should I take next?" --reference 3f2a9c1e-77d4-4b65-9f10-52a4c8e3b7aa
    #[command(verbatim_doc_comment)]
    Discuss {
        #[arg(long)]
        title: String,

        /// Discussion body
        #[arg(long)]
        text: String,

        /// Append a reference token for this course id to the body; can be repeated
        #[arg(long = "reference", value_name = "COURSE_ID")]
        references: Vec<String>,
    },

    /// Reply to a discussion, or to another reply (requires login)
    /// Examples:
    ///     coursehub reply d-42 --text "Agreed"
    ///     coursehub reply d-42 --parent r-7 --text "Same here"
    #[command(verbatim_doc_comment)]
    Reply {
        /// Discussion id
        discussion_id: String,

        /// Parent reply id for a nested reply
        #[arg(long)]
        parent: Option<String>,

        /// Reply text
        #[arg(short, long)]
        text: String,
    },

    /// Delete one of your replies; it stays visible as "[deleted]" (requires login)
    DeleteReply {
        /// Discussion id
        discussion_id: String,

        /// Reply id
        reply_id: String,
    },

    /// Account and session management
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// List registered users
    Users {
        /// Emit only the JSON response
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Args)]
struct CoursesArgs {
    /// Search text; blank browses the full catalog
    #[arg(short, long)]
    query: Option<String>,

    /// 1-based page number
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Courses per page (default: COURSEHUB_PAGE_SIZE or 12)
    #[arg(long)]
    page_size: Option<usize>,

    /// Keep courses whose internal average rating is at least N
    #[arg(long, value_name = "N")]
    min_internal_rating: Option<f64>,

    /// Keep courses whose platform rating is at least N
    #[arg(long, value_name = "N")]
    min_external_rating: Option<f64>,

    /// Keep courses with at least N internal reviews
    #[arg(long, value_name = "N")]
    min_internal_reviews: Option<i64>,

    /// Keep courses with at least N platform reviews
    #[arg(long, value_name = "N")]
    min_external_reviews: Option<i64>,

    /// Only free courses
    #[arg(long, conflicts_with = "paid")]
    free: bool,

    /// Only paid courses
    #[arg(long)]
    paid: bool,

    /// Sort key (fetch order when omitted)
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Emit only the JSON response
    #[arg(short, long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    InternalRating,
    ExternalRating,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::InternalRating => SortKey::InternalRating,
            SortArg::ExternalRating => SortKey::ExternalRating,
        }
    }
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Log in and store the session
    /// Examples:
    ///     coursehub auth login --username ada --password hunter42x
    #[command(verbatim_doc_comment)]
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Drop the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
}

/// Initialize tracing/logging.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,coursehub=info,coursehub_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load client config, using defaults");
        ClientConfig::default()
    });
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let session = Session::load()?;
    let api = ApiClient::new(&config, session.clone());

    match cli.command {
        Commands::Courses(args) => commands::courses::browse(&api, &config, args).await?,
        Commands::Course { id, json } => commands::courses::detail(&api, &id, json).await?,
        Commands::Reviews {
            course_id,
            limit,
            offset,
            json,
        } => commands::reviews::list(&api, &course_id, limit, offset, json).await?,
        Commands::Review {
            course_id,
            rating,
            text,
        } => commands::reviews::submit(&api, &course_id, rating, &text).await?,
        Commands::DeleteReview {
            course_id,
            review_id,
        } => commands::reviews::delete(&api, &course_id, &review_id).await?,
        Commands::Discussions {
            course,
            limit,
            offset,
            json,
        } => commands::discussions::list(&api, course.as_deref(), limit, offset, json).await?,
        Commands::Discussion { id } => commands::discussions::show(&api, &id).await?,
        Commands::Discuss {
            title,
            text,
            references,
        } => commands::discussions::create(&api, &title, &text, &references).await?,
        Commands::Reply {
            discussion_id,
            parent,
            text,
        } => commands::discussions::reply(&api, &discussion_id, parent.as_deref(), &text).await?,
        Commands::DeleteReply {
            discussion_id,
            reply_id,
        } => commands::discussions::delete_reply(&api, &discussion_id, &reply_id).await?,
        Commands::Auth { command } => match command {
            AuthCommand::Login { username, password } => {
                commands::auth::login(&api, &username, &password).await?
            }
            AuthCommand::Register {
                username,
                email,
                password,
            } => commands::auth::register(&api, &username, &email, &password).await?,
            AuthCommand::Logout => commands::auth::logout(&session).await?,
            AuthCommand::Whoami => commands::auth::whoami(&api, &session).await?,
        },
        Commands::Users { json } => commands::auth::list_users(&api, json).await?,
    }

    Ok(())
}
