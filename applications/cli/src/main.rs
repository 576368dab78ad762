/// dash - command-line client for the Product Dashboard
use anyhow::Context;
use clap::{Parser, Subcommand};
use dash_cli::{render, CliConfig, SessionFile};
use dash_client::{DashClient, LiveRefresh, LiveState, Session};
use dash_core::{Credentials, ProductForm, ProductId, Registration};
use dash_views::{AuthView, Notice, ProductsPage, ProfilePage};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dash")]
#[command(about = "Product Dashboard command-line client", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to ./dash.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API base URL
    #[arg(long, env = "DASH_API_BASE", global = true)]
    api_base: Option<String>,

    /// API key, sent as x-api-key
    #[arg(long, env = "DASH_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// File that keeps the login token between runs
    #[arg(long, env = "DASH_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "DASH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "DASH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and forget the token
    Logout,
    /// Show who is logged in
    Me,
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// List and manage products
    Products {
        #[command(subcommand)]
        command: ProductsCommand,
    },
    /// Follow live changes until Ctrl-C
    Watch {
        #[command(subcommand)]
        target: WatchTarget,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show the profile
    Show,
    /// Change name and/or email
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProductsCommand {
    /// List products, one page at a time
    List {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        per_page: Option<usize>,
    },
    /// Create a product
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        price: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Update a product; omitted fields keep their current value
    Update {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        price: Option<String>,
        /// Pass an empty string to clear the description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a product
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum WatchTarget {
    /// Re-render the product list whenever it changes
    Products {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        per_page: Option<usize>,
    },
    /// Re-render your profile whenever it changes
    Profile,
}

struct App {
    client: DashClient,
    session: Session,
    per_page: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dash=info,dash_cli=info,dash_client=info,dash_views=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?.with_overrides(
        cli.api_base,
        cli.api_key,
        cli.session_file,
    );
    config.validate()?;

    let client = DashClient::new(config.client_config())?;
    let store = SessionFile::new(config.session_path());
    let session = store.restore()?;

    let app = App {
        client,
        session,
        per_page: config.display.per_page,
    };

    let result = run(&app, cli.command).await;

    store
        .persist(&app.session)
        .context("Failed to save session")?;

    result
}

async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => login(app, email, password).await,
        Commands::Register {
            name,
            email,
            password,
        } => register(app, name, email, password).await,
        Commands::Logout => logout(app).await,
        Commands::Me => me(app).await,
        Commands::Profile { command } => match command {
            ProfileCommand::Show => show_profile(app).await,
            ProfileCommand::Update { name, email } => update_profile(app, name, email).await,
        },
        Commands::Products { command } => match command {
            ProductsCommand::List { page, per_page } => list_products(app, page, per_page).await,
            ProductsCommand::Create {
                name,
                price,
                description,
            } => create_product(app, ProductForm::new(name, price, description)).await,
            ProductsCommand::Update {
                id,
                name,
                price,
                description,
            } => update_product(app, ProductId::new(id), name, price, description).await,
            ProductsCommand::Delete { id, yes } => delete_product(app, ProductId::new(id), yes).await,
        },
        Commands::Watch { target } => match target {
            WatchTarget::Products { page, per_page } => watch_products(app, page, per_page).await,
            WatchTarget::Profile => watch_profile(app).await,
        },
    }
}

// =============================================================================
// Auth
// =============================================================================

async fn login(app: &App, email: String, password: String) -> anyhow::Result<()> {
    let view = AuthView::new(app.client.clone(), app.session.clone());
    view.login(&Credentials::new(email, password)).await?;
    print_notice(view.notice().await);
    Ok(())
}

async fn register(
    app: &App,
    name: String,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    let view = AuthView::new(app.client.clone(), app.session.clone());
    view.register(&Registration::new(name, email, password))
        .await?;
    print_notice(view.notice().await);
    Ok(())
}

async fn logout(app: &App) -> anyhow::Result<()> {
    let view = AuthView::new(app.client.clone(), app.session.clone());
    view.logout().await;
    print_notice(view.notice().await);
    Ok(())
}

// =============================================================================
// Profile
// =============================================================================

fn profile_page(app: &App) -> ProfilePage<DashClient> {
    ProfilePage::new(app.client.clone(), app.session.clone())
}

async fn me(app: &App) -> anyhow::Result<()> {
    let page = profile_page(app);
    page.load().await?;
    if let Some(user) = page.user().await {
        println!("Logged in as {} <{}> (id {})", user.name, user.email, user.id);
    }
    Ok(())
}

async fn show_profile(app: &App) -> anyhow::Result<()> {
    let page = profile_page(app);
    page.load().await?;
    if let Some(user) = page.user().await {
        print!("{}", render::user(&user));
    }
    Ok(())
}

async fn update_profile(
    app: &App,
    name: Option<String>,
    email: Option<String>,
) -> anyhow::Result<()> {
    if name.is_none() && email.is_none() {
        anyhow::bail!("Nothing to update; pass --name and/or --email");
    }

    let page = profile_page(app);
    page.load().await?;
    let mut form = page
        .form()
        .await
        .context("Profile could not be loaded")?;
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(email) = email {
        form.email = email;
    }

    let user = page.save(&form).await?;
    print_notice(page.notice().await);
    print!("{}", render::user(&user));
    Ok(())
}

// =============================================================================
// Products
// =============================================================================

fn products_page(app: &App, per_page: Option<usize>) -> ProductsPage<DashClient> {
    ProductsPage::new(app.client.clone(), app.session.clone())
        .with_per_page(per_page.unwrap_or(app.per_page))
}

async fn list_products(app: &App, page_no: usize, per_page: Option<usize>) -> anyhow::Result<()> {
    let page = products_page(app, per_page);
    page.load().await?;
    page.set_page(page_no).await;
    print!("{}", render::products(&page.snapshot().await));
    Ok(())
}

async fn create_product(app: &App, form: ProductForm) -> anyhow::Result<()> {
    let page = products_page(app, None);
    let product = page.create(&form).await?;
    print_notice(page.notice().await);
    println!("Created product #{}", product.id);
    Ok(())
}

async fn update_product(
    app: &App,
    id: ProductId,
    name: Option<String>,
    price: Option<String>,
    description: Option<String>,
) -> anyhow::Result<()> {
    let page = products_page(app, None);

    // Start from the stored product; a logged-out session is turned away
    // by the page without loading anything.
    let mut form = if app.session.is_authenticated() {
        page.load().await?;
        let existing = page
            .products()
            .await
            .into_iter()
            .find(|p| p.id == id)
            .with_context(|| format!("Product {} not found", id))?;
        ProductForm::from_product(&existing)
    } else {
        ProductForm::default()
    };
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(price) = price {
        form.price = price;
    }
    if let Some(description) = description {
        form.description = description;
    }

    page.update(id, &form).await?;
    print_notice(page.notice().await);
    Ok(())
}

async fn delete_product(app: &App, id: ProductId, yes: bool) -> anyhow::Result<()> {
    if app.session.is_authenticated() && !yes {
        let prompt = format!("Delete product #{}?", id);
        if !tokio::task::spawn_blocking(move || confirm(&prompt)).await?? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let page = products_page(app, None);
    page.delete(id).await?;
    print_notice(page.notice().await);
    Ok(())
}

// =============================================================================
// Watch
// =============================================================================

async fn watch_products(app: &App, page_no: usize, per_page: Option<usize>) -> anyhow::Result<()> {
    let page = Arc::new(products_page(app, per_page));
    page.load().await?;
    page.set_page(page_no).await;

    let live = page.live(&app.client);
    follow(live, || {
        let page = Arc::clone(&page);
        async move { render::products(&page.snapshot().await) }
    })
    .await;
    Ok(())
}

async fn watch_profile(app: &App) -> anyhow::Result<()> {
    let page = Arc::new(profile_page(app));
    page.load().await?;

    let live = page.live(&app.client);
    follow(live, || {
        let page = Arc::clone(&page);
        async move {
            let state = page.snapshot().await;
            let mut out = state.user.as_ref().map(render::user).unwrap_or_default();
            if let Some(notice) = &state.notice {
                out.push_str(&render::notice(notice));
                out.push('\n');
            }
            out
        }
    })
    .await;
    Ok(())
}

/// Print the view, then print it again each time a live refresh changes it.
async fn follow<F, Fut>(live: LiveRefresh, mut render_view: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = String>,
{
    let mut state = live.watch_state();
    let mut last = render_view().await;
    print!("{}", last);
    eprintln!("Watching for changes; press Ctrl-C to stop.");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                match current {
                    LiveState::Closed => {
                        tracing::warn!("Live refresh closed");
                        break;
                    }
                    LiveState::Connected => {
                        let out = render_view().await;
                        if out != last {
                            println!();
                            print!("{}", out);
                            last = out;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    live.shutdown().await;
}

// =============================================================================
// Helpers
// =============================================================================

fn print_notice(notice: Option<Notice>) {
    if let Some(notice) = notice {
        println!("{}", render::notice(&notice));
    }
}

fn confirm(prompt: &str) -> std::io::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
