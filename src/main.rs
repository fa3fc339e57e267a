use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nutrifit_auth::config::{AuthConfig, ConfigError};
use nutrifit_auth::net::types::ApiError;
use nutrifit_auth::theme::{self, ANSI_RESET, DEFAULT_THEME, Rgb};
use nutrifit_auth::{
    AuthController, ErrorKey, Field, FileSession, FormState, HttpAuthBackend, Mode, NavState, Navigator, SessionStore,
    SubmitOutcome,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("backend client failed: {0}")]
    Api(#[from] ApiError),
    #[error("terminal io failed: {0}")]
    Io(#[from] io::Error),
    #[error("authentication did not complete")]
    NotAuthenticated,
}

#[derive(Parser, Debug)]
#[command(name = "nutrifit-auth", about = "NutriFit sign-in / sign-up client")]
struct Cli {
    /// Backend base URL (overrides `NUTRIFIT_API_URL`).
    #[arg(long)]
    base_url: Option<String>,

    /// Session file path (overrides `NUTRIFIT_SESSION_FILE`).
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with an existing account.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new account.
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Line-driven form: `set <field> <value>`, `toggle`, `submit`, `show`, `quit`.
    Interactive,
    /// Print the stored session user id.
    Session,
}

type TerminalController = AuthController<HttpAuthBackend, FileSession, TerminalNavigator>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let painter = Painter { color: !cli.no_color };

    match cli.command {
        Command::Session => {
            if let Some(user_id) = FileSession::new(&config.session_file).user_id() {
                println!("{user_id}");
            }
            Ok(())
        }
        Command::Login { username, password } => {
            let mut controller = build_controller(&config, Mode::Login, painter)?;
            controller.set_field(Field::Username, username);
            controller.set_field(Field::Password, password);
            submit_once(&mut controller, painter).await
        }
        Command::Signup { username, password, confirm_password, email } => {
            let mut controller = build_controller(&config, Mode::Signup, painter)?;
            controller.set_field(Field::Username, username);
            controller.set_field(Field::Password, password);
            controller.set_field(Field::ConfirmPassword, confirm_password);
            controller.set_field(Field::Email, email);
            submit_once(&mut controller, painter).await
        }
        Command::Interactive => {
            let mut controller = build_controller(&config, Mode::Login, painter)?;
            run_interactive(&mut controller, painter).await
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<AuthConfig, CliError> {
    let mut config = AuthConfig::from_env()?;
    if let Some(url) = cli.base_url.as_deref() {
        config.base_url = AuthConfig::from_values(Some(url), None)?.base_url;
    }
    if let Some(path) = &cli.session_file {
        config.session_file.clone_from(path);
    }
    tracing::debug!(base_url = %config.base_url, session_file = %config.session_file.display(), "config resolved");
    Ok(config)
}

fn build_controller(config: &AuthConfig, mode: Mode, painter: Painter) -> Result<TerminalController, CliError> {
    let backend = HttpAuthBackend::new(&config.base_url)?;
    let session = FileSession::new(&config.session_file);
    Ok(AuthController::with_mode(mode, backend, session, TerminalNavigator { painter }))
}

async fn submit_once(controller: &mut TerminalController, painter: Painter) -> Result<(), CliError> {
    let outcome = controller.submit().await;
    if outcome.is_navigated() {
        return Ok(());
    }
    render(controller.form(), painter);
    Err(CliError::NotAuthenticated)
}

async fn run_interactive(controller: &mut TerminalController, painter: Painter) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    render(controller.form(), painter);

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        let mut parts = line.trim().splitn(3, ' ');
        match parts.next().unwrap_or_default() {
            "" | "show" => render(controller.form(), painter),
            "quit" | "exit" => return Ok(()),
            "toggle" => {
                controller.toggle_mode();
                render(controller.form(), painter);
            }
            "set" => {
                let Some(name) = parts.next() else {
                    println!("usage: set <field> <value>");
                    continue;
                };
                match name.parse::<Field>() {
                    Ok(field) => {
                        controller.set_field(field, parts.next().unwrap_or_default());
                    }
                    Err(e) => println!("{e}"),
                }
            }
            "submit" => match controller.submit().await {
                SubmitOutcome::Navigated { .. } => return Ok(()),
                _ => render(controller.form(), painter),
            },
            other => println!("unknown command: {other}"),
        }
    }
}

// =============================================================================
// RENDERING
// =============================================================================

#[derive(Clone, Copy, Debug)]
struct Painter {
    color: bool,
}

impl Painter {
    fn paint(self, hex: &str, text: &str) -> String {
        match Rgb::from_hex(hex) {
            Some(rgb) if self.color => format!("{}{text}{ANSI_RESET}", rgb.ansi_fg()),
            _ => text.to_owned(),
        }
    }
}

fn render(form: &FormState, painter: Painter) {
    let theme = DEFAULT_THEME;
    let mode = form.mode();
    println!();
    println!("{} {}", painter.paint(theme.accent, theme::APP_TITLE), painter.paint(theme.muted, theme::heading(mode)));
    if let Some(message) = form.errors().get(ErrorKey::General) {
        println!("{}", painter.paint(theme.error, &format!("! {message}")));
    }
    for field in mode.visible_fields() {
        let value = form.fields().get(*field);
        let shown = if field.is_secret() { "*".repeat(value.chars().count()) } else { value.to_owned() };
        let label = painter.paint(theme.input_border(form.is_invalid(*field)), field.label());
        println!("  {label} [{}]: {shown}", field.name());
        if let Some(message) = form.errors().get(*field) {
            println!("    {}", painter.paint(theme.error, message));
        }
    }
    println!(
        "  [{}]  ({})",
        painter.paint(theme.submit_background(form.is_loading()), theme::submit_label(mode, form.is_loading())),
        theme::toggle_label(mode)
    );
}

struct TerminalNavigator {
    painter: Painter,
}

impl Navigator for TerminalNavigator {
    fn navigate(&mut self, path: &str, state: Option<&NavState>) {
        let payload = state.and_then(|s| serde_json::to_string(s).ok()).unwrap_or_default();
        println!("{} {path} {payload}", self.painter.paint(DEFAULT_THEME.accent, "->"));
    }
}
