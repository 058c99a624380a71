use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ladder_core::{
    ActivityLog, Command as Mutation, FileGateway, Invitation, InviteCode, Role, Session, SessionConfig,
    UserId,
};
use ladder_store::{Category, Change, TierId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod render;

fn tier_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(value_parser!(TierId))
        .help("Tier number, 1 to 5")
}

fn category_arg() -> Arg {
    Arg::new("category")
        .required(true)
        .value_parser(value_parser!(Category))
        .help("responsibilities (resp) or privileges (priv)")
}

fn text_arg(name: &'static str) -> Arg {
    Arg::new(name).required(true)
}

fn cli() -> Command {
    Command::new("ladder")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Responsibility ladder for kids: tiers, mastery and privileges")
        .subcommand_required(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .default_value(".ladder")
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding stored documents and invitations"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML session configuration"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .default_value("local")
                .help("Account whose ladder is opened"),
        )
        .arg(
            Arg::new("invite-code")
                .long("invite")
                .global(true)
                .value_name("CODE")
                .help("Open the inviting parent's ladder as the child linked by CODE"),
        )
        .subcommand(
            Command::new("show").about("Print the active child's ladder").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Print the stored document instead"),
            ),
        )
        .subcommand(Command::new("progress").about("Print tier progress"))
        .subcommand(Command::new("kids").about("List child profiles"))
        .subcommand(
            Command::new("select")
                .about("Make a child active")
                .arg(text_arg("name")),
        )
        .subcommand(
            Command::new("add-kid")
                .about("Add a child profile")
                .arg(text_arg("name")),
        )
        .subcommand(
            Command::new("rename-kid")
                .about("Rename a child profile")
                .arg(text_arg("from"))
                .arg(text_arg("to")),
        )
        .subcommand(
            Command::new("delete-kid")
                .about("Delete a child profile")
                .arg(text_arg("name")),
        )
        .subcommand(
            Command::new("add")
                .about("Add an item to a tier")
                .arg(tier_arg("tier"))
                .arg(category_arg())
                .arg(text_arg("text")),
        )
        .subcommand(
            Command::new("edit")
                .about("Change an item's text")
                .arg(tier_arg("tier"))
                .arg(category_arg())
                .arg(text_arg("from"))
                .arg(text_arg("to")),
        )
        .subcommand(
            Command::new("delete")
                .about("Remove an item")
                .arg(tier_arg("tier"))
                .arg(category_arg())
                .arg(text_arg("text")),
        )
        .subcommand(
            Command::new("move")
                .about("Move an item to another tier")
                .arg(category_arg())
                .arg(text_arg("text"))
                .arg(tier_arg("from"))
                .arg(tier_arg("to")),
        )
        .subcommand(
            Command::new("master")
                .about("Mark a responsibility as mastered")
                .arg(text_arg("text"))
                .arg(
                    Arg::new("off")
                        .long("off")
                        .action(ArgAction::SetTrue)
                        .help("Clear the mark instead"),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Run a JSON array of commands, undo and redo included")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("streak")
                .about("Print completion streaks of a child account")
                .arg(
                    Arg::new("child")
                        .long("child")
                        .help("Child account; defaults to the signed-in user"),
                ),
        )
        .subcommand(Command::new("invite").about("Issue an invite code for the active child"))
        .subcommand(
            Command::new("join")
                .about("Open a parent's ladder as a child using an invite code")
                .arg(text_arg("code")),
        )
}

/// Translate a mutation subcommand into a session command
fn mutation(name: &str, args: &ArgMatches) -> Option<Mutation> {
    let text = |key: &str| args.get_one::<String>(key).cloned().unwrap_or_default();
    let tier = |key: &str| args.get_one::<TierId>(key).copied().unwrap_or(TierId::FIRST);
    let category = || {
        args.get_one::<Category>("category")
            .copied()
            .unwrap_or(Category::Responsibilities)
    };

    Some(match name {
        "select" => Mutation::SelectChild { name: text("name") },
        "add-kid" => Mutation::AddChild { name: text("name") },
        "rename-kid" => Mutation::RenameChild {
            from: text("from"),
            to: text("to"),
        },
        "delete-kid" => Mutation::DeleteChild { name: text("name") },
        "add" => Mutation::AddItem {
            tier: tier("tier"),
            category: category(),
            text: text("text"),
        },
        "edit" => Mutation::EditItem {
            tier: tier("tier"),
            category: category(),
            from: text("from"),
            to: text("to"),
        },
        "delete" => Mutation::DeleteItem {
            tier: tier("tier"),
            category: category(),
            text: text("text"),
        },
        "move" => Mutation::MoveItem {
            category: category(),
            text: text("text"),
            from: tier("from"),
            to: tier("to"),
        },
        "master" => Mutation::ToggleMastery {
            text: text("text"),
            mastered: !args.get_flag("off"),
        },
        _ => return None,
    })
}

fn invite_path(data_dir: &Path, code: &InviteCode) -> PathBuf {
    data_dir.join("invites").join(format!("{code}.json"))
}

async fn read_invite(path: &Path) -> Result<Invitation> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("no invitation at {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("malformed invitation {}", path.display()))
}

async fn write_invite(path: &Path, invitation: &Invitation) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(invitation)?).await?;
    Ok(())
}

async fn run(session: &mut Session, data_dir: &Path, name: &str, args: &ArgMatches) -> Result<()> {
    if let Some(command) = mutation(name, args) {
        let change = session.execute(&command)?;
        debug!(?command, ?change, "Command executed");
        if change == Change::Unchanged {
            println!("No change.");
        }
        return print_board(session);
    }

    match name {
        "show" if args.get_flag("json") => {
            let store = session.store().context("session not ready")?;
            println!("{}", serde_json::to_string_pretty(&store.to_document()?)?);
        }
        "show" | "join" => print_board(session)?,
        "progress" => {
            let store = session.store().context("session not ready")?;
            print!("{}", render::progress(store));
        }
        "kids" => {
            let store = session.store().context("session not ready")?;
            print!("{}", render::kids(store));
        }
        "batch" => {
            let path = args.get_one::<PathBuf>("file").context("missing file")?;
            let source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("cannot read {}", path.display()))?;
            let commands: Vec<Mutation> = serde_json::from_str(&source)
                .with_context(|| format!("{} is not a JSON array of commands", path.display()))?;
            for command in &commands {
                session.execute(command)?;
            }
            info!(count = commands.len(), "Batch applied");
            print_board(session)?;
        }
        "streak" => {
            let log = session.activity_log().context("no activity log attached")?;
            let store = session.store().context("session not ready")?;
            let child = match args.get_one::<String>("child") {
                Some(child) => UserId::new(child.as_str()),
                None => session.user().cloned().context("not signed in")?,
            };
            let records = log.records(&child).await?;
            print!("{}", render::streaks(store, &records, &child, Local::now().date_naive()));
        }
        "invite" => {
            let invitation = session.create_invite(Utc::now())?;
            write_invite(&invite_path(data_dir, &invitation.code), &invitation).await?;
            println!(
                "Invite code {} for {} (valid until {})",
                invitation.code,
                invitation.kid_name,
                invitation.expires_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        other => anyhow::bail!("unknown command: {other}"),
    }
    Ok(())
}

fn print_board(session: &Session) -> Result<()> {
    let store = session.store().context("session not ready")?;
    print!("{}", render::board(store));
    Ok(())
}

async fn open(
    session: &mut Session,
    data_dir: &Path,
    user: UserId,
    invite: Option<&String>,
    sub: (&str, &ArgMatches),
) -> Result<()> {
    let code = match sub {
        ("join", args) => Some(args.get_one::<String>("code").context("missing code")?),
        _ => invite,
    };
    match code {
        Some(raw) => {
            let code: InviteCode = raw.parse()?;
            let path = invite_path(data_dir, &code);
            let mut invitation = read_invite(&path).await?;
            session.login_child(user, &mut invitation, Utc::now()).await?;
            write_invite(&path, &invitation).await?;
        }
        None => session.login(user, Role::Parent).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let data_dir = matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(".ladder"));
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SessionConfig::from_file(path).await?,
        None => SessionConfig::default(),
    };
    let user = UserId::new(
        matches
            .get_one::<String>("user")
            .map_or("local", String::as_str),
    );
    let (name, args) = matches.subcommand().context("no command given")?;

    let gateway = Arc::new(FileGateway::new(data_dir.join("users")));
    let activity = ActivityLog::new(Arc::new(FileGateway::new(data_dir.join("activity"))));
    let mut session = Session::new(config, gateway).with_activity_log(activity);
    let mut notices = session.subscribe();

    let invite = matches.get_one::<String>("invite-code");
    open(&mut session, &data_dir, user, invite, (name, args)).await?;
    let outcome = run(&mut session, &data_dir, name, args).await;
    let saved = session.logout().await;

    while let Ok(notice) = notices.try_recv() {
        eprintln!("{}", render::notice(&notice));
    }
    outcome?;
    saved?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        cli().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn add_parses_tier_and_category() {
        let matches = parse(&["ladder", "add", "2", "priv", "Phone"]);
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(
            mutation(name, args),
            Some(Mutation::AddItem {
                tier: TierId::new(2).unwrap(),
                category: Category::Privileges,
                text: "Phone".into(),
            })
        );
    }

    #[test]
    fn bad_tier_is_rejected_by_parser() {
        assert!(cli()
            .try_get_matches_from(["ladder", "add", "7", "resp", "x"])
            .is_err());
    }

    #[test]
    fn master_off_clears() {
        let matches = parse(&["ladder", "master", "Make bed", "--off"]);
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(
            mutation(name, args),
            Some(Mutation::ToggleMastery {
                text: "Make bed".into(),
                mastered: false,
            })
        );
    }

    #[test]
    fn reads_are_not_mutations() {
        let matches = parse(&["ladder", "--data-dir", "/tmp/x", "show"]);
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(mutation(name, args), None);
        assert_eq!(
            matches.get_one::<PathBuf>("data-dir"),
            Some(&PathBuf::from("/tmp/x"))
        );
    }

    #[tokio::test]
    async fn invitations_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let invitation = Invitation::issue(UserId::new("p"), "Ana", Utc::now(), chrono::Duration::hours(1)).unwrap();
        let path = invite_path(dir.path(), &invitation.code);
        write_invite(&path, &invitation).await.unwrap();
        assert_eq!(read_invite(&path).await.unwrap(), invitation);
    }
}
