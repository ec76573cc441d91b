use setlist::session::{Command, NullPlayer, SessionEvent, SessionHandle};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Default)]
struct CliArgs {
    config_dir: Option<PathBuf>,
    game: Option<String>,
}

fn main() -> anyhow::Result<()> {
    setlist::logging::init();
    let args = parse_args(std::env::args().skip(1).collect())?;

    let root = match args.config_dir {
        Some(dir) => dir,
        None => setlist::config::config_root()?,
    };
    let game = match args.game {
        Some(game) => game,
        None => setlist::config::load_current_game(&root)?,
    };

    let mut session = SessionHandle::spawn(root, game, NullPlayer::new());
    let mut now_playing: Option<String> = None;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let Some(command) = parse_command(&line, now_playing.as_deref()) else {
            continue;
        };
        let quit = matches!(command, Command::Shutdown);
        session.send(command);
        if quit {
            break;
        }
        while let Some(event) = session.recv_event_timeout(Duration::from_millis(200)) {
            match &event {
                SessionEvent::NowPlaying { title, .. } => now_playing = Some(title.clone()),
                SessionEvent::LocationChecked(_) | SessionEvent::Idle => now_playing = None,
                _ => {}
            }
            print_event(&event);
        }
    }

    session.shutdown();
    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--config" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--config requires a directory");
                };
                out.config_dir = Some(PathBuf::from(value.trim()));
            }
            "--game" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--game requires a game name");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--game cannot be empty");
                }
                out.game = Some(value.trim().to_string());
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn parse_command(line: &str, now_playing: Option<&str>) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim().to_string();

    let command = match verb {
        "item" => Command::ItemReceived(rest),
        "slot" => match serde_json::from_str(&rest) {
            Ok(value) => Command::SlotData(value),
            Err(err) => {
                eprintln!("bad slot data: {err}");
                return None;
            }
        },
        "queue" => Command::Enqueue(rest),
        "done" => {
            let title = if rest.is_empty() {
                now_playing?.to_string()
            } else {
                rest
            };
            Command::PlaybackFinished { title }
        }
        "skip" => Command::SkipLocked,
        "game" => Command::SwitchGame(rest),
        "reload" => Command::Reload,
        "disconnect" => Command::Disconnect,
        "quit" => Command::Shutdown,
        other => {
            eprintln!("unknown command {other}");
            return None;
        }
    };
    Some(command)
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::TreeChanged(tree) => {
            for album in tree {
                println!("{}", album.name);
                for song in &album.songs {
                    println!("  {song}");
                }
            }
        }
        SessionEvent::NowPlaying { title, path } => {
            println!("now playing {title} ({})", path.display())
        }
        SessionEvent::Idle => println!("queue empty"),
        SessionEvent::Locked(err) => println!("{err}"),
        SessionEvent::LocationChecked(title) => println!("checked {title}"),
        SessionEvent::LoadFailed(reason) => eprintln!("load failed: {reason}"),
        SessionEvent::Status(message) => println!("{message}"),
    }
}

fn print_help() {
    println!("setlist");
    println!("  --config DIR      Config root (default $SETLIST_CONFIG_DIR or ~/.config/setlist)");
    println!("  --game NAME       Game folder to load (default currentGame.json)");
    println!();
    println!("stdin commands: item NAME | slot JSON | queue TITLE | done [TITLE] | skip");
    println!("                game NAME | reload | disconnect | quit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_slot_line_is_skipped() {
        assert!(parse_command("slot {bad", None).is_none());
        assert!(matches!(
            parse_command("item Red (Album)", None),
            Some(Command::ItemReceived(item)) if item == "Red (Album)"
        ));
        assert!(matches!(
            parse_command(r#"slot {"opt_red": 1}"#, None),
            Some(Command::SlotData(_))
        ));
    }

    #[test]
    fn done_defaults_to_current_song() {
        assert!(matches!(
            parse_command("done", Some("22")),
            Some(Command::PlaybackFinished { title }) if title == "22"
        ));
        assert!(matches!(
            parse_command("done Style", Some("22")),
            Some(Command::PlaybackFinished { title }) if title == "Style"
        ));
        assert!(parse_command("done", None).is_none());
    }
}
