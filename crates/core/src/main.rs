use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use graph::{shortest_path, LinkGraph};
use protocol::{Outcome, PathTab};
use redrace::{format_elapsed, GameSession, Phase, TickTimer};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "redrace")]
#[command(about = "Race across the subreddit link graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON link-graph document.
    #[arg(long, global = true, default_value = "top_subreddit_links.json")]
    graph: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a race interactively.
    Play {
        /// Starting subreddit; random when omitted.
        #[arg(long)]
        start: Option<String>,

        /// Destination subreddit; random when omitted.
        #[arg(long)]
        end: Option<String>,

        /// Seed for random endpoint picks (wall clock when omitted).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the shortest link path between two subreddits.
    Path { from: String, to: String },

    /// Print link-graph statistics.
    Stats,

    /// Print random valid subreddit names.
    Random {
        #[arg(long, default_value = "1")]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let graph = LinkGraph::load(&cli.graph)?;

    match cli.command {
        Commands::Play { start, end, seed } => {
            run_play(Arc::new(graph), start, end, seed).await?;
        }

        Commands::Path { from, to } => {
            if !graph.contains(&from) {
                println!("Start subreddit not found: {}", from);
                return Ok(());
            }
            if !graph.contains(&to) {
                println!("Destination subreddit not found: {}", to);
                return Ok(());
            }

            match shortest_path(&graph, &from, &to) {
                Some(path) => {
                    println!(
                        "Shortest path from r/{} to r/{} ({} hops):",
                        from,
                        to,
                        path.len() - 1
                    );
                    for node in path {
                        println!("  -> r/{}", node);
                    }
                }
                None => println!("No path found from r/{} to r/{}", from, to),
            }
        }

        Commands::Stats => {
            let stats = graph.stats();
            println!("Graph statistics:");
            println!("  Nodes (subreddits): {}", stats.node_count);
            println!("  Edges (links): {}", stats.edge_count);
            println!("  Dangling links: {}", stats.dangling_edges);
        }

        Commands::Random { count, seed } => {
            let mut seed = seed.unwrap_or_else(clock_seed);
            for _ in 0..count {
                seed = seed.wrapping_add(1);
                if let Some(node) = graph.random_node(seed) {
                    println!("r/{}", node);
                }
            }
        }
    }

    Ok(())
}

async fn run_play(
    graph: Arc<LinkGraph>,
    mut start_arg: Option<String>,
    mut end_arg: Option<String>,
    seed: Option<u64>,
) -> Result<()> {
    let mut seed = seed.unwrap_or_else(clock_seed);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let start = pick_endpoint(&graph, start_arg.take(), "start", &mut seed)?;
        let end = pick_endpoint(&graph, end_arg.take(), "destination", &mut seed)?;
        info!("Starting race: r/{} -> r/{}", start, end);

        let mut session = GameSession::new(graph.clone(), &start, &end)?;
        let play_again = run_session(&mut session, &mut lines).await?;
        if !play_again {
            return Ok(());
        }
        // Restarts discard the session and draw fresh random endpoints.
    }
}

fn pick_endpoint(
    graph: &LinkGraph,
    provided: Option<String>,
    role: &str,
    seed: &mut u64,
) -> Result<String> {
    match provided {
        Some(name) => {
            if !graph.contains(&name) {
                return Err(anyhow!("{} subreddit not in current data: {}", role, name));
            }
            Ok(name)
        }
        None => {
            *seed = seed.wrapping_add(1);
            graph
                .random_node(*seed)
                .map(str::to_string)
                .ok_or_else(|| anyhow!("graph has no nodes to pick a {} from", role))
        }
    }
}

async fn run_session(
    session: &mut GameSession,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool> {
    println!();
    println!("GET TO r/{}", session.end());
    println!("From: r/{}", session.start());

    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let timer = TickTimer::start(tick_tx);
    let mut needs_render = true;

    while session.phase() == Phase::Playing {
        if needs_render {
            render_turn(session);
            needs_render = false;
        }

        let line = tokio::select! {
            Some(()) = tick_rx.recv() => {
                session.tick();
                continue;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            // stdin closed
            timer.stop();
            return Ok(false);
        };

        match line.trim() {
            "" => {}
            "q" => {
                timer.stop();
                return Ok(false);
            }
            "h" => {
                session.request_hint();
                match session.hint() {
                    Some(next) => println!("Hint: head for r/{}", next),
                    None => println!("No route to the destination from here."),
                }
                needs_render = true;
            }
            input => match input.parse::<usize>() {
                Ok(n) if n >= 1 && n <= session.options().len() => {
                    let next = session.options()[n - 1].subreddit.clone();
                    session.select_next_hop(&next)?;
                    needs_render = true;
                }
                _ => println!("Enter a link number, 'h' for a hint, or 'q' to quit."),
            },
        }
    }

    timer.stop();
    render_win(session);
    post_win_loop(session, lines).await
}

fn render_turn(session: &GameSession) {
    println!();
    println!(
        "[{}] You are at r/{} ({} moves)",
        format_elapsed(session.elapsed_secs()),
        session.current(),
        session.player_moves()
    );

    if session.options().is_empty() {
        println!("  Dead end: no outgoing links. 'q' to give up.");
    }
    for (i, link) in session.options().iter().enumerate() {
        let hinted = session.hint() == Some(link.subreddit.as_str());
        println!(
            "  {}. r/{}{}",
            i + 1,
            link.subreddit,
            if hinted { "  <- hint" } else { "" }
        );
    }
    print!("> ");
    std::io::stdout().flush().ok();
}

fn render_win(session: &GameSession) {
    println!();
    println!(
        "You made it to r/{} in {} moves ({}).",
        session.end(),
        session.player_moves(),
        format_elapsed(session.elapsed_secs())
    );
    match session.outcome() {
        Outcome::Optimal => println!("That is an optimal route!"),
        Outcome::Suboptimal { optimal_moves } => {
            println!("A shorter route exists: {} moves.", optimal_moves)
        }
        Outcome::Unknown => {}
    }
}

async fn post_win_loop(
    session: &mut GameSession,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool> {
    let comparable = matches!(session.outcome(), Outcome::Suboptimal { .. });
    loop {
        if comparable {
            println!("[p] your path  [o] optimal path  [r] play again  [q] quit");
        } else {
            println!("[p] your path  [r] play again  [q] quit");
        }
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        match line.trim() {
            "p" => {
                session.set_comparison_tab(PathTab::Player);
                print_path(session.path());
            }
            "o" if comparable => {
                session.set_comparison_tab(PathTab::Optimal);
                print_path(session.optimal_path());
            }
            "r" => return Ok(true),
            "q" => return Ok(false),
            _ => {}
        }
    }
}

fn print_path(path: &[String]) {
    for node in path {
        println!("  -> r/{}", node);
    }
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
